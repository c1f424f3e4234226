use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::questionnaire::{Question, QuestionOption};
use crate::domain::stack::StackTier;

pub const STANDARD_CATALOG_VERSION: &str = "2024-standard";

/// Option value that, on a multi-select question, excludes every other choice.
pub const NONE_OPTION: &str = "none";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog has no questions")]
    Empty,
    #[error("duplicate question id `{0}`")]
    DuplicateQuestion(String),
    #[error("question `{question_id}` lists option `{value}` more than once")]
    DuplicateOption { question_id: String, value: String },
    #[error("question `{0}` has no options")]
    NoOptions(String),
}

/// Ordered questionnaire. The order drives navigation only; scoring never depends on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCatalog {
    pub version: String,
    pub questions: Vec<Question>,
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl QuestionCatalog {
    pub fn new(version: impl Into<String>, questions: Vec<Question>) -> Self {
        Self { version: version.into(), questions }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Self = toml::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen_questions = HashSet::new();
        for question in &self.questions {
            if !seen_questions.insert(question.id.as_str()) {
                return Err(CatalogError::DuplicateQuestion(question.id.clone()));
            }
            if question.options.is_empty() {
                return Err(CatalogError::NoOptions(question.id.clone()));
            }

            let mut seen_values = HashSet::new();
            for option in &question.options {
                if !seen_values.insert(option.value.as_str()) {
                    return Err(CatalogError::DuplicateOption {
                        question_id: question.id.clone(),
                        value: option.value.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn find(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == question_id)
    }

    pub fn option(&self, question_id: &str, value: &str) -> Option<&QuestionOption> {
        self.find(question_id).and_then(|question| question.option(value))
    }

    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Built-in seven-question web project catalog.
    pub fn standard() -> Self {
        let pct = |hundredths: i64| Decimal::new(hundredths, 2);
        let weighted = |value: &str, modifier: i64, stack_modifier: i64| {
            QuestionOption::new(value)
                .with_modifier(pct(modifier))
                .with_stack_modifier(Decimal::from(stack_modifier))
        };
        let timed = |value: &str, modifier: i64| QuestionOption::new(value).with_modifier(pct(modifier));

        let questions = vec![
            Question::single(
                "projectType",
                vec![
                    QuestionOption::new("vitrine").with_stack(StackTier::C).with_days(8, 15),
                    QuestionOption::new("corporate").with_stack(StackTier::B).with_days(20, 35),
                    QuestionOption::new("editorial").with_stack(StackTier::A).with_days(40, 60),
                    QuestionOption::new("webapp").with_stack(StackTier::B).with_days(25, 50),
                    QuestionOption::new("webgl").with_stack(StackTier::B).with_days(30, 60),
                    QuestionOption::new("intranet").with_stack(StackTier::A).with_days(60, 120),
                    QuestionOption::new("internal").with_stack(StackTier::C).with_days(10, 25),
                ],
            ),
            Question::single(
                "dataComplexity",
                vec![
                    weighted("simple", 0, 0),
                    weighted("medium", 15, 0),
                    weighted("complex", 30, 1),
                    weighted("enterprise", 50, 2),
                ],
            ),
            Question::single(
                "multilingual",
                vec![
                    weighted("mono", 0, 0),
                    weighted("bi", 10, 0),
                    weighted("multi", 20, 1),
                    weighted("enterprise", 30, 2),
                ],
            ),
            Question::multi(
                "integrations",
                vec![
                    timed(NONE_OPTION, 0),
                    timed("crm", 10),
                    timed("erp", 15),
                    weighted("sso", 10, 1),
                    timed("payment", 10),
                    timed("analytics", 5),
                    timed("search", 10),
                ],
            ),
            Question::single(
                "accessibility",
                vec![timed(NONE_OPTION, 0), timed("aa", 15), timed("aaa", 25)],
            ),
            Question::single(
                "security",
                vec![
                    weighted("standard", 0, 0),
                    weighted("enhanced", 10, 0),
                    weighted("enterprise", 20, 1),
                ],
            ),
            Question::single(
                "deadline",
                vec![
                    timed("urgent", 20),
                    timed("standard", 0),
                    timed("comfortable", -5),
                    timed("long", -10),
                ],
            ),
        ];

        Self::new(STANDARD_CATALOG_VERSION, questions)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{CatalogError, QuestionCatalog};
    use crate::domain::stack::StackTier;

    #[test]
    fn standard_catalog_is_consistent_and_ordered() {
        let catalog = QuestionCatalog::standard();
        catalog.validate().expect("standard catalog validates");

        let ids: Vec<&str> = catalog.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(
            ids,
            ["projectType", "dataComplexity", "multilingual", "integrations", "accessibility", "security", "deadline"]
        );
        assert!(catalog.find("integrations").is_some_and(|q| q.multi_select));
        assert_eq!(catalog.question_at(0).map(|q| q.options.len()), Some(7));
    }

    #[test]
    fn only_project_type_options_carry_days_and_stack_hints() {
        let catalog = QuestionCatalog::standard();
        for question in &catalog.questions {
            let carries_baseline = question.options.iter().any(|o| o.days.is_some() || o.stack.is_some());
            assert_eq!(carries_baseline, question.id == "projectType", "question {}", question.id);
        }

        let intranet = catalog.option("projectType", "intranet").expect("intranet option");
        assert_eq!(intranet.stack, Some(StackTier::A));
        assert_eq!(catalog.option("deadline", "long").and_then(|o| o.modifier), Some(Decimal::new(-10, 2)));
    }

    #[test]
    fn toml_catalog_loads_from_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.toml");
        fs::write(
            &path,
            r#"
version = "custom-1"

[[questions]]
id = "projectType"

[[questions.options]]
value = "landing"
stack = "C"
days = { min = 3, max = 6 }

[[questions]]
id = "extras"
multi_select = true

[[questions.options]]
value = "blog"
modifier = "0.1"
"#,
        )
        .expect("write catalog");

        let catalog = QuestionCatalog::load(&path).expect("load catalog");
        assert_eq!(catalog.version, "custom-1");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.option("extras", "blog").and_then(|o| o.modifier), Some(Decimal::new(1, 1)));
    }

    #[test]
    fn duplicate_ids_and_options_are_rejected() {
        let duplicate_question = r#"
version = "broken"
[[questions]]
id = "a"
[[questions.options]]
value = "x"
[[questions]]
id = "a"
[[questions.options]]
value = "y"
"#;
        assert!(matches!(
            QuestionCatalog::from_toml_str(duplicate_question),
            Err(CatalogError::DuplicateQuestion(ref id)) if id == "a"
        ));

        let duplicate_option = r#"
version = "broken"
[[questions]]
id = "a"
[[questions.options]]
value = "x"
[[questions.options]]
value = "x"
"#;
        assert!(matches!(
            QuestionCatalog::from_toml_str(duplicate_option),
            Err(CatalogError::DuplicateOption { .. })
        ));

        assert!(matches!(
            QuestionCatalog::from_toml_str("version = \"empty\"\nquestions = []"),
            Err(CatalogError::Empty)
        ));
    }
}
