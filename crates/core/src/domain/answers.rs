use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One questionnaire answer. Serialized as a bare string or a string array so the
/// persisted shape stays `{"projectType": "vitrine", "integrations": ["crm"]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multiple(BTreeSet<String>),
}

impl Answer {
    pub fn single(value: impl Into<String>) -> Self {
        Self::Single(value.into())
    }

    pub fn multiple<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multiple(values.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(value) => value.is_empty(),
            Self::Multiple(values) => values.is_empty(),
        }
    }
}

/// Answers keyed by question id. Partial until every catalog question has a non-empty
/// answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<String, Answer>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.0.get(question_id)
    }

    pub fn insert(&mut self, question_id: impl Into<String>, answer: Answer) {
        self.0.insert(question_id.into(), answer);
    }

    pub fn remove(&mut self, question_id: &str) -> Option<Answer> {
        self.0.remove(question_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Answer)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn with(mut self, question_id: impl Into<String>, answer: Answer) -> Self {
        self.insert(question_id, answer);
        self
    }
}

impl FromIterator<(String, Answer)> for Answers {
    fn from_iter<T: IntoIterator<Item = (String, Answer)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Answer, Answers};

    #[test]
    fn answers_serialize_as_plain_strings_and_arrays() {
        let answers = Answers::new()
            .with("projectType", Answer::single("vitrine"))
            .with("integrations", Answer::multiple(["sso", "crm"]));

        let json = serde_json::to_value(&answers).expect("serialize answers");
        assert_eq!(
            json,
            serde_json::json!({"integrations": ["crm", "sso"], "projectType": "vitrine"})
        );

        let decoded: Answers = serde_json::from_value(json).expect("decode answers");
        assert_eq!(decoded, answers);
    }

    #[test]
    fn duplicate_multi_values_collapse() {
        let answer = Answer::multiple(["crm", "crm", "erp"]);
        assert!(matches!(answer, Answer::Multiple(ref values) if values.len() == 2));
    }
}
