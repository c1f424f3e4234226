//! Estimate request documents read by `estimate`, `budget` and `project save`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use stackwise_core::domain::answers::{Answer, Answers};
use stackwise_core::domain::profile::{ProfileId, TjmProfile};
use stackwise_core::{DiscountType, EstimationSession, EstimationType, Project, QuestionCatalog};

use super::{application_failure, Failure, EXIT_INPUT};

/// ```json
/// {
///   "name": "Refonte site corporate",
///   "answers": { "projectType": "corporate", "integrations": ["crm", "sso"] },
///   "distribution": { "dev": 60, "pm": 40 },
///   "tjm": { "dev": 550 },
///   "days": { "design": 3 },
///   "discount_type": "percentage",
///   "discount_value": 10
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimateInput {
    pub name: Option<String>,
    pub answers: Answers,
    pub estimation_type: Option<EstimationType>,
    pub distribution: BTreeMap<ProfileId, Decimal>,
    pub tjm: BTreeMap<ProfileId, Decimal>,
    pub days: BTreeMap<ProfileId, Decimal>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
}

impl EstimateInput {
    pub fn from_json_str(raw: &str) -> Result<Self, Failure> {
        serde_json::from_str(raw)
            .map_err(|error| ("input", format!("invalid estimate input: {error}"), EXIT_INPUT))
    }

    pub fn read(path: &Path) -> Result<Self, Failure> {
        let raw = fs::read_to_string(path).map_err(|error| {
            ("input", format!("could not read `{}`: {error}", path.display()), EXIT_INPUT)
        })?;
        Self::from_json_str(&raw)
    }

    /// Rejects answers the catalog cannot score: unknown questions, unknown option
    /// values, and a list given to a single-choice question or the reverse.
    pub fn validate_answers(&self, catalog: &QuestionCatalog) -> Result<(), Failure> {
        for (question_id, answer) in self.answers.iter() {
            let question = catalog.find(question_id).ok_or_else(|| {
                ("input", format!("unknown question `{question_id}`"), EXIT_INPUT)
            })?;

            let values: Vec<&str> = match (answer, question.multi_select) {
                (Answer::Single(value), false) => vec![value.as_str()],
                (Answer::Multiple(values), true) => values.iter().map(String::as_str).collect(),
                (Answer::Single(_), true) => {
                    return Err((
                        "input",
                        format!("question `{question_id}` expects a list of values"),
                        EXIT_INPUT,
                    ))
                }
                (Answer::Multiple(_), false) => {
                    return Err((
                        "input",
                        format!("question `{question_id}` expects a single value"),
                        EXIT_INPUT,
                    ))
                }
            };

            if let Some(unknown) = values.iter().find(|value| question.option(value).is_none()) {
                return Err((
                    "input",
                    format!("unknown option `{unknown}` for question `{question_id}`"),
                    EXIT_INPUT,
                ));
            }
        }
        Ok(())
    }

    /// Replays the document onto a fresh session, in the order an operator would fill
    /// the questionnaire: profiles, answers, then overrides and discount.
    pub fn into_session(
        self,
        catalog: QuestionCatalog,
        profiles: Vec<TjmProfile>,
    ) -> Result<EstimationSession, Failure> {
        self.into_session_over(catalog, profiles, None)
    }

    /// Like [`EstimateInput::into_session`], but a stored project is restored first and
    /// the document is applied over it. Fields missing from the document keep the
    /// stored values.
    pub fn into_session_over(
        self,
        catalog: QuestionCatalog,
        profiles: Vec<TjmProfile>,
        stored: Option<&Project>,
    ) -> Result<EstimationSession, Failure> {
        self.validate_answers(&catalog)?;

        let known = |id: &ProfileId| profiles.iter().any(|profile| &profile.id == id);
        let overridden = self.distribution.keys().chain(self.tjm.keys()).chain(self.days.keys());
        for id in overridden {
            if !known(id) {
                return Err(("input", format!("unknown profile `{id}`"), EXIT_INPUT));
            }
        }

        let mut session = EstimationSession::new(catalog);
        if !profiles.is_empty() {
            session.load_profiles(profiles).map_err(application_failure)?;
        }
        if let Some(project) = stored {
            session.restore_from_project(project);
        }
        self.apply_to(&mut session);

        Ok(session)
    }

    fn apply_to(self, session: &mut EstimationSession) {
        for (question_id, answer) in self.answers.iter() {
            session.set_answer(question_id.clone(), answer.clone());
        }
        if let Some(name) = self.name {
            session.set_project_name(name);
        }
        if let Some(estimation_type) = self.estimation_type {
            session.set_estimation_type(estimation_type);
        }

        for (id, percentage) in self.distribution {
            session.set_distribution(id, percentage);
        }
        for (id, tjm) in &self.tjm {
            session.set_tjm_override(id, *tjm);
        }
        for (id, days) in self.days {
            session.set_days_override(id, days);
        }

        if let Some(discount_type) = self.discount_type {
            session.set_discount_type(discount_type);
        }
        // a value without a discount type is dropped, as the session would zero it anyway
        if let Some(value) = self.discount_value {
            if session.discount_type() != DiscountType::None {
                session.set_discount_value(value);
            }
        }
    }
}

/// Missing catalog question ids, in catalog order.
pub fn unanswered_questions(session: &EstimationSession) -> Vec<String> {
    session
        .catalog()
        .questions
        .iter()
        .filter(|question| match session.answers().get(&question.id) {
            Some(answer) => answer.is_empty(),
            None => true,
        })
        .map(|question| question.id.clone())
        .collect()
}
