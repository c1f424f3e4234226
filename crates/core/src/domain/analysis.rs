//! Structured payload returned by the document-analysis collaborator.
//!
//! The payload is opaque to the estimation engine; the only thing read from it is the
//! per-question suggestion, which the session turns into ordinary [`Answers`].

use serde::{Deserialize, Serialize};

use crate::domain::answers::{Answer, Answers};
use crate::domain::stack::StackTier;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub title: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisQuestionnaire {
    #[serde(default)]
    pub project_type: Option<SuggestedAnswer>,
    #[serde(default)]
    pub data_complexity: Option<SuggestedAnswer>,
    #[serde(default)]
    pub multilingual: Option<SuggestedAnswer>,
    #[serde(default)]
    pub integrations: Option<SuggestedAnswer>,
    #[serde(default)]
    pub accessibility: Option<SuggestedAnswer>,
    #[serde(default)]
    pub security: Option<SuggestedAnswer>,
    #[serde(default)]
    pub deadline: Option<SuggestedAnswer>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
    Enterprise,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisComplexity {
    pub score: f64,
    pub level: ComplexityLevel,
    pub suggested_stack: StackTier,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMeta {
    pub analyzed_at: String,
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub text_length: u64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub tokens_used: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub summary: AnalysisSummary,
    pub questionnaire: AnalysisQuestionnaire,
    pub complexity: AnalysisComplexity,
    #[serde(default)]
    pub missing_info: Vec<String>,
    pub meta: AnalysisMeta,
}

impl AiAnalysis {
    /// Answers suggested by the analysis. Single-choice questions read `value`, the
    /// integrations question reads `values`; blank suggestions are skipped.
    pub fn suggested_answers(&self) -> Answers {
        let q = &self.questionnaire;
        let mut answers = Answers::new();

        let singles = [
            ("projectType", &q.project_type),
            ("dataComplexity", &q.data_complexity),
            ("multilingual", &q.multilingual),
            ("accessibility", &q.accessibility),
            ("security", &q.security),
            ("deadline", &q.deadline),
        ];
        for (question_id, suggestion) in singles {
            let value = suggestion.as_ref().and_then(|s| s.value.as_deref());
            if let Some(value) = value.filter(|value| !value.is_empty()) {
                answers.insert(question_id, Answer::single(value));
            }
        }

        if let Some(values) = q.integrations.as_ref().and_then(|s| s.values.as_ref()) {
            answers.insert("integrations", Answer::multiple(values.iter().cloned()));
        }

        answers
    }
}
