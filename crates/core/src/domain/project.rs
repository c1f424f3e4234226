use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::analysis::AiAnalysis;
use crate::domain::answers::Answers;
use crate::domain::stack::StackTier;
use crate::errors::DomainError;
use crate::estimation::{BudgetBreakdownItem, DiscountType};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Pending,
    Validated,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Validated => "validated",
        }
    }

    pub fn can_transition_to(self, next: ProjectStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Pending)
                | (Self::Pending, Self::Validated)
                | (Self::Pending, Self::Draft)
                | (Self::Validated, Self::Draft)
        )
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "validated" => Ok(Self::Validated),
            other => Err(format!("unknown project status `{other}` (expected draft|pending|validated)")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: String,
    pub filename: String,
}

/// Project record as handed to the persistence collaborator for create and update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub stack: StackTier,
    pub total_days: i64,
    pub total_budget: Decimal,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub final_budget: Decimal,
    pub status: ProjectStatus,
    pub answers: Answers,
    pub budget_breakdown: Vec<BudgetBreakdownItem>,
    pub documents: Option<Vec<String>>,
    pub ai_analysis: Option<AiAnalysis>,
    pub conversation_history: Option<Vec<ConversationMessage>>,
}

/// Stored project: the draft fields plus identity and timestamps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    #[serde(flatten)]
    pub record: ProjectDraft,
}

impl Project {
    pub fn from_draft(id: ProjectId, draft: ProjectDraft, at: DateTime<Utc>) -> Self {
        Self { id, date_created: at, date_updated: at, record: draft }
    }

    pub fn transition_to(&mut self, next: ProjectStatus) -> Result<(), DomainError> {
        if self.record.status.can_transition_to(next) {
            self.record.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidProjectTransition { from: self.record.status, to: next })
    }
}

#[cfg(test)]
mod tests {
    use super::ProjectStatus;

    #[test]
    fn review_cycle_allows_sending_back_to_draft() {
        assert!(ProjectStatus::Draft.can_transition_to(ProjectStatus::Pending));
        assert!(ProjectStatus::Pending.can_transition_to(ProjectStatus::Validated));
        assert!(ProjectStatus::Pending.can_transition_to(ProjectStatus::Draft));
        assert!(ProjectStatus::Validated.can_transition_to(ProjectStatus::Draft));
    }

    #[test]
    fn draft_cannot_skip_review() {
        assert!(!ProjectStatus::Draft.can_transition_to(ProjectStatus::Validated));
        assert!(!ProjectStatus::Validated.can_transition_to(ProjectStatus::Pending));
        assert!(!ProjectStatus::Draft.can_transition_to(ProjectStatus::Draft));
    }
}
