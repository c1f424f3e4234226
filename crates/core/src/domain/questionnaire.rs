use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::stack::StackTier;

/// Inclusive day range. `min > max` is representable on purpose: a strongly negative
/// duration modifier applied to an asymmetric baseline can invert a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub min: i64,
    pub max: i64,
}

impl DayRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_modifier: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<StackTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<DayRange>,
}

impl QuestionOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), modifier: None, stack_modifier: None, stack: None, days: None }
    }

    pub fn with_modifier(mut self, modifier: Decimal) -> Self {
        self.modifier = Some(modifier);
        self
    }

    pub fn with_stack_modifier(mut self, stack_modifier: Decimal) -> Self {
        self.stack_modifier = Some(stack_modifier);
        self
    }

    pub fn with_stack(mut self, stack: StackTier) -> Self {
        self.stack = Some(stack);
        self
    }

    pub fn with_days(mut self, min: i64, max: i64) -> Self {
        self.days = Some(DayRange::new(min, max));
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub multi_select: bool,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn single(id: impl Into<String>, options: Vec<QuestionOption>) -> Self {
        Self { id: id.into(), multi_select: false, options }
    }

    pub fn multi(id: impl Into<String>, options: Vec<QuestionOption>) -> Self {
        Self { id: id.into(), multi_select: true, options }
    }

    pub fn option(&self, value: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|option| option.value == value)
    }
}
