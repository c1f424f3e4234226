use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::QuestionCatalog;
use crate::domain::answers::{Answer, Answers};
use crate::domain::questionnaire::{DayRange, QuestionOption};
use crate::domain::stack::StackTier;

use super::rounding::to_days;

/// Baseline used until a `projectType`-style option supplies its own day range.
pub const DEFAULT_BASELINE_DAYS: DayRange = DayRange::new(20, 35);

/// Tier B starts ahead so it wins whenever nothing pulls strongly elsewhere.
const STANDARD_TIER_SEED: i64 = 5;
const STACK_HINT_BONUS: i64 = 3;
const ENTERPRISE_THRESHOLD: i64 = 4;
const LIGHTWEIGHT_THRESHOLD: i64 = 3;
const LIGHTWEIGHT_MAX_ENTERPRISE_SCORE: i64 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub stack: StackTier,
    pub days: DayRange,
    pub modifier: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierScores {
    pub a: Decimal,
    pub b: Decimal,
    pub c: Decimal,
}

impl Default for TierScores {
    fn default() -> Self {
        Self { a: Decimal::ZERO, b: Decimal::from(STANDARD_TIER_SEED), c: Decimal::ZERO }
    }
}

impl TierScores {
    /// A is checked first, so it also wins when C would qualify.
    pub fn select(&self) -> StackTier {
        if self.a >= Decimal::from(ENTERPRISE_THRESHOLD) {
            StackTier::A
        } else if self.c >= Decimal::from(LIGHTWEIGHT_THRESHOLD)
            && self.a < Decimal::from(LIGHTWEIGHT_MAX_ENTERPRISE_SCORE)
        {
            StackTier::C
        } else {
            StackTier::B
        }
    }

    fn apply_stack_hint(&mut self, tier: StackTier) {
        match tier {
            StackTier::A => self.a += Decimal::from(STACK_HINT_BONUS),
            StackTier::C => self.c += Decimal::from(STACK_HINT_BONUS),
            StackTier::B => {}
        }
    }
}

/// Scores `answers` against `catalog`.
///
/// Answers for questions missing from the catalog, and values missing from a question's
/// options, contribute nothing. A single-select question answered with a set is ignored,
/// while a multi-select question answered with a single value is scored like a
/// single-select one. The aggregate modifier is not clamped: a sum below `-1` yields
/// negative days, and asymmetric baselines may come back inverted (`min > max`).
pub fn calculate_recommendation(answers: &Answers, catalog: &QuestionCatalog) -> Recommendation {
    let mut scores = TierScores::default();
    let mut baseline = DEFAULT_BASELINE_DAYS;
    let mut modifier = Decimal::ZERO;

    for (question_id, answer) in answers.iter() {
        let Some(question) = catalog.find(question_id) else {
            continue;
        };

        match answer {
            Answer::Multiple(values) if question.multi_select => {
                for option in values.iter().filter_map(|value| question.option(value)) {
                    modifier += option_modifier(option);
                    scores.a += option.stack_modifier.unwrap_or_default();
                }
            }
            Answer::Multiple(_) => {}
            Answer::Single(value) => {
                let Some(option) = question.option(value) else {
                    continue;
                };
                modifier += option_modifier(option);
                scores.a += option.stack_modifier.unwrap_or_default();
                if let Some(days) = option.days {
                    baseline = days;
                }
                if let Some(tier) = option.stack {
                    scores.apply_stack_hint(tier);
                }
            }
        }
    }

    let factor = Decimal::ONE.saturating_add(modifier);
    Recommendation {
        stack: scores.select(),
        days: DayRange::new(
            to_days(Decimal::from(baseline.min).saturating_mul(factor)),
            to_days(Decimal::from(baseline.max).saturating_mul(factor)),
        ),
        modifier,
    }
}

fn option_modifier(option: &QuestionOption) -> Decimal {
    option.modifier.unwrap_or_default()
}
