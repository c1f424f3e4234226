use std::path::Path;

use rust_decimal::Decimal;
use serde::Serialize;
use stackwise_core::{
    format_currency, BudgetOverrides, DetailedBudget, DeterministicEstimationEngine,
    DiscountOutcome, EstimationEngine, TjmProfile,
};
use stackwise_db::{ProfileRepository, SqlProfileRepository};

use crate::commands::input::EstimateInput;
use crate::commands::{load_config, repository_failure, with_pool, CommandResult, Failure};
use crate::commands::EXIT_INPUT;

#[derive(Debug, Serialize)]
pub struct BudgetSummary {
    pub total_days: Decimal,
    pub budget: DetailedBudget,
    pub discount: DiscountOutcome,
    pub final_budget_display: String,
}

/// Detailed budget for an explicit day count. The questionnaire is skipped; only the
/// overrides and discount of the input document are read.
pub fn run(input_path: &Path, total_days: Decimal) -> CommandResult {
    let result = load_config().and_then(|config| {
        let input = EstimateInput::read(input_path)?;
        let profiles = with_pool(&config, |pool| async move {
            SqlProfileRepository::new(pool).list().await.map_err(repository_failure)
        })?;
        compute(&DeterministicEstimationEngine, total_days, &profiles, input)
    });

    match result {
        Ok(summary) => {
            let message = format!(
                "{} days across {} profiles, final budget {}",
                summary.total_days,
                summary.budget.breakdown.len(),
                summary.final_budget_display
            );
            CommandResult::success_with_data("budget", message, summary)
        }
        Err(failure) => CommandResult::from_failure("budget", failure),
    }
}

pub fn compute(
    engine: &impl EstimationEngine,
    total_days: Decimal,
    profiles: &[TjmProfile],
    input: EstimateInput,
) -> Result<BudgetSummary, Failure> {
    if total_days.is_sign_negative() {
        return Err(("input", "total days must not be negative".to_string(), EXIT_INPUT));
    }

    let overrides = BudgetOverrides { distribution: input.distribution, tjm: input.tjm, days: input.days };
    let budget = engine.detailed_budget(total_days, profiles, &overrides);
    let discount = engine.discount(
        budget.total,
        input.discount_type.unwrap_or_default(),
        input.discount_value.unwrap_or_default(),
    );

    Ok(BudgetSummary {
        total_days,
        final_budget_display: format_currency(discount.final_budget),
        budget,
        discount,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use stackwise_core::{DeterministicEstimationEngine, TjmProfile};

    use super::compute;
    use crate::commands::input::EstimateInput;

    fn profiles() -> Vec<TjmProfile> {
        vec![
            TjmProfile::new("p1", "Senior", Decimal::from(500), Decimal::from(60)),
            TjmProfile::new("p2", "Junior", Decimal::from(300), Decimal::from(40)),
        ]
    }

    #[test]
    fn splits_days_by_default_shares() {
        let summary = compute(
            &DeterministicEstimationEngine,
            Decimal::ONE_HUNDRED,
            &profiles(),
            EstimateInput::default(),
        )
        .expect("budget");

        let days: Vec<Decimal> = summary.budget.breakdown.iter().map(|item| item.days).collect();
        assert_eq!(days, vec![Decimal::from(60), Decimal::from(40)]);
        assert_eq!(summary.budget.total, Decimal::from(42_000));
        assert_eq!(summary.final_budget_display, "42\u{202F}000\u{00A0}€");
    }

    #[test]
    fn applies_input_discount() {
        let input = EstimateInput::from_json_str(
            r#"{"discount_type":"percentage","discount_value":10}"#,
        )
        .expect("parse");
        let summary =
            compute(&DeterministicEstimationEngine, Decimal::ONE_HUNDRED, &profiles(), input)
                .expect("budget");

        assert_eq!(summary.discount.discount_amount, Decimal::from(4_200));
        assert_eq!(summary.discount.final_budget, Decimal::from(37_800));
    }

    #[test]
    fn maximal_day_count_and_rate_still_produce_a_budget() {
        let input = EstimateInput::from_json_str(
            r#"{"tjm":{"p2":"79228162514264337593543950335"},"discount_type":"percentage","discount_value":10}"#,
        )
        .expect("parse");
        let summary = compute(&DeterministicEstimationEngine, Decimal::MAX, &profiles(), input)
            .expect("budget");

        assert_eq!(summary.budget.total, Decimal::MAX);
        assert!(summary.discount.final_budget > Decimal::ZERO);
        assert!(summary.final_budget_display.ends_with("\u{00A0}€"));
    }

    #[test]
    fn negative_days_are_rejected() {
        let result = compute(
            &DeterministicEstimationEngine,
            Decimal::NEGATIVE_ONE,
            &profiles(),
            EstimateInput::default(),
        );
        assert!(result.is_err());
    }
}
