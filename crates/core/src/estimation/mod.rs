pub mod budget;
pub mod discount;
pub mod quick;
pub mod recommendation;
pub mod rounding;

use rust_decimal::Decimal;

use crate::catalog::QuestionCatalog;
use crate::domain::answers::Answers;
use crate::domain::profile::TjmProfile;
use crate::domain::questionnaire::DayRange;

pub use self::{
    budget::{calculate_detailed_budget, BudgetBreakdownItem, BudgetOverrides, DetailedBudget},
    discount::{calculate_discount, DiscountOutcome, DiscountType},
    quick::{calculate_quick_estimate, QuickEstimate, FALLBACK_AVERAGE_TJM},
    recommendation::{calculate_recommendation, Recommendation, DEFAULT_BASELINE_DAYS},
};

pub trait EstimationEngine: Send + Sync {
    fn recommend(&self, answers: &Answers, catalog: &QuestionCatalog) -> Recommendation;

    fn detailed_budget(
        &self,
        total_days: Decimal,
        profiles: &[TjmProfile],
        overrides: &BudgetOverrides,
    ) -> DetailedBudget;

    fn quick_estimate(&self, days: DayRange, profiles: &[TjmProfile]) -> QuickEstimate;

    fn discount(
        &self,
        total_budget: Decimal,
        discount_type: DiscountType,
        value: Decimal,
    ) -> DiscountOutcome;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicEstimationEngine;

impl EstimationEngine for DeterministicEstimationEngine {
    fn recommend(&self, answers: &Answers, catalog: &QuestionCatalog) -> Recommendation {
        calculate_recommendation(answers, catalog)
    }

    fn detailed_budget(
        &self,
        total_days: Decimal,
        profiles: &[TjmProfile],
        overrides: &BudgetOverrides,
    ) -> DetailedBudget {
        calculate_detailed_budget(total_days, profiles, overrides)
    }

    fn quick_estimate(&self, days: DayRange, profiles: &[TjmProfile]) -> QuickEstimate {
        calculate_quick_estimate(days, profiles)
    }

    fn discount(
        &self,
        total_budget: Decimal,
        discount_type: DiscountType,
        value: Decimal,
    ) -> DiscountOutcome {
        calculate_discount(total_budget, discount_type, value)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::{
        catalog::QuestionCatalog,
        domain::{
            answers::{Answer, Answers},
            profile::TjmProfile,
            stack::StackTier,
        },
        estimation::{
            BudgetOverrides, DeterministicEstimationEngine, DiscountType, EstimationEngine,
        },
    };

    #[test]
    fn engine_chains_recommendation_budget_and_discount() {
        let engine = DeterministicEstimationEngine;
        let catalog = QuestionCatalog::standard();
        let answers = Answers::new()
            .with("projectType", Answer::single("corporate"))
            .with("deadline", Answer::single("standard"));
        let profiles = vec![
            TjmProfile::new("dev", "Developer", Decimal::from(600), Decimal::from(70)),
            TjmProfile::new("pm", "Project manager", Decimal::from(800), Decimal::from(30)),
        ];

        let recommendation = engine.recommend(&answers, &catalog);
        assert_eq!(recommendation.stack, StackTier::B);

        let quick = engine.quick_estimate(recommendation.days, &profiles);
        assert_eq!(quick.average_tjm, Decimal::from(660));
        assert_eq!(quick.budget_min, Decimal::from(13_200));
        assert_eq!(quick.budget_max, Decimal::from(23_100));

        let budget = engine.detailed_budget(Decimal::from(28), &profiles, &BudgetOverrides::default());
        assert_eq!(budget.total_days, Decimal::from(28));
        assert_eq!(budget.total, Decimal::from(18_480));

        let outcome = engine.discount(budget.total, DiscountType::Percentage, Decimal::from(5));
        assert_eq!(outcome.discount_amount, Decimal::from(924));
        assert_eq!(outcome.final_budget, Decimal::from(17_556));
    }

    #[test]
    fn engine_is_usable_behind_a_trait_object() {
        let engine: Box<dyn EstimationEngine> = Box::new(DeterministicEstimationEngine);
        let first = engine.discount(Decimal::from(100), DiscountType::Fixed, Decimal::from(40));
        let second = engine.discount(Decimal::from(100), DiscountType::Fixed, Decimal::from(40));

        assert_eq!(first, second);
        assert_eq!(first.final_budget, Decimal::from(60));
    }
}
