use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::profile::{ProfileId, TjmProfile};

use super::rounding::{round_tenth, round_whole};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Caller-owned per-profile overrides. The three maps are independent: a day override
/// implies nothing about the rate or the percentage of the same profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetOverrides {
    #[serde(default)]
    pub distribution: BTreeMap<ProfileId, Decimal>,
    #[serde(default)]
    pub tjm: BTreeMap<ProfileId, Decimal>,
    #[serde(default)]
    pub days: BTreeMap<ProfileId, Decimal>,
}

impl BudgetOverrides {
    pub fn is_empty(&self) -> bool {
        self.distribution.is_empty() && self.tjm.is_empty() && self.days.is_empty()
    }

    pub fn percentage_for(&self, profile: &TjmProfile) -> Decimal {
        self.distribution.get(&profile.id).copied().unwrap_or(profile.default_percentage)
    }

    pub fn tjm_for(&self, profile: &TjmProfile) -> Decimal {
        self.tjm.get(&profile.id).copied().unwrap_or(profile.tjm)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetBreakdownItem {
    pub profile: String,
    pub profile_id: ProfileId,
    pub days: Decimal,
    pub tjm_standard: Decimal,
    pub tjm_applied: Decimal,
    pub cost: Decimal,
    pub percentage: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedBudget {
    pub breakdown: Vec<BudgetBreakdownItem>,
    pub total: Decimal,
    pub total_days: Decimal,
}

/// A profile is part of the breakdown when it carries a non-zero day override or when
/// its effective percentage is positive.
pub fn is_active(profile: &TjmProfile, overrides: &BudgetOverrides) -> bool {
    let has_days = overrides.days.get(&profile.id).is_some_and(|days| !days.is_zero());
    has_days || overrides.percentage_for(profile) > Decimal::ZERO
}

/// Spreads `total_days` over the active profiles.
///
/// Percentages are used as given and are not normalised to 100. A present day override
/// replaces the percentage share outright, an explicit zero included. Item costs stay
/// unrounded; only the aggregate total is rounded to a whole amount. Products and sums
/// saturate at the `Decimal` bounds.
pub fn calculate_detailed_budget(
    total_days: Decimal,
    profiles: &[TjmProfile],
    overrides: &BudgetOverrides,
) -> DetailedBudget {
    let breakdown: Vec<BudgetBreakdownItem> = profiles
        .iter()
        .filter(|profile| is_active(profile, overrides))
        .map(|profile| {
            let percentage = overrides.percentage_for(profile);
            let days = overrides.days.get(&profile.id).copied().unwrap_or_else(|| {
                round_tenth(total_days.saturating_mul(percentage) / ONE_HUNDRED)
            });
            let tjm_applied = overrides.tjm_for(profile);

            BudgetBreakdownItem {
                profile: profile.name.clone(),
                profile_id: profile.id.clone(),
                days,
                tjm_standard: profile.tjm,
                tjm_applied,
                cost: days.saturating_mul(tjm_applied),
                percentage,
            }
        })
        .collect();

    let total = breakdown.iter().map(|item| item.cost).fold(Decimal::ZERO, Decimal::saturating_add);
    let total_days =
        breakdown.iter().map(|item| item.days).fold(Decimal::ZERO, Decimal::saturating_add);

    DetailedBudget { breakdown, total: round_whole(total), total_days: round_tenth(total_days) }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{calculate_detailed_budget, BudgetOverrides};
    use crate::domain::profile::{ProfileId, TjmProfile};

    fn profiles() -> Vec<TjmProfile> {
        vec![
            TjmProfile::new("p1", "Senior developer", Decimal::from(500), Decimal::from(60)),
            TjmProfile::new("p2", "Designer", Decimal::from(300), Decimal::from(40)),
        ]
    }

    fn days(items: &super::DetailedBudget) -> Vec<Decimal> {
        items.breakdown.iter().map(|item| item.days).collect()
    }

    #[test]
    fn default_percentages_split_total_days() {
        let budget =
            calculate_detailed_budget(Decimal::from(100), &profiles(), &BudgetOverrides::default());

        assert_eq!(budget.breakdown.len(), 2);
        assert_eq!(days(&budget), vec![Decimal::from(60), Decimal::from(40)]);
        assert_eq!(
            budget.breakdown.iter().map(|item| item.cost).collect::<Vec<_>>(),
            vec![Decimal::from(30_000), Decimal::from(12_000)]
        );
        assert_eq!(budget.total, Decimal::from(42_000));
        assert_eq!(budget.total_days, Decimal::from(100));
    }

    #[test]
    fn day_override_keeps_profile_active_while_zero_share_drops_the_other() {
        let mut overrides = BudgetOverrides::default();
        overrides.days.insert(ProfileId::new("p1"), Decimal::from(10));
        overrides.distribution.insert(ProfileId::new("p2"), Decimal::ZERO);

        for total_days in [0, 37, 500] {
            let budget = calculate_detailed_budget(Decimal::from(total_days), &profiles(), &overrides);
            assert_eq!(budget.breakdown.len(), 1);
            assert_eq!(budget.breakdown[0].profile_id, ProfileId::new("p1"));
            assert_eq!(days(&budget), vec![Decimal::from(10)]);
            assert_eq!(budget.total, Decimal::from(5_000));
        }
    }

    #[test]
    fn explicit_zero_day_override_on_a_sharing_profile_yields_zero_days() {
        let mut overrides = BudgetOverrides::default();
        overrides.days.insert(ProfileId::new("p2"), Decimal::ZERO);

        let budget = calculate_detailed_budget(Decimal::from(100), &profiles(), &overrides);

        assert_eq!(days(&budget), vec![Decimal::from(60), Decimal::ZERO]);
        assert_eq!(budget.total, Decimal::from(30_000));
    }

    #[test]
    fn rate_override_changes_applied_rate_only() {
        let mut overrides = BudgetOverrides::default();
        overrides.tjm.insert(ProfileId::new("p2"), Decimal::from(350));

        let budget = calculate_detailed_budget(Decimal::from(100), &profiles(), &overrides);
        let designer = &budget.breakdown[1];

        assert_eq!(designer.tjm_standard, Decimal::from(300));
        assert_eq!(designer.tjm_applied, Decimal::from(350));
        assert_eq!(designer.percentage, Decimal::from(40));
        assert_eq!(budget.total, Decimal::from(44_000));
    }

    #[test]
    fn percentages_are_not_normalised() {
        let mut overrides = BudgetOverrides::default();
        overrides.distribution.insert(ProfileId::new("p1"), Decimal::from(80));

        let budget = calculate_detailed_budget(Decimal::from(10), &profiles(), &overrides);

        assert_eq!(days(&budget), vec![Decimal::from(8), Decimal::from(4)]);
        assert_eq!(budget.total_days, Decimal::from(12));
    }

    #[test]
    fn item_days_round_to_tenths_and_costs_stay_unrounded() {
        let profiles = vec![TjmProfile::new(
            "p1",
            "Project manager",
            Decimal::new(6255, 1),
            Decimal::new(333, 1),
        )];

        let budget = calculate_detailed_budget(Decimal::from(17), &profiles, &BudgetOverrides::default());
        let item = &budget.breakdown[0];

        assert_eq!(item.days, Decimal::new(57, 1));
        assert_eq!(item.cost, Decimal::new(356535, 2));
        assert_eq!(budget.total, Decimal::from(3_565));
    }

    #[test]
    fn no_active_profiles_yield_empty_budget() {
        let empty = calculate_detailed_budget(Decimal::from(40), &[], &BudgetOverrides::default());
        assert!(empty.breakdown.is_empty());
        assert_eq!(empty.total, Decimal::ZERO);
        assert_eq!(empty.total_days, Decimal::ZERO);

        let idle = vec![TjmProfile::new("p3", "Intern", Decimal::from(200), Decimal::ZERO)];
        let idle_budget = calculate_detailed_budget(Decimal::from(40), &idle, &BudgetOverrides::default());
        assert!(idle_budget.breakdown.is_empty());
    }

    #[test]
    fn huge_day_counts_saturate_instead_of_overflowing() {
        let budget = calculate_detailed_budget(Decimal::MAX, &profiles(), &BudgetOverrides::default());

        assert_eq!(budget.breakdown.len(), 2);
        assert!(budget.breakdown.iter().all(|item| item.cost == Decimal::MAX));
        assert_eq!(budget.total, Decimal::MAX);
        assert!(budget.total_days > Decimal::ZERO);
    }

    #[test]
    fn huge_rate_override_saturates_the_item_cost() {
        let mut overrides = BudgetOverrides::default();
        overrides.tjm.insert(ProfileId::new("p1"), Decimal::MAX);

        let budget = calculate_detailed_budget(Decimal::from(100), &profiles(), &overrides);

        assert_eq!(budget.breakdown[0].tjm_applied, Decimal::MAX);
        assert_eq!(budget.breakdown[0].cost, Decimal::MAX);
        assert_eq!(budget.breakdown[1].cost, Decimal::from(12_000));
        assert_eq!(budget.total, Decimal::MAX);
    }
}
