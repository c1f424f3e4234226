use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::profile::TjmProfile;
use crate::domain::questionnaire::DayRange;

use super::rounding::round_whole;

/// Daily rate used when no profile carries a positive default share.
pub const FALLBACK_AVERAGE_TJM: Decimal = Decimal::from_parts(950, 0, 0, false, 0);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickEstimate {
    pub days_min: i64,
    pub days_max: i64,
    pub budget_min: Decimal,
    pub budget_max: Decimal,
    pub average_tjm: Decimal,
}

/// Rate of each profile weighted by its default share, rounded to a whole amount.
pub fn weighted_average_tjm(profiles: &[TjmProfile]) -> Decimal {
    let (weighted, weight) = profiles
        .iter()
        .filter(|profile| profile.default_percentage > Decimal::ZERO)
        .fold((Decimal::ZERO, Decimal::ZERO), |(weighted, weight), profile| {
            (
                weighted.saturating_add(profile.tjm.saturating_mul(profile.default_percentage)),
                weight.saturating_add(profile.default_percentage),
            )
        });

    if weight > Decimal::ZERO {
        round_whole(weighted / weight)
    } else {
        FALLBACK_AVERAGE_TJM
    }
}

/// Coarse budget range ahead of any customisation; overrides never reach this path.
pub fn calculate_quick_estimate(days: DayRange, profiles: &[TjmProfile]) -> QuickEstimate {
    let average_tjm = weighted_average_tjm(profiles);

    QuickEstimate {
        days_min: days.min,
        days_max: days.max,
        budget_min: round_whole(Decimal::from(days.min).saturating_mul(average_tjm)),
        budget_max: round_whole(Decimal::from(days.max).saturating_mul(average_tjm)),
        average_tjm,
    }
}
