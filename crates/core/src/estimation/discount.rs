use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rounding::round_whole;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[default]
    None,
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

impl std::str::FromStr for DiscountType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(format!("unknown discount type `{other}` (expected none|percentage|fixed)")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountOutcome {
    pub discount_amount: Decimal,
    pub final_budget: Decimal,
}

/// Applies a commercial discount. A zero value means "no discount" whatever the type,
/// and the final budget is floored at zero.
pub fn calculate_discount(
    total_budget: Decimal,
    discount_type: DiscountType,
    value: Decimal,
) -> DiscountOutcome {
    if discount_type == DiscountType::None || value.is_zero() {
        return DiscountOutcome { discount_amount: Decimal::ZERO, final_budget: total_budget };
    }

    let discount_amount = match discount_type {
        DiscountType::Percentage => {
            round_whole(total_budget.saturating_mul(value) / Decimal::ONE_HUNDRED)
        }
        DiscountType::Fixed => round_whole(value),
        DiscountType::None => Decimal::ZERO,
    };

    DiscountOutcome {
        discount_amount,
        final_budget: total_budget.saturating_sub(discount_amount).max(Decimal::ZERO),
    }
}
