use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds half toward positive infinity at `dp` decimal places, the same result as
/// `floor(x * 10^dp + 0.5) / 10^dp` without the intermediate product.
///
/// This is the rounding every engine figure goes through; it differs from banker's
/// rounding on exact midpoints (`2.5 -> 3`, `-2.5 -> -2`). It never overflows, so
/// `Decimal::MAX` rounds to itself.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let strategy = if value.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    value.round_dp_with_strategy(dp, strategy).normalize()
}

pub fn round_whole(value: Decimal) -> Decimal {
    round_half_up(value, 0)
}

pub fn round_tenth(value: Decimal) -> Decimal {
    round_half_up(value, 1)
}

/// Whole-day conversion, saturating at the `i64` bounds.
pub(crate) fn to_days(value: Decimal) -> i64 {
    let whole = round_whole(value);
    whole.to_i64().unwrap_or(if whole.is_sign_negative() { i64::MIN } else { i64::MAX })
}
