//! Euro amounts for display, in the French grouping convention (`42 000 €`).

use rust_decimal::{Decimal, RoundingStrategy};

use crate::estimation::rounding::round_whole;

/// Narrow no-break space between digit groups.
pub const GROUP_SEPARATOR: char = '\u{202F}';
/// No-break space before the currency sign.
pub const CURRENCY_SEPARATOR: char = '\u{00A0}';

pub fn format_currency(amount: Decimal) -> String {
    let whole = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = whole.abs().trunc().normalize().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if whole.is_sign_negative() && !whole.is_zero() {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(digit);
    }

    grouped.push(CURRENCY_SEPARATOR);
    grouped.push('€');
    grouped
}

/// Compact form used on summary cards: thousands become `k`.
pub fn format_currency_k(amount: Decimal) -> String {
    if amount >= Decimal::ONE_THOUSAND {
        return format!("{}k €", round_whole(amount / Decimal::ONE_THOUSAND));
    }
    format_currency(amount)
}
