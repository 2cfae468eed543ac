//! ru-RU numeric formatting for user-facing amounts.
//!
//! Thousands are grouped with a non-breaking space, the decimal separator
//! is a comma, ruble amounts are rounded to whole units with a `₽` suffix.

use rust_decimal::{Decimal, RoundingStrategy};

const NBSP: char = '\u{a0}';

/// Format a number with ru-RU grouping, keeping at most `max_frac` decimals.
/// Trailing zero decimals are dropped, matching locale output.
pub fn format_num(value: Decimal, max_frac: u32) -> String {
    let rounded = value
        .round_dp_with_strategy(max_frac, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(NBSP);
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped},{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Format a ruble amount: integer-rounded, grouped, with the currency sign.
pub fn format_rub(value: Decimal) -> String {
    format!("{}{NBSP}₽", format_num(value, 0))
}
