//! Display formatting and lenient parsing of amounts typed at the counter.
//!
//! Amounts are shown with Indian digit grouping (`12,34,567.5`): the last
//! three integer digits form one group, every group before that has two.
//! At most two fraction digits are kept and trailing zeros are dropped.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

pub const CURRENCY_SIGN: &str = "৳";

/// Formats an amount with en-IN grouping and 0 to 2 fraction digits.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = rounded.abs().to_string();

    let (integer, fraction) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };

    let mut out = String::with_capacity(plain.len() + plain.len() / 2 + 1);
    if negative {
        out.push('-');
    }
    out.push_str(&group_indian(integer));
    if let Some(f) = fraction {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// `৳` followed by the formatted amount; negatives render as `-৳X`.
pub fn format_currency(value: Decimal) -> String {
    if value.is_sign_negative() && !value.is_zero() {
        format!("-{}{}", CURRENCY_SIGN, format_amount(value.abs()))
    } else {
        format!("{}{}", CURRENCY_SIGN, format_amount(value))
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    let mut out = groups.join(",");
    out.push(',');
    out.push_str(tail);
    out
}

/// Parses a typed amount, ignoring thousands separators and whitespace.
///
/// Returns `None` for empty or unparseable input; callers decide whether
/// that means "missing" or "zero".
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Parses a typed note count. Fractions are truncated toward zero.
pub fn parse_count(input: &str) -> Option<i64> {
    parse_amount(input).and_then(|v| v.trunc().to_i64())
}
