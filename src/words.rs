//! Spelling out amounts with the South Asian scale.
//!
//! Groups are thousand (10^3), lakh (10^5) and crore (10^7). Anything
//! above 99 crore is spelled as a count of crores, so `10^10` reads
//! "One Thousand Crore".

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{CalcError, Result};

const ONES: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];
const TEENS: [&str; 10] = [
    "Ten", "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen",
    "Eighteen", "Nineteen",
];
const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const THOUSAND: u128 = 1_000;
const LAKH: u128 = 100_000;
const CRORE: u128 = 10_000_000;

fn push_below_thousand(mut n: u128, words: &mut Vec<&'static str>) {
    if n >= 100 {
        words.push(ONES[(n / 100) as usize]);
        words.push("Hundred");
        n %= 100;
    }
    if n >= 20 {
        words.push(TENS[(n / 10) as usize]);
        n %= 10;
        if n > 0 {
            words.push(ONES[n as usize]);
        }
    } else if n >= 10 {
        words.push(TEENS[(n - 10) as usize]);
    } else if n > 0 {
        words.push(ONES[n as usize]);
    }
}

fn push_words(n: u128, words: &mut Vec<&'static str>) {
    let mut rest = n;
    if rest >= CRORE {
        push_words(rest / CRORE, words);
        words.push("Crore");
        rest %= CRORE;
    }
    if rest >= LAKH {
        push_below_thousand(rest / LAKH, words);
        words.push("Lakh");
        rest %= LAKH;
    }
    if rest >= THOUSAND {
        push_below_thousand(rest / THOUSAND, words);
        words.push("Thousand");
        rest %= THOUSAND;
    }
    push_below_thousand(rest, words);
}

/// Spells out a whole amount, e.g. `1_50_000` -> "One Lakh Fifty Thousand".
pub fn to_words(amount: u128) -> String {
    if amount == 0 {
        return "Zero".to_string();
    }
    let mut words = Vec::new();
    push_words(amount, &mut words);
    words.join(" ")
}

/// Spells out a non-negative amount; paisa are dropped.
///
/// # Errors
///
/// Returns an error for negative amounts.
pub fn amount_to_words(amount: Decimal) -> Result<String> {
    if amount.is_sign_negative() && !amount.trunc().is_zero() {
        return Err(CalcError::invalid("amount", "cannot spell a negative amount"));
    }
    let whole = amount
        .trunc()
        .abs()
        .to_u128()
        .ok_or_else(|| CalcError::invalid("amount", "out of range"))?;
    Ok(to_words(whole))
}

/// Like [`amount_to_words`] but prefixes negative amounts with "Negative".
pub fn signed_amount_to_words(amount: Decimal) -> String {
    let whole = amount.trunc();
    // |Decimal::MAX| < 2^96, so this always fits.
    let magnitude = whole.abs().to_u128().unwrap_or_default();
    if whole.is_sign_negative() && !whole.is_zero() {
        format!("Negative {}", to_words(magnitude))
    } else {
        to_words(magnitude)
    }
}

/// Caption shown under an amount field, or `None` when there is nothing to show.
pub fn in_words_caption(amount: Decimal) -> Option<String> {
    if amount <= Decimal::ZERO {
        return None;
    }
    Some(format!("In words: {} Taka Only", signed_amount_to_words(amount)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(0, "Zero")]
    #[case(7, "Seven")]
    #[case(13, "Thirteen")]
    #[case(40, "Forty")]
    #[case(99, "Ninety Nine")]
    #[case(110, "One Hundred Ten")]
    #[case(1000, "One Thousand")]
    #[case(12_345, "Twelve Thousand Three Hundred Forty Five")]
    #[case(100_000, "One Lakh")]
    #[case(250_019, "Two Lakh Fifty Thousand Nineteen")]
    #[case(10_000_000, "One Crore")]
    #[case(123_456_789, "Twelve Crore Thirty Four Lakh Fifty Six Thousand Seven Hundred Eighty Nine")]
    #[case(10_000_000_000, "One Thousand Crore")]
    fn test_to_words(#[case] amount: u128, #[case] expected: &str) {
        assert_eq!(to_words(amount), expected);
    }

    #[test]
    fn test_fraction_is_truncated() {
        assert_eq!(amount_to_words(dec!(1500.99)).unwrap(), "One Thousand Five Hundred");
        assert_eq!(amount_to_words(dec!(0.75)).unwrap(), "Zero");
    }

    #[test]
    fn test_negative_amounts() {
        assert!(amount_to_words(dec!(-5)).is_err());
        assert_eq!(signed_amount_to_words(dec!(-2500)), "Negative Two Thousand Five Hundred");
        assert_eq!(signed_amount_to_words(dec!(-0.5)), "Zero");
    }

    #[test]
    fn test_caption() {
        assert_eq!(
            in_words_caption(dec!(100000)).as_deref(),
            Some("In words: One Lakh Taka Only")
        );
        assert_eq!(in_words_caption(dec!(0)), None);
    }
}
