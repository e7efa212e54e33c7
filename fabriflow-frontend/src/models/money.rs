//! Monetary parsing and display.
//!
//! Every amount that reaches the app as text (invoice totals from the backend,
//! form inputs in the payment dialog) goes through here exactly once and is a
//! [`Decimal`] from then on. Unparsable input becomes zero, never an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Largest magnitude accepted for any amount. Sums of accepted amounts stay
/// far inside the range of [`Decimal`].
pub fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000_000i64)
}

/// Parses a decimal amount, returning `None` for empty or non-numeric text
/// and for anything beyond [`max_amount`].
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
        .filter(|amount| amount.abs() <= max_amount())
}

/// Adds up `amounts`, saturating at the bounds of [`Decimal`] instead of panicking.
pub fn saturating_sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |total, amount| total.saturating_add(amount))
}

/// Parses a decimal amount, treating anything unparsable as zero.
pub fn parse_or_zero(raw: &str) -> Decimal {
    parse_decimal(raw).unwrap_or(Decimal::ZERO)
}

/// Parses a manually entered allocation. Negative input clamps to zero.
pub fn parse_allocation(raw: &str) -> Decimal {
    parse_or_zero(raw).max(Decimal::ZERO)
}

/// Renders `amount` as `$1,234.50`.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    format!("{}${}.{}", sign, grouped, frac_part)
}

/// Serde helper for monetary fields the backend sends either as a string
/// (`"25500.00"`) or as a JSON number. Missing or garbage values become zero.
pub fn lenient<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(serde_json::Value::String(text)) => parse_or_zero(&text),
        Some(serde_json::Value::Number(number)) => parse_or_zero(&number.to_string()),
        _ => Decimal::ZERO,
    })
}
