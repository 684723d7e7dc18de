//! Fixed-point money helpers.
//!
//! Every price in the system is an integer number of cents. Form-style
//! clients may still submit decimal strings ("25.00", "25,5"), which are
//! converted here without going through floating point.

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::Cents;

/// Number of minor units per currency unit.
pub const CENTS_PER_UNIT: Cents = 100;

/// Parse a non-negative decimal amount into cents.
///
/// Accepts `.` or `,` as the decimal separator and at most two fractional
/// digits. Signs, exponents and thousands separators are rejected.
pub fn parse_price(input: &str) -> Result<Cents, CoreError> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err(CoreError::Validation("Price is required".into()));
    }

    let (units, fraction) = match normalized.split_once('.') {
        Some((units, fraction)) => (units, fraction),
        None => (normalized.as_str(), ""),
    };

    let invalid = || CoreError::Validation(format!("Price '{input}' is not a valid amount"));

    if units.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !units.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
        || fraction.len() > 2
    {
        return Err(invalid());
    }

    let whole: Cents = if units.is_empty() {
        0
    } else {
        units.parse().map_err(|_| invalid())?
    };
    let minor: Cents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<Cents>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(CENTS_PER_UNIT)
        .and_then(|c| c.checked_add(minor))
        .ok_or_else(invalid)
}

/// A price as submitted by a client: a JSON number is taken as cents, a
/// string as a decimal amount in currency units.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Cents(Cents),
    Decimal(String),
}

impl PriceInput {
    pub fn to_cents(&self) -> Result<Cents, CoreError> {
        match self {
            Self::Cents(cents) => Ok(*cents),
            Self::Decimal(text) => parse_price(text),
        }
    }
}

/// Render cents as a plain decimal string with two fractional digits.
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Sum a list of prices, saturating instead of overflowing.
pub fn sum_cents(prices: impl IntoIterator<Item = Cents>) -> Cents {
    prices.into_iter().fold(0, Cents::saturating_add)
}
