//! Product price using decimal arithmetic.
//!
//! The REST API stores prices as plain JSON numbers in the shop's currency
//! (Vietnamese dong). `Price` keeps them as [`Decimal`] so cart subtotals do
//! not accumulate float error, and renders them the way the storefront shows
//! money: `.`-grouped thousands, `,` before any fraction, `₫` suffix.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a number.
    #[error("price must be a number")]
    NotANumber,
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount is above [`Price::MAX_UNITS`].
    #[error("price cannot exceed {}", Price::MAX_UNITS)]
    TooLarge,
}

/// A non-negative price of at most [`Price::MAX_UNITS`].
///
/// Deserialization runs the same checks as [`Price::new`], so a record from
/// the API with a negative price fails to decode instead of rendering as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Currency symbol appended when displaying a price.
    pub const SYMBOL: &'static str = "₫";

    /// Largest accepted amount (one trillion dong).
    pub const MAX_UNITS: u64 = 1_000_000_000_000;

    /// Create a price from an amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for amounts below zero and
    /// `PriceError::TooLarge` above [`Price::MAX_UNITS`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount > Decimal::from(Self::MAX_UNITS) {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount.normalize()))
    }

    /// Create a price from a whole number of currency units, capped at
    /// [`Price::MAX_UNITS`].
    #[must_use]
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units.min(Self::MAX_UNITS)))
    }

    /// Parse a price from form input such as `"19.99"` or `" 250000 "`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed text is not a decimal number or is
    /// negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by a quantity (cart line totals). Saturates instead of
    /// overflowing.
    #[must_use]
    pub fn times(&self, qty: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(qty)))
    }

    /// Render the amount without the currency symbol, e.g. `1.250.000`.
    #[must_use]
    pub fn format_amount(&self) -> String {
        let normalized = self.0.normalize();
        let text = normalized.to_string();
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let digits: Vec<char> = whole.chars().collect();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(*c);
        }

        if fraction.is_empty() {
            grouped
        } else {
            format!("{grouped},{fraction}")
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.format_amount(), Self::SYMBOL)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.0)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_units(250_000).to_string(), "250.000₫");
        assert_eq!(Price::from_units(1_250_000).to_string(), "1.250.000₫");
        assert_eq!(Price::from_units(999).to_string(), "999₫");
        assert_eq!(Price::from_units(0).to_string(), "0₫");
    }

    #[test]
    fn test_display_fraction() {
        assert_eq!(Price::parse("19.50").unwrap().to_string(), "19,5₫");
        assert_eq!(Price::parse("1234.99").unwrap().to_string(), "1.234,99₫");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Price::parse("abc"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse("-5"), Err(PriceError::Negative));
        assert_eq!(Price::parse(" 42 ").unwrap(), Price::from_units(42));
        assert_eq!(
            Price::parse("10000000000000000000000000"),
            Err(PriceError::TooLarge)
        );
        assert!(Price::parse("1000000000000").is_ok());
    }

    #[test]
    fn test_deserialize_rejects_negative_and_oversized() {
        assert!(serde_json::from_str::<Price>("-500").is_err());
        assert!(serde_json::from_str::<Price>("1e20").is_err());
        assert_eq!(
            serde_json::from_str::<Price>("0").unwrap(),
            Price::from_units(0)
        );
    }

    #[test]
    fn test_serde_as_json_number() {
        let price: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(price, Price::parse("19.99").unwrap());
        assert_eq!(serde_json::to_string(&Price::from_units(5)).unwrap(), "5.0");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_units(100).times(3), Price::from_units(50)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_units(350));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Price::from_units(u64::MAX);
        assert_eq!(max, Price::from_units(Price::MAX_UNITS));

        let huge = Price(Decimal::MAX);
        assert_eq!(huge.times(u32::MAX).amount(), Decimal::MAX);
        let total: Price = [huge, huge, max].into_iter().sum();
        assert_eq!(total.amount(), Decimal::MAX);
    }
}
