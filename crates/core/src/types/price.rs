//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog API transmits prices as numeric strings (`"170"`, `"49.99"`),
//! sometimes empty. [`Price`] parses them into a [`Decimal`] so cart and order
//! totals are exact; rounding happens only when a price is displayed.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency symbol appended to displayed prices.
const CURRENCY_SYMBOL: &str = "€";

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-rounded monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse a price from the catalog's numeric string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank or not a decimal number.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Self)
            .map_err(|_| PriceError::Invalid(trimmed.to_owned()))
    }

    /// Parse a price, treating missing or malformed values as zero.
    ///
    /// The whole string must be numeric: `"12abc"` is zero, not 12. Values
    /// beyond the decimal range are malformed too.
    #[must_use]
    pub fn parse_or_zero(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::ZERO)
    }

    /// The exact amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity, saturating at the decimal range.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// The amount rounded to cents (half away from zero), for presentation.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}{CURRENCY_SYMBOL}", self.rounded())
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at the decimal range.
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_and_fractional() {
        assert_eq!(Price::parse("170").unwrap().amount(), Decimal::from(170));
        assert_eq!(
            Price::parse(" 49.99 ").unwrap().amount(),
            Decimal::new(4999, 2)
        );
    }

    #[test]
    fn test_parse_rejects_blank_and_garbage() {
        assert_eq!(Price::parse(""), Err(PriceError::Empty));
        assert_eq!(Price::parse("   "), Err(PriceError::Empty));
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_parse_or_zero() {
        assert_eq!(Price::parse_or_zero(""), Price::ZERO);
        assert_eq!(Price::parse_or_zero("n/a"), Price::ZERO);
        assert_eq!(Price::parse_or_zero("10.5").amount(), Decimal::new(105, 1));
        assert_eq!(Price::parse_or_zero("12abc"), Price::ZERO);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let max = Price::parse("79228162514264337593543950335").unwrap();
        assert_eq!(max.times(2).amount(), Decimal::MAX);
        assert_eq!((max + Price::parse("1").unwrap()).amount(), Decimal::MAX);

        let total: Price = [max.times(3), max].into_iter().sum();
        assert_eq!(total.amount(), Decimal::MAX);
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Price::parse("249.99").unwrap().to_string(), "249.99€");
        assert_eq!(Price::parse("500").unwrap().to_string(), "500.00€");
        assert_eq!(Price::parse("0.125").unwrap().to_string(), "0.13€");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [
            Price::parse("100.00").unwrap().times(2),
            Price::parse("49.99").unwrap().times(1),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.amount(), Decimal::new(24999, 2));
    }
}
