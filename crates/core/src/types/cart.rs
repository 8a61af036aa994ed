//! Cart line types and derived cart figures.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::{OptionCode, Product};

/// Error returned when a quantity is not a positive integer.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity must be at least 1")]
pub struct QuantityError;

/// A strictly positive item quantity.
///
/// There is no zero-quantity state: reducing a line below 1 removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Convert a signed request value; anything below 1 yields `None`.
    #[must_use]
    pub fn from_signed(value: i64) -> Option<Self> {
        u32::try_from(value).ok().and_then(Self::new)
    }

    /// Parse raw user input.
    ///
    /// Rejects non-numeric text, zero, negatives, and values that overflow.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        input.trim().parse::<i64>().ok().and_then(Self::from_signed)
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add another quantity, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(QuantityError)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a cart line: lines with equal keys are merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub color_code: OptionCode,
    pub storage_code: OptionCode,
}

/// One product variant in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product identifier.
    #[serde(rename = "id")]
    pub product_id: ProductId,
    /// Selected color.
    pub color_code: OptionCode,
    /// Selected storage.
    pub storage_code: OptionCode,
    /// Number of units.
    pub quantity: Quantity,
    /// Product snapshot taken when the line was created, if available.
    #[serde(default)]
    pub details: Option<Product>,
}

impl CartLine {
    /// Create a new line.
    #[must_use]
    pub fn new(key: LineKey, quantity: Quantity, details: Option<Product>) -> Self {
        Self {
            product_id: key.product_id,
            color_code: key.color_code,
            storage_code: key.storage_code,
            quantity,
            details,
        }
    }

    /// Whether this line has the given identity.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id
            && self.color_code == key.color_code
            && self.storage_code == key.storage_code
    }

    /// This line's identity.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            color_code: self.color_code,
            storage_code: self.storage_code,
        }
    }

    /// Unit price from the details snapshot, zero when details are missing.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.details.as_ref().map_or(Price::ZERO, Product::unit_price)
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price().times(self.quantity.get())
    }
}

/// Total number of units across `lines`.
#[must_use]
pub fn item_count(lines: &[CartLine]) -> u32 {
    lines
        .iter()
        .fold(0u32, |acc, line| acc.saturating_add(line.quantity.get()))
}

/// Sum of line totals, full precision.
#[must_use]
pub fn subtotal(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::line_total).sum()
}
