//! Catalog product types.
//!
//! A [`Product`] is owned by the remote catalog and never mutated locally.
//! Only the fields needed for cart totals, variant selection, and search are
//! typed; everything else the API sends is kept in [`Product::extra`] so a
//! cached or persisted product round-trips without loss.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Code identifying a color or storage option of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionCode(i64);

impl OptionCode {
    /// Create an option code.
    #[must_use]
    pub const fn new(code: i64) -> Self {
        Self(code)
    }

    /// Get the underlying numeric code.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for OptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OptionCode {
    fn from(code: i64) -> Self {
        Self(code)
    }
}

/// A selectable product option (a color or a storage size).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    /// Code sent to the cart endpoint.
    pub code: OptionCode,
    /// Display name (e.g., "Black", "64 GB").
    pub name: String,
}

/// Options a product can be configured with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductOptions {
    /// Available colors.
    #[serde(default)]
    pub colors: Vec<OptionValue>,
    /// Available storage sizes.
    #[serde(default)]
    pub storages: Vec<OptionValue>,
}

/// A catalog product as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Manufacturer name.
    #[serde(default)]
    pub brand: String,
    /// Model name.
    #[serde(default)]
    pub model: String,
    /// Unit price as a numeric string; may be empty.
    #[serde(default, deserialize_with = "price_string")]
    pub price: String,
    /// Product image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    /// Configurable options. Only present on product detail responses.
    #[serde(default)]
    pub options: ProductOptions,
    /// Fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// Unit price, zero if the catalog sent no usable price.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::parse_or_zero(&self.price)
    }

    /// Color preselected for this product: the first listed, or code 0.
    #[must_use]
    pub fn default_color_code(&self) -> OptionCode {
        self.options
            .colors
            .first()
            .map_or_else(OptionCode::default, |c| c.code)
    }

    /// Storage preselected for this product: the first listed, or code 0.
    #[must_use]
    pub fn default_storage_code(&self) -> OptionCode {
        self.options
            .storages
            .first()
            .map_or_else(OptionCode::default, |s| s.code)
    }

    /// Look up a color option by code.
    #[must_use]
    pub fn color(&self, code: OptionCode) -> Option<&OptionValue> {
        self.options.colors.iter().find(|c| c.code == code)
    }

    /// Look up a storage option by code.
    #[must_use]
    pub fn storage(&self, code: OptionCode) -> Option<&OptionValue> {
        self.options.storages.iter().find(|s| s.code == code)
    }

    /// Whether brand or model contains `term`, ignoring case.
    ///
    /// A blank term matches every product.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.brand.to_lowercase().contains(&term) || self.model.to_lowercase().contains(&term)
    }

    /// Display title ("Brand Model").
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_owned()
    }
}

/// Accept the price as a string, a bare number, or null.
fn price_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}
