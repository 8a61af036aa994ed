//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Catalog IDs are
//! opaque strings assigned by the remote API, so the wrappers hold a `String`.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Length of the random suffix appended to generated order IDs.
const ORDER_ID_SUFFIX_LEN: usize = 9;

/// Alphabet of the random suffix (lowercase base-36).
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use mobile_shop_core::define_id;
/// define_id!(WishlistId);
/// define_id!(ReviewId);
///
/// let wishlist = WishlistId::new("w-1");
/// let review = ReviewId::new("w-1");
///
/// // These are different types, so this won't compile:
/// // let _: WishlistId = review;
/// assert_eq!(wishlist.as_str(), review.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);

impl OrderId {
    /// Generate a fresh order ID of the form `order-{epoch_ms}-{random}`.
    ///
    /// The millisecond timestamp orders IDs by creation time and the 9-char
    /// base-36 suffix makes a collision within the same millisecond negligible.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..ORDER_ID_SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();
        Self(format!("order-{}-{suffix}", now.timestamp_millis()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_product_id_serializes_transparently() {
        let id = ProductId::new("ZmGrkLRPXOTpxsU4jjAcv");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ZmGrkLRPXOTpxsU4jjAcv\"");

        let back: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_order_id_format() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let id = OrderId::generate(now);

        let rest = id.as_str().strip_prefix("order-1700000000000-").unwrap();
        assert_eq!(rest.len(), ORDER_ID_SUFFIX_LEN);
        assert!(rest.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_order_ids_unique_within_same_millisecond() {
        let now = Utc::now();
        let ids: HashSet<OrderId> = (0..1000).map(|_| OrderId::generate(now)).collect();
        assert_eq!(ids.len(), 1000);
    }
}
