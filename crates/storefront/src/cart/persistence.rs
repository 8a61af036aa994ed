//! Stored representations of the cart and the order history.
//!
//! ```text
//! mobile_shop_cart   { "items": [CartLine...], "timestamp": 1700000000000 }
//! mobile_shop_orders [Order...]   // newest first
//! ```

use mobile_shop_core::{CartLine, Order};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::{KeyValueStore, StoreError, keys, load_json, save_json};

#[derive(Serialize)]
struct StoredCartRef<'a> {
    items: &'a [CartLine],
    timestamp: i64,
}

/// Lines are decoded one by one so a single bad line does not take the
/// rest of the cart with it.
#[derive(Deserialize)]
struct RawStoredCart {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    timestamp: i64,
}

/// A cart read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCart {
    pub items: Vec<CartLine>,
    /// Epoch milliseconds of the last write.
    pub timestamp: i64,
}

/// Read the persisted cart, dropping lines that fail to decode (for
/// instance a zero or negative quantity).
pub fn load_cart(store: &dyn KeyValueStore) -> Result<Option<StoredCart>, StoreError> {
    let Some(raw) = load_json::<RawStoredCart>(store, keys::CART)? else {
        return Ok(None);
    };

    let total = raw.items.len();
    let items: Vec<CartLine> = raw
        .items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if items.len() < total {
        warn!(
            dropped = total - items.len(),
            "Dropped invalid lines from stored cart"
        );
    }

    Ok(Some(StoredCart {
        items,
        timestamp: raw.timestamp,
    }))
}

/// Write the cart with the given timestamp.
pub fn save_cart(
    store: &dyn KeyValueStore,
    items: &[CartLine],
    timestamp: i64,
) -> Result<(), StoreError> {
    save_json(store, keys::CART, &StoredCartRef { items, timestamp })
}

/// Delete the persisted cart.
pub fn remove_cart(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(keys::CART)
}

/// Order history read back from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredOrders {
    /// Every entry as stored, newest first, including ones that failed to
    /// decode.
    pub raw: Vec<serde_json::Value>,
    /// Entries that decoded, newest first.
    pub orders: Vec<Order>,
}

/// Read the order history (empty if never written).
///
/// Entries are decoded one by one; an entry that fails to decode is left
/// out of `orders` but kept in `raw` so the next write preserves it.
pub fn load_orders(store: &dyn KeyValueStore) -> Result<StoredOrders, StoreError> {
    let raw: Vec<serde_json::Value> = load_json(store, keys::ORDERS)?.unwrap_or_default();

    let orders: Vec<Order> = raw
        .iter()
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect();

    if orders.len() < raw.len() {
        warn!(
            unreadable = raw.len() - orders.len(),
            "Skipped unreadable entries in stored order history"
        );
    }

    Ok(StoredOrders { raw, orders })
}

/// Write the full order history.
pub fn save_orders<T: Serialize>(
    store: &dyn KeyValueStore,
    orders: &[T],
) -> Result<(), StoreError> {
    save_json(store, keys::ORDERS, orders)
}
