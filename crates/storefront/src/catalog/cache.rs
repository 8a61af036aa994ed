//! Time-bounded cache for catalog API responses.
//!
//! The whole table is persisted as one JSON blob under
//! [`keys::API_CACHE`](crate::store::keys::API_CACHE):
//!
//! ```text
//! { "products-list": { "data": [...], "timestamp": 1700000000000 },
//!   "product-ZmGrkLRPXOTpxsU4jjAcv": { "data": {...}, "timestamp": ... } }
//! ```
//!
//! Expired entries are pruned when the table is loaded and before every read,
//! and the pruned table is written back at once so stale data never survives
//! a restart. Writes are write-through. TTL is the only eviction policy.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mobile_shop_core::ProductId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::store::{KeyValueStore, StoreError, keys, load_json, save_json};

/// Default time-to-live for cached responses (1 hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Identity of a cached catalog request.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    ProductList,
    Product(ProductId),
}

impl CacheKey {
    /// The key used inside the persisted table.
    #[must_use]
    pub fn as_storage_key(&self) -> String {
        match self {
            Self::ProductList => "products-list".to_string(),
            Self::Product(id) => format!("product-{id}"),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_storage_key())
    }
}

/// A cached response body and when it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    pub data: serde_json::Value,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

type CacheTable = BTreeMap<String, CachedEntry>;

/// Persistent read cache shared by all catalog reads.
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
    table: Mutex<CacheTable>,
}

impl ResponseCache {
    /// Load the cache from `store`.
    ///
    /// A missing or unreadable blob starts an empty table; this never fails.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        let table = match load_json::<CacheTable>(store.as_ref(), keys::API_CACHE) {
            Ok(table) => table.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable response cache");
                CacheTable::new()
            }
        };

        let cache = Self {
            store,
            clock,
            ttl_millis: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            table: Mutex::new(table),
        };

        if let Err(e) = cache.prune() {
            warn!(error = %e, "Failed to persist pruned response cache");
        }
        cache
    }

    /// Get a fresh cached value.
    ///
    /// Prunes every expired entry first; an entry whose age has reached the
    /// TTL is a miss.
    pub fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let mut table = self.table();
        if let Err(e) = self.prune_locked(&mut table) {
            warn!(error = %e, "Failed to persist pruned response cache");
        }

        let storage_key = key.as_storage_key();
        let now = self.clock.now_millis();
        table
            .get(&storage_key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.data.clone())
    }

    /// Store `data` under `key` and persist the whole table.
    ///
    /// The in-memory entry is kept even if persisting fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the table could not be written to the store.
    pub fn set(&self, key: &CacheKey, data: serde_json::Value) -> Result<(), StoreError> {
        let mut table = self.table();
        table.insert(
            key.as_storage_key(),
            CachedEntry {
                data,
                timestamp: self.clock.now_millis(),
            },
        );
        save_json(self.store.as_ref(), keys::API_CACHE, &*table)
    }

    /// Drop every entry and delete the persisted blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob could not be removed.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.table().clear();
        self.store.remove(keys::API_CACHE)
    }

    /// Remove expired entries, persisting the table if anything was removed.
    ///
    /// Returns the number of entries removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the pruned table could not be written.
    pub fn prune(&self) -> Result<usize, StoreError> {
        let mut table = self.table();
        self.prune_locked(&mut table)
    }

    /// Number of entries currently held (fresh or not yet pruned).
    #[must_use]
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    fn table(&self) -> MutexGuard<'_, CacheTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &CachedEntry, now: i64) -> bool {
        now.saturating_sub(entry.timestamp) < self.ttl_millis
    }

    fn prune_locked(&self, table: &mut CacheTable) -> Result<usize, StoreError> {
        let now = self.clock.now_millis();
        let before = table.len();
        table.retain(|_, entry| self.is_fresh(entry, now));
        let pruned = before - table.len();

        if pruned > 0 {
            debug!(pruned, "Pruned expired cache entries");
            save_json(self.store.as_ref(), keys::API_CACHE, &*table)?;
        }
        Ok(pruned)
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl_millis", &self.ttl_millis)
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}
