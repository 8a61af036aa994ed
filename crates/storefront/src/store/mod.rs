//! Persistent key-value store adapter.
//!
//! Both the response cache and the cart manager persist JSON blobs through
//! [`KeyValueStore`], each under its own fixed key (see [`keys`]). Every
//! operation returns a [`StoreError`] instead of swallowing failures; callers
//! decide whether to surface, retry, or log and carry on.
//!
//! # Backends
//!
//! - [`FileStore`] - one file per key in a data directory
//! - [`MemoryStore`] - in-process map for tests and ephemeral sessions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Fixed storage keys. Each owner reads and writes only its own key.
pub mod keys {
    /// Cart blob: `{ items, timestamp }`.
    pub const CART: &str = "mobile_shop_cart";
    /// Order history blob: `Order[]`, newest first.
    pub const ORDERS: &str = "mobile_shop_orders";
    /// Response cache blob: `{ [cacheKey]: { data, timestamp } }`.
    pub const API_CACHE: &str = "mobile_shop_api_cache";
}

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage could not be read or written.
    #[error("storage I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored blob is not valid JSON for the expected shape.
    #[error("corrupt blob under key {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded as JSON.
    #[error("failed to serialize value for key {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Origin-scoped string key/value storage.
///
/// Writes are synchronous from the caller's point of view.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and decode the JSON blob under `key`.
///
/// # Errors
///
/// Returns an error if the backend fails or the blob does not decode as `T`.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            key: key.to_owned(),
            source,
        })
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the backend write fails.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, &raw)
}
