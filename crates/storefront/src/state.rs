//! Application state shared across commands.

use std::sync::Arc;

use crate::cart::CartManager;
use crate::catalog::{CatalogClient, ResponseCache};
use crate::clock::{Clock, SystemClock};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::store::{FileStore, KeyValueStore};

/// Application state shared across all commands.
///
/// This struct is cheaply cloneable via `Arc` and owns the single store,
/// response cache, catalog client, and cart manager of a session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    cart: CartManager<CatalogClient>,
}

impl AppState {
    /// Create the application state backed by the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let store = FileStore::new(config.data_dir.clone());
        Self::with_parts(config, Arc::new(store), Arc::new(SystemClock))
    }

    /// Create the application state over an explicit store and clock.
    ///
    /// Cart and order history are loaded before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_parts(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let cache = ResponseCache::new(store.clone(), clock.clone(), config.cache_ttl);
        let catalog = CatalogClient::new(&config.catalog, cache)?;
        let cart = CartManager::new(catalog.clone(), store, clock, config.cart_ttl);
        cart.load_state();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the cart manager.
    #[must_use]
    pub fn cart(&self) -> &CartManager<CatalogClient> {
        &self.inner.cart
    }
}
