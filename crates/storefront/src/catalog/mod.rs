//! Remote catalog API client.
//!
//! Uses `reqwest` for HTTP. Product reads go through the persistent
//! [`ResponseCache`] (1-hour TTL); the cart-add write is never cached.
//!
//! # Endpoints
//!
//! - `GET {base}/product` - product list
//! - `GET {base}/product/{id}` - product detail
//! - `POST {base}/cart` with `{ id, colorCode, storageCode }` - cart add
//!
//! # Example
//!
//! ```rust,ignore
//! use mobile_shop_storefront::catalog::{CatalogClient, ResponseCache};
//!
//! let client = CatalogClient::new(&config.catalog, cache)?;
//!
//! let products = client.fetch_product_list().await?;
//! let detail = client.fetch_product(&products[0].id).await?;
//! let ack = client
//!     .submit_cart_add(&detail.id, detail.default_color_code(), detail.default_storage_code())
//!     .await?;
//! ```

mod cache;
mod search;

pub use cache::{CacheKey, CachedEntry, DEFAULT_CACHE_TTL, ResponseCache};
pub use search::filter_products;

use std::future::Future;
use std::sync::Arc;

use mobile_shop_core::{OptionCode, Product, ProductId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::config::CatalogConfig;

/// Maximum number of response body characters kept in error messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    /// Whether the API reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Acknowledgement returned by the cart endpoint. Opaque and advisory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartAck(pub serde_json::Value);

impl CartAck {
    /// The server-side item count, when the API reports one.
    #[must_use]
    pub fn count(&self) -> Option<u64> {
        self.0.get("count").and_then(serde_json::Value::as_u64)
    }
}

/// Request body of the cart-add endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartAddRequest<'a> {
    id: &'a ProductId,
    color_code: OptionCode,
    storage_code: OptionCode,
}

/// Catalog operations the cart manager depends on.
///
/// Implemented by [`CatalogClient`]; tests substitute in-memory fakes.
pub trait Catalog: Send + Sync {
    /// All products.
    fn fetch_product_list(&self) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// One product with its options.
    fn fetch_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;

    /// Register a cart add with the server.
    fn submit_cart_add(
        &self,
        id: &ProductId,
        color_code: OptionCode,
        storage_code: OptionCode,
    ) -> impl Future<Output = Result<CartAck, CatalogError>> + Send;
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the remote catalog API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: ResponseCache,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig, cache: ResponseCache) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mobile-shop/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// The response cache backing product reads.
    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Map a response to its JSON body, turning non-success statuses into errors.
    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, CatalogError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: text.chars().take(ERROR_BODY_PREVIEW).collect(),
            });
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Read-through GET: serve a fresh cached body or fetch, cache, and decode.
    async fn cached_get<T: DeserializeOwned>(
        &self,
        key: CacheKey,
        segments: &[&str],
    ) -> Result<T, CatalogError> {
        if let Some(data) = self.inner.cache.get(&key) {
            match serde_json::from_value(data) {
                Ok(value) => {
                    debug!(%key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => warn!(%key, error = %e, "Cached body no longer decodes, refetching"),
            }
        }

        debug!(%key, "Cache miss");
        let url = self.endpoint(segments)?;
        let response = self.inner.client.get(url).send().await.inspect_err(|e| {
            error!(%key, error = %e, "Catalog request failed");
        })?;
        let body = Self::read_json(response).await?;
        let value = serde_json::from_value(body.clone())?;

        if let Err(e) = self.inner.cache.set(&key, body) {
            warn!(%key, error = %e, "Failed to persist response cache");
        }
        Ok(value)
    }
}

impl Catalog for CatalogClient {
    #[instrument(skip(self))]
    async fn fetch_product_list(&self) -> Result<Vec<Product>, CatalogError> {
        self.cached_get(CacheKey::ProductList, &["product"]).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn fetch_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.cached_get(CacheKey::Product(id.clone()), &["product", id.as_str()])
            .await
    }

    #[instrument(skip(self), fields(product_id = %id, color = %color_code, storage = %storage_code))]
    async fn submit_cart_add(
        &self,
        id: &ProductId,
        color_code: OptionCode,
        storage_code: OptionCode,
    ) -> Result<CartAck, CatalogError> {
        let url = self.endpoint(&["cart"])?;
        let body = CartAddRequest {
            id,
            color_code,
            storage_code,
        };

        let response = self
            .inner
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| error!(error = %e, "Cart add request failed"))?;

        Ok(CartAck(Self::read_json(response).await?))
    }
}
