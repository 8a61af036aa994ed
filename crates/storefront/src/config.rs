//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOP_API_BASE_URL` - Catalog API base URL
//!   (default: `https://itx-frontend-test.onrender.com/api`)
//! - `SHOP_DATA_DIR` - Directory holding the persisted cart, orders, and
//!   response cache (default: `.mobile-shop`)
//! - `SHOP_CACHE_TTL_SECS` - Response cache time-to-live (default: 3600)
//! - `SHOP_CART_TTL_SECS` - Persisted cart time-to-live (default: 3600)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://itx-frontend-test.onrender.com/api";
const DEFAULT_DATA_DIR: &str = ".mobile-shop";
const DEFAULT_TTL_SECS: &str = "3600";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Directory of the file-backed store
    pub data_dir: PathBuf,
    /// How long cached catalog responses stay fresh
    pub cache_ttl: Duration,
    /// How long a persisted cart survives without being touched
    pub cart_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; endpoint paths are appended to it.
    pub base_url: Url,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url = parse_base_url(
            "SHOP_API_BASE_URL",
            &get_or("SHOP_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let data_dir = PathBuf::from(get_or("SHOP_DATA_DIR", DEFAULT_DATA_DIR));
        let cache_ttl = parse_ttl(
            "SHOP_CACHE_TTL_SECS",
            &get_or("SHOP_CACHE_TTL_SECS", DEFAULT_TTL_SECS),
        )?;
        let cart_ttl = parse_ttl(
            "SHOP_CART_TTL_SECS",
            &get_or("SHOP_CART_TTL_SECS", DEFAULT_TTL_SECS),
        )?;

        Ok(Self {
            catalog: CatalogConfig { base_url },
            data_dir,
            cache_ttl,
            cart_ttl,
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an absolute http(s) base URL.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    Ok(url)
}

/// Parse a positive number of seconds.
fn parse_ttl(var_name: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
