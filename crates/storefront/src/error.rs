//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for the presentation layer. Internal
//! failures are captured to Sentry by [`AppError::report`]; user mistakes are
//! only logged.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Persistent store could not be opened.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the error is an internal failure worth reporting.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::BadRequest(_))
    }

    /// Message safe to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) => "Invalid configuration, check your environment".to_string(),
            Self::Catalog(err) if err.is_not_found() => "Product not found".to_string(),
            Self::Catalog(_) => "The catalog service is unavailable".to_string(),
            Self::Cart(_) => crate::cart::ADD_TO_CART_FAILED.to_string(),
            Self::Store(_) => "Local storage is unavailable".to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Log the error, capturing internal failures to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        } else {
            tracing::info!(error = %self, "Command rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
