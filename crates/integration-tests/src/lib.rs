//! Integration tests for Mobile Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mobile-shop-integration-tests
//! ```
//!
//! Each test gets a [`TestContext`]: a mock catalog API, a temporary data
//! directory, and a manual clock. [`TestContext::session`] opens a fresh
//! [`AppState`] over the same directory, which stands in for restarting the
//! application.

use std::sync::Arc;

use chrono::TimeDelta;
use mobile_shop_storefront::clock::ManualClock;
use mobile_shop_storefront::config::StorefrontConfig;
use mobile_shop_storefront::state::AppState;
use mobile_shop_storefront::store::FileStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start time of every test clock (2023-11-14T22:13:20Z).
pub const START_MILLIS: i64 = 1_700_000_000_000;

/// Shared fixtures for one test.
pub struct TestContext {
    pub server: MockServer,
    pub data_dir: TempDir,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    /// Start a mock catalog server with an empty data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            data_dir: TempDir::new().expect("failed to create temp dir"),
            clock: Arc::new(ManualClock::from_millis(START_MILLIS)),
        }
    }

    /// Configuration pointing at the mock server and the temp directory.
    ///
    /// # Panics
    ///
    /// Panics if the generated configuration is rejected.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let base_url = format!("{}/api", self.server.uri());
        let data_dir = self.data_dir.path().to_string_lossy().into_owned();

        StorefrontConfig::from_lookup(|key| match key {
            "SHOP_API_BASE_URL" => Some(base_url.clone()),
            "SHOP_DATA_DIR" => Some(data_dir.clone()),
            _ => None,
        })
        .expect("test configuration is valid")
    }

    /// Open a new session over the persisted data.
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    #[must_use]
    pub fn session(&self) -> AppState {
        let config = self.config();
        let store = Arc::new(FileStore::new(config.data_dir.clone()));
        AppState::with_parts(config, store, self.clock.clone()).expect("failed to build app state")
    }

    /// Move the shared clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        self.clock.advance(delta);
    }
}

/// Detail body for a phone with two colors and two storage sizes.
#[must_use]
pub fn product_detail(id: &str, brand: &str, model: &str, price: &str) -> Value {
    json!({
        "id": id,
        "brand": brand,
        "model": model,
        "price": price,
        "imgUrl": format!("https://img.example.com/{id}.jpg"),
        "cpu": "Octa-core",
        "options": {
            "colors": [
                { "code": 1000, "name": "Black" },
                { "code": 1001, "name": "White" }
            ],
            "storages": [
                { "code": 2000, "name": "16 GB" },
                { "code": 2001, "name": "32 GB" }
            ]
        }
    })
}

/// Mount `GET /api/product` returning the given list, expected `times` times.
pub async fn mount_product_list(server: &MockServer, products: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path("/api/product"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products))
        .expect(times)
        .mount(server)
        .await;
}

/// Mount `GET /api/product/{id}` returning `body`, expected `times` times.
pub async fn mount_product_detail(server: &MockServer, id: &str, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/product/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Mount `POST /api/cart` answering with `status`.
pub async fn mount_cart_endpoint(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "count": 1 })))
        .mount(server)
        .await;
}
