//! Integration tests for the cart and checkout across application restarts.

use chrono::TimeDelta;
use mobile_shop_core::{CustomerInfo, OptionCode, ProductId, Quantity};
use mobile_shop_integration_tests::{
    START_MILLIS, TestContext, mount_cart_endpoint, product_detail,
};
use mobile_shop_storefront::catalog::Catalog;
use mobile_shop_storefront::state::AppState;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn add_default_variant(state: &AppState, id: &str, quantity: u32) {
    let product = state
        .catalog()
        .fetch_product(&ProductId::new(id))
        .await
        .unwrap();
    state
        .cart()
        .add_to_cart(
            product.id.clone(),
            product.default_color_code(),
            product.default_storage_code(),
            Quantity::new(quantity).unwrap(),
            Some(product),
        )
        .await
        .unwrap();
}

/// Context with two products served on demand.
async fn setup() -> TestContext {
    let ctx = TestContext::new().await;
    for (id, body) in [
        ("acer-1", product_detail("acer-1", "Acer", "Iconia Talk S", "170")),
        ("sam-1", product_detail("sam-1", "Samsung", "Galaxy S8", "600.50")),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/api/product/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&ctx.server)
            .await;
    }
    ctx
}

fn read_blob(ctx: &TestContext, key: &str) -> Option<Value> {
    let raw = std::fs::read_to_string(ctx.data_dir.path().join(format!("{key}.json"))).ok()?;
    Some(serde_json::from_str(&raw).unwrap())
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        address: "12 St James's Square".to_string(),
    }
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[tokio::test]
async fn test_cart_restored_after_restart() {
    let ctx = setup().await;
    mount_cart_endpoint(&ctx.server, 200).await;

    let state = ctx.session();
    add_default_variant(&state, "acer-1", 1).await;
    add_default_variant(&state, "acer-1", 2).await;
    add_default_variant(&state, "sam-1", 1).await;
    drop(state);

    ctx.advance(TimeDelta::minutes(45));
    let restored = ctx.session();
    let items = restored.cart().items();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].quantity.get(), 3);
    assert_eq!(items[0].color_code, OptionCode::new(1000));
    assert_eq!(items[1].storage_code, OptionCode::new(2000));
    assert_eq!(restored.cart().count(), 4);
    assert_eq!(restored.cart().cart_total().to_string(), "1110.50€");
}

#[tokio::test]
async fn test_cart_blob_format() {
    let ctx = setup().await;
    mount_cart_endpoint(&ctx.server, 200).await;

    add_default_variant(&ctx.session(), "acer-1", 2).await;

    let blob = read_blob(&ctx, "mobile_shop_cart").unwrap();
    assert_eq!(blob["timestamp"], json!(START_MILLIS));
    assert_eq!(blob["items"][0]["id"], json!("acer-1"));
    assert_eq!(blob["items"][0]["colorCode"], json!(1000));
    assert_eq!(blob["items"][0]["storageCode"], json!(2000));
    assert_eq!(blob["items"][0]["quantity"], json!(2));
    assert_eq!(blob["items"][0]["details"]["model"], json!("Iconia Talk S"));
}

#[tokio::test]
async fn test_cart_expires_after_an_hour() {
    let ctx = setup().await;
    mount_cart_endpoint(&ctx.server, 200).await;

    add_default_variant(&ctx.session(), "acer-1", 1).await;

    ctx.advance(TimeDelta::hours(1));
    let restored = ctx.session();

    assert!(restored.cart().items().is_empty());
    assert_eq!(restored.cart().count(), 0);
    assert!(read_blob(&ctx, "mobile_shop_cart").is_none());
}

#[tokio::test]
async fn test_rejected_add_leaves_cart_empty() {
    let ctx = setup().await;
    mount_cart_endpoint(&ctx.server, 500).await;

    let state = ctx.session();
    let product = state
        .catalog()
        .fetch_product(&ProductId::new("acer-1"))
        .await
        .unwrap();
    let result = state
        .cart()
        .add_to_cart(
            product.id.clone(),
            product.default_color_code(),
            product.default_storage_code(),
            Quantity::ONE,
            Some(product),
        )
        .await;

    assert!(result.is_err());
    assert!(state.cart().items().is_empty());
    assert!(state.cart().last_error().is_some());
    assert!(!state.cart().is_loading());
    assert!(read_blob(&ctx, "mobile_shop_cart").is_none());
}

#[tokio::test]
async fn test_missing_details_hydrated_from_catalog() {
    let ctx = setup().await;
    std::fs::write(
        ctx.data_dir.path().join("mobile_shop_cart.json"),
        json!({
            "items": [
                { "id": "sam-1", "colorCode": 1001, "storageCode": 2001, "quantity": 2 },
                { "id": "acer-1", "colorCode": 1000, "storageCode": 2000, "quantity": 0 }
            ],
            "timestamp": START_MILLIS
        })
        .to_string(),
    )
    .unwrap();

    let state = ctx.session();
    assert_eq!(state.cart().items().len(), 1);
    assert_eq!(state.cart().hydrate_missing_details().await, 1);
    assert_eq!(state.cart().cart_total().to_string(), "1201.00€");
}

// =============================================================================
// Checkout Tests
// =============================================================================

#[tokio::test]
async fn test_checkout_survives_restart() {
    let ctx = setup().await;
    mount_cart_endpoint(&ctx.server, 200).await;

    let state = ctx.session();
    add_default_variant(&state, "acer-1", 2).await;
    let order = state.cart().checkout(customer()).unwrap();
    drop(state);

    assert!(read_blob(&ctx, "mobile_shop_cart").is_none());

    ctx.advance(TimeDelta::days(30));
    let restored = ctx.session();
    assert!(restored.cart().items().is_empty());
    assert_eq!(restored.cart().orders(), vec![order]);
}

#[tokio::test]
async fn test_order_blob_format() {
    let ctx = setup().await;
    mount_cart_endpoint(&ctx.server, 200).await;

    let state = ctx.session();
    add_default_variant(&state, "sam-1", 2).await;
    state.cart().checkout(customer()).unwrap();

    let orders = read_blob(&ctx, "mobile_shop_orders").unwrap();
    let order = &orders[0];
    assert!(order["id"].as_str().unwrap().starts_with("order-1700000000000-"));
    assert_eq!(order["total"], json!(1201.0));
    assert_eq!(order["status"], json!("completed"));
    assert_eq!(order["date"], json!("2023-11-14T22:13:20Z"));
    assert_eq!(order["customerInfo"]["email"], json!("ada@example.com"));
    assert_eq!(order["items"][0]["quantity"], json!(2));
}

#[tokio::test]
async fn test_empty_checkout_records_nothing() {
    let ctx = TestContext::new().await;
    let state = ctx.session();

    assert!(state.cart().checkout(customer()).is_none());
    assert!(state.cart().orders().is_empty());
    assert!(read_blob(&ctx, "mobile_shop_orders").is_none());
}
