//! Integration tests for catalog reads through the persistent response cache.

use chrono::TimeDelta;
use mobile_shop_core::ProductId;
use mobile_shop_integration_tests::{
    TestContext, mount_product_detail, mount_product_list, product_detail,
};
use mobile_shop_storefront::catalog::{Catalog, filter_products};
use serde_json::{Value, json};

fn product_list() -> Value {
    json!([
        { "id": "acer-1", "brand": "Acer", "model": "Iconia Talk S", "price": "170" },
        { "id": "alc-1", "brand": "Alcatel", "model": "Idol 4", "price": "" },
        { "id": "sam-1", "brand": "Samsung", "model": "Galaxy S8", "price": 600 }
    ])
}

// =============================================================================
// Cache Lifetime Tests
// =============================================================================

#[tokio::test]
async fn test_product_list_cached_across_sessions() {
    let ctx = TestContext::new().await;
    mount_product_list(&ctx.server, product_list(), 1).await;

    let first = ctx.session().catalog().fetch_product_list().await.unwrap();

    ctx.advance(TimeDelta::minutes(30));
    let second = ctx.session().catalog().fetch_product_list().await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert!(ctx.data_dir.path().join("mobile_shop_api_cache.json").exists());
}

#[tokio::test]
async fn test_product_list_refetched_after_an_hour() {
    let ctx = TestContext::new().await;
    mount_product_list(&ctx.server, product_list(), 2).await;

    let state = ctx.session();
    state.catalog().fetch_product_list().await.unwrap();

    ctx.advance(TimeDelta::hours(1));
    state.catalog().fetch_product_list().await.unwrap();
}

#[tokio::test]
async fn test_expired_entries_pruned_on_startup() {
    let ctx = TestContext::new().await;
    mount_product_list(&ctx.server, product_list(), 1).await;

    let state = ctx.session();
    state.catalog().fetch_product_list().await.unwrap();
    assert_eq!(state.catalog().cache().len(), 1);

    ctx.advance(TimeDelta::hours(2));
    assert!(ctx.session().catalog().cache().is_empty());
}

#[tokio::test]
async fn test_cache_clear_forces_refetch() {
    let ctx = TestContext::new().await;
    mount_product_detail(
        &ctx.server,
        "acer-1",
        product_detail("acer-1", "Acer", "Iconia Talk S", "170"),
        2,
    )
    .await;

    let state = ctx.session();
    let id = ProductId::new("acer-1");
    state.catalog().fetch_product(&id).await.unwrap();
    state.catalog().fetch_product(&id).await.unwrap();

    state.catalog().cache().clear().unwrap();
    assert!(!ctx.data_dir.path().join("mobile_shop_api_cache.json").exists());

    let product = state.catalog().fetch_product(&id).await.unwrap();
    assert_eq!(product.options.colors.len(), 2);
}

// =============================================================================
// Stored Format Tests
// =============================================================================

#[tokio::test]
async fn test_cache_blob_format() {
    let ctx = TestContext::new().await;
    mount_product_list(&ctx.server, product_list(), 1).await;
    mount_product_detail(
        &ctx.server,
        "sam-1",
        product_detail("sam-1", "Samsung", "Galaxy S8", "600"),
        1,
    )
    .await;

    let state = ctx.session();
    state.catalog().fetch_product_list().await.unwrap();
    state
        .catalog()
        .fetch_product(&ProductId::new("sam-1"))
        .await
        .unwrap();

    let raw =
        std::fs::read_to_string(ctx.data_dir.path().join("mobile_shop_api_cache.json")).unwrap();
    let blob: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(blob["products-list"]["data"], product_list());
    assert_eq!(blob["products-list"]["timestamp"], json!(1_700_000_000_000_i64));
    assert_eq!(blob["product-sam-1"]["data"]["cpu"], json!("Octa-core"));
}

// =============================================================================
// Search Tests
// =============================================================================

#[tokio::test]
async fn test_search_over_cached_list() {
    let ctx = TestContext::new().await;
    mount_product_list(&ctx.server, product_list(), 1).await;

    let products = ctx.session().catalog().fetch_product_list().await.unwrap();

    let hits = filter_products(&products, "GALAXY");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.as_str(), "sam-1");
    assert_eq!(filter_products(&products, "  ").len(), 3);
}
