//! Catalog browsing commands.

use mobile_shop_core::{Product, ProductId};
use mobile_shop_storefront::catalog::{Catalog, filter_products};
use mobile_shop_storefront::error::AppError;
use mobile_shop_storefront::state::AppState;

/// List products, optionally filtered by brand or model.
///
/// # Errors
///
/// Returns an error if the product list cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn list(state: &AppState, search: Option<&str>) -> Result<(), AppError> {
    let products = state.catalog().fetch_product_list().await?;
    let matches = filter_products(&products, search.unwrap_or_default());

    if matches.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for product in &matches {
        println!(
            "{:<24} {:<32} {:>10}",
            product.id.as_str(),
            product.title(),
            product.unit_price().to_string()
        );
    }
    println!("{} of {} product(s)", matches.len(), products.len());
    Ok(())
}

/// Show one product with its color and storage options.
///
/// # Errors
///
/// Returns `NotFound` if the catalog does not know the product, or another
/// error if the fetch fails.
#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState, id: &str) -> Result<(), AppError> {
    let product = fetch(state, id).await?;

    println!("{}", product.title());
    println!("  ID:    {}", product.id);
    println!("  Price: {}", product.unit_price());
    if let Some(img_url) = &product.img_url {
        println!("  Image: {img_url}");
    }

    println!("  Colors:");
    for color in &product.options.colors {
        println!("    {:>6}  {}", color.code, color.name);
    }
    println!("  Storage:");
    for storage in &product.options.storages {
        println!("    {:>6}  {}", storage.code, storage.name);
    }
    Ok(())
}

/// Fetch a product, mapping a 404 to `NotFound`.
pub(crate) async fn fetch(state: &AppState, id: &str) -> Result<Product, AppError> {
    state
        .catalog()
        .fetch_product(&ProductId::new(id))
        .await
        .map_err(|e| {
            if e.is_not_found() {
                AppError::NotFound(format!("product {id}"))
            } else {
                e.into()
            }
        })
}
