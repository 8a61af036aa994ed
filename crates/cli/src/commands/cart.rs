//! Cart commands.
//!
//! Line numbers on the command line are 1-based, matching `cart show`.

use mobile_shop_core::{OptionCode, Quantity};
use mobile_shop_storefront::error::{AppError, add_breadcrumb};
use mobile_shop_storefront::state::AppState;

use super::products::fetch;
use super::{describe_line, line_index};

/// Print cart lines, line subtotals, and the cart total.
///
/// Lines restored without product details are filled in first.
#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState) {
    let cart = state.cart();
    cart.hydrate_missing_details().await;

    let snapshot = cart.snapshot();
    if snapshot.items.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for (number, line) in (1..).zip(&snapshot.items) {
        println!(
            "{number:>3}. {:<48} {:>3} x {:>10} = {:>10}",
            describe_line(line),
            line.quantity.get(),
            line.unit_price().to_string(),
            line.line_total().to_string()
        );
    }
    println!("{} item(s), total {}", snapshot.count, cart.cart_total());
}

/// Add a product variant to the cart.
///
/// Missing color or storage codes default to the product's first option.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched, the variant or
/// quantity is invalid, or the server rejects the add.
#[allow(clippy::print_stdout)]
pub async fn add(
    state: &AppState,
    id: &str,
    color: Option<i64>,
    storage: Option<i64>,
    quantity: u32,
) -> Result<(), AppError> {
    let quantity = Quantity::new(quantity)
        .ok_or_else(|| AppError::BadRequest("quantity must be at least 1".to_string()))?;

    let product = fetch(state, id).await?;

    let color_code = color.map_or_else(|| product.default_color_code(), OptionCode::new);
    if !product.options.colors.is_empty() && product.color(color_code).is_none() {
        return Err(AppError::BadRequest(format!(
            "{} has no color {color_code}",
            product.title()
        )));
    }
    let storage_code = storage.map_or_else(|| product.default_storage_code(), OptionCode::new);
    if !product.options.storages.is_empty() && product.storage(storage_code).is_none() {
        return Err(AppError::BadRequest(format!(
            "{} has no storage {storage_code}",
            product.title()
        )));
    }

    add_breadcrumb("cart", "Add to cart", Some(&[("product_id", id)]));

    let title = product.title();
    let product_id = product.id.clone();
    let ack = state
        .cart()
        .add_to_cart(product_id, color_code, storage_code, quantity, Some(product))
        .await?;

    tracing::debug!(server_count = ?ack.count(), "Cart add acknowledged");
    println!(
        "Added {quantity} x {title}. Cart now holds {} item(s).",
        state.cart().count()
    );
    Ok(())
}

/// Set a line's quantity from raw user input.
///
/// # Errors
///
/// Returns `NotFound` for an unknown line and `BadRequest` for input that is
/// not a positive whole number.
#[allow(clippy::print_stdout)]
pub fn update(state: &AppState, number: usize, raw: &str) -> Result<(), AppError> {
    let index = existing_line(state, number)?;

    if !state.cart().update_quantity_input(index, raw) {
        return Err(AppError::BadRequest(format!(
            "'{}' is not a positive whole number (use `cart remove` to drop a line)",
            raw.trim()
        )));
    }

    println!("Line {number} updated. Cart now holds {} item(s).", state.cart().count());
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns `NotFound` for an unknown line.
#[allow(clippy::print_stdout)]
pub fn remove(state: &AppState, number: usize) -> Result<(), AppError> {
    let index = existing_line(state, number)?;

    if let Some(line) = state.cart().remove_item(index) {
        println!("Removed {}.", describe_line(&line));
    }
    Ok(())
}

/// Remove every line.
#[allow(clippy::print_stdout)]
pub fn clear(state: &AppState) {
    state.cart().clear_cart();
    println!("Cart cleared.");
}

/// Resolve a 1-based line number to an index into the current cart.
fn existing_line(state: &AppState, number: usize) -> Result<usize, AppError> {
    line_index(number)
        .filter(|&index| index < state.cart().items().len())
        .ok_or_else(|| AppError::NotFound(format!("cart line {number}")))
}
