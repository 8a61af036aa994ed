//! Checkout and order history commands.

use mobile_shop_core::{CustomerInfo, Order};
use mobile_shop_storefront::error::{AppError, add_breadcrumb};
use mobile_shop_storefront::state::AppState;

use super::describe_line;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Turn the cart into an order and print its summary.
///
/// # Errors
///
/// Returns `BadRequest` if the cart is empty or a customer field is blank.
pub fn checkout(
    state: &AppState,
    name: String,
    email: String,
    address: String,
) -> Result<(), AppError> {
    for (field, value) in [("name", &name), ("email", &email), ("address", &address)] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{field} is required")));
        }
    }

    add_breadcrumb("checkout", "Checkout", None);

    let order = state
        .cart()
        .checkout(CustomerInfo {
            name,
            email,
            address,
        })
        .ok_or_else(|| AppError::BadRequest("your cart is empty".to_string()))?;

    print_order(&order);
    Ok(())
}

/// Print every recorded order, newest first.
#[allow(clippy::print_stdout)]
pub fn list(state: &AppState) {
    let orders = state.cart().orders();
    if orders.is_empty() {
        println!("No orders yet.");
        return;
    }

    for order in &orders {
        print_order(order);
        println!();
    }
}

#[allow(clippy::print_stdout)]
fn print_order(order: &Order) {
    println!(
        "Order {} - {} - {}",
        order.id,
        order.date.format(DATE_FORMAT),
        order.status
    );
    println!(
        "  {} <{}>, {}",
        order.customer_info.name, order.customer_info.email, order.customer_info.address
    );
    for line in &order.items {
        println!(
            "  {:>3} x {:<48} {:>10}",
            line.quantity.get(),
            describe_line(line),
            line.line_total().to_string()
        );
    }
    println!("  Total: {}", order.total_price());
}
