//! Command implementations.
//!
//! Each command prints its result to stdout; diagnostics go through
//! `tracing` to stderr.

pub mod cache;
pub mod cart;
pub mod orders;
pub mod products;

use mobile_shop_core::CartLine;

/// One-line description of a cart line: title plus chosen variant names.
fn describe_line(line: &CartLine) -> String {
    let Some(product) = &line.details else {
        return format!(
            "{} (color {}, storage {})",
            line.product_id, line.color_code, line.storage_code
        );
    };

    let color = product
        .color(line.color_code)
        .map_or_else(|| line.color_code.to_string(), |c| c.name.clone());
    let storage = product
        .storage(line.storage_code)
        .map_or_else(|| line.storage_code.to_string(), |s| s.name.clone());
    format!("{} ({color}, {storage})", product.title())
}

/// Convert a 1-based line number from the command line.
fn line_index(number: usize) -> Option<usize> {
    number.checked_sub(1)
}
