//! Core types for Mobile Shop.
//!
//! This module provides type-safe wrappers for catalog and checkout concepts.

pub mod cart;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{CartLine, LineKey, Quantity, QuantityError, item_count, subtotal};
pub use id::*;
pub use order::{CustomerInfo, Order};
pub use price::{Price, PriceError};
pub use product::{OptionCode, OptionValue, Product, ProductOptions};
pub use status::OrderStatus;
