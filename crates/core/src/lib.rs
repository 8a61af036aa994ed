//! Mobile Shop Core - Shared types library.
//!
//! This crate provides the types shared by every Mobile Shop component:
//! - `storefront` - Catalog client, response cache, and cart/order manager
//! - `cli` - Command-line front end for browsing and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and pure computations - no I/O, no
//! storage access, no HTTP clients. Totals, quantity validation, and order
//! construction live here so they can be tested without any collaborators.
//!
//! # Modules
//!
//! - [`types`] - Products, cart lines, orders, prices, and type-safe IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
