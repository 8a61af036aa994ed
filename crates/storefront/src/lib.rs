//! Mobile Shop storefront library.
//!
//! Client-side persistence and caching for a mobile-phone storefront:
//!
//! - [`catalog`] - catalog API client behind a persistent response cache
//! - [`cart`] - cart and order-history state with expiring persistence
//! - [`store`] - key-value storage the other two persist through
//!
//! [`state::AppState`] wires them together for one session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod state;
pub mod store;
