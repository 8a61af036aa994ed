//! Cart and order-history state owner.
//!
//! [`CartManager`] holds the in-memory cart and order history, mirrors both to
//! the key-value store, and implements checkout. It is constructed once per
//! session and shared by reference; there is no global state.
//!
//! # Persistence
//!
//! - The cart is written with a fresh timestamp after every mutation that
//!   leaves it non-empty, and deleted outright when it becomes empty.
//! - A stored cart whose timestamp is at least the cart TTL old is discarded
//!   as a whole on load.
//! - Order history never expires and is rewritten in full on every change.
//!   Stored entries that fail to decode are written back untouched; a history
//!   that could not be read at all is never overwritten.
//!
//! Storage failures are logged and never reach the caller: in-memory state
//! stays authoritative for the rest of the session.
//!
//! # Checkout consistency
//!
//! Recording an order and clearing the cart are two separate writes. Each
//! order remembers the timestamp of the stored cart it consumed; if the clear
//! never reached storage, [`CartManager::load_state`] recognises that cart by
//! its timestamp and lines and discards it again.

mod persistence;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mobile_shop_core::{
    CartLine, CustomerInfo, LineKey, OptionCode, Order, Price, Product, ProductId, Quantity,
    item_count, subtotal,
};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::{CartAck, Catalog, CatalogError};
use crate::clock::Clock;
use crate::store::{KeyValueStore, StoreError};

/// Default time-to-live for a persisted cart (1 hour).
pub const DEFAULT_CART_TTL: Duration = Duration::from_secs(60 * 60);

/// Message exposed to the presentation layer when an add fails.
pub const ADD_TO_CART_FAILED: &str = "Could not add the product to the cart";

/// Errors surfaced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The server rejected or never received the cart add.
    #[error("failed to add to cart: {0}")]
    Catalog(#[from] CatalogError),
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    /// Cart lines in insertion order.
    pub items: Vec<CartLine>,
    /// Sum of line quantities.
    pub count: u32,
    /// A cart add is awaiting the server.
    pub loading: bool,
    /// Message from the last failed operation.
    pub error: Option<String>,
    /// Whether the cart panel is open.
    pub is_cart_open: bool,
    /// Completed orders, newest first.
    pub orders: Vec<Order>,
}

#[derive(Default)]
struct Inner {
    view: CartState,
    /// Timestamp of the last successful cart write.
    persisted_at: Option<i64>,
    /// Cart adds awaiting the server.
    in_flight: u32,
    /// Order history entries as stored, newest first.
    stored_orders: Vec<serde_json::Value>,
    /// The stored history could not be read.
    orders_unreadable: bool,
}

impl Inner {
    fn recount(&mut self) {
        self.view.count = item_count(&self.view.items);
    }
}

/// Owner of cart and order state.
pub struct CartManager<C> {
    catalog: C,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    cart_ttl_millis: i64,
    inner: Mutex<Inner>,
}

impl<C: Catalog> CartManager<C> {
    /// Create a manager with an empty cart. Call [`Self::load_state`] to
    /// hydrate from storage.
    pub fn new(
        catalog: C,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        cart_ttl: Duration,
    ) -> Self {
        Self {
            catalog,
            store,
            clock,
            cart_ttl_millis: i64::try_from(cart_ttl.as_millis()).unwrap_or(i64::MAX),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // State accessors
    // =========================================================================

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.lock().view.clone()
    }

    /// Current cart lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        self.lock().view.items.clone()
    }

    /// Total units in the cart.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lock().view.count
    }

    /// Whether a cart add is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().view.loading
    }

    /// Message from the last failed operation.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock().view.error.clone()
    }

    /// Whether the cart panel is open.
    #[must_use]
    pub fn is_cart_open(&self) -> bool {
        self.lock().view.is_cart_open
    }

    /// Order history, newest first.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.lock().view.orders.clone()
    }

    /// Sum of line totals at full precision.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        subtotal(&self.lock().view.items)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Hydrate cart and order history from storage.
    ///
    /// An expired cart, a cart already consumed by the newest order, or an
    /// unreadable blob is discarded and its key removed. Order history is
    /// loaded entry by entry; entries that fail to decode are skipped.
    #[instrument(skip(self))]
    pub fn load_state(&self) {
        let store = self.store.as_ref();
        let now = self.clock.now_millis();

        let (orders, orders_unreadable) = match persistence::load_orders(store) {
            Ok(stored) => (stored, false),
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!(error = %e, "Stored order history is corrupt, starting empty");
                (persistence::StoredOrders::default(), false)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load order history, leaving it untouched");
                (persistence::StoredOrders::default(), true)
            }
        };

        let stored = match persistence::load_cart(store) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to load cart, starting empty");
                self.discard_stored_cart();
                None
            }
        };

        let mut inner = self.lock();
        inner.view.orders = orders.orders;
        inner.stored_orders = orders.raw;
        inner.orders_unreadable = orders_unreadable;
        inner.view.items.clear();
        inner.persisted_at = None;

        if let Some(cart) = stored {
            // A matching timestamp alone could be a new cart written in the
            // same millisecond.
            let consumed = inner.view.orders.first().is_some_and(|order| {
                order.cart_timestamp == Some(cart.timestamp)
                    && same_lines(&order.items, &cart.items)
            });

            if now.saturating_sub(cart.timestamp) >= self.cart_ttl_millis {
                info!(stored_at = cart.timestamp, "Stored cart expired, discarding");
                self.discard_stored_cart();
            } else if consumed {
                warn!(
                    stored_at = cart.timestamp,
                    "Stored cart was already checked out, clearing it again"
                );
                self.discard_stored_cart();
            } else if cart.items.is_empty() {
                self.discard_stored_cart();
            } else {
                inner.view.items = cart.items;
                inner.persisted_at = Some(cart.timestamp);
            }
        }

        inner.recount();
        debug!(
            lines = inner.view.items.len(),
            count = inner.view.count,
            orders = inner.view.orders.len(),
            "Cart state loaded"
        );
    }

    // =========================================================================
    // Cart mutations
    // =========================================================================

    /// Add a product variant to the cart.
    ///
    /// The server call gates the local change: if it fails nothing is
    /// mutated and [`CartState::error`] is set. On success the quantity is
    /// merged into the line with the same product, color, and storage, or a
    /// new line is appended with the `details` snapshot.
    ///
    /// State is re-read after the server responds, so adds that complete
    /// while this one is pending are not lost.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog API call fails.
    #[instrument(
        skip_all,
        fields(
            product_id = %product_id,
            color = %color_code,
            storage = %storage_code,
            quantity = %quantity
        )
    )]
    pub async fn add_to_cart(
        &self,
        product_id: ProductId,
        color_code: OptionCode,
        storage_code: OptionCode,
        quantity: Quantity,
        details: Option<Product>,
    ) -> Result<CartAck, CartError> {
        {
            let mut inner = self.lock();
            inner.in_flight += 1;
            inner.view.loading = true;
            inner.view.error = None;
        }

        let result = self
            .catalog
            .submit_cart_add(&product_id, color_code, storage_code)
            .await;

        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        inner.view.loading = inner.in_flight > 0;

        let ack = match result {
            Ok(ack) => ack,
            Err(e) => {
                error!(error = %e, "Cart add rejected, cart unchanged");
                inner.view.error = Some(ADD_TO_CART_FAILED.to_string());
                return Err(e.into());
            }
        };

        let key = LineKey {
            product_id,
            color_code,
            storage_code,
        };
        if let Some(line) = inner.view.items.iter_mut().find(|line| line.matches(&key)) {
            if line.quantity.get().checked_add(quantity.get()).is_none() {
                warn!(
                    existing = %line.quantity,
                    "Line quantity capped at its maximum"
                );
            }
            line.quantity = line.quantity.saturating_add(quantity);
            debug!(quantity = %line.quantity, "Merged into existing line");
        } else {
            inner.view.items.push(CartLine::new(key, quantity, details));
            debug!("Appended new line");
        }

        inner.recount();
        self.sync_cart(&mut inner);
        Ok(ack)
    }

    /// Set a line's quantity (absolute, not a delta).
    ///
    /// Values below 1 remove the line. Out-of-range indices are ignored.
    #[instrument(skip(self))]
    pub fn update_quantity(&self, index: usize, new_quantity: i64) {
        let Some(quantity) = Quantity::from_signed(new_quantity) else {
            self.remove_item(index);
            return;
        };

        let mut inner = self.lock();
        let Some(line) = inner.view.items.get_mut(index) else {
            debug!("No line at index, ignoring");
            return;
        };
        line.quantity = quantity;

        inner.recount();
        self.sync_cart(&mut inner);
    }

    /// Apply a quantity typed by the user.
    ///
    /// Non-numeric, zero, or negative input is rejected without touching the
    /// cart. Returns whether the input was accepted.
    pub fn update_quantity_input(&self, index: usize, raw: &str) -> bool {
        match Quantity::parse(raw) {
            Some(quantity) => {
                self.update_quantity(index, i64::from(quantity.get()));
                true
            }
            None => {
                debug!(input = raw, "Rejected quantity input");
                false
            }
        }
    }

    /// Remove the line at `index`, returning it.
    ///
    /// Removing the last line deletes the stored cart.
    #[instrument(skip(self))]
    pub fn remove_item(&self, index: usize) -> Option<CartLine> {
        let mut inner = self.lock();
        if index >= inner.view.items.len() {
            debug!("No line at index, ignoring");
            return None;
        }
        let removed = inner.view.items.remove(index);

        inner.recount();
        self.sync_cart(&mut inner);
        Some(removed)
    }

    /// Empty the cart and delete the stored cart.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) {
        let mut inner = self.lock();
        self.clear_locked(&mut inner);
    }

    /// Flip the cart panel flag, returning the new value.
    pub fn toggle_cart(&self) -> bool {
        let mut inner = self.lock();
        inner.view.is_cart_open = !inner.view.is_cart_open;
        inner.view.is_cart_open
    }

    /// Fill in product details for lines stored without them.
    ///
    /// Each product is fetched once through the catalog (and its cache);
    /// failed fetches are logged and the line is left as is. Returns the
    /// number of lines updated.
    #[instrument(skip(self))]
    pub async fn hydrate_missing_details(&self) -> usize {
        let missing = {
            let inner = self.lock();
            let mut ids: Vec<ProductId> = Vec::new();
            for line in inner.view.items.iter().filter(|l| l.details.is_none()) {
                if !ids.contains(&line.product_id) {
                    ids.push(line.product_id.clone());
                }
            }
            ids
        };
        if missing.is_empty() {
            return 0;
        }

        let mut fetched = Vec::with_capacity(missing.len());
        for id in missing {
            match self.catalog.fetch_product(&id).await {
                Ok(product) => fetched.push(product),
                Err(e) => warn!(product_id = %id, error = %e, "Failed to fetch line details"),
            }
        }

        let mut inner = self.lock();
        let mut updated = 0;
        for line in inner.view.items.iter_mut().filter(|l| l.details.is_none()) {
            if let Some(product) = fetched.iter().find(|p| p.id == line.product_id) {
                line.details = Some(product.clone());
                updated += 1;
            }
        }
        if updated > 0 {
            self.sync_cart(&mut inner);
        }
        updated
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Turn the cart into a completed order.
    ///
    /// Returns `None` and changes nothing when the cart is empty. Otherwise
    /// the order is prepended to the history, the history is persisted, the
    /// cart is cleared, and the cart panel is closed.
    #[instrument(skip(self, customer_info))]
    pub fn checkout(&self, customer_info: CustomerInfo) -> Option<Order> {
        let mut inner = self.lock();
        let order = Order::from_cart(
            &inner.view.items,
            customer_info,
            self.clock.now(),
            inner.persisted_at,
        )?;

        inner.view.orders.insert(0, order.clone());
        self.persist_order(&mut inner, &order);

        self.clear_locked(&mut inner);
        inner.view.is_cart_open = false;

        info!(
            order_id = %order.id,
            total = %order.total_price(),
            lines = order.items.len(),
            "Order completed"
        );
        Some(order)
    }

    // =========================================================================
    // Persistence helpers
    // =========================================================================

    fn clear_locked(&self, inner: &mut Inner) {
        inner.view.items.clear();
        inner.view.count = 0;
        self.sync_cart(inner);
    }

    /// Mirror the in-memory cart to storage.
    fn sync_cart(&self, inner: &mut Inner) {
        if inner.view.items.is_empty() {
            match persistence::remove_cart(self.store.as_ref()) {
                Ok(()) => inner.persisted_at = None,
                Err(e) => warn!(error = %e, "Failed to delete stored cart"),
            }
            return;
        }

        let timestamp = self.clock.now_millis();
        match persistence::save_cart(self.store.as_ref(), &inner.view.items, timestamp) {
            Ok(()) => inner.persisted_at = Some(timestamp),
            Err(e) => warn!(error = %e, "Failed to persist cart"),
        }
    }

    /// Prepend `order` to the stored history and write it back.
    fn persist_order(&self, inner: &mut Inner, order: &Order) {
        if inner.orders_unreadable {
            warn!(
                order_id = %order.id,
                "Stored order history could not be read, not overwriting it"
            );
            return;
        }

        match serde_json::to_value(order) {
            Ok(entry) => inner.stored_orders.insert(0, entry),
            Err(e) => {
                warn!(error = %e, order_id = %order.id, "Failed to encode order");
                return;
            }
        }
        if let Err(e) = persistence::save_orders(self.store.as_ref(), &inner.stored_orders) {
            warn!(error = %e, order_id = %order.id, "Failed to persist order history");
        }
    }

    fn discard_stored_cart(&self) {
        if let Err(e) = persistence::remove_cart(self.store.as_ref()) {
            warn!(error = %e, "Failed to delete stored cart");
        }
    }
}

/// Same variants and quantities, in the same order.
fn same_lines(a: &[CartLine], b: &[CartLine]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.matches(&y.key()) && x.quantity == y.quantity)
}

impl<C> fmt::Debug for CartManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartManager")
            .field("cart_ttl_millis", &self.cart_ttl_millis)
            .finish_non_exhaustive()
    }
}
