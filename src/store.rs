//! Cart store
//!
//! Owns the authoritative [`Cart`], keeps it in sync with a [`Storage`] slot and
//! notifies subscribers after every committed change.

use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use crate::{
    cart::Cart,
    products::{Product, ProductId},
    storage::{Storage, StorageError},
    subscribers::{SubscriptionKey, Subscribers},
};

/// Storage key the cart is persisted under by default.
pub const CART_KEY: &str = "cart";

/// When committed changes are written to storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistMode {
    /// Write the whole cart after every committed mutation.
    #[default]
    Immediate,

    /// Only mark the store dirty; [`CartStore::flush`] writes.
    ///
    /// Changes not flushed before the store is dropped are lost, with a warning.
    Deferred,
}

/// Shopping cart store.
///
/// Mutations never fail. Storage errors are logged and the in-memory cart stays
/// authoritative until a later write succeeds.
#[derive(Debug)]
pub struct CartStore<S: Storage> {
    storage: S,
    key: String,
    cart: Cart,
    mode: PersistMode,
    dirty: bool,
    subscribers: Subscribers<Cart>,
}

impl<S: Storage> CartStore<S> {
    /// Create a store backed by `storage`, restoring the cart saved under [`CART_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, CART_KEY)
    }

    /// Create a store persisting under a custom key.
    ///
    /// A missing, unreadable or invalid saved cart yields an empty cart.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = load_cart(&storage, &key);

        Self {
            storage,
            key,
            cart,
            mode: PersistMode::default(),
            dirty: false,
            subscribers: Subscribers::new(),
        }
    }

    /// Set the persistence mode.
    #[must_use]
    pub fn with_mode(mut self, mode: PersistMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add `quantity` units of `product`, merging with an existing line for the same id.
    pub fn add_to_cart(&mut self, product: Product, quantity: u32) {
        debug!(product = %product.id, quantity, "adding to cart");

        self.cart.add(product, quantity);
        self.commit();
    }

    /// Add a single unit of `product`.
    pub fn add_one(&mut self, product: Product) {
        self.add_to_cart(product, 1);
    }

    /// Remove the line for `id`. Unknown ids are ignored.
    pub fn remove_from_cart(&mut self, id: &ProductId) {
        if self.cart.remove(id) {
            debug!(product = %id, "removed from cart");
            self.commit();
        }
    }

    /// Set the quantity of the line for `id`.
    ///
    /// Quantities below one are ignored: removing a line goes through
    /// [`CartStore::remove_from_cart`]. Returns whether the cart changed.
    pub fn update_quantity(&mut self, id: &ProductId, new_quantity: u32) -> bool {
        if !self.cart.set_quantity(id, new_quantity) {
            return false;
        }

        debug!(product = %id, quantity = new_quantity, "updated cart quantity");
        self.commit();

        true
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.commit();
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.cart.total()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn cart_items_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Current cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Register a listener called with the cart after each committed mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&Cart) + 'static) -> SubscriptionKey {
        self.subscribers.subscribe(listener)
    }

    /// Remove a listener. Returns `false` if the key was unknown.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscribers.unsubscribe(key)
    }

    /// Whether committed changes have not reached storage yet.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write pending changes to storage.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the cart cannot be serialized or written. The store
    /// stays dirty in that case.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if !self.dirty {
            return Ok(());
        }

        self.write()
    }

    /// Persistence mode in use.
    #[must_use]
    pub fn mode(&self) -> PersistMode {
        self.mode
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing storage.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn commit(&mut self) {
        self.dirty = true;

        if self.mode == PersistMode::Immediate
            && let Err(err) = self.write()
        {
            error!(key = %self.key, error = %err, "failed to persist cart");
        }

        self.subscribers.notify(&self.cart);
    }

    fn write(&mut self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.cart)?;

        self.storage.write(&self.key, &json)?;
        self.dirty = false;

        Ok(())
    }
}

impl<S: Storage> Drop for CartStore<S> {
    fn drop(&mut self) {
        if self.dirty {
            warn!(
                key = %self.key,
                lines = self.cart.len(),
                "dropping cart store with unsaved changes"
            );
        }
    }
}

fn load_cart(storage: &impl Storage, key: &str) -> Cart {
    let raw = match storage.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(err) => {
            warn!(key, error = %err, "failed to read saved cart; starting empty");
            return Cart::new();
        }
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => {
            debug!(key, lines = cart.len(), "restored saved cart");
            cart
        }
        Err(err) => {
            warn!(key, error = %err, "failed to parse saved cart; starting empty");
            Cart::new()
        }
    }
}
