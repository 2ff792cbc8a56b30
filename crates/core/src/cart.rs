//! Shopping cart lines and the persisted cart store.
//!
//! A cart is an ordered list of `(product id, quantity)` lines with at most
//! one line per product. [`Cart`] holds the state and its mutation rules;
//! [`CartStore`] wraps a cart together with a [`KeyValueStore`] and writes
//! the serialized cart back under [`CART_STORAGE_KEY`] after every mutation.
//!
//! # Persisted format
//!
//! ```json
//! {"state":{"items":[{"productId":"a1","quantity":2}]},"version":0}
//! ```
//!
//! Quantities are always at least 1. [`Cart::set_quantity`] clamps lower
//! values up to 1 instead of rejecting them; removing a line is always an
//! explicit [`Cart::remove`].

use std::collections::HashMap;
use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductId;

/// Fixed key the cart is stored under.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// Version written into the persisted blob.
const CART_STORAGE_VERSION: u32 = 0;

/// Errors raised by [`CartStore`].
#[derive(Debug, Error)]
pub enum CartError {
    /// The backing store failed to read or write.
    #[error("cart storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The cart could not be serialized.
    #[error("cart serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartLine {
    /// Create a line, clamping the quantity to at least 1.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity: quantity.max(1),
        }
    }
}

/// Cart state: ordered lines, unique per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PersistedCart", into = "PersistedCart")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from raw lines.
    ///
    /// Zero-quantity lines are dropped and duplicate product ids are merged
    /// into the first occurrence by summing quantities.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            match cart.position(&line.product_id) {
                Some(idx) => {
                    if let Some(existing) = cart.lines.get_mut(idx) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                    }
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity held for a product, if it is in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|line| &line.product_id == product_id)
            .map(|line| line.quantity)
    }

    /// Distinct product ids in the cart, in line order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|line| line.product_id.clone()).collect()
    }

    /// Add one unit of a product. Returns the line's new quantity.
    pub fn add(&mut self, product_id: &ProductId) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|l| &l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }
        self.lines.push(CartLine::new(product_id.clone(), 1));
        1
    }

    /// Remove a product's line. Returns `false` if it was not in the cart.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        self.lines.len() != before
    }

    /// Overwrite the quantity of an existing line, clamped to at least 1.
    ///
    /// Returns the stored quantity, or `None` if the product is not in the
    /// cart (in which case nothing changes).
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Option<u32> {
        let line = self.lines.iter_mut().find(|l| &l.product_id == product_id)?;
        line.quantity = quantity.max(1);
        Some(line.quantity)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Serialize into the persisted blob.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a persisted blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not a valid persisted cart.
    pub fn from_json(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|l| &l.product_id == product_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedCart {
    #[serde(default)]
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    items: Vec<CartLine>,
}

impl From<PersistedCart> for Cart {
    fn from(persisted: PersistedCart) -> Self {
        Self::from_lines(persisted.state.items)
    }
}

impl From<Cart> for PersistedCart {
    fn from(cart: Cart) -> Self {
        Self {
            state: PersistedState { items: cart.lines },
            version: CART_STORAGE_VERSION,
        }
    }
}

// =============================================================================
// Key-value persistence
// =============================================================================

/// A synchronous string key-value store.
pub trait KeyValueStore {
    /// Error type of the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the read fails.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the write fails.
    fn set(&mut self, key: &str, value: String) -> Result<(), Self::Error>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), Self::Error> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// A cart bound to a key-value store.
///
/// Every mutation is written through to the store before returning.
#[derive(Debug)]
pub struct CartStore<S: KeyValueStore> {
    cart: Cart,
    storage: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Load the cart from `storage`.
    ///
    /// A missing entry yields an empty cart. An unreadable blob is logged and
    /// also yields an empty cart; it is overwritten on the next mutation.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the store cannot be read.
    pub fn open(storage: S) -> Result<Self, CartError> {
        let blob = storage
            .get(CART_STORAGE_KEY)
            .map_err(|e| CartError::Storage(Box::new(e)))?;

        let cart = match blob {
            Some(blob) => Cart::from_json(&blob).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable persisted cart");
                Cart::new()
            }),
            None => Cart::new(),
        };

        Ok(Self { cart, storage })
    }

    /// Current cart state.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Total number of units.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.cart.count()
    }

    /// Add one unit of a product and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn add(&mut self, product_id: &ProductId) -> Result<u32, CartError> {
        let quantity = self.cart.add(product_id);
        self.persist()?;
        Ok(quantity)
    }

    /// Remove a product's line and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove(&mut self, product_id: &ProductId) -> Result<bool, CartError> {
        let removed = self.cart.remove(product_id);
        self.persist()?;
        Ok(removed)
    }

    /// Set a line's quantity (clamped to at least 1) and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Option<u32>, CartError> {
        let stored = self.cart.set_quantity(product_id, quantity);
        self.persist()?;
        Ok(stored)
    }

    /// Empty the cart and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.cart.clear();
        self.persist()
    }

    /// Give back the underlying store.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) -> Result<(), CartError> {
        let blob = self.cart.to_json()?;
        self.storage
            .set(CART_STORAGE_KEY, blob)
            .map_err(|e| CartError::Storage(Box::new(e)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(s: &str) -> ProductId {
        ProductId::new(s)
    }

    #[test]
    fn test_repeated_add_accumulates_quantity() {
        let mut cart = Cart::new();
        for expected in 1..=5 {
            assert_eq!(cart.add(&id("a")), expected);
        }
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(&id("a")), Some(5));
        assert_eq!(cart.count(), 5);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add(&id("b"));
        cart.add(&id("a"));
        cart.add(&id("b"));
        assert_eq!(cart.product_ids(), vec![id("b"), id("a")]);
    }

    #[test]
    fn test_remove_excludes_quantity_from_count() {
        let mut cart = Cart::new();
        cart.add(&id("a"));
        cart.add(&id("a"));
        cart.add(&id("b"));
        assert!(cart.remove(&id("a")));
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.quantity_of(&id("a")), None);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add(&id("a"));
        assert!(!cart.remove(&id("zzz")));
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn test_set_quantity_zero_is_accepted_and_clamped() {
        let mut cart = Cart::new();
        cart.add(&id("a"));
        cart.add(&id("a"));
        assert_eq!(cart.set_quantity(&id("a"), 0), Some(1));
        assert_eq!(cart.quantity_of(&id("a")), Some(1));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = Cart::new();
        cart.add(&id("a"));
        assert_eq!(cart.set_quantity(&id("a"), 7), Some(7));
        assert_eq!(cart.count(), 7);
    }

    #[test]
    fn test_set_quantity_unknown_product_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(cart.set_quantity(&id("a"), 3), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&id("a"));
        cart.add(&id("b"));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_persisted_format() {
        let mut cart = Cart::new();
        cart.add(&id("a"));
        cart.add(&id("a"));
        assert_eq!(
            cart.to_json().unwrap(),
            r#"{"state":{"items":[{"productId":"a","quantity":2}]},"version":0}"#
        );
    }

    #[test]
    fn test_load_normalizes_lines() {
        let blob = r#"{"state":{"items":[
            {"productId":"a","quantity":1},
            {"productId":"b","quantity":0},
            {"productId":"a","quantity":2}
        ]},"version":0}"#;
        let cart = Cart::from_json(blob).unwrap();
        assert_eq!(cart.lines(), &[CartLine::new("a", 3)]);
    }

    #[test]
    fn test_load_rejects_negative_quantity() {
        let blob = r#"{"state":{"items":[{"productId":"a","quantity":-1}]}}"#;
        assert!(Cart::from_json(blob).is_err());
    }

    #[test]
    fn test_store_writes_through_on_every_mutation() {
        let mut store = CartStore::open(MemoryStore::new()).unwrap();
        store.add(&id("a")).unwrap();
        store.add(&id("a")).unwrap();

        let storage = store.into_storage();
        let blob = storage.get(CART_STORAGE_KEY).unwrap().unwrap();
        assert_eq!(Cart::from_json(&blob).unwrap().count(), 2);

        let mut reopened = CartStore::open(storage).unwrap();
        assert_eq!(reopened.count(), 2);
        reopened.clear().unwrap();

        let storage = reopened.into_storage();
        let blob = storage.get(CART_STORAGE_KEY).unwrap().unwrap();
        assert!(Cart::from_json(&blob).unwrap().is_empty());
    }

    #[test]
    fn test_store_discards_corrupt_blob() {
        let mut storage = MemoryStore::new();
        storage
            .set(CART_STORAGE_KEY, "not json".to_string())
            .unwrap();
        let store = CartStore::open(storage).unwrap();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_store_set_quantity_and_remove() {
        let mut store = CartStore::open(MemoryStore::new()).unwrap();
        store.add(&id("a")).unwrap();
        store.add(&id("b")).unwrap();
        assert_eq!(store.set_quantity(&id("b"), 4).unwrap(), Some(4));
        assert!(store.remove(&id("a")).unwrap());
        assert_eq!(store.lines(), &[CartLine::new("b", 4)]);
    }
}
