//! Session-backed cart persistence.
//!
//! The cart blob lives in the session under the same key the client-side
//! store uses (`cart-storage`). Each request loads it into a write-through
//! [`CartStore`], mutates it, and writes the result back.

use babyluxe_core::{CART_STORAGE_KEY, CartError, CartStore, KeyValueStore, MemoryStore};
use tower_sessions::Session;

use crate::error::Result;

/// Session keys.
pub mod keys {
    /// Key for the persisted cart blob.
    pub const CART: &str = babyluxe_core::CART_STORAGE_KEY;

    /// Set after a checkout handoff, consumed by the success page.
    pub const CHECKOUT_SUCCESS: &str = "checkout_success";
}

/// Session cart loaded into an in-memory store.
pub type SessionCart = CartStore<MemoryStore>;

/// Load the cart from the session.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<SessionCart> {
    let mut storage = MemoryStore::new();
    if let Some(blob) = session.get::<String>(keys::CART).await? {
        let Ok(()) = storage.set(CART_STORAGE_KEY, blob);
    }
    Ok(CartStore::open(storage)?)
}

/// Write the cart back to the session.
///
/// # Errors
///
/// Returns an error if the cart cannot be serialized or the session store
/// rejects the write.
pub async fn save_cart(session: &Session, cart: &SessionCart) -> Result<()> {
    let blob = cart.cart().to_json().map_err(CartError::from)?;
    session.insert(keys::CART, blob).await?;
    Ok(())
}
