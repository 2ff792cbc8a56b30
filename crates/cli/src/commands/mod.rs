//! Command implementations.
//!
//! Commands print their results to stdout; diagnostics go through `tracing`.

pub mod cart;
pub mod checkout;
pub mod products;

use std::path::Path;

use babyluxe_core::{CartError, CartStore, CheckoutError};
use babyluxe_storefront::config::{ConfigError, StorefrontConfig};
use babyluxe_storefront::state::AppState;
use babyluxe_storefront::supabase::SupabaseError;
use thiserror::Error;

use crate::store::{FileStore, FileStoreError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Supabase client could not be built.
    #[error("Data store error: {0}")]
    DataStore(#[from] SupabaseError),

    /// Cart file could not be read or written.
    #[error("Cart file error: {0}")]
    Store(#[from] FileStoreError),

    /// Cart could not be persisted.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout could not be composed.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Cart persisted to the CLI's file store.
pub type FileCart = CartStore<FileStore>;

/// Load storefront services from the environment.
///
/// # Errors
///
/// Returns an error if configuration is malformed or the client cannot be
/// built.
pub fn load_state() -> Result<AppState, CommandError> {
    let config = StorefrontConfig::from_env()?;
    Ok(AppState::new(config)?)
}

/// Open the cart stored at `path`.
///
/// # Errors
///
/// Returns an error if the file exists but is unreadable.
pub fn open_cart(path: &Path) -> Result<FileCart, CommandError> {
    Ok(CartStore::open(FileStore::open(path)?)?)
}
