//! BabyLuxe Core - Shared domain library.
//!
//! This crate provides the domain logic used by every BabyLuxe component:
//! - `storefront` - Public HTTP storefront (catalog, cart, WhatsApp checkout)
//! - `cli` - Command-line storefront with a file-persisted cart
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no network
//! access and no filesystem access. Persistence goes through the
//! [`cart::KeyValueStore`] trait so each binary can plug in its own backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails and statuses
//! - [`product`] - Product records as stored in the hosted database
//! - [`cart`] - Cart lines and the persisted cart store
//! - [`hydrate`] - Joining cart lines with product records
//! - [`checkout`] - Order summary, outbound message and deep link composition
//! - [`event`] - Checkout analytics event shape

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod event;
pub mod hydrate;
pub mod product;
pub mod types;

pub use cart::{CART_STORAGE_KEY, Cart, CartError, CartLine, CartStore, KeyValueStore, MemoryStore};
pub use checkout::{CheckoutComposer, CheckoutError, CheckoutForm, CheckoutSettings, ComposedCheckout};
pub use event::{CheckoutEvent, CheckoutItemSnapshot};
pub use hydrate::{HydratedCartItem, hydrate};
pub use product::Product;
pub use types::*;
