//! Session-stored state and JSON views returned by the routes.

pub mod session;
pub mod views;

pub use session::{keys as session_keys, load_cart, save_cart};
pub use views::{CartItemView, CartView, CheckoutPreview, ProductView};
