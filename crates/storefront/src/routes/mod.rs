//! HTTP route handlers for storefront.
//!
//! Handlers answer with JSON documents and redirects; page rendering is left
//! to whatever client consumes them.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (brand + featured products)
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (?category=)
//! GET  /products/{slug}        - Product detail
//!
//! # Cart
//! GET  /cart                   - Cart page (hydrated lines + subtotal)
//! POST /cart/add               - Add one unit (returns count)
//! POST /cart/update            - Set quantity (returns cart)
//! POST /cart/remove            - Remove line (returns cart)
//! POST /cart/clear             - Empty the cart (returns cart)
//! GET  /cart/count             - Cart count badge
//!
//! # Checkout
//! GET  /checkout               - Checkout preview (redirects to /products when empty)
//! POST /checkout               - Submit form, 303 to the WhatsApp deep link
//! GET  /checkout/success       - Shown once after a handoff
//!
//! # API
//! GET  /api/products           - Active catalog as raw records
//! POST /api/checkout-event     - Record checkout analytics
//! ```

pub mod api;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .route("/success", get(checkout::success))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(api::products::list))
        .route("/checkout-event", post(api::checkout_event::record))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout handoff
        .nest("/checkout", checkout_routes())
        // JSON API
        .nest("/api", api_routes())
}
