//! Cart route handlers.
//!
//! The cart lives in the session (see [`crate::models::session`]). Every
//! mutation loads it, applies the change and writes it back before
//! responding.

use axum::{Form, Json, extract::State};
use babyluxe_core::{ProductId, hydrate};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::models::{CartView, load_cart, save_cart};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart count badge data.
#[derive(Debug, Serialize)]
pub struct CartCountView {
    pub count: u64,
}

/// Hydrate the session cart into a view.
async fn cart_view(state: &AppState, session: &Session) -> Result<CartView> {
    let cart = load_cart(session).await?;
    let lookup = state.products().for_cart(cart.lines()).await;
    let items = hydrate(cart.lines(), &lookup.products);

    Ok(CartView::new(
        state.composer(),
        cart.lines(),
        &items,
        lookup.warning,
    ))
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    Ok(Json(cart_view(&state, &session).await?))
}

/// Add one unit of a product to the cart.
#[instrument(skip(session))]
pub async fn add(
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Json<CartCountView>> {
    let mut cart = load_cart(&session).await?;
    let quantity = cart.add(&form.product_id)?;
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", form.product_id.as_str())]),
    );
    tracing::debug!(product_id = %form.product_id, quantity, "Added to cart");

    Ok(Json(CartCountView {
        count: cart.count(),
    }))
}

/// Update cart item quantity.
///
/// Unknown products are ignored; a quantity of 0 is stored as 1.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.set_quantity(&form.product_id, form.quantity)?;
    save_cart(&session, &cart).await?;

    Ok(Json(cart_view(&state, &session).await?))
}

/// Remove item from cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    if cart.remove(&form.product_id)? {
        save_cart(&session, &cart).await?;
    }

    Ok(Json(cart_view(&state, &session).await?))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear()?;
    save_cart(&session, &cart).await?;

    Ok(Json(cart_view(&state, &session).await?))
}

/// Get cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCountView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCountView {
        count: cart.count(),
    }))
}
