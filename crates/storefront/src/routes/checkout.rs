//! Checkout route handlers.
//!
//! Checkout hands the order to the shop over WhatsApp: the submitted form
//! and the cart become a pre-filled message, the browser is redirected to
//! the messaging deep link, and the cart is cleared. Nothing is charged and
//! no order is stored.

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use babyluxe_core::checkout::recipient_digits;
use babyluxe_core::{CheckoutChannel, CheckoutEvent, CheckoutForm, hydrate};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::models::{CartView, CheckoutPreview, load_cart, save_cart, session_keys};
use crate::state::AppState;

/// Where an empty cart is sent.
pub const EMPTY_CART_REDIRECT: &str = "/products";

/// Success page data.
#[derive(Debug, Serialize)]
pub struct CheckoutSuccessView {
    pub brand: String,
    pub message: String,
}

/// Display checkout page.
///
/// Redirects to the catalog when the cart is empty.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart = load_cart(&session).await?;
    if cart.lines().is_empty() {
        return Ok(Redirect::to(EMPTY_CART_REDIRECT).into_response());
    }

    let lookup = state.products().for_cart(cart.lines()).await;
    let items = hydrate(cart.lines(), &lookup.products);
    let composer = state.composer();

    let preview = CheckoutPreview {
        brand: composer.settings().brand_name.clone(),
        recipient_configured: composer
            .settings()
            .recipient
            .as_deref()
            .is_some_and(|r| !recipient_digits(r).is_empty()),
        summary: composer.order_summary(cart.lines(), &items),
        cart: CartView::new(composer, cart.lines(), &items, lookup.warning),
    };

    Ok(Json(preview).into_response())
}

/// Submit the checkout form.
///
/// On success the cart is cleared and the browser is sent (303) to the
/// messaging deep link. Configuration and validation failures leave the
/// cart untouched.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    if cart.lines().is_empty() {
        return Ok(Redirect::to(EMPTY_CART_REDIRECT).into_response());
    }

    let lookup = state.products().for_cart(cart.lines()).await;
    let items = hydrate(cart.lines(), &lookup.products);

    let checkout = state
        .composer()
        .compose(cart.lines(), &items, &form, lookup.warning.as_deref())?;

    let event = CheckoutEvent::from_checkout(&checkout, CheckoutChannel::WhatsApp);
    if let Err(e) = state.events().record_bounded(&event).await {
        tracing::warn!(error = %e, "Failed to log checkout event");
    }

    cart.clear()?;
    save_cart(&session, &cart).await?;
    session.insert(session_keys::CHECKOUT_SUCCESS, true).await?;

    add_breadcrumb("checkout", "Checkout handed off", None);
    tracing::info!(
        cart_count = checkout.cart_count,
        subtotal_cents = checkout.subtotal_cents,
        "Checkout handed off"
    );

    Ok(Redirect::to(&checkout.deep_link).into_response())
}

/// Display checkout success page.
///
/// Only reachable once per handoff; otherwise redirects home.
#[instrument(skip(state, session))]
pub async fn success(State(state): State<AppState>, session: Session) -> Result<Response> {
    let completed = session
        .remove::<bool>(session_keys::CHECKOUT_SUCCESS)
        .await?
        .unwrap_or(false);

    if !completed {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Json(CheckoutSuccessView {
        brand: state.config().checkout.brand_name.clone(),
        message: "Your order request was sent on WhatsApp. We will confirm it there.".to_string(),
    })
    .into_response())
}
