//! Checkout command.
//!
//! Composes the WhatsApp order message for the file cart, prints the deep
//! link, logs the checkout event and clears the cart.
//!
//! # Usage
//!
//! ```bash
//! bl-cli checkout --email ada@example.com --phone 555-0100 \
//!     --first-name Ada --last-name Lovelace \
//!     --address "1 Main St" --city London --zip N1
//! ```

use babyluxe_core::{CheckoutChannel, CheckoutError, CheckoutEvent, CheckoutForm, hydrate};
use babyluxe_storefront::state::AppState;

use super::{CommandError, FileCart};

/// Run a checkout for the file cart.
///
/// # Errors
///
/// Returns an error if the cart is empty, the form is incomplete, no
/// recipient is configured, or the cart file cannot be cleared. Event
/// logging failures are only reported.
#[allow(clippy::print_stdout)]
pub async fn run(
    state: &AppState,
    cart: &mut FileCart,
    form: &CheckoutForm,
) -> Result<(), CommandError> {
    if cart.lines().is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }

    let lookup = state.products().for_cart(cart.lines()).await;
    let items = hydrate(cart.lines(), &lookup.products);

    let checkout = state
        .composer()
        .compose(cart.lines(), &items, form, lookup.warning.as_deref())?;

    let event = CheckoutEvent::from_checkout(&checkout, CheckoutChannel::WhatsApp);
    if let Err(e) = state.events().record_bounded(&event).await {
        tracing::warn!(error = %e, "Failed to log checkout event");
    }

    cart.clear()?;

    println!("{}", checkout.message);
    println!();
    println!("Open to send: {}", checkout.deep_link);
    Ok(())
}
