//! Cart commands.
//!
//! The cart is kept in a JSON file under the same `cart-storage` key the
//! storefront session uses.
//!
//! # Usage
//!
//! ```bash
//! bl-cli cart add <product-id>
//! bl-cli cart set <product-id> 3
//! bl-cli cart remove <product-id>
//! bl-cli cart show
//! bl-cli cart clear
//! ```

use babyluxe_core::{ProductId, hydrate};
use babyluxe_storefront::state::AppState;

use super::{CommandError, FileCart};

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the cart file cannot be written.
#[allow(clippy::print_stdout)]
pub fn add(cart: &mut FileCart, product_id: &str) -> Result<(), CommandError> {
    let id = ProductId::new(product_id);
    let quantity = cart.add(&id)?;
    println!("{id}: {quantity} in cart ({} items)", cart.count());
    Ok(())
}

/// Remove a product's line.
///
/// # Errors
///
/// Returns an error if the cart file cannot be written.
#[allow(clippy::print_stdout)]
pub fn remove(cart: &mut FileCart, product_id: &str) -> Result<(), CommandError> {
    let id = ProductId::new(product_id);
    if cart.remove(&id)? {
        println!("Removed {id} ({} items)", cart.count());
    } else {
        println!("{id} was not in the cart");
    }
    Ok(())
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns [`CommandError::NotFound`] if the product is not in the cart.
#[allow(clippy::print_stdout)]
pub fn set(cart: &mut FileCart, product_id: &str, quantity: u32) -> Result<(), CommandError> {
    let id = ProductId::new(product_id);
    let stored = cart
        .set_quantity(&id, quantity)?
        .ok_or_else(|| CommandError::NotFound(format!("cart line {id}")))?;
    println!("{id}: {stored} in cart ({} items)", cart.count());
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart file cannot be written.
#[allow(clippy::print_stdout)]
pub fn clear(cart: &mut FileCart) -> Result<(), CommandError> {
    cart.clear()?;
    println!("Cart cleared");
    Ok(())
}

/// Print the cart with product details and subtotal.
#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState, cart: &FileCart) {
    if cart.lines().is_empty() {
        println!("Your cart is empty.");
        return;
    }

    let lookup = state.products().for_cart(cart.lines()).await;
    let items = hydrate(cart.lines(), &lookup.products);
    let composer = state.composer();

    println!("{}", composer.order_summary(cart.lines(), &items));
    println!();
    println!("Items: {}", cart.count());
    println!("Subtotal: {}", composer.totals(&items).subtotal());
    if let Some(warning) = lookup.warning {
        println!("Warning: {warning}");
    }
}
