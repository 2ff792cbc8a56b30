//! Checkout analytics event shape.
//!
//! One row per checkout handoff is inserted into the `checkout_events`
//! table. Rows are write-once and never read back by the storefront.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checkout::ComposedCheckout;
use crate::hydrate::HydratedCartItem;
use crate::types::{CheckoutChannel, ProductId};

/// A line item as it looked at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItemSnapshot {
    pub product_id: ProductId,
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub price_cents: i64,
    pub currency: String,
    pub product_url: String,
}

impl CheckoutItemSnapshot {
    /// Snapshot a hydrated cart item. Rows without a currency are recorded in
    /// `default_currency`.
    #[must_use]
    pub fn from_item(
        item: &HydratedCartItem,
        default_currency: &str,
        product_url: String,
    ) -> Self {
        Self {
            product_id: item.product.id.clone(),
            slug: item.product.slug.clone(),
            name: item.product.name.clone(),
            quantity: item.quantity,
            price_cents: item.product.price_cents,
            currency: item.product.currency_or(default_currency).to_string(),
            product_url,
        }
    }
}

/// Row inserted into `checkout_events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutEvent {
    pub channel: String,
    pub cart_count: i64,
    pub subtotal_cents: i64,
    pub items: Vec<CheckoutItemSnapshot>,
    pub message: Option<String>,
}

impl CheckoutEvent {
    /// Build the event for a composed checkout.
    #[must_use]
    pub fn from_checkout(checkout: &ComposedCheckout, channel: CheckoutChannel) -> Self {
        Self {
            channel: channel.as_str().to_string(),
            cart_count: i64::try_from(checkout.cart_count).unwrap_or(i64::MAX),
            subtotal_cents: checkout.subtotal_cents,
            items: checkout.items.clone(),
            message: Some(checkout.message.clone()),
        }
    }

    /// Normalise a loosely-typed client payload.
    ///
    /// Accepts `cartCount`, `subtotalCents`, `channel`, `items` and `message`.
    /// Counts that are missing or not finite numbers become 0, the channel
    /// defaults to `whatsapp`, a non-array `items` becomes empty (entries
    /// that do not match the snapshot shape are dropped) and a non-string
    /// `message` becomes `None`.
    #[must_use]
    pub fn from_loose_json(body: &Value) -> Self {
        let channel = match body.get("channel") {
            None | Some(Value::Null) => CheckoutChannel::WhatsApp.as_str().to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let items = body
            .get("items")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        serde_json::from_value::<CheckoutItemSnapshot>(entry.clone())
                            .map_err(|e| {
                                tracing::debug!(error = %e, "Dropping malformed checkout item");
                            })
                            .ok()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            channel,
            cart_count: loose_integer(body.get("cartCount")),
            subtotal_cents: loose_integer(body.get("subtotalCents")),
            items,
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }
}

/// Interpret a JSON value as an integer the way a numeric coercion would:
/// numbers are truncated, numeric strings are parsed, anything else is 0.
#[allow(clippy::cast_possible_truncation)] // finite f64 truncation is the intent
fn loose_integer(value: Option<&Value>) -> i64 {
    let as_float = match value {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return i;
            }
            n.as_f64()
        }
        Some(Value::String(s)) if s.trim().is_empty() => Some(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    as_float
        .filter(|f| f.is_finite())
        .map_or(0, |f| f.trunc() as i64)
}
