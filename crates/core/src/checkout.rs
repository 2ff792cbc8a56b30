//! Checkout composition: order summary, outbound message and deep link.
//!
//! Checkout does not create an order anywhere. It turns the cart and the
//! customer's contact/shipping form into a plain-text order request and a
//! messaging deep link (`https://wa.me/<digits>?text=<message>`) that opens
//! a chat with the shop, pre-filled with that request.
//!
//! When product records could not be loaded the summary falls back to
//! `Product ID` / `Qty` lines so the message can still be sent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::CartLine;
use crate::event::CheckoutItemSnapshot;
use crate::hydrate::{HydratedCartItem, subtotal_cents};
use crate::product::product_path;
use crate::types::{Email, EmailError, Price};

/// Default messaging host for deep links.
pub const DEFAULT_MESSAGING_HOST: &str = "wa.me";

/// Default brand shown in the message header.
pub const DEFAULT_BRAND_NAME: &str = "Store";

/// Default currency when no hydrated item carries one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Summary text for an empty cart.
pub const EMPTY_CART_SUMMARY: &str = "Cart is empty.";

/// Reasons a checkout cannot be composed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// No outbound recipient number is configured.
    #[error("WhatsApp number is not configured. Set NEXT_PUBLIC_WHATSAPP_NUMBER.")]
    RecipientNotConfigured,

    /// A required form field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The email field is not a valid address.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Static inputs of the composer, usually read from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Brand shown in the message header.
    pub brand_name: String,
    /// Outbound recipient number; formatting characters are allowed.
    pub recipient: Option<String>,
    /// Public site URL used to build absolute product links.
    pub site_base_url: Option<String>,
    /// Host of the messaging deep link.
    pub messaging_host: String,
    /// Currency assumed when no hydrated item provides one.
    pub default_currency: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            brand_name: DEFAULT_BRAND_NAME.to_string(),
            recipient: None,
            site_base_url: None,
            messaging_host: DEFAULT_MESSAGING_HOST.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Contact and shipping details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub notes: String,
}

impl CheckoutForm {
    /// Check required fields and the email shape.
    ///
    /// # Errors
    ///
    /// Returns the first blank required field, or the email parse error.
    pub fn validate(&self) -> Result<Email, CheckoutError> {
        let required = [
            ("email", &self.email),
            ("phone", &self.phone),
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("address", &self.address),
            ("city", &self.city),
            ("zip", &self.zip),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(name));
            }
        }
        Ok(Email::parse(&self.email)?)
    }
}

/// Subtotal and the currency it is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutTotals {
    pub subtotal_cents: i64,
    pub currency: String,
}

impl CheckoutTotals {
    /// Subtotal as a price.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        Price::new(self.subtotal_cents, self.currency.clone())
    }
}

/// Everything produced by a successful checkout composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedCheckout {
    /// Total units in the cart.
    pub cart_count: u64,
    pub subtotal_cents: i64,
    pub currency: String,
    /// Per-line order summary.
    pub summary: String,
    /// Full outbound message.
    pub message: String,
    /// Messaging deep link carrying the message.
    pub deep_link: String,
    /// Snapshot of the hydrated lines for analytics.
    pub items: Vec<CheckoutItemSnapshot>,
}

/// Builds order summaries, messages and deep links.
#[derive(Debug, Clone, Default)]
pub struct CheckoutComposer {
    settings: CheckoutSettings,
}

impl CheckoutComposer {
    /// Create a composer from settings.
    #[must_use]
    pub const fn new(settings: CheckoutSettings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    #[must_use]
    pub const fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    /// Absolute product URL, or the bare path when no site URL is set.
    #[must_use]
    pub fn product_url(&self, slug: &str) -> String {
        let path = product_path(slug);
        match self.settings.site_base_url.as_deref() {
            Some(base) if !base.trim().is_empty() => {
                format!("{}{path}", base.trim().trim_end_matches('/'))
            }
            _ => path,
        }
    }

    /// Subtotal over hydrated items; the first item's currency wins.
    #[must_use]
    pub fn totals(&self, items: &[HydratedCartItem]) -> CheckoutTotals {
        let default_currency = self.settings.default_currency.as_str();
        let currency = items
            .first()
            .map_or(default_currency, |item| item.product.currency_or(default_currency))
            .to_string();

        CheckoutTotals {
            subtotal_cents: subtotal_cents(items),
            currency,
        }
    }

    /// Human-readable order summary.
    ///
    /// Uses hydrated items when any are available, otherwise falls back to
    /// product ids and quantities from the raw cart lines. When only some
    /// lines hydrated, the lines without a product record are left out.
    /// Prices of products without a currency use the default currency.
    #[must_use]
    pub fn order_summary(&self, lines: &[CartLine], items: &[HydratedCartItem]) -> String {
        if lines.is_empty() {
            return EMPTY_CART_SUMMARY.to_string();
        }

        if items.is_empty() {
            return lines
                .iter()
                .enumerate()
                .map(|(idx, line)| {
                    format!(
                        "{}. Product ID: {}\nQty: {}",
                        idx + 1,
                        line.product_id,
                        line.quantity
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n");
        }

        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                format!(
                    "{}. {}\nQty: {} | Unit: {} | Total: {} | Link: {}",
                    idx + 1,
                    item.product.name,
                    item.quantity,
                    item.unit_price(&self.settings.default_currency),
                    item.line_total(&self.settings.default_currency),
                    self.product_url(&item.product.slug)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Compose the outbound order request.
    ///
    /// `lookup_warning` carries a product-loading failure message that is
    /// included in the outbound text.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] when `lines` is empty
    /// - [`CheckoutError::MissingField`] / [`CheckoutError::InvalidEmail`]
    ///   when the form is incomplete
    /// - [`CheckoutError::RecipientNotConfigured`] when no recipient digits
    ///   are configured
    pub fn compose(
        &self,
        lines: &[CartLine],
        items: &[HydratedCartItem],
        form: &CheckoutForm,
        lookup_warning: Option<&str>,
    ) -> Result<ComposedCheckout, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let email = form.validate()?;

        let recipient = self
            .settings
            .recipient
            .as_deref()
            .map(recipient_digits)
            .filter(|digits| !digits.is_empty())
            .ok_or(CheckoutError::RecipientNotConfigured)?;

        let totals = self.totals(items);
        let summary = self.order_summary(lines, items);

        let notes = form.notes.trim();
        let notes_line = if notes.is_empty() {
            "Notes: (none)".to_string()
        } else {
            format!("Notes: {notes}")
        };

        let subtotal_line = if items.is_empty() {
            String::new()
        } else {
            format!("\nSubtotal: {}", totals.subtotal())
        };

        let message = [
            format!("New order request \u{2014} {}", self.settings.brand_name),
            "Contact Information".to_string(),
            format!("Email: {email}"),
            format!("Phone: {}", form.phone.trim()),
            "Shipping Details".to_string(),
            format!("Name: {} {}", form.first_name.trim(), form.last_name.trim()),
            format!("Address: {}", form.address.trim()),
            format!("City: {}", form.city.trim()),
            format!("Zip: {}", form.zip.trim()),
            notes_line,
            lookup_warning
                .map(|w| format!("Product lookup warning: {w}"))
                .unwrap_or_default(),
            "Cart".to_string(),
            summary.clone(),
            subtotal_line,
        ]
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

        let deep_link = build_deep_link(&self.settings.messaging_host, &recipient, &message);

        let snapshots = items
            .iter()
            .map(|item| {
                CheckoutItemSnapshot::from_item(
                    item,
                    &self.settings.default_currency,
                    self.product_url(&item.product.slug),
                )
            })
            .collect();

        Ok(ComposedCheckout {
            cart_count: lines.iter().map(|l| u64::from(l.quantity)).sum(),
            subtotal_cents: totals.subtotal_cents,
            currency: totals.currency,
            summary,
            message,
            deep_link,
            items: snapshots,
        })
    }
}

/// Strip everything but ASCII digits from a phone number.
#[must_use]
pub fn recipient_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Build `https://{host}/{digits}?text={url-encoded message}`.
#[must_use]
pub fn build_deep_link(host: &str, digits: &str, message: &str) -> String {
    let host = host
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!(
        "https://{host}/{digits}?text={}",
        urlencoding::encode(message)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hydrate::hydrate;
    use crate::product::fixtures::product;

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            brand_name: "BabyLuxe".to_string(),
            recipient: Some("+1 (555) 000-0000".to_string()),
            site_base_url: Some("https://babyluxe.shop/".to_string()),
            ..CheckoutSettings::default()
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            email: "parent@example.com".to_string(),
            phone: "+1 555 111 2222".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address: "1 Nursery Lane".to_string(),
            city: "London".to_string(),
            zip: "N1 1AA".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_summary_line_format_for_hydrated_item() {
        let composer = CheckoutComposer::new(settings());
        let lines = vec![CartLine::new("a", 2)];
        let items = hydrate(&lines, &[product("a", "Sleepy Sophie", 1999, "USD")]);

        let composed = composer.compose(&lines, &items, &form(), None).unwrap();

        assert_eq!(composed.subtotal_cents, 3998);
        assert_eq!(composed.currency, "USD");
        assert_eq!(
            composed.summary,
            "1. Sleepy Sophie\nQty: 2 | Unit: $19.99 | Total: $39.98 | Link: https://babyluxe.shop/products/sleepy-sophie"
        );
        assert!(composed.message.ends_with("\n\nSubtotal: $39.98"));
    }

    #[test]
    fn test_currency_less_product_uses_default_everywhere() {
        let composer = CheckoutComposer::new(CheckoutSettings {
            default_currency: "EUR".to_string(),
            ..settings()
        });
        let lines = vec![CartLine::new("a", 2)];
        let items = hydrate(&lines, &[product("a", "Alpha", 1999, "")]);

        let composed = composer.compose(&lines, &items, &form(), None).unwrap();

        assert!(!composed.message.contains('$'));
        assert!(
            composed
                .summary
                .contains("Qty: 2 | Unit: \u{20ac}19.99 | Total: \u{20ac}39.98")
        );
        assert!(composed.message.ends_with("\n\nSubtotal: \u{20ac}39.98"));
        assert_eq!(composed.currency, "EUR");
        assert_eq!(composed.items[0].currency, "EUR");
    }

    #[test]
    fn test_partially_hydrated_cart_lists_only_found_products() {
        let composer = CheckoutComposer::new(settings());
        let lines = vec![
            CartLine::new("a", 1),
            CartLine::new("gone", 3),
            CartLine::new("b", 2),
        ];
        let items = hydrate(
            &lines,
            &[
                product("a", "Alpha", 1000, "USD"),
                product("b", "Beta", 500, "USD"),
            ],
        );

        let composed = composer.compose(&lines, &items, &form(), None).unwrap();

        assert!(composed.summary.starts_with("1. Alpha\n"));
        assert!(composed.summary.contains("\n\n2. Beta\n"));
        assert!(!composed.summary.contains("gone"));
        assert!(!composed.summary.contains("3."));
        assert_eq!(composed.cart_count, 6);
        assert_eq!(composed.subtotal_cents, 2000);
        assert_eq!(composed.items.len(), 2);
    }

    #[test]
    fn test_subtotal_sums_all_lines() {
        let composer = CheckoutComposer::new(settings());
        let lines = vec![CartLine::new("a", 3), CartLine::new("b", 1)];
        let items = hydrate(
            &lines,
            &[
                product("a", "Alpha", 1250, "EUR"),
                product("b", "Beta", 999, "EUR"),
            ],
        );
        let totals = composer.totals(&items);
        assert_eq!(totals.subtotal_cents, 1250 * 3 + 999);
        assert_eq!(totals.currency, "EUR");
    }

    #[test]
    fn test_totals_default_currency_when_nothing_hydrated() {
        let composer = CheckoutComposer::new(settings());
        let totals = composer.totals(&[]);
        assert_eq!(totals.subtotal_cents, 0);
        assert_eq!(totals.currency, "USD");
    }

    #[test]
    fn test_fallback_summary_without_products() {
        let composer = CheckoutComposer::new(settings());
        let lines = vec![CartLine::new("a", 2), CartLine::new("b", 1)];

        let composed = composer.compose(&lines, &[], &form(), None).unwrap();

        assert_eq!(
            composed.summary,
            "1. Product ID: a\nQty: 2\n\n2. Product ID: b\nQty: 1"
        );
        assert!(!composed.message.contains("Subtotal"));
        assert!(composed.items.is_empty());
        assert_eq!(composed.cart_count, 3);
    }

    #[test]
    fn test_message_layout() {
        let composer = CheckoutComposer::new(settings());
        let lines = vec![CartLine::new("a", 1)];

        let composed = composer
            .compose(&lines, &[], &form(), Some("Failed to load products"))
            .unwrap();

        let expected = "New order request \u{2014} BabyLuxe\n\
            Contact Information\n\
            Email: parent@example.com\n\
            Phone: +1 555 111 2222\n\
            Shipping Details\n\
            Name: Ada Lovelace\n\
            Address: 1 Nursery Lane\n\
            City: London\n\
            Zip: N1 1AA\n\
            Notes: (none)\n\
            Product lookup warning: Failed to load products\n\
            Cart\n\
            1. Product ID: a\nQty: 1";
        assert_eq!(composed.message, expected);
    }

    #[test]
    fn test_notes_are_trimmed() {
        let composer = CheckoutComposer::new(settings());
        let mut form = form();
        form.notes = "  leave at the door \n".to_string();
        let composed = composer
            .compose(&[CartLine::new("a", 1)], &[], &form, None)
            .unwrap();
        assert!(composed.message.contains("Notes: leave at the door\n"));
    }

    #[test]
    fn test_deep_link_recipient_is_digits_only() {
        let composer = CheckoutComposer::new(settings());
        let composed = composer
            .compose(&[CartLine::new("a", 1)], &[], &form(), None)
            .unwrap();
        assert!(
            composed
                .deep_link
                .starts_with("https://wa.me/15550000000?text=")
        );
    }

    #[test]
    fn test_deep_link_encodes_message() {
        let link = build_deep_link("wa.me", "15550000000", "Hi there\nQty: 2 & more");
        assert_eq!(
            link,
            "https://wa.me/15550000000?text=Hi%20there%0AQty%3A%202%20%26%20more"
        );
    }

    #[test]
    fn test_recipient_not_configured() {
        let composer = CheckoutComposer::new(CheckoutSettings {
            recipient: None,
            ..settings()
        });
        let err = composer
            .compose(&[CartLine::new("a", 1)], &[], &form(), None)
            .unwrap_err();
        assert_eq!(err, CheckoutError::RecipientNotConfigured);

        let composer = CheckoutComposer::new(CheckoutSettings {
            recipient: Some(" - ".to_string()),
            ..settings()
        });
        assert_eq!(
            composer
                .compose(&[CartLine::new("a", 1)], &[], &form(), None)
                .unwrap_err(),
            CheckoutError::RecipientNotConfigured
        );
    }

    #[test]
    fn test_empty_cart() {
        let composer = CheckoutComposer::new(settings());
        assert_eq!(
            composer.compose(&[], &[], &form(), None).unwrap_err(),
            CheckoutError::EmptyCart
        );
        assert_eq!(composer.order_summary(&[], &[]), EMPTY_CART_SUMMARY);
    }

    #[test]
    fn test_missing_field() {
        let composer = CheckoutComposer::new(settings());
        let mut form = form();
        form.city = "   ".to_string();
        assert_eq!(
            composer
                .compose(&[CartLine::new("a", 1)], &[], &form, None)
                .unwrap_err(),
            CheckoutError::MissingField("city")
        );
    }

    #[test]
    fn test_invalid_email() {
        let mut form = form();
        form.email = "not-an-email".to_string();
        assert_eq!(
            form.validate().unwrap_err(),
            CheckoutError::InvalidEmail(EmailError::MissingAtSymbol)
        );
    }

    #[test]
    fn test_product_url_without_base() {
        let composer = CheckoutComposer::default();
        assert_eq!(composer.product_url("lulu"), "/products/lulu");
    }

    #[test]
    fn test_form_accepts_camel_case_names() {
        let form: CheckoutForm = serde_json::from_value(serde_json::json!({
            "email": "a@b.c",
            "firstName": "Ada",
            "lastName": "L"
        }))
        .unwrap();
        assert_eq!(form.first_name, "Ada");
        assert_eq!(form.last_name, "L");
        assert!(form.notes.is_empty());
    }

    #[test]
    fn test_snapshots_carry_product_urls() {
        let composer = CheckoutComposer::new(settings());
        let lines = vec![CartLine::new("a", 2)];
        let items = hydrate(&lines, &[product("a", "Sleepy Sophie", 1999, "USD")]);
        let composed = composer.compose(&lines, &items, &form(), None).unwrap();

        let snapshot = composed.items.first().unwrap();
        assert_eq!(snapshot.quantity, 2);
        assert_eq!(
            snapshot.product_url,
            "https://babyluxe.shop/products/sleepy-sophie"
        );
    }
}
