//! JSON documents returned by the storefront routes.
//!
//! Prices are pre-formatted for display; raw minor-unit amounts are kept
//! alongside for clients that do their own formatting.

use babyluxe_core::{CartLine, CheckoutComposer, HydratedCartItem, Product, ProductId};
use serde::Serialize;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub price_cents: i64,
    pub currency: String,
    pub image: String,
    pub images: Vec<String>,
    pub url: String,
    pub featured: bool,
    pub category: Option<String>,
    pub age_group: Option<String>,
}

impl ProductView {
    /// Build the view, pricing currency-less rows in `default_currency`.
    #[must_use]
    pub fn new(product: &Product, default_currency: &str) -> Self {
        Self {
            id: product.id.clone(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price(default_currency).to_string(),
            price_cents: product.price_cents,
            currency: product.currency_or(default_currency).to_string(),
            image: product.primary_image().to_string(),
            images: product.images.clone(),
            url: product.path(),
            featured: product.featured,
            category: product.category.clone(),
            age_group: product.age_group.clone(),
        }
    }
}

/// One hydrated cart line.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub image: String,
    pub url: String,
}

impl CartItemView {
    /// Build the view, pricing currency-less rows in `default_currency`.
    #[must_use]
    pub fn new(item: &HydratedCartItem, default_currency: &str) -> Self {
        Self {
            product_id: item.product.id.clone(),
            slug: item.product.slug.clone(),
            name: item.product.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price(default_currency).to_string(),
            line_total: item.line_total(default_currency).to_string(),
            image: item.product.primary_image().to_string(),
            url: item.product.path(),
        }
    }
}

/// Cart page data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Raw lines, including those whose product could not be loaded.
    pub lines: Vec<CartLine>,
    pub count: u64,
    pub subtotal: String,
    pub subtotal_cents: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl CartView {
    /// Build the view from cart lines and their hydrated items.
    #[must_use]
    pub fn new(
        composer: &CheckoutComposer,
        lines: &[CartLine],
        items: &[HydratedCartItem],
        warning: Option<String>,
    ) -> Self {
        let default_currency = composer.settings().default_currency.as_str();
        let totals = composer.totals(items);
        Self {
            items: items
                .iter()
                .map(|item| CartItemView::new(item, default_currency))
                .collect(),
            lines: lines.to_vec(),
            count: lines.iter().map(|l| u64::from(l.quantity)).sum(),
            subtotal: totals.subtotal().to_string(),
            subtotal_cents: totals.subtotal_cents,
            currency: totals.currency,
            warning,
        }
    }
}

/// Checkout page data shown before the form is submitted.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutPreview {
    pub brand: String,
    /// Whether an order recipient is configured; submission fails otherwise.
    pub recipient_configured: bool,
    pub cart: CartView,
    pub summary: String,
}
