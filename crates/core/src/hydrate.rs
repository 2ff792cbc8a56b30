//! Joining cart lines with product records.

use std::collections::HashMap;

use serde::Serialize;

use crate::cart::CartLine;
use crate::product::Product;
use crate::types::{Price, ProductId};

/// A cart line with its product record attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydratedCartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl HydratedCartItem {
    /// Unit price of the product. See [`Product::price`].
    #[must_use]
    pub fn unit_price(&self, default_currency: &str) -> Price {
        self.product.price(default_currency)
    }

    /// Unit price times quantity, in minor units.
    #[must_use]
    pub fn line_total_cents(&self) -> i64 {
        self.product
            .price_cents
            .saturating_mul(i64::from(self.quantity))
    }

    /// Unit price times quantity, in the same currency as [`Self::unit_price`].
    #[must_use]
    pub fn line_total(&self, default_currency: &str) -> Price {
        Price::new(
            self.line_total_cents(),
            self.product.currency_or(default_currency),
        )
    }
}

/// Join cart lines with products, keeping cart order.
///
/// Lines whose product is absent from `products` are skipped, so an empty
/// product list yields an empty result.
#[must_use]
pub fn hydrate(lines: &[CartLine], products: &[Product]) -> Vec<HydratedCartItem> {
    if lines.is_empty() || products.is_empty() {
        return Vec::new();
    }

    let by_id: HashMap<&ProductId, &Product> = products.iter().map(|p| (&p.id, p)).collect();

    lines
        .iter()
        .filter_map(|line| {
            by_id.get(&line.product_id).map(|product| HydratedCartItem {
                product: (*product).clone(),
                quantity: line.quantity,
            })
        })
        .collect()
}

/// Sum of line totals over hydrated items, in minor units.
#[must_use]
pub fn subtotal_cents(items: &[HydratedCartItem]) -> i64 {
    items
        .iter()
        .fold(0_i64, |sum, item| sum.saturating_add(item.line_total_cents()))
}
