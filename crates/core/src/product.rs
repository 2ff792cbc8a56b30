//! Product records as stored in the hosted `products` table.
//!
//! Products are owned by the database; the storefront only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Price, ProductId, ProductStatus};

/// Image shown when a product has no images of its own.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=800&width=800";

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Unit price in minor currency units.
    pub price_cents: i64,
    /// ISO 4217 currency code.
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sort_order: i32,
    /// Image URLs, first one is the primary image.
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Age-group label (e.g. "newborn"); not every row has one.
    #[serde(default)]
    pub age_group: Option<String>,
    /// Catalog category used by the listing filter.
    #[serde(default)]
    pub category: Option<String>,
}

impl Product {
    /// Currency code of this product, or `default_currency` when the row
    /// has none.
    #[must_use]
    pub fn currency_or<'a>(&'a self, default_currency: &'a str) -> &'a str {
        match self.currency.trim() {
            "" => default_currency,
            own => own,
        }
    }

    /// Unit price of this product, priced in `default_currency` when the row
    /// has no currency of its own.
    #[must_use]
    pub fn price(&self, default_currency: &str) -> Price {
        Price::new(self.price_cents, self.currency_or(default_currency))
    }

    /// Primary image URL, or the placeholder when the product has none.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images.first().map_or(PLACEHOLDER_IMAGE, String::as_str)
    }

    /// Whether the product is visible in the catalog.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Storefront path of the product detail page.
    #[must_use]
    pub fn path(&self) -> String {
        product_path(&self.slug)
    }
}

/// Storefront path for a product slug, with the slug percent-encoded.
#[must_use]
pub fn product_path(slug: &str) -> String {
    format!("/products/{}", urlencoding::encode(slug))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_database_row() {
        let row = serde_json::json!({
            "id": "1b9d6bcd-bbfd-4b2d-9b5d-ab8dfbbd4bed",
            "slug": "sleepy-sophie",
            "name": "Sleepy Sophie",
            "description": null,
            "price_cents": 24900,
            "currency": "USD",
            "status": "active",
            "featured": true,
            "sort_order": 2,
            "images": null,
            "created_at": "2025-03-01T10:00:00.123456+00:00",
            "updated_at": "2025-03-02T10:00:00+00:00",
            "age_group": "newborn"
        });

        let product: Product = serde_json::from_value(row).unwrap();
        assert_eq!(product.slug, "sleepy-sophie");
        assert!(product.description.is_empty());
        assert!(product.images.is_empty());
        assert_eq!(product.age_group.as_deref(), Some("newborn"));
        assert_eq!(product.category, None);
        assert!(product.is_active());
    }

    #[test]
    fn test_primary_image_falls_back_to_placeholder() {
        let mut product = fixtures::product("p1", "Lulu", 100, "USD");
        assert_eq!(product.primary_image(), PLACEHOLDER_IMAGE);

        product.images = vec!["https://cdn.example/a.jpg".into(), "b.jpg".into()];
        assert_eq!(product.primary_image(), "https://cdn.example/a.jpg");
    }

    #[test]
    fn test_product_path_encodes_slug() {
        assert_eq!(product_path("rosie"), "/products/rosie");
        assert_eq!(product_path("rosie & co"), "/products/rosie%20%26%20co");
    }

    #[test]
    fn test_price() {
        let product = fixtures::product("p1", "Lulu", 1999, "USD");
        assert_eq!(product.price("EUR").to_string(), "$19.99");
    }

    #[test]
    fn test_price_without_currency_uses_default() {
        let product = fixtures::product("p1", "Lulu", 1999, " ");
        assert_eq!(product.currency_or("EUR"), "EUR");
        assert_eq!(product.price("EUR").to_string(), "\u{20ac}19.99");
    }
}
