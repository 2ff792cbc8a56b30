//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! bl-cli products list
//! bl-cli products list --category sleep
//! bl-cli products show lulu-romper
//! ```

use babyluxe_core::Product;
use babyluxe_storefront::state::AppState;

use super::CommandError;

/// Print the active catalog.
#[allow(clippy::print_stdout)]
pub async fn list(state: &AppState, category: Option<&str>) {
    let products = state.products().active(category).await;
    let default_currency = &state.composer().settings().default_currency;
    print!("{}", format_listing(&products, default_currency));
}

/// Print one product.
///
/// # Errors
///
/// Returns [`CommandError::NotFound`] when no active product has this slug.
#[allow(clippy::print_stdout)]
pub async fn show(state: &AppState, slug: &str) -> Result<(), CommandError> {
    let product = state
        .products()
        .by_slug(slug)
        .await
        .ok_or_else(|| CommandError::NotFound(format!("product {slug}")))?;

    let default_currency = &state.composer().settings().default_currency;
    println!("{}", format_detail(&product, default_currency));
    Ok(())
}

fn format_listing(products: &[Product], default_currency: &str) -> String {
    if products.is_empty() {
        return "No products found.\n".to_string();
    }

    products
        .iter()
        .map(|p| {
            format!(
                "{}\t{}\t{}\t{}\n",
                p.id,
                p.slug,
                p.price(default_currency),
                p.name
            )
        })
        .collect()
}

fn format_detail(product: &Product, default_currency: &str) -> String {
    let mut lines = vec![
        product.name.clone(),
        format!("Price: {}", product.price(default_currency)),
        format!("Id: {}", product.id),
        format!("Slug: {}", product.slug),
    ];
    if let Some(category) = &product.category {
        lines.push(format!("Category: {category}"));
    }
    if let Some(age_group) = &product.age_group {
        lines.push(format!("Age group: {age_group}"));
    }
    if !product.description.is_empty() {
        lines.push(String::new());
        lines.push(product.description.clone());
    }
    lines.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product() -> Product {
        serde_json::from_value(json!({
            "id": "p1",
            "slug": "lulu",
            "name": "Lulu Romper",
            "description": "Soft cotton.",
            "price_cents": 1999,
            "currency": "USD",
            "category": "sleep",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_listing() {
        assert_eq!(format_listing(&[], "USD"), "No products found.\n");
        assert_eq!(
            format_listing(&[product()], "EUR"),
            "p1\tlulu\t$19.99\tLulu Romper\n"
        );
    }

    #[test]
    fn test_detail() {
        assert_eq!(
            format_detail(&product(), "USD"),
            "Lulu Romper\nPrice: $19.99\nId: p1\nSlug: lulu\nCategory: sleep\n\nSoft cotton."
        );
    }

    #[test]
    fn test_listing_without_currency_uses_default() {
        let mut product = product();
        product.currency = String::new();
        assert_eq!(
            format_listing(&[product], "GBP"),
            "p1\tlulu\t\u{a3}19.99\tLulu Romper\n"
        );
    }
}
