//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::ProductView;
use crate::state::AppState;

/// Listing filter.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
}

/// Product listing page data.
#[derive(Debug, Serialize)]
pub struct ProductsIndexView {
    pub category: Option<String>,
    pub products: Vec<ProductView>,
}

/// Display product listing page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Json<ProductsIndexView> {
    let category = query.category.filter(|c| !c.trim().is_empty());
    let products = state.products().active(category.as_deref()).await;
    let default_currency = state.composer().settings().default_currency.as_str();

    Json(ProductsIndexView {
        category,
        products: products
            .iter()
            .map(|p| ProductView::new(p, default_currency))
            .collect(),
    })
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductView>> {
    let product = state
        .products()
        .by_slug(&slug)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    add_breadcrumb(
        "navigation",
        "Viewed product page",
        Some(&[("slug", slug.as_str())]),
    );

    Ok(Json(ProductView::new(
        &product,
        &state.composer().settings().default_currency,
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{TestCatalog, get, product, read_json, test_app};

    fn catalog() -> TestCatalog {
        let mut sleep = product("a", "Alpha", 1000);
        sleep.category = Some("sleep".to_string());
        let mut draft = product("c", "Gamma", 100);
        draft.status = babyluxe_core::ProductStatus::Draft;
        TestCatalog::with(vec![sleep, product("b", "Beta", 500), draft])
    }

    #[tokio::test]
    async fn test_index_lists_active_products() {
        let app = test_app(catalog(), None);
        let body = read_json(get(&app, "/products", None).await).await;
        assert_eq!(body["products"].as_array().unwrap().len(), 2);
        assert!(body["category"].is_null());
    }

    #[tokio::test]
    async fn test_index_filters_by_category() {
        let app = test_app(catalog(), None);
        let body = read_json(get(&app, "/products?category=sleep", None).await).await;
        let products = body["products"].as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], "Alpha");
        assert_eq!(body["category"], "sleep");
    }

    #[tokio::test]
    async fn test_show_product() {
        let app = test_app(catalog(), None);
        let response = get(&app, "/products/beta", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["price"], "$5.00");
    }

    #[tokio::test]
    async fn test_show_missing_or_draft_is_not_found() {
        let app = test_app(catalog(), None);
        assert_eq!(
            get(&app, "/products/nope", None).await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get(&app, "/products/gamma", None).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_catalog_failure_renders_empty_listing() {
        let app = test_app(TestCatalog::failing(), None);
        let response = get(&app, "/products", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert!(body["products"].as_array().unwrap().is_empty());
    }
}
