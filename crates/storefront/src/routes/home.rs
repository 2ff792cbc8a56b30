//! Home page route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::models::ProductView;
use crate::state::AppState;

/// Number of featured products on the home page.
pub const FEATURED_LIMIT: usize = 4;

/// Home page data.
#[derive(Debug, Serialize)]
pub struct HomeView {
    pub brand: String,
    pub featured: Vec<ProductView>,
}

/// Display home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Json<HomeView> {
    let featured = state.products().featured(FEATURED_LIMIT).await;
    let default_currency = state.composer().settings().default_currency.as_str();

    Json(HomeView {
        brand: state.config().checkout.brand_name.clone(),
        featured: featured
            .iter()
            .map(|p| ProductView::new(p, default_currency))
            .collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{TestCatalog, get, product, read_json, test_app};

    #[tokio::test]
    async fn test_home_lists_featured_products() {
        let mut featured = product("a", "Alpha", 1000);
        featured.featured = true;
        let catalog = TestCatalog::with(vec![featured, product("b", "Beta", 500)]);
        let app = test_app(catalog, Some("15550000000"));

        let response = get(&app, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["brand"], "BabyLuxe");
        let names: Vec<_> = body["featured"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Alpha"]);
    }
}
