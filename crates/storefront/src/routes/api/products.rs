//! Catalog API.

use axum::{Json, extract::State};
use babyluxe_core::Product;
use tracing::instrument;

use crate::state::AppState;

/// Active products as raw records, ordered by `sort_order`.
///
/// Failures degrade to an empty array.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.products().active(None).await)
}
