//! Checkout event logging endpoint.
//!
//! Accepts a loosely-typed JSON body, normalises it and inserts one row
//! into `checkout_events`. Always answers with `{"ok": bool}`; failures
//! carry an `error` string and a 500 status.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use babyluxe_core::CheckoutEvent;
use serde_json::{Value, json};
use tracing::instrument;

use crate::state::AppState;

/// Record a checkout event.
#[instrument(skip(state, body))]
pub async fn record(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => return failure(&format!("Invalid JSON body: {e}")),
    };

    let event = CheckoutEvent::from_loose_json(&payload);

    match state.events().record(&event).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to record checkout event");
            failure(&e.to_string())
        }
    }
}

fn failure(error: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "ok": false, "error": error })),
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{
        RecordingSink, TestCatalog, post_json, post_raw, read_json, test_app_with_sink,
    };
    use crate::services::Unconfigured;

    #[tokio::test]
    async fn test_records_normalised_event() {
        let sink = Arc::new(RecordingSink::default());
        let app = test_app_with_sink(TestCatalog::default(), sink.clone());

        let response = post_json(
            &app,
            "/api/checkout-event",
            &json!({ "cartCount": "2", "subtotalCents": 3998, "message": "hi" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, json!({ "ok": true }));

        let recorded = sink.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].channel, "whatsapp");
        assert_eq!(recorded[0].cart_count, 2);
        assert_eq!(recorded[0].subtotal_cents, 3998);
        assert_eq!(recorded[0].message.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_unconfigured_store_fails() {
        let app = test_app_with_sink(TestCatalog::default(), Arc::new(Unconfigured));

        let response = post_json(&app, "/api/checkout-event", &json!({})).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(
            body["error"],
            "Missing NEXT_PUBLIC_SUPABASE_URL or NEXT_PUBLIC_SUPABASE_ANON_KEY"
        );
    }

    #[tokio::test]
    async fn test_invalid_json_fails() {
        let sink = Arc::new(RecordingSink::default());
        let app = test_app_with_sink(TestCatalog::default(), sink.clone());

        let response = post_raw(&app, "/api/checkout-event", "application/json", "{oops").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_json(response).await["ok"], false);
        assert!(sink.recorded().is_empty());
    }
}
