//! Supabase REST (PostgREST) client.
//!
//! Thin wrapper over `reqwest` that sends the anon key on every request and
//! maps PostgREST responses into domain types. Reads go to
//! `GET {url}/rest/v1/{table}` with query filters; writes are single-row
//! inserts with `Prefer: return=minimal`.

mod query;

pub use query::Query;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::SupabaseConfig;

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// PostgREST returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response or build the client.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Supabase REST client.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    rest_url: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_url", &self.rest_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Create a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let key = config.anon_key.expose_secret();
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| SupabaseError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| SupabaseError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
        })
    }

    /// Read rows of `table` matching `query`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, PostgREST rejects it, or the rows
    /// do not match `T`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = format!("{}/{table}", self.rest_url);

        let response = self.client.get(&url).query(query.params()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))
    }

    /// Insert a single row into `table` without reading it back.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or PostgREST rejects the row.
    pub async fn insert<T: Serialize + Sync>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<(), SupabaseError> {
        let url = format!("{}/{table}", self.rest_url);

        let response = self
            .client
            .post(&url)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::RawQuery;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use secrecy::SecretString;
    use serde_json::{Value, json};

    use super::*;

    #[derive(Default, Clone)]
    struct Seen {
        query: Arc<Mutex<Option<String>>>,
        apikey: Arc<Mutex<Option<String>>>,
        prefer: Arc<Mutex<Option<String>>>,
        body: Arc<Mutex<Option<Value>>>,
    }

    fn header(headers: &AxumHeaders, name: &str) -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    }

    async fn spawn_backend(seen: Seen) -> SupabaseClient {
        let read = seen.clone();
        let write = seen;
        let app = Router::new()
            .route(
                "/rest/v1/products",
                get(move |RawQuery(query): RawQuery, headers: AxumHeaders| {
                    let seen = read.clone();
                    async move {
                        *seen.query.lock().unwrap() = query;
                        *seen.apikey.lock().unwrap() = header(&headers, "apikey");
                        Json(json!([{
                            "id": "p1",
                            "slug": "lulu",
                            "name": "Lulu Romper",
                            "description": null,
                            "price_cents": 1999,
                            "currency": "USD",
                            "status": "active",
                            "featured": true,
                            "sort_order": 1,
                            "images": [],
                            "created_at": "2025-01-01T00:00:00Z",
                            "updated_at": "2025-01-01T00:00:00Z"
                        }]))
                    }
                }),
            )
            .route(
                "/rest/v1/checkout_events",
                axum::routing::post(move |headers: AxumHeaders, Json(body): Json<Value>| {
                    let seen = write.clone();
                    async move {
                        *seen.prefer.lock().unwrap() = header(&headers, "prefer");
                        *seen.body.lock().unwrap() = Some(body);
                        StatusCode::CREATED
                    }
                }),
            )
            .route(
                "/rest/v1/broken",
                get(|| async { (StatusCode::BAD_REQUEST, "column does not exist") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        SupabaseClient::new(&SupabaseConfig {
            url: format!("http://{addr}"),
            anon_key: SecretString::from("anon-key"),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_select_sends_key_and_filters() {
        let seen = Seen::default();
        let client = spawn_backend(seen.clone()).await;

        let rows: Vec<babyluxe_core::Product> = client
            .select("products", &Query::default().eq("status", "active"))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Lulu Romper");
        assert_eq!(seen.apikey.lock().unwrap().as_deref(), Some("anon-key"));
        assert_eq!(
            seen.query.lock().unwrap().as_deref(),
            Some("select=*&status=eq.active")
        );
    }

    #[tokio::test]
    async fn test_insert_prefers_minimal_return() {
        let seen = Seen::default();
        let client = spawn_backend(seen.clone()).await;

        client
            .insert("checkout_events", &json!({"channel": "whatsapp"}))
            .await
            .unwrap();

        assert_eq!(
            seen.prefer.lock().unwrap().as_deref(),
            Some("return=minimal")
        );
        assert_eq!(
            seen.body.lock().unwrap().clone(),
            Some(json!({"channel": "whatsapp"}))
        );
    }

    #[tokio::test]
    async fn test_error_status_is_api_error() {
        let client = spawn_backend(Seen::default()).await;

        let err = client
            .select::<Value>("broken", &Query::default())
            .await
            .unwrap_err();

        match err {
            SupabaseError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "column does not exist");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_hides_key() {
        let client = SupabaseClient::new(&SupabaseConfig {
            url: "https://abc.supabase.co/".to_string(),
            anon_key: SecretString::from("super_secret"),
        })
        .unwrap();
        let debug_output = format!("{client:?}");
        assert!(debug_output.contains("https://abc.supabase.co/rest/v1"));
        assert!(!debug_output.contains("super_secret"));
    }
}
