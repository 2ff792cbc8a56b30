//! Integration test support for the BabyLuxe storefront.
//!
//! Drives the full storefront router (sessions, request ids, tracing) in
//! process with fake data store services, so no network or Supabase project
//! is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p babyluxe-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use babyluxe_core::{CheckoutEvent, Product, ProductId};
use babyluxe_storefront::config::StorefrontConfig;
use babyluxe_storefront::middleware::session::SESSION_COOKIE_NAME;
use babyluxe_storefront::services::{CheckoutEventSink, ProductCatalog, ServiceError};
use babyluxe_storefront::state::AppState;
use babyluxe_storefront::supabase::SupabaseError;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Catalog served from memory. `down()` makes every read fail.
#[derive(Default)]
pub struct FakeCatalog {
    products: Vec<Product>,
    down: bool,
}

impl FakeCatalog {
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            down: false,
        }
    }

    #[must_use]
    pub const fn down() -> Self {
        Self {
            products: Vec::new(),
            down: true,
        }
    }

    fn available(&self) -> Result<(), ServiceError> {
        if self.down {
            return Err(ServiceError::Supabase(SupabaseError::Api {
                status: 500,
                message: "relation \"products\" does not exist".to_string(),
            }));
        }
        Ok(())
    }

    fn active(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_active())
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn fetch_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ServiceError> {
        self.available()?;
        Ok(self
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn fetch_active(&self, category: Option<&str>) -> Result<Vec<Product>, ServiceError> {
        self.available()?;
        let mut products: Vec<Product> = self
            .active()
            .filter(|p| category.is_none_or(|c| p.category.as_deref() == Some(c)))
            .cloned()
            .collect();
        products.sort_by_key(|p| p.sort_order);
        Ok(products)
    }

    async fn fetch_featured(&self, limit: usize) -> Result<Vec<Product>, ServiceError> {
        self.available()?;
        Ok(self
            .products
            .iter()
            .filter(|p| p.featured)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Product>, ServiceError> {
        self.available()?;
        Ok(self.active().find(|p| p.slug == slug).cloned())
    }
}

/// Event sink that keeps every recorded event.
#[derive(Default)]
pub struct EventRecorder {
    events: Mutex<Vec<CheckoutEvent>>,
}

impl EventRecorder {
    #[must_use]
    pub fn events(&self) -> Vec<CheckoutEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckoutEventSink for EventRecorder {
    async fn record(&self, event: &CheckoutEvent) -> Result<(), ServiceError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Active product with a lowercase slug derived from its name.
#[must_use]
pub fn product(id: &str, name: &str, price_cents: i64) -> Product {
    serde_json::from_value(json!({
        "id": id,
        "slug": name.to_lowercase().replace(' ', "-"),
        "name": name,
        "price_cents": price_cents,
        "currency": "USD",
        "status": "active",
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    }))
    .unwrap()
}

/// Options for building a [`TestStorefront`].
#[derive(Default)]
pub struct StorefrontOptions {
    pub whatsapp_number: Option<String>,
    pub site_url: Option<String>,
    pub default_currency: Option<String>,
}

/// The storefront router plus a browser-like cookie jar.
pub struct TestStorefront {
    app: Router,
    cookie: Option<String>,
    pub events: Arc<EventRecorder>,
}

impl TestStorefront {
    /// Storefront with a WhatsApp recipient configured.
    #[must_use]
    pub fn new(catalog: FakeCatalog) -> Self {
        Self::with_options(
            catalog,
            StorefrontOptions {
                whatsapp_number: Some("+1 (555) 010-0200".to_string()),
                site_url: Some("https://babyluxe.example".to_string()),
                default_currency: None,
            },
        )
    }

    #[must_use]
    pub fn with_options(catalog: FakeCatalog, options: StorefrontOptions) -> Self {
        let mut vars = HashMap::from([("NEXT_PUBLIC_BRAND_NAME", "BabyLuxe".to_string())]);
        if let Some(number) = options.whatsapp_number {
            vars.insert("NEXT_PUBLIC_WHATSAPP_NUMBER", number);
        }
        if let Some(site_url) = options.site_url {
            vars.insert("NEXT_PUBLIC_SITE_URL", site_url);
        }
        if let Some(currency) = options.default_currency {
            vars.insert("NEXT_PUBLIC_DEFAULT_CURRENCY", currency);
        }
        let config = StorefrontConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let events = Arc::new(EventRecorder::default());
        let state = AppState::with_services(config, Arc::new(catalog), events.clone());

        Self {
            app: babyluxe_storefront::app(state),
            cookie: None,
            events,
        }
    }

    /// Send a request, carrying and updating the session cookie.
    pub async fn send(&mut self, request: axum::http::request::Builder, body: Body) -> Response {
        let request = match &self.cookie {
            Some(cookie) => request.header(header::COOKIE, cookie),
            None => request,
        };
        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let prefix = format!("{SESSION_COOKIE_NAME}=");
        if let Some(cookie) = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&prefix))
        {
            self.cookie = cookie.split(';').next().map(str::to_string);
        }

        response
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        self.send(Request::get(uri), Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> Response {
        self.send(
            Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(form.to_string()),
        )
        .await
    }

    pub async fn post_json(&mut self, uri: &str, body: &Value) -> Response {
        self.send(
            Request::post(uri).header(header::CONTENT_TYPE, "application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    /// Add one unit of a product to the cart.
    pub async fn add_to_cart(&mut self, product_id: &str) {
        let response = self
            .post_form("/cart/add", &format!("product_id={product_id}"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    /// Current cart count as reported by the storefront.
    pub async fn cart_count(&mut self) -> u64 {
        json_body(self.get("/cart/count").await).await["count"]
            .as_u64()
            .unwrap()
    }
}

/// Read a JSON response body.
pub async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Decoded `text` parameter of a messaging deep link.
#[must_use]
pub fn deep_link_text(location: &str) -> String {
    let (_, encoded) = location.split_once("?text=").unwrap();
    urlencoding::decode(encoded).unwrap().into_owned()
}

/// A complete, valid checkout form body.
pub const CHECKOUT_FORM: &str = "email=ada%40example.com&phone=555-0100&first_name=Ada\
                                 &last_name=Lovelace&address=1+Main+St&city=London&zip=N1\
                                 &notes=Gift+wrap+please";
