//! Application state shared across handlers.

use std::sync::Arc;

use babyluxe_core::CheckoutComposer;

use crate::config::StorefrontConfig;
use crate::services::{
    CheckoutEventSink, EventLogger, ProductCatalog, ProductLookup, Unconfigured,
};
use crate::supabase::{SupabaseClient, SupabaseError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the data store services and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    products: ProductLookup,
    events: EventLogger,
    composer: CheckoutComposer,
}

impl AppState {
    /// Create application state backed by Supabase.
    ///
    /// Falls back to [`Unconfigured`] services when no Supabase project is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the Supabase client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, SupabaseError> {
        let (catalog, sink): (Arc<dyn ProductCatalog>, Arc<dyn CheckoutEventSink>) =
            match &config.supabase {
                Some(supabase) => {
                    let client = Arc::new(SupabaseClient::new(supabase)?);
                    (client.clone(), client)
                }
                None => {
                    tracing::warn!("Supabase is not configured; catalog reads will be empty");
                    (Arc::new(Unconfigured), Arc::new(Unconfigured))
                }
            };

        Ok(Self::with_services(config, catalog, sink))
    }

    /// Create application state from explicit services.
    #[must_use]
    pub fn with_services(
        config: StorefrontConfig,
        catalog: Arc<dyn ProductCatalog>,
        sink: Arc<dyn CheckoutEventSink>,
    ) -> Self {
        let composer = CheckoutComposer::new(config.checkout_settings());
        let events = EventLogger::new(sink, config.checkout.event_timeout);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                products: ProductLookup::new(catalog),
                events,
                composer,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Product reads.
    #[must_use]
    pub fn products(&self) -> &ProductLookup {
        &self.inner.products
    }

    /// Checkout event writes.
    #[must_use]
    pub fn events(&self) -> &EventLogger {
        &self.inner.events
    }

    /// Checkout message composer built from configuration.
    #[must_use]
    pub fn composer(&self) -> &CheckoutComposer {
        &self.inner.composer
    }
}
