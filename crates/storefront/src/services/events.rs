//! Checkout analytics writes.
//!
//! One row per checkout handoff goes to `checkout_events`. Writes are never
//! retried and their failure never affects the customer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use babyluxe_core::CheckoutEvent;
use tracing::instrument;

use super::ServiceError;
use crate::supabase::SupabaseClient;

/// Hosted table receiving checkout events.
pub const CHECKOUT_EVENTS_TABLE: &str = "checkout_events";

/// Destination for checkout events.
#[async_trait]
pub trait CheckoutEventSink: Send + Sync {
    /// Insert one event.
    async fn record(&self, event: &CheckoutEvent) -> Result<(), ServiceError>;
}

#[async_trait]
impl CheckoutEventSink for SupabaseClient {
    async fn record(&self, event: &CheckoutEvent) -> Result<(), ServiceError> {
        Ok(self.insert(CHECKOUT_EVENTS_TABLE, event).await?)
    }
}

/// Event sink with the storefront's timeout policy attached.
#[derive(Clone)]
pub struct EventLogger {
    sink: Arc<dyn CheckoutEventSink>,
    timeout: Duration,
}

impl EventLogger {
    #[must_use]
    pub fn new(sink: Arc<dyn CheckoutEventSink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    /// Insert one event, reporting the backend result as is.
    ///
    /// # Errors
    ///
    /// Returns the sink's error.
    #[instrument(skip_all, fields(channel = %event.channel, cart_count = event.cart_count))]
    pub async fn record(&self, event: &CheckoutEvent) -> Result<(), ServiceError> {
        self.sink.record(event).await
    }

    /// Insert one event, giving up after the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns the sink's error, or [`ServiceError::Timeout`].
    #[instrument(skip_all, fields(channel = %event.channel, cart_count = event.cart_count))]
    pub async fn record_bounded(&self, event: &CheckoutEvent) -> Result<(), ServiceError> {
        tokio::time::timeout(self.timeout, self.sink.record(event))
            .await
            .map_err(|_| ServiceError::Timeout(self.timeout))?
    }
}
