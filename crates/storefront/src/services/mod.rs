//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Product reads from the hosted `products` table
//! - `events` - Checkout analytics writes to `checkout_events`
//!
//! Both sit behind traits so handlers can run against in-memory fakes.
//! When Supabase is not configured, [`Unconfigured`] stands in for both.

pub mod catalog;
pub mod events;

use std::time::Duration;

use async_trait::async_trait;
use babyluxe_core::{CheckoutEvent, Product, ProductId};
use thiserror::Error;

use crate::supabase::SupabaseError;

pub use catalog::{CartProducts, PRODUCT_LOOKUP_WARNING, ProductCatalog, ProductLookup};
pub use events::{CheckoutEventSink, EventLogger};

/// Errors from the hosted data store services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Supabase URL or key is missing.
    #[error("Missing NEXT_PUBLIC_SUPABASE_URL or NEXT_PUBLIC_SUPABASE_ANON_KEY")]
    NotConfigured,

    /// Supabase request failed.
    #[error(transparent)]
    Supabase(#[from] SupabaseError),

    /// The call did not finish in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Backend used when Supabase is not configured. Every call fails with
/// [`ServiceError::NotConfigured`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait]
impl ProductCatalog for Unconfigured {
    async fn fetch_by_ids(&self, _ids: &[ProductId]) -> Result<Vec<Product>, ServiceError> {
        Err(ServiceError::NotConfigured)
    }

    async fn fetch_active(&self, _category: Option<&str>) -> Result<Vec<Product>, ServiceError> {
        Err(ServiceError::NotConfigured)
    }

    async fn fetch_featured(&self, _limit: usize) -> Result<Vec<Product>, ServiceError> {
        Err(ServiceError::NotConfigured)
    }

    async fn fetch_by_slug(&self, _slug: &str) -> Result<Option<Product>, ServiceError> {
        Err(ServiceError::NotConfigured)
    }
}

#[async_trait]
impl CheckoutEventSink for Unconfigured {
    async fn record(&self, _event: &CheckoutEvent) -> Result<(), ServiceError> {
        Err(ServiceError::NotConfigured)
    }
}
