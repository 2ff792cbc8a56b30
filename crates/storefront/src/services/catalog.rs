//! Product reads.
//!
//! [`ProductCatalog`] is the raw, fallible interface. [`ProductLookup`] wraps
//! it for handlers: failures are logged and degrade to empty results so a
//! page can still be served with reduced information.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use babyluxe_core::{CartLine, Product, ProductId, ProductStatus};
use tracing::instrument;

use super::ServiceError;
use crate::supabase::{Query, SupabaseClient};

/// Hosted table holding the catalog.
pub const PRODUCTS_TABLE: &str = "products";

/// Warning carried into the checkout message when products failed to load.
pub const PRODUCT_LOOKUP_WARNING: &str = "Failed to load products";

/// Read-only access to product records.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Products whose id is in `ids`. Order is unspecified.
    async fn fetch_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ServiceError>;

    /// Active products ordered by `sort_order`, optionally in one category.
    async fn fetch_active(&self, category: Option<&str>) -> Result<Vec<Product>, ServiceError>;

    /// Up to `limit` featured products.
    async fn fetch_featured(&self, limit: usize) -> Result<Vec<Product>, ServiceError>;

    /// The active product with this slug.
    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Product>, ServiceError>;
}

#[async_trait]
impl ProductCatalog for SupabaseClient {
    async fn fetch_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ServiceError> {
        let ids = distinct_ids(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = Query::default().is_in("id", ids);
        Ok(self.select(PRODUCTS_TABLE, &query).await?)
    }

    async fn fetch_active(&self, category: Option<&str>) -> Result<Vec<Product>, ServiceError> {
        let mut query = Query::default().eq("status", ProductStatus::Active);
        if let Some(category) = category {
            query = query.eq("category", category);
        }
        let query = query.order_asc("sort_order");
        Ok(self.select(PRODUCTS_TABLE, &query).await?)
    }

    async fn fetch_featured(&self, limit: usize) -> Result<Vec<Product>, ServiceError> {
        let query = Query::default().eq("featured", true).limit(limit);
        Ok(self.select(PRODUCTS_TABLE, &query).await?)
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Product>, ServiceError> {
        let query = Query::default()
            .eq("slug", slug)
            .eq("status", ProductStatus::Active)
            .limit(1);
        let rows: Vec<Product> = self.select(PRODUCTS_TABLE, &query).await?;
        Ok(rows.into_iter().next())
    }
}

/// Ids with duplicates removed, first occurrence kept.
fn distinct_ids(ids: &[ProductId]) -> Vec<&str> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(ProductId::as_str)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Products backing a cart, plus a warning when they could not be loaded.
#[derive(Debug, Clone, Default)]
pub struct CartProducts {
    pub products: Vec<Product>,
    pub warning: Option<String>,
}

/// Catalog reads that never fail.
#[derive(Clone)]
pub struct ProductLookup {
    catalog: Arc<dyn ProductCatalog>,
}

impl ProductLookup {
    /// Wrap a catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { catalog }
    }

    /// Products referenced by `lines`. Empty carts skip the backend.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn for_cart(&self, lines: &[CartLine]) -> CartProducts {
        if lines.is_empty() {
            return CartProducts::default();
        }

        let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id.clone()).collect();
        match self.catalog.fetch_by_ids(&ids).await {
            Ok(products) => CartProducts {
                products,
                warning: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch cart products");
                CartProducts {
                    products: Vec::new(),
                    warning: Some(PRODUCT_LOOKUP_WARNING.to_string()),
                }
            }
        }
    }

    /// Active catalog, empty on failure.
    #[instrument(skip(self))]
    pub async fn active(&self, category: Option<&str>) -> Vec<Product> {
        self.catalog
            .fetch_active(category)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to fetch products");
                Vec::new()
            })
    }

    /// Featured products, empty on failure.
    #[instrument(skip(self))]
    pub async fn featured(&self, limit: usize) -> Vec<Product> {
        self.catalog.fetch_featured(limit).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch featured products");
            Vec::new()
        })
    }

    /// Product by slug, `None` when missing or on failure.
    #[instrument(skip(self))]
    pub async fn by_slug(&self, slug: &str) -> Option<Product> {
        self.catalog.fetch_by_slug(slug).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, slug, "Failed to fetch product");
            None
        })
    }
}
