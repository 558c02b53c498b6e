//! Catalog service trait and in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::{CAPACITY_KEY, Metafield, ProductId};
use tokio::sync::RwLock;

use crate::error::SplitError;

/// Read access to product metadata in the external catalog.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Returns the metadata records of a product in store order.
    ///
    /// An unknown product yields an empty list. Failing to reach the store
    /// yields [`SplitError::Service`].
    async fn product_metafields(&self, product_id: &ProductId)
    -> Result<Vec<Metafield>, SplitError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    metafields: HashMap<ProductId, Vec<Metafield>>,
    failing_products: HashSet<ProductId>,
    latency: Option<Duration>,
    lookups: usize,
}

/// In-memory catalog for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogService {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogService {
    /// Creates an empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the metadata records of a product.
    pub async fn set_metafields(&self, product_id: impl Into<ProductId>, records: Vec<Metafield>) {
        self.state
            .write()
            .await
            .metafields
            .insert(product_id.into(), records);
    }

    /// Stores a `custom.shipping_capacity` record holding `raw`.
    pub async fn set_capacity(&self, product_id: impl Into<ProductId>, raw: &str) {
        self.set_metafields(
            product_id,
            vec![Metafield::new("custom", CAPACITY_KEY, raw)],
        )
        .await;
    }

    /// Makes lookups for `product_id` fail as if the store were unreachable.
    pub async fn fail_product(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .await
            .failing_products
            .insert(product_id.into());
    }

    /// Delays every lookup, letting concurrent deliveries interleave.
    pub async fn set_latency(&self, latency: Duration) {
        self.state.write().await.latency = Some(latency);
    }

    /// Returns the number of lookups served, including failed ones.
    pub async fn lookup_count(&self) -> usize {
        self.state.read().await.lookups
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn product_metafields(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Metafield>, SplitError> {
        let latency = {
            let mut state = self.state.write().await;
            state.lookups += 1;
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let state = self.state.read().await;
        if state.failing_products.contains(product_id) {
            return Err(SplitError::Service {
                product_id: product_id.clone(),
                reason: "catalog unavailable".to_string(),
            });
        }

        Ok(state
            .metafields
            .get(product_id)
            .cloned()
            .unwrap_or_default())
    }
}
