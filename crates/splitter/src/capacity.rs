//! Per-product shipping capacity lookup.

use domain::{Capacity, ProductId, resolve_capacity};

use crate::error::SplitError;
use crate::services::CatalogService;

/// Resolves a product's shipping capacity through the catalog.
#[derive(Debug, Clone)]
pub struct CapacityResolver<C: CatalogService> {
    catalog: C,
}

impl<C: CatalogService> CapacityResolver<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Returns the product's capacity, or `None` when no usable capacity
    /// record exists. Catalog failures are returned, never swallowed.
    #[tracing::instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn resolve(&self, product_id: &ProductId) -> Result<Option<Capacity>, SplitError> {
        let records = self.catalog.product_metafields(product_id).await?;
        let capacity = resolve_capacity(&records);
        tracing::debug!(
            records = records.len(),
            capacity = capacity.map(|c| c.get()),
            "capacity resolved"
        );
        Ok(capacity)
    }
}
