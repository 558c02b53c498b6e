//! Domain layer for the order splitter.
//!
//! This crate provides the pure parts of the split workflow:
//! - Order, line item and tag model with the split-processed sentinel
//! - Capacity selection from product metadata
//! - The capacity-bounded partitioner
//! - Child order construction for each shipment

pub mod capacity;
pub mod child;
pub mod error;
pub mod order;
pub mod partition;

pub use capacity::{CAPACITY_KEY, CAPACITY_NAMESPACES, Metafield, resolve_capacity};
pub use child::{ChildLineItem, ChildOrder, parent_tag, shipment_tag};
pub use error::DomainError;
pub use order::{
    Capacity, CustomerId, Eligibility, LineItem, Order, OrderId, ProductId, Quantity,
    SPLIT_PROCESSED_TAG, TagSet, VariantId,
};
pub use partition::{Partition, bounded_partition, partition, partition_units};
