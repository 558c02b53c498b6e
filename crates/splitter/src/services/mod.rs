//! External service traits and in-memory implementations for the split workflow.

pub mod catalog;
pub mod orders;

pub use catalog::{CatalogService, InMemoryCatalogService};
pub use orders::{InMemoryOrderGateway, OrderGateway, OrderRef};
