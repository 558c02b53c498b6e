//! Order model, identifiers and tags.

mod model;
mod tags;
mod value_objects;

pub use model::{Eligibility, LineItem, Order};
pub use tags::{SPLIT_PROCESSED_TAG, TagSet};
pub use value_objects::{Capacity, CustomerId, OrderId, ProductId, Quantity, VariantId};
