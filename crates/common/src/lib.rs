//! Shared identifier types used across the order splitter crates.

mod types;

pub use types::{ExternalId, RunId};
