//! Split workflow error types.

use domain::ProductId;
use thiserror::Error;

/// Errors that can occur while splitting an order.
#[derive(Debug, Error)]
pub enum SplitError {
    /// The inbound order cannot be processed as given.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The catalog could not be queried for a product's capacity.
    #[error("Catalog service error for product {product_id}: {reason}")]
    Service {
        product_id: ProductId,
        reason: String,
    },

    /// The platform rejected a child order.
    #[error("Order creation failed with status {status}: {body}")]
    Creation { status: u16, body: String },

    /// The platform rejected the completion tag update.
    #[error("Order tagging failed with status {status}: {body}")]
    Tagging { status: u16, body: String },

    /// The request never produced a response (connect failure, timeout).
    #[error("Transport error during {operation}: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    /// The idempotency ledger could not be read or updated.
    #[error("Idempotency ledger error: {0}")]
    Ledger(String),
}
