//! Domain error types.

use thiserror::Error;

/// Errors raised when domain invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Quantities must be strictly positive.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Capacities must be strictly positive.
    #[error("Invalid capacity: {capacity} (must be greater than 0)")]
    InvalidCapacity { capacity: u32 },

    /// A split would need more shipments than allowed.
    #[error("Split into {shipments} shipments exceeds the limit of {limit}")]
    TooManyShipments { shipments: u32, limit: u32 },
}
