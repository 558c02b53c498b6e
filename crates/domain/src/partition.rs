//! Capacity-bounded decomposition of a line item quantity.

use crate::error::DomainError;
use crate::order::{Capacity, Quantity};

/// Ordered per-shipment quantities for one line item.
///
/// Invariants: every entry is in `(0, capacity]`, entries sum to the
/// original quantity, and only the last entry may be smaller than capacity.
/// Shipments are produced on demand, so a huge quantity costs nothing until
/// it is iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    capacity: u32,
    full: u32,
    remainder: u32,
}

impl Partition {
    /// Per-shipment quantities in order.
    pub fn shipments(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::repeat_n(self.capacity, self.full as usize)
            .chain((self.remainder != 0).then_some(self.remainder))
    }

    /// Collects the shipments.
    pub fn to_vec(&self) -> Vec<u32> {
        self.shipments().collect()
    }

    /// Number of shipments.
    pub fn len(&self) -> u32 {
        // A nonzero remainder implies capacity >= 2, so this cannot overflow.
        self.full + u32::from(self.remainder != 0)
    }

    /// Always false; a partition holds at least one shipment.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the quantity needs more than one shipment.
    pub fn is_split(&self) -> bool {
        self.len() > 1
    }

    /// Sum of all shipments.
    pub fn total(&self) -> u64 {
        u64::from(self.capacity) * u64::from(self.full) + u64::from(self.remainder)
    }

    /// Iterates `(shipment_index, quantity)` with 1-based indices.
    pub fn indexed(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (1u32..).zip(self.shipments())
    }
}

/// Splits `quantity` into shipments of at most `capacity` units.
///
/// Produces `floor(q / c)` full shipments followed by one remainder shipment
/// when `q mod c` is nonzero. A quantity that already fits yields `[q]`.
pub fn partition(quantity: Quantity, capacity: Capacity) -> Partition {
    let q = quantity.get();
    let c = capacity.get();
    Partition {
        capacity: c,
        full: q / c,
        remainder: q % c,
    }
}

/// Like [`partition`], refusing splits into more than `max_shipments`.
pub fn bounded_partition(
    quantity: Quantity,
    capacity: Capacity,
    max_shipments: u32,
) -> Result<Partition, DomainError> {
    let partition = partition(quantity, capacity);
    if partition.len() > max_shipments {
        return Err(DomainError::TooManyShipments {
            shipments: partition.len(),
            limit: max_shipments,
        });
    }
    Ok(partition)
}

/// Like [`partition`] for raw integers, rejecting zero inputs.
pub fn partition_units(quantity: u32, capacity: u32) -> Result<Partition, DomainError> {
    let q = Quantity::new(quantity).ok_or(DomainError::InvalidQuantity { quantity })?;
    let c = Capacity::new(capacity).ok_or(DomainError::InvalidCapacity { capacity })?;
    Ok(partition(q, c))
}
