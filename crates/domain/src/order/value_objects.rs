//! Value objects for the order domain.

use std::num::NonZeroU32;

use common::ExternalId;
use serde::{Deserialize, Serialize};

/// Identifier of an order on the commerce platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(ExternalId);

impl OrderId {
    /// Creates an order ID from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(ExternalId::new(id))
    }

    /// Returns the order ID as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u64> for OrderId {
    fn from(n: u64) -> Self {
        Self(ExternalId::from(n))
    }
}

/// Identifier of a catalog product. Capacity metadata is attached here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(ExternalId);

impl ProductId {
    /// Creates a product ID from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(ExternalId::new(id))
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u64> for ProductId {
    fn from(n: u64) -> Self {
        Self(ExternalId::from(n))
    }
}

/// Identifier of a purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(ExternalId);

impl VariantId {
    /// Creates a variant ID from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(ExternalId::new(id))
    }

    /// Returns the variant ID as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for VariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VariantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u64> for VariantId {
    fn from(n: u64) -> Self {
        Self(ExternalId::from(n))
    }
}

/// Reference to the customer who placed an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(ExternalId);

impl CustomerId {
    /// Creates a customer ID from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(ExternalId::new(id))
    }

    /// Returns the customer ID as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CustomerId {
    fn from(n: u64) -> Self {
        Self(ExternalId::from(n))
    }
}

/// A strictly positive quantity of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Returns `None` for zero.
    pub fn new(units: u32) -> Option<Self> {
        NonZeroU32::new(units).map(Self)
    }

    /// Returns the number of units.
    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum number of units of one product allowed in a single shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capacity(NonZeroU32);

impl Capacity {
    /// Returns `None` for zero.
    pub fn new(units: u32) -> Option<Self> {
        NonZeroU32::new(units).map(Self)
    }

    /// Parses a capacity from stored metadata text.
    ///
    /// Surrounding whitespace is ignored. Anything that is not a positive
    /// integer fitting in `u32` yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u32>().ok().and_then(Self::new)
    }

    /// Returns the number of units.
    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// Returns true if `quantity` fits in one shipment.
    pub fn admits(&self, quantity: Quantity) -> bool {
        quantity.get() <= self.get()
    }
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
