//! Shipping capacity metadata attached to catalog products.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::order::Capacity;

/// Metadata key holding a product's shipping capacity.
pub const CAPACITY_KEY: &str = "shipping_capacity";

/// Namespaces under which the capacity key is recognized. Both are treated
/// as aliases of each other.
pub const CAPACITY_NAMESPACES: [&str; 2] = ["custom", "global"];

/// A product metadata record as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metafield {
    pub namespace: String,
    pub key: String,
    /// Usually a string; some stores return typed numbers.
    #[serde(default)]
    pub value: Value,
}

impl Metafield {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns true if this record carries shipping capacity semantics.
    pub fn is_capacity_record(&self) -> bool {
        self.key == CAPACITY_KEY && CAPACITY_NAMESPACES.contains(&self.namespace.as_str())
    }

    fn capacity_value(&self) -> Option<Capacity> {
        match &self.value {
            Value::String(raw) => Capacity::parse(raw),
            Value::Number(n) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .and_then(Capacity::new),
            _ => None,
        }
    }
}

/// Selects the capacity from a product's metadata records.
///
/// The first record with recognized semantics wins, in the order the store
/// returned them. If that record's value is not a positive integer the
/// product has no known capacity; later records are not consulted.
pub fn resolve_capacity(records: &[Metafield]) -> Option<Capacity> {
    records
        .iter()
        .find(|m| m.is_capacity_record())
        .and_then(Metafield::capacity_value)
}
