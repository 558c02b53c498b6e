//! Child orders created for each shipment of a split line item.

use serde_json::Value;

use crate::order::{CustomerId, Order, TagSet, VariantId};

/// Tag identifying a child's position within its partition.
pub fn shipment_tag(shipment: u32) -> String {
    format!("Shipment-{shipment}")
}

/// Tag linking a child back to the parent order's reference name.
pub fn parent_tag(parent_name: &str) -> String {
    format!("Parent-{parent_name}")
}

/// The single line item a child order carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLineItem {
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// A new order representing one shipment of a split line item.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildOrder {
    pub email: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub shipping_address: Option<Value>,
    pub billing_address: Option<Value>,
    pub line_item: ChildLineItem,
    pub tags: TagSet,
    pub note: String,
    /// 1-based position in the partition.
    pub shipment: u32,
}

impl ChildOrder {
    /// Builds the child for shipment `shipment` of `total_shipments`.
    ///
    /// Customer, email and addresses are copied from the parent.
    pub fn for_shipment(
        parent: &Order,
        variant_id: &VariantId,
        quantity: u32,
        shipment: u32,
        total_shipments: u32,
    ) -> Self {
        let tags: TagSet = [shipment_tag(shipment), parent_tag(&parent.name)]
            .into_iter()
            .collect();
        let note = format!(
            "Split from order {} (ID: {}) - Shipment {} of {}",
            parent.name, parent.id, shipment, total_shipments
        );

        Self {
            email: parent.email.clone(),
            customer_id: parent.customer_id.clone(),
            shipping_address: parent.shipping_address.clone(),
            billing_address: parent.billing_address.clone(),
            line_item: ChildLineItem {
                variant_id: variant_id.clone(),
                quantity,
            },
            tags,
            note,
            shipment,
        }
    }
}
