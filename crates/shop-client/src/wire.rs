//! Request and response bodies of the Admin REST API.

use domain::{ChildOrder, CustomerId, Metafield, OrderId, TagSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every order payload is wrapped in `{"order": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OrderEnvelope<T> {
    pub order: T,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewOrder<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerRef<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<&'a Value>,
    pub line_items: Vec<NewLineItem<'a>>,
    pub tags: String,
    pub note: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CustomerRef<'a> {
    pub id: &'a CustomerId,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewLineItem<'a> {
    pub variant_id: &'a domain::VariantId,
    pub quantity: u32,
}

impl<'a> From<&'a ChildOrder> for NewOrder<'a> {
    fn from(child: &'a ChildOrder) -> Self {
        Self {
            email: child.email.as_deref(),
            customer: child.customer_id.as_ref().map(|id| CustomerRef { id }),
            shipping_address: child.shipping_address.as_ref(),
            billing_address: child.billing_address.as_ref(),
            line_items: vec![NewLineItem {
                variant_id: &child.line_item.variant_id,
                quantity: child.line_item.quantity,
            }],
            tags: child.tags.render(),
            note: &child.note,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedOrder {
    pub id: OrderId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TagUpdate<'a> {
    pub id: &'a OrderId,
    pub tags: String,
}

impl<'a> TagUpdate<'a> {
    pub fn new(id: &'a OrderId, tags: &TagSet) -> Self {
        Self {
            id,
            tags: tags.render(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetafieldList {
    #[serde(default)]
    pub metafields: Vec<Metafield>,
}
