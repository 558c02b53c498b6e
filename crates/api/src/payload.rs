//! Inbound `orders/create` notification body.

use domain::{CustomerId, LineItem, Order, OrderId, ProductId, TagSet, VariantId};
use serde::Deserialize;
use serde_json::Value;

/// Order as delivered by the platform. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct OrderPayload {
    pub id: OrderId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: TagSet,
    /// Absent means the body is not an order notification at all.
    #[serde(default)]
    pub line_items: Option<Vec<LineItemPayload>>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerPayload>,
    #[serde(default)]
    pub shipping_address: Option<Value>,
    #[serde(default)]
    pub billing_address: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct LineItemPayload {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CustomerPayload {
    pub id: CustomerId,
}

impl OrderPayload {
    /// Parses a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, String> {
        serde_json::from_slice(body).map_err(|e| format!("invalid order payload: {e}"))
    }

    /// Converts the payload into the domain order.
    ///
    /// Negative quantities become zero and are skipped downstream.
    pub fn into_order(self) -> Result<Order, String> {
        let Some(items) = self.line_items else {
            return Err(format!("order {} has no line_items field", self.id));
        };

        let mut line_items = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let quantity = u32::try_from(item.quantity.max(0)).map_err(|_| {
                format!("line item {index} quantity {} is out of range", item.quantity)
            })?;
            line_items.push(LineItem {
                product_id: item.product_id,
                variant_id: item.variant_id,
                quantity,
            });
        }

        let name = self.name.unwrap_or_else(|| format!("#{}", self.id));
        Ok(Order {
            id: self.id,
            name,
            tags: self.tags,
            line_items,
            email: self.email,
            customer_id: self.customer.map(|c| c.id),
            shipping_address: self.shipping_address,
            billing_address: self.billing_address,
        })
    }
}
