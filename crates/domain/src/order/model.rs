//! The inbound order as seen by the splitter.

use serde_json::Value;

use super::tags::TagSet;
use super::value_objects::{CustomerId, OrderId, ProductId, Quantity, VariantId};

/// A customer order received from the platform.
///
/// The splitter never shrinks or rewrites an order's line items; the only
/// mutation it ever applies is appending the split-processed tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable reference such as `#1001`.
    pub name: String,
    pub tags: TagSet,
    pub line_items: Vec<LineItem>,
    pub email: Option<String>,
    pub customer_id: Option<CustomerId>,
    /// Carried verbatim to child orders.
    pub shipping_address: Option<Value>,
    /// Carried verbatim to child orders.
    pub billing_address: Option<Value>,
}

impl Order {
    /// Creates an order with no tags, line items or customer details.
    pub fn new(id: impl Into<OrderId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tags: TagSet::new(),
            line_items: Vec::new(),
            email: None,
            customer_id: None,
            shipping_address: None,
            billing_address: None,
        }
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn with_shipping_address(mut self, address: Value) -> Self {
        self.shipping_address = Some(address);
        self
    }

    pub fn with_billing_address(mut self, address: Value) -> Self {
        self.billing_address = Some(address);
        self
    }

    /// Returns true if the order carries the split-processed tag.
    pub fn is_split_processed(&self) -> bool {
        self.tags.is_split_processed()
    }

    pub fn has_line_items(&self) -> bool {
        !self.line_items.is_empty()
    }
}

/// One product/variant/quantity entry of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: Option<ProductId>,
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line item with both identifiers present.
    pub fn new(
        product_id: impl Into<ProductId>,
        variant_id: impl Into<VariantId>,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: Some(product_id.into()),
            variant_id: Some(variant_id.into()),
            quantity,
        }
    }

    /// Classifies whether this item can take part in a split.
    pub fn eligibility(&self) -> Eligibility<'_> {
        let Some(product_id) = self.product_id.as_ref() else {
            return Eligibility::MissingProductId;
        };
        let Some(variant_id) = self.variant_id.as_ref() else {
            return Eligibility::MissingVariantId;
        };
        match Quantity::new(self.quantity) {
            Some(quantity) => Eligibility::Eligible {
                product_id,
                variant_id,
                quantity,
            },
            None => Eligibility::ZeroQuantity,
        }
    }
}

/// Result of [`LineItem::eligibility`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility<'a> {
    Eligible {
        product_id: &'a ProductId,
        variant_id: &'a VariantId,
        quantity: Quantity,
    },
    MissingProductId,
    MissingVariantId,
    ZeroQuantity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_line_item() {
        let item = LineItem::new(10u64, 20u64, 5);
        match item.eligibility() {
            Eligibility::Eligible {
                product_id,
                variant_id,
                quantity,
            } => {
                assert_eq!(product_id.as_str(), "10");
                assert_eq!(variant_id.as_str(), "20");
                assert_eq!(quantity.get(), 5);
            }
            other => panic!("expected eligible, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_identifiers() {
        let mut item = LineItem::new(10u64, 20u64, 5);
        item.product_id = None;
        assert_eq!(item.eligibility(), Eligibility::MissingProductId);

        let mut item = LineItem::new(10u64, 20u64, 5);
        item.variant_id = None;
        assert_eq!(item.eligibility(), Eligibility::MissingVariantId);
    }

    #[test]
    fn test_zero_quantity() {
        let item = LineItem::new(10u64, 20u64, 0);
        assert_eq!(item.eligibility(), Eligibility::ZeroQuantity);
    }

    #[test]
    fn test_split_processed_follows_tags() {
        let order = Order::new(1u64, "#1001").with_tags(TagSet::parse("VIP, Split-Processed"));
        assert!(order.is_split_processed());
        assert!(!Order::new(1u64, "#1001").is_split_processed());
    }
}
