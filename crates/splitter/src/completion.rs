//! The completion marker: the only write ever applied to the original order.

use domain::{Order, SPLIT_PROCESSED_TAG, TagSet};

use crate::error::SplitError;
use crate::services::OrderGateway;

/// Appends the split-processed tag to the order's existing tags and submits
/// the result. Returns the tag set that was written.
#[tracing::instrument(skip(orders, order), fields(order_id = %order.id))]
pub async fn mark_split_processed<O: OrderGateway>(
    orders: &O,
    order: &Order,
) -> Result<TagSet, SplitError> {
    let tags = order.tags.with(SPLIT_PROCESSED_TAG);
    orders.update_tags(&order.id, &tags).await?;
    tracing::info!(tags = %tags, "order marked as split-processed");
    Ok(tags)
}
