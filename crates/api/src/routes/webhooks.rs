//! Order notification endpoint.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use splitter::{CatalogService, IdempotencyLedger, OrderGateway, SplitCoordinator};

use crate::error::ApiError;
use crate::payload::OrderPayload;
use crate::signature::{self, SIGNATURE_HEADER};

/// Shared application state accessible from all handlers.
pub struct AppState<C, O, L>
where
    C: CatalogService,
    O: OrderGateway,
    L: IdempotencyLedger,
{
    pub coordinator: SplitCoordinator<C, O, L>,
    /// Signature verification is skipped when unset.
    pub webhook_secret: Option<String>,
}

impl<C, O, L> AppState<C, O, L>
where
    C: CatalogService,
    O: OrderGateway,
    L: IdempotencyLedger,
{
    pub fn new(coordinator: SplitCoordinator<C, O, L>, webhook_secret: Option<String>) -> Self {
        Self {
            coordinator,
            webhook_secret,
        }
    }
}

/// POST /webhooks/orders/create: split an order and tag it.
///
/// Responds 200 with a one-line summary for every reportable outcome,
/// 401 for a bad signature and 500 when the sender should redeliver.
pub async fn order_created<C, O, L>(
    State(state): State<Arc<AppState<C, O, L>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, String), ApiError>
where
    C: CatalogService + 'static,
    O: OrderGateway + 'static,
    L: IdempotencyLedger + 'static,
{
    if let Some(secret) = state.webhook_secret.as_deref() {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                metrics::counter!("webhook_unauthorized_total").increment(1);
                ApiError::Unauthorized("missing webhook signature".to_string())
            })?;
        if !signature::verify(secret, &body, provided) {
            metrics::counter!("webhook_unauthorized_total").increment(1);
            return Err(ApiError::Unauthorized(
                "invalid webhook signature".to_string(),
            ));
        }
    }

    let order = OrderPayload::from_slice(&body)
        .and_then(OrderPayload::into_order)
        .map_err(ApiError::MalformedPayload)?;

    tracing::info!(
        order_id = %order.id,
        order_name = %order.name,
        line_items = order.line_items.len(),
        "received order notification"
    );

    // The run outlives the request: a sender that hangs up mid-split must
    // not cancel child creation halfway through.
    let run = tokio::spawn(async move { state.coordinator.split_order(&order).await });
    let report = run
        .await
        .map_err(|e| ApiError::Internal(format!("split task failed: {e}")))??;
    Ok((StatusCode::OK, report.summary()))
}
