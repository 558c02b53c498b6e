//! Webhook receiver for capacity-bounded order splitting.
//!
//! Accepts `orders/create` notifications, verifies their signature, splits
//! oversized line items into child orders and tags the original order.
//! Structured logging (tracing) and Prometheus metrics are built in.

pub mod config;
pub mod error;
pub mod payload;
pub mod routes;
pub mod signature;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use shop_client::{ShopClient, ShopClientError};
use splitter::{
    CatalogService, IdempotencyLedger, InMemoryIdempotencyLedger, OrderGateway, SplitCoordinator,
};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::webhooks::AppState;

/// Application state wired to the live store.
pub type ShopAppState = AppState<ShopClient, ShopClient, InMemoryIdempotencyLedger>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C, O, L>(state: Arc<AppState<C, O, L>>, metrics_handle: PrometheusHandle) -> Router
where
    C: CatalogService + 'static,
    O: OrderGateway + 'static,
    L: IdempotencyLedger + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/webhooks/orders/create",
            post(routes::webhooks::order_created::<C, O, L>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state backed by the store's Admin API.
pub fn create_default_state(config: &Config) -> Result<Arc<ShopAppState>, ShopClientError> {
    let client = ShopClient::new(&config.shop_config())?;
    let coordinator = SplitCoordinator::with_ledger(
        client.clone(),
        client,
        InMemoryIdempotencyLedger::new(),
        config.policy,
    );

    Ok(Arc::new(AppState::new(
        coordinator,
        config.webhook_secret.clone(),
    )))
}
