//! HTTP implementation of the catalog and order services.

use std::time::Duration;

use async_trait::async_trait;
use domain::{ChildOrder, Metafield, OrderId, ProductId, TagSet};
use reqwest::{RequestBuilder, Response, StatusCode};
use splitter::{CatalogService, OrderGateway, OrderRef, SplitError};
use tracing::{debug, warn};

use crate::config::ShopConfig;
use crate::error::ShopClientError;
use crate::wire::{CreatedOrder, MetafieldList, NewOrder, OrderEnvelope, TagUpdate};

/// Header carrying the Admin API access token.
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Upper bound on a server-requested `Retry-After` delay.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Admin REST client.
///
/// Implements [`CatalogService`] and [`OrderGateway`] for the splitter. GET
/// and PUT requests retry transient failures; POST is sent exactly once.
///
/// NOTE: Do NOT derive `Debug` on this struct, `access_token` would be exposed.
#[derive(Clone)]
pub struct ShopClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

/// Why an idempotent request gave up.
enum Failure {
    /// No response was received.
    Transport(String),
    /// The last response was still 429 or 5xx.
    Status { status: u16, body: String },
}

impl ShopClient {
    pub fn new(config: &ShopConfig) -> Result<Self, ShopClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("order-splitter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(ACCESS_TOKEN_HEADER, &self.access_token)
    }

    /// Sends an idempotent request, retrying connect errors, timeouts, 429
    /// and 5xx responses with exponential backoff.
    ///
    /// Any other response, including 4xx, is returned to the caller as-is.
    async fn send_idempotent<F>(&self, operation: &'static str, build: F) -> Result<Response, Failure>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            let (failure, retry_after) = match self.authorized(build()).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
                        return Ok(resp);
                    }
                    let retry_after = parse_retry_after(&resp);
                    let body = resp.text().await.unwrap_or_default();
                    (
                        Failure::Status {
                            status: status.as_u16(),
                            body,
                        },
                        retry_after,
                    )
                }
                Err(e) if e.is_connect() || e.is_timeout() => (Failure::Transport(e.to_string()), None),
                Err(e) => return Err(Failure::Transport(e.to_string())),
            };

            if attempt >= self.max_retries {
                return Err(failure);
            }

            // Exponential backoff, at least as long as the server asked for.
            let backoff = self.retry_base_delay.saturating_mul(2u32.saturating_pow(attempt));
            let delay = retry_after.map_or(backoff, |ra| ra.min(MAX_RETRY_AFTER).max(backoff));
            match &failure {
                Failure::Status { status, .. } => {
                    warn!(operation, attempt = attempt + 1, status, ?delay, "transient response, retrying")
                }
                Failure::Transport(reason) => {
                    warn!(operation, attempt = attempt + 1, %reason, ?delay, "request failed, retrying")
                }
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

fn parse_retry_after(resp: &Response) -> Option<Duration> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl CatalogService for ShopClient {
    #[tracing::instrument(skip(self, product_id), fields(product_id = %product_id))]
    async fn product_metafields(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Metafield>, SplitError> {
        let url = self.url(&format!("/products/{product_id}/metafields.json"));
        let service_error = |reason: String| SplitError::Service {
            product_id: product_id.clone(),
            reason,
        };

        let resp = self
            .send_idempotent("product_metafields", || self.http.get(&url))
            .await
            .map_err(|failure| match failure {
                Failure::Transport(reason) => service_error(reason),
                Failure::Status { status, body } => {
                    service_error(format!("status {status}: {body}"))
                }
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!("product not found, no capacity");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(service_error(format!("status {}: {body}", status.as_u16())));
        }

        let list: MetafieldList = resp
            .json()
            .await
            .map_err(|e| service_error(format!("invalid metafields response: {e}")))?;
        debug!(records = list.metafields.len(), "fetched product metafields");
        Ok(list.metafields)
    }
}

#[async_trait]
impl OrderGateway for ShopClient {
    #[tracing::instrument(skip(self, order), fields(shipment = order.shipment))]
    async fn create_order(&self, order: &ChildOrder) -> Result<OrderRef, SplitError> {
        let body = OrderEnvelope {
            order: NewOrder::from(order),
        };

        let resp = self
            .authorized(self.http.post(self.url("/orders.json")))
            .json(&body)
            .send()
            .await
            .map_err(|e| SplitError::Transport {
                operation: "create_order",
                reason: e.to_string(),
            })?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| SplitError::Transport {
            operation: "create_order",
            reason: e.to_string(),
        })?;
        if !(200..300).contains(&status) {
            return Err(SplitError::Creation { status, body: text });
        }

        // A 2xx means the order exists even if the body cannot be read.
        match serde_json::from_str::<OrderEnvelope<CreatedOrder>>(&text) {
            Ok(created) => {
                debug!(child_id = %created.order.id, "child order created");
                Ok(OrderRef {
                    id: Some(created.order.id),
                    name: created.order.name,
                })
            }
            Err(e) => {
                let id = recover_order_id(&text);
                warn!(
                    status,
                    error = %e,
                    recovered_id = ?id,
                    body = %text,
                    "child order created but the response was unreadable"
                );
                Ok(OrderRef { id, name: None })
            }
        }
    }

    #[tracing::instrument(skip(self, order_id, tags), fields(order_id = %order_id))]
    async fn update_tags(&self, order_id: &OrderId, tags: &TagSet) -> Result<(), SplitError> {
        let url = self.url(&format!("/orders/{order_id}.json"));
        let body = OrderEnvelope {
            order: TagUpdate::new(order_id, tags),
        };

        let resp = self
            .send_idempotent("update_tags", || self.http.put(&url).json(&body))
            .await
            .map_err(|failure| match failure {
                Failure::Transport(reason) => SplitError::Transport {
                    operation: "update_tags",
                    reason,
                },
                Failure::Status { status, body } => SplitError::Tagging { status, body },
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SplitError::Tagging {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Pulls `order.id` out of a create response that did not match the
/// expected shape.
fn recover_order_id(text: &str) -> Option<OrderId> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    serde_json::from_value(value.get("order")?.get("id")?.clone()).ok()
}
