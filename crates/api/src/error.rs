//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use splitter::SplitError;

/// API-level error type that maps to HTTP responses.
///
/// Every body is plain text. Anything other than an authentication failure
/// is answered with 500 so the sender redelivers the notification.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid webhook signature.
    Unauthorized(String),
    /// The body could not be read as an order.
    MalformedPayload(String),
    /// The split workflow failed fatally.
    Split(SplitError),
    /// The split task panicked or was cancelled.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!(reason = %msg, "rejected unauthenticated webhook");
                (StatusCode::UNAUTHORIZED, msg)
            }
            ApiError::MalformedPayload(msg) => {
                tracing::error!(error = %msg, "malformed webhook payload");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error processing order: {msg}"),
                )
            }
            ApiError::Split(err) => {
                tracing::error!(error = %err, "order split failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error processing order: {err}"),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "order split task did not complete");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error processing order: {msg}"),
                )
            }
        };

        (status, message).into_response()
    }
}

impl From<SplitError> for ApiError {
    fn from(err: SplitError) -> Self {
        match err {
            SplitError::MalformedInput(msg) => ApiError::MalformedPayload(msg),
            other => ApiError::Split(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::ProductId;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let unauthorized = ApiError::Unauthorized("bad signature".into()).into_response();
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

        let malformed = ApiError::from(SplitError::MalformedInput("no line_items".into()))
            .into_response();
        assert_eq!(malformed.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let service = ApiError::from(SplitError::Service {
            product_id: ProductId::from(1u64),
            reason: "timeout".into(),
        })
        .into_response();
        assert_eq!(service.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let internal = ApiError::Internal("split task failed: panicked".into()).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_body_is_plain_text() {
        let response = ApiError::Unauthorized("bad signature".into()).into_response();
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/plain"));
    }
}
