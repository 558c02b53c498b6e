//! Shop client construction errors.

use thiserror::Error;

/// Errors raised while setting up the client.
///
/// Per-request failures are reported as [`splitter::SplitError`] so the
/// coordinator can apply its recovery rules.
#[derive(Debug, Error)]
pub enum ShopClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
