//! Connection settings for the store's Admin REST API.

use std::time::Duration;

/// Default Admin API version.
pub const DEFAULT_API_VERSION: &str = "2024-01";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of retries for idempotent requests.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default base delay for exponential backoff.
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Configuration for [`ShopClient`](crate::ShopClient).
///
/// NOTE: `Debug` is implemented by hand so the access token never reaches logs.
#[derive(Clone)]
pub struct ShopConfig {
    /// Versioned API root, e.g. `https://example.myshopify.com/admin/api/2024-01`.
    pub base_url: String,
    pub access_token: String,
    pub timeout_secs: u64,
    /// Retries after the first attempt for GET and PUT. POST is never retried.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl ShopConfig {
    /// Builds the configuration for a shop domain and API version.
    pub fn for_shop(
        shop_domain: &str,
        api_version: &str,
        access_token: impl Into<String>,
    ) -> Self {
        let domain = shop_domain
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        Self::builder(
            format!("https://{domain}/admin/api/{api_version}"),
            access_token,
        )
        .build()
    }

    /// Create a config builder, mostly for pointing the client at a mock server.
    pub fn builder(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> ShopConfigBuilder {
        ShopConfigBuilder {
            base_url: base_url.into(),
            access_token: access_token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for ShopConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish()
    }
}

/// Builder for [`ShopConfig`].
pub struct ShopConfigBuilder {
    base_url: String,
    access_token: String,
    timeout_secs: u64,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl ShopConfigBuilder {
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn build(self) -> ShopConfig {
        ShopConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            access_token: self.access_token,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
            retry_base_delay: self.retry_base_delay,
        }
    }
}
