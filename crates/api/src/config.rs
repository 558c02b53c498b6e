//! Application configuration loaded from environment variables.

use shop_client::ShopConfig;
use shop_client::config::{DEFAULT_API_VERSION, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use splitter::{PolicyParseError, SplitPolicy};
use thiserror::Error;

/// Errors raised while reading the configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Policy(#[from] PolicyParseError),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Store connection settings.
///
/// NOTE: `Debug` is implemented by hand so the access token never reaches logs.
#[derive(Clone)]
pub struct ShopSettings {
    pub domain: String,
    pub access_token: String,
    pub api_version: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl std::fmt::Debug for ShopSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopSettings")
            .field("domain", &self.domain)
            .field("access_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Server configuration.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `SHOP_DOMAIN`, `SHOP_ACCESS_TOKEN`: required store credentials
/// - `SHOP_API_VERSION` (default: `2024-01`), `SHOP_TIMEOUT_SECS` (default: `10`),
///   `SHOP_MAX_RETRIES` (default: `2`)
/// - `WEBHOOK_SECRET`: enables signature verification when set
/// - `SPLIT_ON_LOOKUP_FAILURE` (`abort`|`skip`), `SPLIT_ITEM_SCOPE` (`all`|`first`),
///   `SPLIT_EMPTY_ORDERS` (`accept`|`reject`)
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub shop: ShopSettings,
    pub webhook_secret: Option<String>,
    pub policy: SplitPolicy,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("shop", &self.shop)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("policy", &self.policy)
            .finish()
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_format = match get("LOG_FORMAT") {
            None => LogFormat::Text,
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "text" | "pretty" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "LOG_FORMAT",
                        value: v,
                        reason: "expected text or json".to_string(),
                    });
                }
            },
        };

        let shop = ShopSettings {
            domain: get("SHOP_DOMAIN").ok_or(ConfigError::Missing("SHOP_DOMAIN"))?,
            access_token: get("SHOP_ACCESS_TOKEN")
                .ok_or(ConfigError::Missing("SHOP_ACCESS_TOKEN"))?,
            api_version: get("SHOP_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout_secs: parse_or("SHOP_TIMEOUT_SECS", get("SHOP_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS)?,
            max_retries: parse_or("SHOP_MAX_RETRIES", get("SHOP_MAX_RETRIES"), DEFAULT_MAX_RETRIES)?,
        };
        if shop.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SHOP_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let mut policy = SplitPolicy::default();
        if let Some(v) = get("SPLIT_ON_LOOKUP_FAILURE") {
            policy.on_lookup_failure = v.parse()?;
        }
        if let Some(v) = get("SPLIT_ITEM_SCOPE") {
            policy.item_scope = v.parse()?;
        }
        if let Some(v) = get("SPLIT_EMPTY_ORDERS") {
            policy.empty_orders = v.parse()?;
        }
        policy.max_shipments_per_item = parse_or(
            "SPLIT_MAX_SHIPMENTS",
            get("SPLIT_MAX_SHIPMENTS"),
            policy.max_shipments_per_item,
        )?;
        if policy.max_shipments_per_item == 0 {
            return Err(ConfigError::Invalid {
                var: "SPLIT_MAX_SHIPMENTS",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", get("PORT"), 3000)?,
            log_level: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            log_format,
            shop,
            webhook_secret: get("WEBHOOK_SECRET"),
            policy,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the client configuration for the store.
    pub fn shop_config(&self) -> ShopConfig {
        let mut config = ShopConfig::for_shop(
            &self.shop.domain,
            &self.shop.api_version,
            self.shop.access_token.clone(),
        );
        config.timeout_secs = self.shop.timeout_secs;
        config.max_retries = self.shop.max_retries;
        config
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: v,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use splitter::{EmptyOrderPolicy, ItemScope, LookupFailurePolicy};

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("SHOP_DOMAIN", "demo.myshopify.com"),
        ("SHOP_ACCESS_TOKEN", "shpat_123"),
    ];

    #[test]
    fn test_default_values() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.shop.api_version, "2024-01");
        assert_eq!(config.shop.timeout_secs, 10);
        assert_eq!(config.shop.max_retries, 2);
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.policy, SplitPolicy::default());
    }

    #[test]
    fn test_addr_formatting() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("HOST", "127.0.0.1"), ("PORT", "8080")]);
        assert_eq!(load(&pairs).unwrap().addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_missing_credentials() {
        assert!(matches!(
            load(&[("SHOP_ACCESS_TOKEN", "x")]),
            Err(ConfigError::Missing("SHOP_DOMAIN"))
        ));
        assert!(matches!(
            load(&[("SHOP_DOMAIN", "x"), ("SHOP_ACCESS_TOKEN", " ")]),
            Err(ConfigError::Missing("SHOP_ACCESS_TOKEN"))
        ));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::Invalid { var: "PORT", .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SHOP_TIMEOUT_SECS", "0"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::Invalid {
                var: "SHOP_TIMEOUT_SECS",
                ..
            })
        ));
    }

    #[test]
    fn test_policies_and_secret() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("SPLIT_ON_LOOKUP_FAILURE", "skip"),
            ("SPLIT_ITEM_SCOPE", "first"),
            ("SPLIT_EMPTY_ORDERS", "reject"),
            ("SPLIT_MAX_SHIPMENTS", "50"),
            ("WEBHOOK_SECRET", "hush"),
            ("LOG_FORMAT", "json"),
        ]);
        let config = load(&pairs).unwrap();

        assert_eq!(config.policy.on_lookup_failure, LookupFailurePolicy::SkipItem);
        assert_eq!(config.policy.item_scope, ItemScope::FirstItemOnly);
        assert_eq!(config.policy.empty_orders, EmptyOrderPolicy::Reject);
        assert_eq!(config.policy.max_shipments_per_item, 50);
        assert_eq!(config.webhook_secret.as_deref(), Some("hush"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_zero_shipment_limit_is_invalid() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SPLIT_MAX_SHIPMENTS", "0"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::Invalid {
                var: "SPLIT_MAX_SHIPMENTS",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_policy_is_an_error() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SPLIT_ITEM_SCOPE", "some"));
        assert!(matches!(load(&pairs), Err(ConfigError::Policy(_))));
    }

    #[test]
    fn test_shop_config_and_redaction() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("SHOP_MAX_RETRIES", "5"), ("WEBHOOK_SECRET", "hush")]);
        let config = load(&pairs).unwrap();

        let shop = config.shop_config();
        assert_eq!(shop.base_url, "https://demo.myshopify.com/admin/api/2024-01");
        assert_eq!(shop.max_retries, 5);

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("shpat_123"));
        assert!(!rendered.contains("hush"));
    }
}
