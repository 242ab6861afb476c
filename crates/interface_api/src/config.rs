//! API configuration

use std::str::FromStr;

use core_kernel::Currency;
use serde::Deserialize;

/// API configuration
///
/// Loaded from `API_`-prefixed environment variables; any field not set
/// keeps its default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// HS256 secret for signing bearer tokens
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Maximum pool connections
    pub database_max_connections: u32,
    /// Log level
    pub log_level: String,
    /// ISO code used when a request names no currency
    pub default_currency: String,
    /// Shared secret the OAuth front end presents on Google sign-in;
    /// the route refuses every call while unset
    pub oauth_proxy_secret: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/splitledger".to_string(),
            database_max_connections: 10,
            log_level: "info".to_string(),
            default_currency: "USD".to_string(),
            oauth_proxy_secret: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses `default_currency`, falling back to USD for an unknown code
    pub fn currency(&self) -> Currency {
        Currency::from_str(&self.default_currency).unwrap_or(Currency::USD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.currency(), Currency::USD);
        assert!(config.oauth_proxy_secret.is_none());
    }

    #[test]
    fn test_currency_parsing() {
        let config = ApiConfig {
            default_currency: "eur".into(),
            ..ApiConfig::default()
        };
        assert_eq!(config.currency(), Currency::EUR);

        let config = ApiConfig {
            default_currency: "???".into(),
            ..ApiConfig::default()
        };
        assert_eq!(config.currency(), Currency::USD);
    }
}
