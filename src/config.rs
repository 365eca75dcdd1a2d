//! Runtime configuration
//!
//! Defaults are usable as-is. A JSON document may override any subset of
//! fields, and `SLIMVITA_*` environment variables override both.

use crate::error::FunnelError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client-side bound on each avatar request
pub const DEFAULT_AVATAR_TIMEOUT_MS: u64 = 2_500;

pub const DEFAULT_AVATAR_ENDPOINT: &str =
    "https://api.slimvita.com/functions/v1/generate-body-avatar";

/// Avatar generation endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    pub endpoint: String,
    /// Sent as a bearer token when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AVATAR_ENDPOINT.to_string(),
            api_key: None,
            timeout_ms: DEFAULT_AVATAR_TIMEOUT_MS,
        }
    }
}

impl AvatarConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// External checkout page per plan tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub basic_url: String,
    pub pro_url: String,
    pub premium_url: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            basic_url: "https://checkout.slimvita.com/basic".to_string(),
            pro_url: "https://checkout.slimvita.com/pro".to_string(),
            premium_url: "https://checkout.slimvita.com/premium".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunnelConfig {
    pub avatar: AvatarConfig,
    pub checkout: CheckoutConfig,
}

impl FunnelConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json(json: &str) -> Result<Self, FunnelError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, FunnelError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `SLIMVITA_*` overrides from an arbitrary lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, FunnelError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("SLIMVITA_AVATAR_ENDPOINT") {
            self.avatar.endpoint = endpoint;
        }
        if let Some(key) = lookup("SLIMVITA_AVATAR_API_KEY") {
            self.avatar.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(raw) = lookup("SLIMVITA_AVATAR_TIMEOUT_MS") {
            self.avatar.timeout_ms = raw.trim().parse().map_err(|_| {
                FunnelError::ConfigError(format!("SLIMVITA_AVATAR_TIMEOUT_MS is not a number: {raw}"))
            })?;
        }
        if let Some(url) = lookup("SLIMVITA_CHECKOUT_BASIC_URL") {
            self.checkout.basic_url = url;
        }
        if let Some(url) = lookup("SLIMVITA_CHECKOUT_PRO_URL") {
            self.checkout.pro_url = url;
        }
        if let Some(url) = lookup("SLIMVITA_CHECKOUT_PREMIUM_URL") {
            self.checkout.premium_url = url;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), FunnelError> {
        if self.avatar.timeout_ms == 0 {
            return Err(FunnelError::ConfigError(
                "avatar timeout must be positive".to_string(),
            ));
        }
        if !self.avatar.endpoint.starts_with("http") {
            return Err(FunnelError::ConfigError(format!(
                "avatar endpoint is not an http(s) url: {}",
                self.avatar.endpoint
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = FunnelConfig::default();
        assert_eq!(config.avatar.timeout(), Duration::from_millis(2_500));
        assert!(config.avatar.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = FunnelConfig::from_json(r#"{"avatar": {"timeout_ms": 4000}}"#).unwrap();

        assert_eq!(config.avatar.timeout_ms, 4000);
        assert_eq!(config.avatar.endpoint, DEFAULT_AVATAR_ENDPOINT);
        assert_eq!(config.checkout, CheckoutConfig::default());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = FunnelConfig::from_json(r#"{"avatar": {"timeout_ms": 0}}"#).unwrap_err();
        assert!(matches!(err, FunnelError::ConfigError(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SLIMVITA_AVATAR_API_KEY", "secret"),
            ("SLIMVITA_AVATAR_TIMEOUT_MS", "1200"),
            ("SLIMVITA_CHECKOUT_PRO_URL", "https://pay.example.com/pro"),
        ]
        .into_iter()
        .collect();

        let config = FunnelConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.avatar.api_key.as_deref(), Some("secret"));
        assert_eq!(config.avatar.timeout_ms, 1200);
        assert_eq!(config.checkout.pro_url, "https://pay.example.com/pro");
        assert_eq!(config.checkout.basic_url, "https://checkout.slimvita.com/basic");
    }

    #[test]
    fn test_bad_timeout_override() {
        let result = FunnelConfig::default().with_overrides(|key| {
            (key == "SLIMVITA_AVATAR_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }
}
