//! Payment gateway (BayarCash) configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::check_public_url;
use crate::adapters::bayarcash::{BayarCashConfig, DEFAULT_PAYMENT_CHANNEL};

/// Gateway endpoints and the payment-query policy.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_live_base_url")]
    pub live_base_url: String,

    #[serde(default = "default_test_base_url")]
    pub test_base_url: String,

    /// Outbound call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_payment_channel")]
    pub payment_channel: u32,

    /// Answer payment queries with success without upstream verification.
    /// Off by default: queries are answered as failed.
    #[serde(default)]
    pub trust_unverified_charges: bool,
}

impl GatewayConfig {
    pub fn client_config(&self) -> BayarCashConfig {
        BayarCashConfig::default()
            .with_base_urls(self.live_base_url.clone(), self.test_base_url.clone())
            .with_payment_channel(self.payment_channel)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        // Gateway endpoints are always HTTPS, even outside production
        check_public_url(&self.live_base_url, "GATEWAY__LIVE_BASE_URL", true)?;
        check_public_url(&self.test_base_url, "GATEWAY__TEST_BASE_URL", true)?;
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("gateway calls"));
        }
        if self.payment_channel == 0 {
            return Err(ValidationError::InvalidPaymentChannel);
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            live_base_url: default_live_base_url(),
            test_base_url: default_test_base_url(),
            timeout_secs: default_timeout(),
            payment_channel: default_payment_channel(),
            trust_unverified_charges: false,
        }
    }
}

fn default_live_base_url() -> String {
    "https://api.console.bayar.cash/v3".to_string()
}

fn default_test_base_url() -> String {
    "https://api.console.bayarcash-sandbox.com/v3".to_string()
}

fn default_timeout() -> u64 {
    20
}

fn default_payment_channel() -> u32 {
    DEFAULT_PAYMENT_CHANNEL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::integration::GatewayEnvironment;

    #[test]
    fn test_defaults_are_valid_and_fail_closed() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.trust_unverified_charges);
    }

    #[test]
    fn test_client_config_routes_environments() {
        let config = GatewayConfig {
            live_base_url: "https://live.example.com/v3/".to_string(),
            test_base_url: "https://sandbox.example.com/v3".to_string(),
            ..Default::default()
        };
        let client = config.client_config();
        assert_eq!(client.base_url(GatewayEnvironment::Live), "https://live.example.com/v3");
        assert_eq!(client.base_url(GatewayEnvironment::Test), "https://sandbox.example.com/v3");
    }

    #[test]
    fn test_plain_http_endpoint_is_rejected() {
        let config = GatewayConfig {
            test_base_url: "http://sandbox.example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MustBeHttps("GATEWAY__TEST_BASE_URL"))
        ));
    }

    #[test]
    fn test_zero_channel_is_rejected() {
        let config = GatewayConfig {
            payment_channel: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
