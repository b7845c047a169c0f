//! Platform (LeadConnector) configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::{check_public_url, ServerConfig};
use crate::adapters::leadconnector::LeadConnectorConfig;
use crate::ports::ProviderListing;

/// OAuth app credentials, API endpoints and the provider listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    pub client_id: String,

    pub client_secret: SecretString,

    /// Must match the redirect URI registered with the OAuth app
    pub redirect_uri: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Value of the `Version` header on API calls
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Outbound call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Upper bound on a token refresh, including the grant call
    #[serde(default = "default_refresh_timeout")]
    pub refresh_timeout_secs: u64,

    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    #[serde(default = "default_provider_description")]
    pub provider_description: String,
}

impl PlatformConfig {
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    pub fn client_config(&self) -> LeadConnectorConfig {
        LeadConnectorConfig::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.redirect_uri.clone(),
        )
        .with_token_url(self.token_url.clone())
        .with_api_base_url(self.api_base_url.clone())
        .with_api_version(self.api_version.clone())
        .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    /// Listing registered for each tenant, pointing back at this deployment.
    pub fn provider_listing(&self, server: &ServerConfig) -> ProviderListing {
        ProviderListing::for_deployment(
            self.provider_name.clone(),
            self.provider_description.clone(),
            &server.frontend_url,
            &server.backend_url,
        )
    }

    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("PLATFORM__CLIENT_ID"));
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PLATFORM__CLIENT_SECRET"));
        }
        check_public_url(&self.redirect_uri, "PLATFORM__REDIRECT_URI", production)?;
        check_public_url(&self.token_url, "PLATFORM__TOKEN_URL", production)?;
        check_public_url(&self.api_base_url, "PLATFORM__API_BASE_URL", production)?;
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("platform calls"));
        }
        if self.refresh_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("token refresh"));
        }
        Ok(())
    }
}

fn default_token_url() -> String {
    "https://services.leadconnectorhq.com/oauth/token".to_string()
}

fn default_api_base_url() -> String {
    "https://services.leadconnectorhq.com".to_string()
}

fn default_api_version() -> String {
    "2021-07-28".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_refresh_timeout() -> u64 {
    20
}

fn default_provider_name() -> String {
    "BayarCash Payment Integration".to_string()
}

fn default_provider_description() -> String {
    "Accept payments in Malaysia via BayarCash - supports FPX, credit/debit cards, and e-wallets."
        .to_string()
}
