//! Tenant-supplied gateway credentials, scoped per environment.
//!
//! Each environment holds a triple (personal access token, API secret key,
//! portal key). Fields stay optional until configured; only a complete triple
//! is ever handed to the gateway. The platform only ever sees the reduced
//! `{api_key, publishable_key}` summary, never the personal access token.

use secrecy::SecretString;
use serde::Serialize;
use std::fmt;

use super::GatewayEnvironment;

/// Credential triple for one environment; any field may be missing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvironmentCredentials {
    pub personal_access_token: Option<String>,
    pub api_secret_key: Option<String>,
    pub portal_key: Option<String>,
}

impl EnvironmentCredentials {
    /// Builds a credential set, treating blank values as absent.
    pub fn new(
        personal_access_token: Option<String>,
        api_secret_key: Option<String>,
        portal_key: Option<String>,
    ) -> Self {
        Self {
            personal_access_token: non_blank(personal_access_token),
            api_secret_key: non_blank(api_secret_key),
            portal_key: non_blank(portal_key),
        }
    }

    /// True when all three fields are present.
    pub fn is_usable(&self) -> bool {
        self.usable().is_some()
    }

    /// True when nothing has been configured.
    pub fn is_empty(&self) -> bool {
        self.personal_access_token.is_none()
            && self.api_secret_key.is_none()
            && self.portal_key.is_none()
    }

    /// The complete triple, if every field is present.
    pub fn usable(&self) -> Option<UsableCredentials> {
        match (
            &self.personal_access_token,
            &self.api_secret_key,
            &self.portal_key,
        ) {
            (Some(pat), Some(secret), Some(portal)) => Some(UsableCredentials {
                personal_access_token: SecretString::new(pat.clone()),
                api_secret_key: SecretString::new(secret.clone()),
                portal_key: portal.clone(),
            }),
            _ => None,
        }
    }

    /// Names of the fields still missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.personal_access_token.is_none() {
            missing.push("personal_access_token");
        }
        if self.api_secret_key.is_none() {
            missing.push("api_secret_key");
        }
        if self.portal_key.is_none() {
            missing.push("portal_key");
        }
        missing
    }

    /// Platform-facing projection; requires both API key and portal key.
    pub fn key_summary(&self) -> Option<ProviderKeySummary> {
        match (&self.api_secret_key, &self.portal_key) {
            (Some(api_key), Some(portal_key)) => Some(ProviderKeySummary {
                api_key: api_key.clone(),
                publishable_key: portal_key.clone(),
            }),
            _ => None,
        }
    }

    /// Replaces the API key and portal key, keeping the personal access token.
    pub fn with_platform_keys(&self, keys: &PlatformKeys) -> Self {
        Self::new(
            self.personal_access_token.clone(),
            keys.api_key.clone(),
            keys.publishable_key.clone(),
        )
    }
}

/// API key and portal key for one environment, as the platform sends them.
///
/// The platform never holds the personal access token, so recording these
/// must leave it as stored.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PlatformKeys {
    pub api_key: Option<String>,
    pub publishable_key: Option<String>,
}

impl PlatformKeys {
    /// Builds a key pair, treating blank values as absent.
    pub fn new(api_key: Option<String>, publishable_key: Option<String>) -> Self {
        Self {
            api_key: non_blank(api_key),
            publishable_key: non_blank(publishable_key),
        }
    }
}

impl fmt::Debug for PlatformKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformKeys")
            .field("api_key_set", &self.api_key.is_some())
            .field("publishable_key", &self.publishable_key)
            .finish()
    }
}

impl fmt::Debug for EnvironmentCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentCredentials")
            .field("personal_access_token_set", &self.personal_access_token.is_some())
            .field("api_secret_key_set", &self.api_secret_key.is_some())
            .field("portal_key", &self.portal_key)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A complete credential triple, the only form accepted by the gateway port.
#[derive(Debug, Clone)]
pub struct UsableCredentials {
    pub personal_access_token: SecretString,
    pub api_secret_key: SecretString,
    pub portal_key: String,
}

/// Credentials for both environments of a tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayCredentials {
    pub live: EnvironmentCredentials,
    pub test: EnvironmentCredentials,
}

impl GatewayCredentials {
    pub fn get(&self, environment: GatewayEnvironment) -> &EnvironmentCredentials {
        match environment {
            GatewayEnvironment::Live => &self.live,
            GatewayEnvironment::Test => &self.test,
        }
    }

    pub fn set(&mut self, environment: GatewayEnvironment, credentials: EnvironmentCredentials) {
        match environment {
            GatewayEnvironment::Live => self.live = credentials,
            GatewayEnvironment::Test => self.test = credentials,
        }
    }

    /// Summaries of every environment whose keys are complete.
    pub fn connect_payload(&self) -> ConnectPayload {
        ConnectPayload {
            live: self.live.key_summary(),
            test: self.test.key_summary(),
        }
    }
}

/// Reduced projection of an environment's keys sent to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderKeySummary {
    pub api_key: String,
    pub publishable_key: String,
}

/// Body of the platform's provider "connect" call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<ProviderKeySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<ProviderKeySummary>,
}

impl ConnectPayload {
    /// True when neither environment has a complete summary.
    pub fn is_empty(&self) -> bool {
        self.live.is_none() && self.test.is_none()
    }
}
