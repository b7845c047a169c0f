//! Platform client port for the tenant-management platform.
//!
//! Covers the OAuth grants and the custom payment provider endpoints the
//! integration needs. Every provider call is bearer-authenticated with the
//! tenant's current access token; the caller decides what to do on 401.

use crate::domain::foundation::TenantId;
use crate::domain::integration::{ConnectPayload, IssuedTokens, TenantAuthorization};
use async_trait::async_trait;
use serde::Serialize;

/// Port for the platform's OAuth and provider APIs.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Exchange an authorization code for a token bundle.
    async fn exchange_code(&self, code: &str) -> Result<TenantAuthorization, PlatformError>;

    /// Spend a refresh token for a new, rotated token pair.
    async fn refresh_token(&self, refresh_token: &str) -> Result<IssuedTokens, PlatformError>;

    /// List the integration as a payment provider for a tenant.
    async fn register_provider(
        &self,
        tenant_id: &TenantId,
        access_token: &str,
        listing: &ProviderListing,
    ) -> Result<(), PlatformError>;

    /// Push the per-environment key summaries.
    async fn connect_provider(
        &self,
        tenant_id: &TenantId,
        access_token: &str,
        payload: &ConnectPayload,
    ) -> Result<(), PlatformError>;

    /// Remove the payment provider listing for a tenant.
    async fn deregister_provider(
        &self,
        tenant_id: &TenantId,
        access_token: &str,
    ) -> Result<(), PlatformError>;
}

/// Payment provider listing shown to the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderListing {
    pub name: String,
    pub description: String,
    pub payments_url: String,
    pub query_url: String,
    pub config_url: String,
    pub image_url: String,
    pub supports_subscription_schedule: bool,
}

impl ProviderListing {
    /// Listing with URLs derived from the public frontend and backend roots.
    pub fn for_deployment(
        name: impl Into<String>,
        description: impl Into<String>,
        frontend_url: &str,
        backend_url: &str,
    ) -> Self {
        let frontend = frontend_url.trim_end_matches('/');
        let backend = backend_url.trim_end_matches('/');
        Self {
            name: name.into(),
            description: description.into(),
            payments_url: format!("{frontend}/payment-iframe"),
            query_url: format!("{backend}/api/bayarcash-query"),
            config_url: format!("{backend}/payments/custom-provider/connect"),
            image_url: format!("{backend}/public/logo.jpg"),
            supports_subscription_schedule: false,
        }
    }
}

/// Errors from platform calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    /// Error code for categorization.
    pub code: PlatformErrorCode,

    /// Human-readable message, taken from the upstream body when present.
    pub message: String,

    /// Upstream HTTP status, if a response was received.
    pub status: Option<u16>,

    /// Platform's error code (if available).
    pub provider_code: Option<String>,
}

impl PlatformError {
    /// Create a new platform error.
    pub fn new(code: PlatformErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            provider_code: None,
        }
    }

    /// Classify an upstream HTTP failure.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            401 => PlatformErrorCode::Unauthorized,
            400 | 422 => PlatformErrorCode::Rejected,
            404 => PlatformErrorCode::NotFound,
            429 => PlatformErrorCode::RateLimitExceeded,
            _ => PlatformErrorCode::ProviderError,
        };
        Self {
            status: Some(status),
            ..Self::new(code, message)
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::NetworkError, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::Timeout, message)
    }

    /// Create an error for a response body we could not use.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::InvalidResponse, message)
    }

    /// The access token was rejected; the 401 refresh-and-retry rule keys off this.
    pub fn is_unauthorized(&self) -> bool {
        self.code == PlatformErrorCode::Unauthorized
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PlatformError {}

/// Platform error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Outbound call exceeded its timeout.
    Timeout,

    /// Access token rejected (HTTP 401).
    Unauthorized,

    /// Request rejected as invalid.
    Rejected,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Response body was missing required fields.
    InvalidResponse,

    /// Any other upstream failure.
    ProviderError,
}

impl std::fmt::Display for PlatformErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PlatformErrorCode::NetworkError => "network_error",
            PlatformErrorCode::Timeout => "timeout",
            PlatformErrorCode::Unauthorized => "unauthorized",
            PlatformErrorCode::Rejected => "rejected",
            PlatformErrorCode::NotFound => "not_found",
            PlatformErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PlatformErrorCode::InvalidResponse => "invalid_response",
            PlatformErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
