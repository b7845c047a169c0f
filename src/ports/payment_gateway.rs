//! Payment gateway port.
//!
//! Creates hosted-checkout payment intents. Calls are never retried by the
//! caller, so implementations must not retry either.

use crate::domain::integration::{Amount, GatewayEnvironment, UsableCredentials};
use async_trait::async_trait;

/// Port for the payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent against the given environment.
    ///
    /// Only a complete credential triple can be passed in; the personal
    /// access token is the bearer credential.
    async fn create_payment_intent(
        &self,
        environment: GatewayEnvironment,
        credentials: &UsableCredentials,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError>;
}

/// Order details for a payment intent.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentRequest {
    /// Major currency units, forwarded verbatim.
    pub amount: Amount,
    pub currency: Option<String>,
    pub order_number: String,
    pub payer_name: String,
    pub payer_email: String,
    pub return_url: String,
}

/// Created intent: where to send the payer, and the gateway's id for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub payment_url: String,
    pub transaction_id: String,
}

/// Errors from gateway calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message, the upstream `message` when present.
    pub message: String,

    /// Upstream HTTP status, if a response was received.
    pub status: Option<u16>,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
        }
    }

    /// Classify an upstream HTTP failure.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            401 | 403 => GatewayErrorCode::AuthenticationError,
            400..=499 => GatewayErrorCode::Rejected,
            _ => GatewayErrorCode::ProviderError,
        };
        Self {
            status: Some(status),
            ..Self::new(code, message)
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    /// Create an error for a response body we could not use.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorCode {
    /// Network connectivity issue or timeout.
    NetworkError,

    /// Personal access token rejected.
    AuthenticationError,

    /// Request rejected as invalid.
    Rejected,

    /// Response body was missing required fields.
    InvalidResponse,

    /// Any other upstream failure.
    ProviderError,
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::Rejected => "rejected",
            GatewayErrorCode::InvalidResponse => "invalid_response",
            GatewayErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
