//! Error taxonomy for the integration.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, TenantId, ValidationError};

use super::GatewayEnvironment;

/// Authorization-code exchange and token refresh failures.
///
/// All variants are terminal for the current session: the tenant has to
/// authorize again. `Clone` so a single refresh outcome can be handed to
/// every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization code is missing")]
    MissingCode,

    #[error("Authorization exchange rejected: {message}")]
    ExchangeRejected { status: Option<u16>, message: String },

    #[error("Token response is incomplete: {0}")]
    InvalidGrant(String),

    #[error("Tenant {0} has no usable authorization")]
    NotAuthorized(TenantId),

    #[error("Token refresh failed: {message}")]
    RefreshFailed { message: String },

    #[error("Token refresh timed out")]
    RefreshTimedOut,

    #[error("Token storage failed: {0}")]
    Storage(String),
}

impl AuthError {
    /// Code carried on the install-failed redirect.
    pub fn redirect_code(&self) -> String {
        match self {
            AuthError::MissingCode => "NO_CODE".to_string(),
            AuthError::ExchangeRejected {
                status: Some(status),
                ..
            } => status.to_string(),
            _ => "UNKNOWN_ERROR".to_string(),
        }
    }
}

/// Every failure the orchestrators surface to their callers.
#[derive(Debug, Clone, Error)]
pub enum IntegrationError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{environment} credentials incomplete, missing: {}", .missing.join(", "))]
    CredentialsIncomplete {
        environment: GatewayEnvironment,
        missing: Vec<String>,
    },

    #[error("Payment mode must be exactly \"live\" or \"test\"")]
    AmbiguousEnvironment { provided: Option<String> },

    #[error("Gateway rejected payment: {message}")]
    Dispatch { code: String, message: String },

    #[error("Provider registration failed: {reason}")]
    RegistrationFailed { reason: String },

    #[error("Provider configuration failed: {reason}")]
    ConfigFailed { reason: String },

    #[error("Provider deregistration failed: {reason}")]
    DeregistrationFailed { reason: String },

    #[error("Invalid event: {reason}")]
    InvalidEvent { reason: String },

    #[error("Tenant not found: {0}")]
    TenantNotFound(TenantId),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),
}

impl IntegrationError {
    pub fn ambiguous_environment(provided: Option<&str>) -> Self {
        IntegrationError::AmbiguousEnvironment {
            provided: provided.map(str::to_string),
        }
    }

    pub fn credentials_incomplete(environment: GatewayEnvironment, missing: &[&str]) -> Self {
        IntegrationError::CredentialsIncomplete {
            environment,
            missing: missing.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn dispatch(code: impl Into<String>, message: impl Into<String>) -> Self {
        IntegrationError::Dispatch {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid_event(reason: impl Into<String>) -> Self {
        IntegrationError::InvalidEvent {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        IntegrationError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            IntegrationError::Auth(_) => "AUTH_ERROR",
            IntegrationError::CredentialsIncomplete { .. } => "CREDENTIALS_INCOMPLETE",
            IntegrationError::AmbiguousEnvironment { .. } => "AMBIGUOUS_ENVIRONMENT",
            IntegrationError::Dispatch { .. } => "DISPATCH_ERROR",
            IntegrationError::RegistrationFailed { .. } => "REGISTRATION_FAILED",
            IntegrationError::ConfigFailed { .. } => "CONFIG_FAILED",
            IntegrationError::DeregistrationFailed { .. } => "DEREGISTRATION_FAILED",
            IntegrationError::InvalidEvent { .. } => "INVALID_EVENT",
            IntegrationError::TenantNotFound(_) => "TENANT_NOT_FOUND",
            IntegrationError::Validation { .. } => "VALIDATION_FAILED",
            IntegrationError::Infrastructure(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for IntegrationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => IntegrationError::Validation {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "request".to_string()),
                message: err.message,
            },
            _ => IntegrationError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for IntegrationError {
    fn from(err: ValidationError) -> Self {
        IntegrationError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_code_prefers_upstream_status() {
        let err = AuthError::ExchangeRejected {
            status: Some(401),
            message: "invalid_grant".into(),
        };
        assert_eq!(err.redirect_code(), "401");
        assert_eq!(AuthError::MissingCode.redirect_code(), "NO_CODE");
        assert_eq!(
            AuthError::ExchangeRejected {
                status: None,
                message: "connection reset".into()
            }
            .redirect_code(),
            "UNKNOWN_ERROR"
        );
    }

    #[test]
    fn credentials_incomplete_lists_missing_fields() {
        let err = IntegrationError::credentials_incomplete(
            GatewayEnvironment::Live,
            &["personal_access_token", "portal_key"],
        );
        assert_eq!(
            err.to_string(),
            "live credentials incomplete, missing: personal_access_token, portal_key"
        );
        assert_eq!(err.code(), "CREDENTIALS_INCOMPLETE");
    }

    #[test]
    fn database_errors_become_infrastructure() {
        let err: IntegrationError = DomainError::database("pool timed out").into();
        assert!(matches!(err, IntegrationError::Infrastructure(_)));
    }

    #[test]
    fn validation_errors_keep_field() {
        let err: IntegrationError = ValidationError::empty_field("tenant_id").into();
        match err {
            IntegrationError::Validation { field, .. } => assert_eq!(field, "tenant_id"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
