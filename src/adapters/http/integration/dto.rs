//! HTTP DTOs for the integration endpoints.
//!
//! Field names follow what the platform and the settings UI actually send;
//! aliases cover both the snake_case and camelCase spellings in use.

use serde::{Deserialize, Serialize};

use crate::domain::integration::{Amount, EnvironmentCredentials, PlatformKeys};
use crate::ports::PaymentIntent;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// `GET /oauth/callback?code=...`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
}

/// `?locationId=...` on platform-initiated provider calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationQuery {
    #[serde(rename = "locationId", alias = "location_id")]
    pub location_id: Option<String>,
}

/// Uninstall webhook body.
#[derive(Debug, Clone, Deserialize)]
pub struct UninstallWebhookRequest {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    #[serde(alias = "companyId")]
    pub account_id: Option<String>,
    #[serde(alias = "locationId")]
    pub tenant_id: Option<String>,
    #[serde(default, alias = "appId")]
    pub app_id: Option<String>,
}

/// Checkout request from the payment iframe.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessPaymentRequest {
    #[serde(alias = "locationId")]
    pub tenant_id: Option<String>,
    pub amount: Option<Amount>,
    pub currency: Option<String>,
    #[serde(alias = "orderId")]
    pub order_id: Option<String>,
    #[serde(alias = "customerName")]
    pub customer_name: Option<String>,
    #[serde(alias = "customerEmail")]
    pub customer_email: Option<String>,
    pub mode: Option<String>,
}

/// One environment's credentials as entered in the settings UI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsInput {
    #[serde(alias = "personal_access_token")]
    pub pat: Option<String>,
    #[serde(alias = "api_secret_key")]
    pub api_key: Option<String>,
    pub portal_key: Option<String>,
}

impl From<CredentialsInput> for EnvironmentCredentials {
    fn from(input: CredentialsInput) -> Self {
        EnvironmentCredentials::new(input.pat, input.api_key, input.portal_key)
    }
}

/// Settings save, nested (`live`/`test` objects) or flat
/// (`bayarcash_pat_live`, ...). Nested values win when both are sent.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveSettingsRequest {
    #[serde(alias = "location_id", alias = "locationId")]
    pub tenant_id: Option<String>,
    pub live: Option<CredentialsInput>,
    pub test: Option<CredentialsInput>,

    pub bayarcash_pat_live: Option<String>,
    pub bayarcash_api_key_live: Option<String>,
    pub bayarcash_portal_key_live: Option<String>,
    pub bayarcash_pat_test: Option<String>,
    pub bayarcash_api_key_test: Option<String>,
    pub bayarcash_portal_key_test: Option<String>,
}

impl SaveSettingsRequest {
    /// Credentials per environment; `None` when the request carries nothing for it.
    pub fn environments(
        self,
    ) -> (Option<EnvironmentCredentials>, Option<EnvironmentCredentials>) {
        let live = self.live.or_else(|| {
            flat(
                self.bayarcash_pat_live,
                self.bayarcash_api_key_live,
                self.bayarcash_portal_key_live,
            )
        });
        let test = self.test.or_else(|| {
            flat(
                self.bayarcash_pat_test,
                self.bayarcash_api_key_test,
                self.bayarcash_portal_key_test,
            )
        });
        (live.map(Into::into), test.map(Into::into))
    }
}

fn flat(
    pat: Option<String>,
    api_key: Option<String>,
    portal_key: Option<String>,
) -> Option<CredentialsInput> {
    if pat.is_none() && api_key.is_none() && portal_key.is_none() {
        return None;
    }
    Some(CredentialsInput {
        pat,
        api_key,
        portal_key,
    })
}

/// Keys for one environment, pushed from the platform's provider config page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderKeysInput {
    pub api_key: Option<String>,
    pub publishable_key: Option<String>,
}

impl From<ProviderKeysInput> for PlatformKeys {
    fn from(input: ProviderKeysInput) -> Self {
        PlatformKeys::new(input.api_key, input.publishable_key)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectProviderRequest {
    pub live: Option<ProviderKeysInput>,
    pub test: Option<ProviderKeysInput>,
}

/// Payment status query from the platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQueryRequest {
    #[serde(rename = "type")]
    pub query_type: Option<String>,
    pub charge_id: Option<String>,
    pub transaction_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub payment_url: String,
    pub transaction_id: String,
}

impl From<PaymentIntent> for PaymentIntentResponse {
    fn from(intent: PaymentIntent) -> Self {
        Self {
            payment_url: intent.payment_url,
            transaction_id: intent.transaction_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettingsResponse {
    pub success: bool,
    /// False when neither environment had a complete key pair to push.
    pub provider_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum UninstallResponse {
    Tenant { tenant_id: String, removed: usize },
    Account { account_id: String, removed: usize },
}

/// Answer to a `verify` payment query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentQueryResponse {
    Success(bool),
    Failed(bool),
}

impl PaymentQueryResponse {
    pub fn verified() -> Self {
        PaymentQueryResponse::Success(true)
    }

    pub fn unverified() -> Self {
        PaymentQueryResponse::Failed(true)
    }
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_accept_nested_shape() {
        let request: SaveSettingsRequest = serde_json::from_value(json!({
            "tenant_id": "T1",
            "test": {"pat": "p", "api_key": "k", "portal_key": "pk"}
        }))
        .unwrap();
        let (live, test) = request.environments();
        assert!(live.is_none());
        assert!(test.unwrap().is_usable());
    }

    #[test]
    fn settings_accept_flat_form_shape() {
        let request: SaveSettingsRequest = serde_json::from_value(json!({
            "location_id": "T1",
            "bayarcash_pat_live": "p",
            "bayarcash_api_key_live": "k",
            "bayarcash_portal_key_live": "pk",
            "bayarcash_pat_test": ""
        }))
        .unwrap();
        assert_eq!(request.tenant_id.as_deref(), Some("T1"));
        let (live, test) = request.environments();
        assert!(live.unwrap().is_usable());
        assert!(test.unwrap().is_empty());
    }

    #[test]
    fn process_payment_accepts_platform_field_names() {
        let request: ProcessPaymentRequest = serde_json::from_value(json!({
            "locationId": "T1",
            "amount": 5,
            "currency": "MYR",
            "orderId": "ord-1",
            "customer_name": "Aina",
            "customer_email": "aina@example.com",
            "mode": "test"
        }))
        .unwrap();
        assert_eq!(request.tenant_id.as_deref(), Some("T1"));
        assert_eq!(request.order_id.as_deref(), Some("ord-1"));
        assert_eq!(request.amount.unwrap().to_string(), "5");
    }

    #[test]
    fn uninstall_accepts_platform_field_names() {
        let request: UninstallWebhookRequest = serde_json::from_value(json!({
            "type": "UNINSTALL",
            "companyId": "A1",
            "appId": "app"
        }))
        .unwrap();
        assert_eq!(request.account_id.as_deref(), Some("A1"));
        assert!(request.tenant_id.is_none());
    }

    #[test]
    fn payment_query_answers_serialize_as_flags() {
        assert_eq!(
            serde_json::to_value(PaymentQueryResponse::unverified()).unwrap(),
            json!({"failed": true})
        );
        assert_eq!(
            serde_json::to_value(PaymentQueryResponse::verified()).unwrap(),
            json!({"success": true})
        );
    }
}
