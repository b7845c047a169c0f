//! PaymentDispatcher - Environment-scoped payment intent creation.

use std::sync::Arc;

use reqwest::Url;

use crate::domain::foundation::{TenantId, Timestamp};
use crate::domain::integration::{Amount, GatewayEnvironment, IntegrationError};
use crate::ports::{CredentialStore, PaymentGateway, PaymentIntent, PaymentIntentRequest};

const DEFAULT_PAYER_NAME: &str = "Customer";
const DEFAULT_PAYER_EMAIL: &str = "customer@example.com";

/// Command to create a payment intent for a tenant's checkout.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntentCommand {
    pub tenant_id: TenantId,
    /// Raw caller-supplied mode; must be exactly `live` or `test`.
    pub mode: Option<String>,
    pub amount: Amount,
    pub currency: Option<String>,
    pub order_id: Option<String>,
    pub payer_name: Option<String>,
    pub payer_email: Option<String>,
}

/// Selects the environment's credentials and calls the gateway once.
///
/// Failures are returned as-is; a payment intent is never retried.
pub struct PaymentDispatcher {
    store: Arc<dyn CredentialStore>,
    gateway: Arc<dyn PaymentGateway>,
    frontend_url: String,
}

impl PaymentDispatcher {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        gateway: Arc<dyn PaymentGateway>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePaymentIntentCommand,
    ) -> Result<PaymentIntent, IntegrationError> {
        // 1. Resolve environment before touching anything else
        let environment = GatewayEnvironment::from_mode(cmd.mode.as_deref())?;

        // 2. Select that environment's credentials
        let record = self
            .store
            .find_by_tenant(&cmd.tenant_id)
            .await?
            .ok_or_else(|| IntegrationError::TenantNotFound(cmd.tenant_id.clone()))?;

        let scoped = record.gateway_credentials.get(environment);
        let credentials = scoped.usable().ok_or_else(|| {
            IntegrationError::credentials_incomplete(environment, &scoped.missing_fields())
        })?;

        // 3. Build the gateway request
        let request = PaymentIntentRequest {
            amount: cmd.amount,
            currency: cmd.currency,
            order_number: cmd
                .order_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("ORDER-{}", Timestamp::now().as_unix_millis())),
            payer_name: cmd
                .payer_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PAYER_NAME.to_string()),
            payer_email: cmd
                .payer_email
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PAYER_EMAIL.to_string()),
            return_url: self.return_url(&cmd.tenant_id)?,
        };

        // 4. Single gateway call
        match self
            .gateway
            .create_payment_intent(environment, &credentials, &request)
            .await
        {
            Ok(intent) => {
                tracing::info!(
                    tenant_id = %cmd.tenant_id,
                    environment = %environment,
                    order_number = %request.order_number,
                    transaction_id = %intent.transaction_id,
                    "payment intent created"
                );
                Ok(intent)
            }
            Err(e) => {
                tracing::warn!(
                    tenant_id = %cmd.tenant_id,
                    environment = %environment,
                    error = %e,
                    "payment intent failed"
                );
                let code = e
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                Err(IntegrationError::dispatch(code, e.message))
            }
        }
    }

    fn return_url(&self, tenant_id: &TenantId) -> Result<String, IntegrationError> {
        Url::parse_with_params(
            &format!("{}/payment-iframe", self.frontend_url),
            &[("location_id", tenant_id.as_str())],
        )
        .map(String::from)
        .map_err(|e| IntegrationError::Infrastructure(format!("Invalid frontend URL: {}", e)))
    }
}
