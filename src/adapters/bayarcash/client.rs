//! BayarCash payment gateway client.
//!
//! Implements `PaymentGateway` against the BayarCash v3 API. Each
//! environment has its own fixed base URL; the environment's personal
//! access token is the bearer credential.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::domain::integration::{GatewayEnvironment, UsableCredentials};
use crate::ports::{GatewayError, PaymentGateway, PaymentIntent, PaymentIntentRequest};

use super::wire::{error_message, PaymentIntentBody, PaymentIntentResponse};

/// FPX online banking; the hosted checkout lets the payer pick a bank.
pub const DEFAULT_PAYMENT_CHANNEL: u32 = 1;

/// BayarCash API configuration.
#[derive(Debug, Clone)]
pub struct BayarCashConfig {
    live_base_url: String,
    test_base_url: String,
    payment_channel: u32,
    timeout: Duration,
}

impl Default for BayarCashConfig {
    fn default() -> Self {
        Self {
            live_base_url: "https://api.console.bayar.cash/v3".to_string(),
            test_base_url: "https://api.console.bayarcash-sandbox.com/v3".to_string(),
            payment_channel: DEFAULT_PAYMENT_CHANNEL,
            timeout: Duration::from_secs(20),
        }
    }
}

impl BayarCashConfig {
    /// Override both environments' base URLs.
    pub fn with_base_urls(mut self, live: impl Into<String>, test: impl Into<String>) -> Self {
        self.live_base_url = live.into().trim_end_matches('/').to_string();
        self.test_base_url = test.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_payment_channel(mut self, channel: u32) -> Self {
        self.payment_channel = channel;
        self
    }

    /// Bound every outbound call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL for an environment.
    pub fn base_url(&self, environment: GatewayEnvironment) -> &str {
        match environment {
            GatewayEnvironment::Live => &self.live_base_url,
            GatewayEnvironment::Test => &self.test_base_url,
        }
    }
}

/// BayarCash gateway adapter.
pub struct BayarCashClient {
    config: BayarCashConfig,
    http_client: reqwest::Client,
}

impl BayarCashClient {
    pub fn new(config: BayarCashConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for BayarCashClient {
    async fn create_payment_intent(
        &self,
        environment: GatewayEnvironment,
        credentials: &UsableCredentials,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        let url = format!("{}/payment-intents", self.config.base_url(environment));

        let body = PaymentIntentBody {
            payment_channel: self.config.payment_channel,
            portal_key: &credentials.portal_key,
            order_number: &request.order_number,
            amount: &request.amount,
            payer_name: &request.payer_name,
            payer_email: &request.payer_email,
            return_url: &request.return_url,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(credentials.personal_access_token.expose_secret())
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&text)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Payment failed".to_string());
            tracing::warn!(
                environment = %environment,
                status = status.as_u16(),
                "BayarCash rejected payment intent"
            );
            return Err(GatewayError::from_status(status.as_u16(), message));
        }

        let parsed: PaymentIntentResponse = serde_json::from_str(&text).map_err(|e| {
            GatewayError::invalid_response(format!("Failed to parse BayarCash response: {}", e))
        })?;

        let payment_url = parsed
            .checkout_url()
            .ok_or_else(|| GatewayError::invalid_response("Response has no payment URL"))?
            .to_string();
        let transaction_id = parsed
            .transaction_id()
            .ok_or_else(|| GatewayError::invalid_response("Response has no transaction id"))?;

        Ok(PaymentIntent {
            payment_url,
            transaction_id,
        })
    }
}
