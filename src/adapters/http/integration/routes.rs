//! Axum router configuration for the integration endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    connect_provider, deregister_provider, health, oauth_callback, payment_query,
    process_payment, save_settings, uninstall_webhook, IntegrationAppState,
};

/// Create the integration router.
///
/// # Routes
///
/// ## Platform
/// - `GET /oauth/callback` - Authorization code exchange, then redirect
/// - `POST /webhook/uninstall` - Tenant or account uninstall
/// - `POST /payments/custom-provider/connect` - Keys from the provider config page
/// - `DELETE /payments/custom-provider/provider` - Deregister and clear credentials
/// - `POST /api/bayarcash-query` - Charge verification (listed as the provider query URL)
/// - `POST /api/payment-query` - Same handler under its older path
///
/// ## UI
/// - `POST /api/process-payment` - Create a payment intent
/// - `POST /api/settings` - Save gateway credentials and push them to the platform
///
/// - `GET /health`
pub fn integration_router() -> Router<IntegrationAppState> {
    Router::new()
        .route("/health", get(health))
        .route("/oauth/callback", get(oauth_callback))
        .route("/webhook/uninstall", post(uninstall_webhook))
        .route("/payments/custom-provider/connect", post(connect_provider))
        .route("/payments/custom-provider/provider", delete(deregister_provider))
        .route("/api/bayarcash-query", post(payment_query))
        .route("/api/payment-query", post(payment_query))
        .route("/api/process-payment", post(process_payment))
        .route("/api/settings", post(save_settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::adapters::bayarcash::MockPaymentGateway;
    use crate::adapters::http::integration::IntegrationSettings;
    use crate::adapters::leadconnector::MockPlatformClient;
    use crate::adapters::memory::InMemoryCredentialStore;
    use crate::ports::ProviderListing;

    #[test]
    fn integration_router_creates_router() {
        let state = IntegrationAppState::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(MockPlatformClient::new()),
            Arc::new(MockPaymentGateway::new()),
            IntegrationSettings {
                frontend_url: "https://app.example.com".into(),
                listing: ProviderListing::for_deployment("BayarCash", "FPX", "https://app", "https://api"),
                refresh_timeout: Duration::from_secs(1),
                trust_unverified_charges: false,
            },
        );
        let _: Router<()> = integration_router().with_state(state);
    }
}
