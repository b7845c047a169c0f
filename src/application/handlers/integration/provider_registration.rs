//! ProviderRegistrationWorkflow - Payment provider listing on the platform.
//!
//! Register, configure and deregister all share one rule: a 401 marks the
//! tenant's token stale, the token is refreshed once, and the call is
//! repeated once. Anything after that is terminal.

use std::future::Future;
use std::sync::Arc;

use crate::domain::foundation::TenantId;
use crate::domain::integration::{AuthError, ConnectPayload, GatewayCredentials, IntegrationError};
use crate::ports::{CredentialStore, PlatformClient, PlatformError, ProviderListing};

use super::TokenLifecycleManager;

/// Whether a configure call reached the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureOutcome {
    Pushed,
    /// Neither environment had a complete key summary.
    Skipped,
}

enum CallFailure {
    Platform(PlatformError),
    Auth(AuthError),
}

impl CallFailure {
    fn into_error(self, wrap: fn(String) -> IntegrationError) -> IntegrationError {
        match self {
            CallFailure::Platform(e) => wrap(e.to_string()),
            CallFailure::Auth(e) => IntegrationError::Auth(e),
        }
    }
}

fn registration_failed(reason: String) -> IntegrationError {
    IntegrationError::RegistrationFailed { reason }
}

fn config_failed(reason: String) -> IntegrationError {
    IntegrationError::ConfigFailed { reason }
}

fn deregistration_failed(reason: String) -> IntegrationError {
    IntegrationError::DeregistrationFailed { reason }
}

pub struct ProviderRegistrationWorkflow {
    platform: Arc<dyn PlatformClient>,
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenLifecycleManager>,
    listing: ProviderListing,
}

impl ProviderRegistrationWorkflow {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenLifecycleManager>,
        listing: ProviderListing,
    ) -> Self {
        Self {
            platform,
            store,
            tokens,
            listing,
        }
    }

    /// Lists the integration as a payment provider with a just-issued token.
    pub async fn register(
        &self,
        tenant_id: &TenantId,
        access_token: &str,
    ) -> Result<(), IntegrationError> {
        let platform = Arc::clone(&self.platform);
        let listing = self.listing.clone();

        self.with_token_retry(tenant_id, access_token.to_string(), |token| {
            let platform = Arc::clone(&platform);
            let tenant_id = tenant_id.clone();
            let listing = listing.clone();
            async move {
                platform
                    .register_provider(&tenant_id, &token, &listing)
                    .await
            }
        })
        .await
        .map_err(|f| f.into_error(registration_failed))?;

        tracing::info!(tenant_id = %tenant_id, "payment provider registered");
        Ok(())
    }

    /// Pushes whichever environment key summaries are complete.
    pub async fn configure(
        &self,
        tenant_id: &TenantId,
        payload: &ConnectPayload,
    ) -> Result<ConfigureOutcome, IntegrationError> {
        if payload.is_empty() {
            tracing::info!(tenant_id = %tenant_id, "no complete key set, provider connect skipped");
            return Ok(ConfigureOutcome::Skipped);
        }

        let token = self.tokens.ensure_valid(tenant_id).await?;
        let platform = Arc::clone(&self.platform);

        self.with_token_retry(tenant_id, token, |token| {
            let platform = Arc::clone(&platform);
            let tenant_id = tenant_id.clone();
            let payload = payload.clone();
            async move { platform.connect_provider(&tenant_id, &token, &payload).await }
        })
        .await
        .map_err(|f| f.into_error(config_failed))?;

        tracing::info!(
            tenant_id = %tenant_id,
            live = payload.live.is_some(),
            test = payload.test.is_some(),
            "payment provider configured"
        );
        Ok(ConfigureOutcome::Pushed)
    }

    /// Removes the provider listing, then clears stored gateway credentials.
    ///
    /// The token bundle is kept.
    pub async fn deregister(&self, tenant_id: &TenantId) -> Result<(), IntegrationError> {
        if self.store.find_by_tenant(tenant_id).await?.is_none() {
            return Err(IntegrationError::TenantNotFound(tenant_id.clone()));
        }

        let token = self.tokens.ensure_valid(tenant_id).await?;
        let platform = Arc::clone(&self.platform);

        self.with_token_retry(tenant_id, token, |token| {
            let platform = Arc::clone(&platform);
            let tenant_id = tenant_id.clone();
            async move { platform.deregister_provider(&tenant_id, &token).await }
        })
        .await
        .map_err(|f| f.into_error(deregistration_failed))?;

        self.store
            .save_gateway_credentials(tenant_id, &GatewayCredentials::default())
            .await?;

        tracing::info!(tenant_id = %tenant_id, "payment provider deregistered, credentials cleared");
        Ok(())
    }

    async fn with_token_retry<F, Fut>(
        &self,
        tenant_id: &TenantId,
        token: String,
        call: F,
    ) -> Result<(), CallFailure>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<(), PlatformError>>,
    {
        match call(token.clone()).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unauthorized() => {
                tracing::info!(tenant_id = %tenant_id, "platform rejected access token, refreshing once");
                self.tokens.mark_stale(tenant_id, &token).await;
                let refreshed = self
                    .tokens
                    .ensure_valid(tenant_id)
                    .await
                    .map_err(CallFailure::Auth)?;
                call(refreshed).await.map_err(CallFailure::Platform)
            }
            Err(e) => Err(CallFailure::Platform(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::leadconnector::{MockPlatformClient, PlatformCall};
    use crate::adapters::memory::InMemoryCredentialStore;
    use crate::domain::foundation::AccountId;
    use crate::domain::integration::{EnvironmentCredentials, ProviderKeySummary};
    use std::time::Duration;

    struct Fixture {
        workflow: ProviderRegistrationWorkflow,
        platform: MockPlatformClient,
        store: InMemoryCredentialStore,
    }

    fn tenant() -> TenantId {
        TenantId::new("T1").unwrap()
    }

    async fn fixture() -> Fixture {
        let platform = MockPlatformClient::new();
        let store = InMemoryCredentialStore::new();
        let tokens = Arc::new(TokenLifecycleManager::new(
            Arc::new(store.clone()),
            Arc::new(platform.clone()),
            Duration::from_secs(1),
        ));
        platform.push_exchange_result(Ok(MockPlatformClient::authorization(
            tenant(),
            AccountId::new("A1").unwrap(),
            "at-0",
        )));
        tokens.exchange_code(Some("code")).await.unwrap();

        let workflow = ProviderRegistrationWorkflow::new(
            Arc::new(platform.clone()),
            Arc::new(store.clone()),
            tokens,
            ProviderListing::for_deployment("BayarCash", "FPX", "https://app", "https://api"),
        );
        Fixture {
            workflow,
            platform,
            store,
        }
    }

    fn payload() -> ConnectPayload {
        ConnectPayload {
            live: Some(ProviderKeySummary {
                api_key: "k".into(),
                publishable_key: "p".into(),
            }),
            test: None,
        }
    }

    fn unauthorized() -> PlatformError {
        PlatformError::from_status(401, "Invalid JWT")
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configure
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn configure_refreshes_once_on_401_and_retries() {
        let f = fixture().await;
        f.platform.push_connect_result(Err(unauthorized()));

        let outcome = f.workflow.configure(&tenant(), &payload()).await.unwrap();

        assert_eq!(outcome, ConfigureOutcome::Pushed);
        assert_eq!(f.platform.refresh_calls(), 1);
        let tokens_used: Vec<String> = f
            .platform
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::ConnectProvider { access_token, .. } => Some(access_token),
                _ => None,
            })
            .collect();
        assert_eq!(tokens_used, vec!["at-0".to_string(), "access-1".to_string()]);
    }

    #[tokio::test]
    async fn second_401_is_terminal_without_third_attempt() {
        let f = fixture().await;
        f.platform.push_connect_result(Err(unauthorized()));
        f.platform.push_connect_result(Err(unauthorized()));

        let err = f.workflow.configure(&tenant(), &payload()).await.unwrap_err();

        assert!(matches!(err, IntegrationError::ConfigFailed { .. }));
        assert_eq!(f.platform.connect_calls(), 2);
        assert_eq!(f.platform.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn non_401_failure_is_not_retried() {
        let f = fixture().await;
        f.platform
            .push_connect_result(Err(PlatformError::from_status(422, "apiKey required")));

        let err = f.workflow.configure(&tenant(), &payload()).await.unwrap_err();

        assert!(matches!(err, IntegrationError::ConfigFailed { .. }));
        assert_eq!(f.platform.connect_calls(), 1);
        assert_eq!(f.platform.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn empty_payload_is_skipped() {
        let f = fixture().await;

        let outcome = f
            .workflow
            .configure(&tenant(), &ConnectPayload::default())
            .await
            .unwrap();

        assert_eq!(outcome, ConfigureOutcome::Skipped);
        assert_eq!(f.platform.connect_calls(), 0);
    }

    #[tokio::test]
    async fn failed_refresh_surfaces_auth_error() {
        let f = fixture().await;
        f.platform.push_connect_result(Err(unauthorized()));
        f.platform
            .push_refresh_result(Err(PlatformError::from_status(400, "invalid_grant")));

        let err = f.workflow.configure(&tenant(), &payload()).await.unwrap_err();

        assert!(matches!(err, IntegrationError::Auth(AuthError::RefreshFailed { .. })));
        assert_eq!(f.platform.connect_calls(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Register / Deregister
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn register_failure_is_classified() {
        let f = fixture().await;
        f.platform
            .push_register_result(Err(PlatformError::from_status(500, "boom")));

        let err = f.workflow.register(&tenant(), "at-0").await.unwrap_err();

        assert!(matches!(err, IntegrationError::RegistrationFailed { .. }));
    }

    #[tokio::test]
    async fn register_refreshes_once_on_401_and_retries() {
        let f = fixture().await;
        f.platform.push_register_result(Err(unauthorized()));

        f.workflow.register(&tenant(), "at-0").await.unwrap();

        assert_eq!(f.platform.register_calls(), 2);
        assert_eq!(f.platform.refresh_calls(), 1);
        let tokens_used: Vec<String> = f
            .platform
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::RegisterProvider { access_token, .. } => Some(access_token),
                _ => None,
            })
            .collect();
        assert_eq!(tokens_used, vec!["at-0".to_string(), "access-1".to_string()]);
    }

    #[tokio::test]
    async fn register_second_401_is_terminal() {
        let f = fixture().await;
        f.platform.push_register_result(Err(unauthorized()));
        f.platform.push_register_result(Err(unauthorized()));

        let err = f.workflow.register(&tenant(), "at-0").await.unwrap_err();

        assert!(matches!(err, IntegrationError::RegistrationFailed { .. }));
        assert_eq!(f.platform.register_calls(), 2);
        assert_eq!(f.platform.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn deregister_clears_credentials_but_keeps_tokens() {
        let f = fixture().await;
        let creds = GatewayCredentials {
            live: EnvironmentCredentials::new(Some("pat".into()), Some("k".into()), Some("p".into())),
            test: EnvironmentCredentials::default(),
        };
        f.store.save_gateway_credentials(&tenant(), &creds).await.unwrap();
        f.platform.push_deregister_result(Err(unauthorized()));

        f.workflow.deregister(&tenant()).await.unwrap();

        assert_eq!(f.platform.deregister_calls(), 2);
        let record = f.store.find_by_tenant(&tenant()).await.unwrap().unwrap();
        assert!(record.gateway_credentials.live.is_empty());
        assert_eq!(record.oauth_bundle.access_token, "access-1");
    }

    #[tokio::test]
    async fn deregister_unknown_tenant_is_not_found() {
        let f = fixture().await;
        let err = f
            .workflow
            .deregister(&TenantId::new("ghost").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrationError::TenantNotFound(_)));
        assert_eq!(f.platform.deregister_calls(), 0);
    }
}
