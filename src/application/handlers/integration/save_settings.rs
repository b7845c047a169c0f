//! SaveSettingsHandler - Store gateway credentials, then push key summaries.

use std::sync::Arc;

use crate::domain::foundation::TenantId;
use crate::domain::integration::{EnvironmentCredentials, GatewayCredentials, IntegrationError};
use crate::ports::CredentialStore;

use super::{ConfigureOutcome, ProviderRegistrationWorkflow};

/// Command from the settings UI. An omitted environment is cleared.
#[derive(Debug, Clone)]
pub struct SaveSettingsCommand {
    pub tenant_id: TenantId,
    pub live: Option<EnvironmentCredentials>,
    pub test: Option<EnvironmentCredentials>,
}

pub struct SaveSettingsHandler {
    store: Arc<dyn CredentialStore>,
    registration: Arc<ProviderRegistrationWorkflow>,
}

impl SaveSettingsHandler {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        registration: Arc<ProviderRegistrationWorkflow>,
    ) -> Self {
        Self {
            store,
            registration,
        }
    }

    pub async fn handle(&self, cmd: SaveSettingsCommand) -> Result<ConfigureOutcome, IntegrationError> {
        let credentials = GatewayCredentials {
            live: cmd.live.unwrap_or_default(),
            test: cmd.test.unwrap_or_default(),
        };

        // 1. Persist
        if !self
            .store
            .save_gateway_credentials(&cmd.tenant_id, &credentials)
            .await?
        {
            return Err(IntegrationError::TenantNotFound(cmd.tenant_id));
        }
        tracing::info!(
            tenant_id = %cmd.tenant_id,
            live_usable = credentials.live.is_usable(),
            test_usable = credentials.test.is_usable(),
            "gateway credentials saved"
        );

        // 2. Push key summaries; failure here fails the save
        self.registration
            .configure(&cmd.tenant_id, &credentials.connect_payload())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::leadconnector::{MockPlatformClient, PlatformCall};
    use crate::adapters::memory::InMemoryCredentialStore;
    use crate::application::handlers::integration::TokenLifecycleManager;
    use crate::domain::foundation::AccountId;
    use crate::domain::integration::TenantIntegration;
    use crate::ports::{PlatformError, ProviderListing};
    use std::time::Duration;

    async fn handler() -> (SaveSettingsHandler, MockPlatformClient, InMemoryCredentialStore) {
        let platform = MockPlatformClient::new();
        let store = InMemoryCredentialStore::new();
        store
            .insert(TenantIntegration::authorized(MockPlatformClient::authorization(
                TenantId::new("T1").unwrap(),
                AccountId::new("A1").unwrap(),
                "at-0",
            )))
            .await;
        let tokens = Arc::new(TokenLifecycleManager::new(
            Arc::new(store.clone()),
            Arc::new(platform.clone()),
            Duration::from_secs(1),
        ));
        let registration = Arc::new(ProviderRegistrationWorkflow::new(
            Arc::new(platform.clone()),
            Arc::new(store.clone()),
            tokens,
            ProviderListing::for_deployment("BayarCash", "FPX", "https://app", "https://api"),
        ));
        (
            SaveSettingsHandler::new(Arc::new(store.clone()), registration),
            platform,
            store,
        )
    }

    fn full() -> EnvironmentCredentials {
        EnvironmentCredentials::new(Some("pat".into()), Some("key".into()), Some("portal".into()))
    }

    #[tokio::test]
    async fn saves_then_pushes_summary_without_pat() {
        let (handler, platform, store) = handler().await;

        let outcome = handler
            .handle(SaveSettingsCommand {
                tenant_id: TenantId::new("T1").unwrap(),
                live: None,
                test: Some(full()),
            })
            .await
            .unwrap();

        assert_eq!(outcome, ConfigureOutcome::Pushed);
        let record = store
            .find_by_tenant(&TenantId::new("T1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(record.gateway_credentials.test.is_usable());

        match platform.calls().last() {
            Some(PlatformCall::ConnectProvider { payload, .. }) => {
                assert!(payload.live.is_none());
                let json = serde_json::to_string(payload).unwrap();
                assert!(!json.contains("pat"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_tenant_is_not_found() {
        let (handler, platform, _) = handler().await;

        let err = handler
            .handle(SaveSettingsCommand {
                tenant_id: TenantId::new("ghost").unwrap(),
                live: Some(full()),
                test: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, IntegrationError::TenantNotFound(_)));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn connect_failure_fails_the_save() {
        let (handler, platform, _) = handler().await;
        platform.push_connect_result(Err(PlatformError::from_status(422, "bad key")));

        let err = handler
            .handle(SaveSettingsCommand {
                tenant_id: TenantId::new("T1").unwrap(),
                live: Some(full()),
                test: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, IntegrationError::ConfigFailed { .. }));
    }
}
