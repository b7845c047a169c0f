//! RecordProviderKeysHandler - Keys pushed by the platform's provider config page.

use std::sync::Arc;

use crate::domain::foundation::TenantId;
use crate::domain::integration::{IntegrationError, PlatformKeys};
use crate::ports::CredentialStore;

/// Keys for both environments. An omitted environment has its keys cleared.
#[derive(Debug, Clone)]
pub struct RecordProviderKeysCommand {
    pub tenant_id: TenantId,
    pub live: Option<PlatformKeys>,
    pub test: Option<PlatformKeys>,
}

/// Stores the API and portal keys; personal access tokens are untouched.
pub struct RecordProviderKeysHandler {
    store: Arc<dyn CredentialStore>,
}

impl RecordProviderKeysHandler {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: RecordProviderKeysCommand) -> Result<(), IntegrationError> {
        let live = cmd.live.unwrap_or_default();
        let test = cmd.test.unwrap_or_default();

        if !self
            .store
            .save_platform_keys(&cmd.tenant_id, &live, &test)
            .await?
        {
            return Err(IntegrationError::TenantNotFound(cmd.tenant_id));
        }

        tracing::info!(tenant_id = %cmd.tenant_id, "provider keys recorded from platform");
        Ok(())
    }
}
