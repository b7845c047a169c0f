//! CompleteAuthorizationHandler - OAuth callback: exchange, then best-effort registration.

use std::sync::Arc;

use crate::domain::foundation::TenantId;
use crate::domain::integration::AuthError;

use super::{ProviderRegistrationWorkflow, TokenLifecycleManager};

/// Command carrying the callback's `code` query parameter.
#[derive(Debug, Clone)]
pub struct CompleteAuthorizationCommand {
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteAuthorizationResult {
    pub tenant_id: TenantId,
    pub provider_registered: bool,
}

pub struct CompleteAuthorizationHandler {
    tokens: Arc<TokenLifecycleManager>,
    registration: Arc<ProviderRegistrationWorkflow>,
}

impl CompleteAuthorizationHandler {
    pub fn new(
        tokens: Arc<TokenLifecycleManager>,
        registration: Arc<ProviderRegistrationWorkflow>,
    ) -> Self {
        Self {
            tokens,
            registration,
        }
    }

    /// Only the exchange can fail the flow; registration errors are logged
    /// and the tenant can configure the provider later.
    pub async fn handle(
        &self,
        cmd: CompleteAuthorizationCommand,
    ) -> Result<CompleteAuthorizationResult, AuthError> {
        let authorization = self.tokens.exchange_code(cmd.code.as_deref()).await?;

        let provider_registered = match self
            .registration
            .register(&authorization.tenant_id, &authorization.bundle.access_token)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    tenant_id = %authorization.tenant_id,
                    error = %e,
                    "provider registration failed, continuing onboarding"
                );
                false
            }
        };

        Ok(CompleteAuthorizationResult {
            tenant_id: authorization.tenant_id,
            provider_registered,
        })
    }
}
