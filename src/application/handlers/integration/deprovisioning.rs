//! DeprovisioningWorkflow - Uninstall event handling.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, TenantId};
use crate::domain::integration::{IntegrationError, UninstallEvent, UninstallScope};
use crate::ports::CredentialStore;

use super::TokenLifecycleManager;

/// What an uninstall event removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeprovisionOutcome {
    /// Tenant-level uninstall; `existed` is false for a repeated event.
    TenantRemoved { tenant_id: TenantId, existed: bool },
    /// Account-level cascade.
    AccountRemoved {
        account_id: AccountId,
        removed: usize,
    },
}

pub struct DeprovisioningWorkflow {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenLifecycleManager>,
}

impl DeprovisioningWorkflow {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: Arc<TokenLifecycleManager>) -> Self {
        Self { store, tokens }
    }

    pub async fn handle(&self, event: UninstallEvent) -> Result<DeprovisionOutcome, IntegrationError> {
        match event.scope {
            UninstallScope::Tenant(tenant_id) => {
                let existed = self.store.delete_by_tenant(&tenant_id).await?;
                self.tokens.forget(&tenant_id);

                if existed {
                    tracing::info!(tenant_id = %tenant_id, "tenant uninstalled, record deleted");
                } else {
                    tracing::info!(tenant_id = %tenant_id, "tenant uninstall for unknown tenant, nothing to delete");
                }
                Ok(DeprovisionOutcome::TenantRemoved { tenant_id, existed })
            }
            UninstallScope::Account(account_id) => {
                let removed = self.store.delete_by_account(&account_id).await?;
                for tenant_id in &removed {
                    self.tokens.forget(tenant_id);
                }

                tracing::info!(
                    account_id = %account_id,
                    removed = removed.len(),
                    "account uninstalled, tenant records deleted"
                );
                Ok(DeprovisionOutcome::AccountRemoved {
                    account_id,
                    removed: removed.len(),
                })
            }
        }
    }
}
