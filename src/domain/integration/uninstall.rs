//! Uninstall events pushed by the platform.

use crate::domain::foundation::{AccountId, TenantId};

use super::IntegrationError;

/// The only event type the deprovisioning workflow accepts.
pub const UNINSTALL_EVENT_TYPE: &str = "UNINSTALL";

/// What an uninstall event removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallScope {
    /// One tenant record.
    Tenant(TenantId),
    /// Every tenant under an account.
    Account(AccountId),
}

/// A validated uninstall event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallEvent {
    pub account_id: Option<AccountId>,
    pub scope: UninstallScope,
}

impl UninstallEvent {
    /// Validates raw webhook fields.
    ///
    /// A tenant id, when present, always selects tenant scope; the account
    /// cascade only runs for events without one.
    pub fn parse(
        event_type: Option<&str>,
        account_id: Option<&str>,
        tenant_id: Option<&str>,
    ) -> Result<Self, IntegrationError> {
        if event_type != Some(UNINSTALL_EVENT_TYPE) {
            return Err(IntegrationError::invalid_event(format!(
                "unsupported event type {:?}",
                event_type.unwrap_or("")
            )));
        }

        let account_id = account_id
            .filter(|s| !s.trim().is_empty())
            .map(AccountId::new)
            .transpose()?;
        let tenant_id = tenant_id
            .filter(|s| !s.trim().is_empty())
            .map(TenantId::new)
            .transpose()?;

        let scope = match (tenant_id, &account_id) {
            (Some(tenant), _) => UninstallScope::Tenant(tenant),
            (None, Some(account)) => UninstallScope::Account(account.clone()),
            (None, None) => {
                return Err(IntegrationError::invalid_event(
                    "event carries neither tenant nor account id",
                ))
            }
        };

        Ok(Self { account_id, scope })
    }
}
