//! Credential store port.
//!
//! Keyed persistence for `TenantIntegration` records. Every method touches
//! exactly one record except `delete_by_account`, and each single-record
//! write is expected to be atomic.
//!
//! # Design
//!
//! - **Upsert on authorization**: a repeated authorization overwrites the
//!   token bundle and keeps gateway credentials
//! - **Idempotent deletes**: removing a missing record is not an error
//! - **Refresh token retirement**: a refresh token is cleared before it is
//!   spent, so it can never be replayed

use crate::domain::foundation::{AccountId, DomainError, TenantId};
use crate::domain::integration::{
    GatewayCredentials, OAuthBundle, PlatformKeys, TenantAuthorization, TenantIntegration,
};
use async_trait::async_trait;

/// Repository port for tenant integration records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the record for a tenant.
    ///
    /// Returns `None` if the tenant never authorized or was uninstalled.
    async fn find_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<TenantIntegration>, DomainError>;

    /// Create or overwrite the authorization part of a record.
    ///
    /// Gateway credentials of an existing record are preserved.
    async fn upsert_authorization(
        &self,
        authorization: &TenantAuthorization,
    ) -> Result<(), DomainError>;

    /// Replace the token bundle after a refresh.
    ///
    /// Returns `false` if the tenant no longer exists.
    async fn update_oauth_bundle(
        &self,
        tenant_id: &TenantId,
        bundle: &OAuthBundle,
    ) -> Result<bool, DomainError>;

    /// Clear the stored refresh token ahead of spending it.
    async fn retire_refresh_token(&self, tenant_id: &TenantId) -> Result<(), DomainError>;

    /// Replace both environments' gateway credentials.
    ///
    /// Returns `false` if the tenant does not exist.
    async fn save_gateway_credentials(
        &self,
        tenant_id: &TenantId,
        credentials: &GatewayCredentials,
    ) -> Result<bool, DomainError>;

    /// Replace the API and portal keys of both environments in one write.
    ///
    /// Personal access tokens are left as stored. Returns `false` if the
    /// tenant does not exist.
    async fn save_platform_keys(
        &self,
        tenant_id: &TenantId,
        live: &PlatformKeys,
        test: &PlatformKeys,
    ) -> Result<bool, DomainError>;

    /// Delete one tenant's record. Returns whether a record existed.
    async fn delete_by_tenant(&self, tenant_id: &TenantId) -> Result<bool, DomainError>;

    /// Delete every record under an account. Returns the removed tenant ids.
    async fn delete_by_account(&self, account_id: &AccountId)
        -> Result<Vec<TenantId>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn CredentialStore) {}
    }
}
