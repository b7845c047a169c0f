//! In-Memory Credential Store Adapter
//!
//! Keeps tenant integration records in a map. Used by tests and for
//! running the service without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{AccountId, DomainError, TenantId};
use crate::domain::integration::{
    GatewayCredentials, OAuthBundle, PlatformKeys, TenantAuthorization, TenantIntegration,
};
use crate::ports::CredentialStore;

/// In-memory storage for tenant integrations
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    records: Arc<RwLock<HashMap<TenantId, TenantIntegration>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryCredentialStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a database error (for tests)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert a record directly, bypassing the authorization path
    pub async fn insert(&self, record: TenantIntegration) {
        self.records
            .write()
            .await
            .insert(record.tenant_id.clone(), record);
    }

    /// Get the number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// True when no records are stored
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("in-memory store is failing writes"));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<TenantIntegration>, DomainError> {
        Ok(self.records.read().await.get(tenant_id).cloned())
    }

    async fn upsert_authorization(
        &self,
        authorization: &TenantAuthorization,
    ) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        match records.get_mut(&authorization.tenant_id) {
            Some(existing) => existing.reauthorize(authorization.clone()),
            None => {
                records.insert(
                    authorization.tenant_id.clone(),
                    TenantIntegration::authorized(authorization.clone()),
                );
            }
        }
        Ok(())
    }

    async fn update_oauth_bundle(
        &self,
        tenant_id: &TenantId,
        bundle: &OAuthBundle,
    ) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        Ok(match records.get_mut(tenant_id) {
            Some(record) => {
                record.oauth_bundle = bundle.clone();
                true
            }
            None => false,
        })
    }

    async fn retire_refresh_token(&self, tenant_id: &TenantId) -> Result<(), DomainError> {
        self.check_writable()?;
        if let Some(record) = self.records.write().await.get_mut(tenant_id) {
            record.oauth_bundle.refresh_token = None;
        }
        Ok(())
    }

    async fn save_gateway_credentials(
        &self,
        tenant_id: &TenantId,
        credentials: &GatewayCredentials,
    ) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        Ok(match records.get_mut(tenant_id) {
            Some(record) => {
                record.gateway_credentials = credentials.clone();
                true
            }
            None => false,
        })
    }

    async fn save_platform_keys(
        &self,
        tenant_id: &TenantId,
        live: &PlatformKeys,
        test: &PlatformKeys,
    ) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        Ok(match records.get_mut(tenant_id) {
            Some(record) => {
                let credentials = &mut record.gateway_credentials;
                credentials.live = credentials.live.with_platform_keys(live);
                credentials.test = credentials.test.with_platform_keys(test);
                true
            }
            None => false,
        })
    }

    async fn delete_by_tenant(&self, tenant_id: &TenantId) -> Result<bool, DomainError> {
        self.check_writable()?;
        Ok(self.records.write().await.remove(tenant_id).is_some())
    }

    async fn delete_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<TenantId>, DomainError> {
        self.check_writable()?;
        let mut records = self.records.write().await;
        let doomed: Vec<TenantId> = records
            .values()
            .filter(|r| &r.account_id == account_id)
            .map(|r| r.tenant_id.clone())
            .collect();
        for tenant_id in &doomed {
            records.remove(tenant_id);
        }
        Ok(doomed)
    }
}
