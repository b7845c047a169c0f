//! PostgreSQL implementation of CredentialStore.
//!
//! One row per tenant in `tenant_integrations`; both environments'
//! credential triples are flattened into prefixed columns.

use crate::domain::foundation::{AccountId, DomainError, ErrorCode, TenantId, Timestamp, UserId};
use crate::domain::integration::{
    EnvironmentCredentials, GatewayCredentials, OAuthBundle, PlatformKeys, TenantAuthorization,
    TenantIntegration,
};
use crate::ports::CredentialStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL implementation of the CredentialStore port.
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Creates a new PostgresCredentialStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a tenant integration.
#[derive(Debug, sqlx::FromRow)]
struct TenantIntegrationRow {
    tenant_id: String,
    account_id: String,
    user_id: Option<String>,
    user_type: Option<String>,
    access_token: String,
    refresh_token: Option<String>,
    token_type: String,
    expires_in: i64,
    scope: Option<String>,
    token_updated_at: DateTime<Utc>,
    live_personal_access_token: Option<String>,
    live_api_secret_key: Option<String>,
    live_portal_key: Option<String>,
    test_personal_access_token: Option<String>,
    test_api_secret_key: Option<String>,
    test_portal_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TenantIntegrationRow> for TenantIntegration {
    type Error = DomainError;

    fn try_from(row: TenantIntegrationRow) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::domain::foundation::ValidationError| {
            DomainError::new(ErrorCode::DatabaseError, format!("Corrupt tenant row: {}", e))
        };

        Ok(TenantIntegration {
            tenant_id: TenantId::new(row.tenant_id).map_err(corrupt)?,
            account_id: AccountId::new(row.account_id).map_err(corrupt)?,
            user_id: row.user_id.map(UserId::new).transpose().map_err(corrupt)?,
            user_type: row.user_type,
            oauth_bundle: OAuthBundle {
                access_token: row.access_token,
                refresh_token: row.refresh_token,
                token_type: row.token_type,
                expires_in: row.expires_in,
                scope: row.scope,
                updated_at: Timestamp::from_datetime(row.token_updated_at),
            },
            gateway_credentials: GatewayCredentials {
                live: EnvironmentCredentials::new(
                    row.live_personal_access_token,
                    row.live_api_secret_key,
                    row.live_portal_key,
                ),
                test: EnvironmentCredentials::new(
                    row.test_personal_access_token,
                    row.test_api_secret_key,
                    row.test_portal_key,
                ),
            },
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<TenantIntegration>, DomainError> {
        let row: Option<TenantIntegrationRow> = sqlx::query_as(
            r#"
            SELECT tenant_id, account_id, user_id, user_type,
                   access_token, refresh_token, token_type, expires_in, scope, token_updated_at,
                   live_personal_access_token, live_api_secret_key, live_portal_key,
                   test_personal_access_token, test_api_secret_key, test_portal_key,
                   created_at, updated_at
            FROM tenant_integrations
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch tenant integration", e))?;

        row.map(TenantIntegration::try_from).transpose()
    }

    async fn upsert_authorization(
        &self,
        authorization: &TenantAuthorization,
    ) -> Result<(), DomainError> {
        let bundle = &authorization.bundle;

        sqlx::query(
            r#"
            INSERT INTO tenant_integrations (
                tenant_id, account_id, user_id, user_type,
                access_token, refresh_token, token_type, expires_in, scope, token_updated_at,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
            ON CONFLICT (tenant_id) DO UPDATE SET
                account_id = EXCLUDED.account_id,
                user_id = EXCLUDED.user_id,
                user_type = EXCLUDED.user_type,
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                token_type = EXCLUDED.token_type,
                expires_in = EXCLUDED.expires_in,
                scope = EXCLUDED.scope,
                token_updated_at = EXCLUDED.token_updated_at,
                updated_at = NOW()
            "#,
        )
        .bind(authorization.tenant_id.as_str())
        .bind(authorization.account_id.as_str())
        .bind(authorization.user_id.as_ref().map(|u| u.as_str()))
        .bind(&authorization.user_type)
        .bind(&bundle.access_token)
        .bind(&bundle.refresh_token)
        .bind(&bundle.token_type)
        .bind(bundle.expires_in)
        .bind(&bundle.scope)
        .bind(bundle.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("upsert tenant authorization", e))?;

        Ok(())
    }

    async fn update_oauth_bundle(
        &self,
        tenant_id: &TenantId,
        bundle: &OAuthBundle,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE tenant_integrations SET
                access_token = $2,
                refresh_token = $3,
                token_type = $4,
                expires_in = $5,
                scope = $6,
                token_updated_at = $7,
                updated_at = NOW()
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(&bundle.access_token)
        .bind(&bundle.refresh_token)
        .bind(&bundle.token_type)
        .bind(bundle.expires_in)
        .bind(&bundle.scope)
        .bind(bundle.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update token bundle", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn retire_refresh_token(&self, tenant_id: &TenantId) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE tenant_integrations SET refresh_token = NULL, updated_at = NOW()
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("retire refresh token", e))?;

        Ok(())
    }

    async fn save_gateway_credentials(
        &self,
        tenant_id: &TenantId,
        credentials: &GatewayCredentials,
    ) -> Result<bool, DomainError> {
        let live = &credentials.live;
        let test = &credentials.test;

        let result = sqlx::query(
            r#"
            UPDATE tenant_integrations SET
                live_personal_access_token = $2,
                live_api_secret_key = $3,
                live_portal_key = $4,
                test_personal_access_token = $5,
                test_api_secret_key = $6,
                test_portal_key = $7,
                updated_at = NOW()
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(&live.personal_access_token)
        .bind(&live.api_secret_key)
        .bind(&live.portal_key)
        .bind(&test.personal_access_token)
        .bind(&test.api_secret_key)
        .bind(&test.portal_key)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save gateway credentials", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn save_platform_keys(
        &self,
        tenant_id: &TenantId,
        live: &PlatformKeys,
        test: &PlatformKeys,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE tenant_integrations SET
                live_api_secret_key = $2,
                live_portal_key = $3,
                test_api_secret_key = $4,
                test_portal_key = $5,
                updated_at = NOW()
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id.as_str())
        .bind(&live.api_key)
        .bind(&live.publishable_key)
        .bind(&test.api_key)
        .bind(&test.publishable_key)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save platform keys", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_tenant(&self, tenant_id: &TenantId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM tenant_integrations WHERE tenant_id = $1")
            .bind(tenant_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete tenant integration", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<TenantId>, DomainError> {
        let removed: Vec<(String,)> = sqlx::query_as(
            "DELETE FROM tenant_integrations WHERE account_id = $1 RETURNING tenant_id",
        )
        .bind(account_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("delete account integrations", e))?;

        removed
            .into_iter()
            .map(|(id,)| TenantId::new(id).map_err(DomainError::from))
            .collect()
    }
}
