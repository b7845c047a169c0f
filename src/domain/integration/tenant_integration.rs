//! TenantIntegration aggregate.

use crate::domain::foundation::{AccountId, TenantId, Timestamp, UserId};

use super::{GatewayCredentials, OAuthBundle, TenantAuthorization};

/// Everything the integration knows about one tenant.
///
/// One record per `tenant_id`. Re-authorization replaces the OAuth bundle
/// and keeps gateway credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantIntegration {
    pub tenant_id: TenantId,
    pub account_id: AccountId,
    pub user_id: Option<UserId>,
    pub user_type: Option<String>,
    pub oauth_bundle: OAuthBundle,
    pub gateway_credentials: GatewayCredentials,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TenantIntegration {
    /// A brand new record from a first authorization.
    pub fn authorized(authorization: TenantAuthorization) -> Self {
        let now = Timestamp::now();
        Self {
            tenant_id: authorization.tenant_id,
            account_id: authorization.account_id,
            user_id: authorization.user_id,
            user_type: authorization.user_type,
            oauth_bundle: authorization.bundle,
            gateway_credentials: GatewayCredentials::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a repeated authorization, preserving gateway credentials.
    pub fn reauthorize(&mut self, authorization: TenantAuthorization) {
        self.account_id = authorization.account_id;
        self.user_id = authorization.user_id;
        self.user_type = authorization.user_type;
        self.oauth_bundle = authorization.bundle;
        self.updated_at = Timestamp::now();
    }
}
