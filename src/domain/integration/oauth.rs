//! OAuth2 token bundle held per tenant.

use std::fmt;

use crate::domain::foundation::{AccountId, TenantId, Timestamp, UserId};

/// Access/refresh token pair and metadata for a tenant.
///
/// The refresh token is single-use: it rotates on every refresh and is
/// `None` once retired.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthBundle {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: i64,
    pub scope: Option<String>,
    pub updated_at: Timestamp,
}

impl OAuthBundle {
    /// Bundle produced by a fresh grant.
    pub fn issued(tokens: IssuedTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: Some(tokens.refresh_token),
            token_type: tokens.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in: tokens.expires_in,
            scope: tokens.scope,
            updated_at: Timestamp::now(),
        }
    }

    /// Bundle after a refresh; metadata the platform omits is carried over.
    pub fn rotated(&self, tokens: IssuedTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: Some(tokens.refresh_token),
            token_type: tokens.token_type.unwrap_or_else(|| self.token_type.clone()),
            expires_in: tokens.expires_in,
            scope: tokens.scope.or_else(|| self.scope.clone()),
            updated_at: Timestamp::now(),
        }
    }
}

impl fmt::Debug for OAuthBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthBundle")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("refresh_token_set", &self.refresh_token.is_some())
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Tokens as returned by a grant call, before they become a bundle.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: Option<String>,
    pub expires_in: i64,
    pub scope: Option<String>,
}

impl fmt::Debug for IssuedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedTokens")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Outcome of an authorization-code exchange: who authorized, and the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantAuthorization {
    pub tenant_id: TenantId,
    pub account_id: AccountId,
    pub user_id: Option<UserId>,
    pub user_type: Option<String>,
    pub bundle: OAuthBundle,
}
