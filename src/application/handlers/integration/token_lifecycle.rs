//! TokenLifecycleManager - Per-tenant OAuth token state and single-flight refresh.
//!
//! Refresh is reactive: a caller that sees a 401 marks the tenant stale with
//! the token that was rejected, and the next `ensure_valid` refreshes.
//! Each tenant has its own async lock. The refresh runs on a spawned task
//! that owns the lock until the new bundle is stored, so a caller that is
//! dropped mid-refresh does not cancel it, and queued callers read its outcome.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::{StateMachine, TenantId};
use crate::domain::integration::{AuthError, TenantAuthorization, TokenState};
use crate::ports::{CredentialStore, PlatformClient, PlatformErrorCode};

/// In-process view of one tenant's token.
#[derive(Debug)]
struct TokenSession {
    state: TokenState,
    /// Last access token known to be current; `None` until loaded.
    access_token: Option<String>,
    /// A downstream call rejected `access_token`.
    stale: bool,
    /// Why the tenant went `Invalid`, replayed to every later caller.
    last_failure: Option<AuthError>,
}

impl Default for TokenSession {
    fn default() -> Self {
        Self {
            state: TokenState::Valid,
            access_token: None,
            stale: false,
            last_failure: None,
        }
    }
}

impl TokenSession {
    fn enter(&mut self, tenant_id: &TenantId, next: TokenState) {
        match self.state.transition_to(next) {
            Ok(state) => self.state = state,
            Err(e) => {
                tracing::error!(tenant_id = %tenant_id, error = %e, "rejected token state change");
                self.state = TokenState::Invalid;
            }
        }
    }

    fn fail(&mut self, tenant_id: &TenantId, failure: AuthError) -> AuthError {
        self.enter(tenant_id, TokenState::Invalid);
        self.access_token = None;
        self.stale = false;
        self.last_failure = Some(failure.clone());
        failure
    }

    /// The refresh task died mid-flight; its refresh token is already retired.
    fn abandon(&mut self, tenant_id: &TenantId) -> AuthError {
        let failure = AuthError::RefreshFailed {
            message: "previous refresh was abandoned".to_string(),
        };
        self.fail(tenant_id, failure)
    }

    fn current_failure(&self, tenant_id: &TenantId) -> AuthError {
        self.last_failure
            .clone()
            .unwrap_or_else(|| AuthError::NotAuthorized(tenant_id.clone()))
    }
}

/// Owned handles for one refresh, so it can run detached from its caller.
struct RefreshFlight {
    store: Arc<dyn CredentialStore>,
    platform: Arc<dyn PlatformClient>,
    timeout: Duration,
}

impl RefreshFlight {
    /// Retires the stored refresh token, spends it and stores the rotated bundle.
    async fn run(&self, tenant_id: &TenantId, session: &mut TokenSession) -> Result<String, AuthError> {
        session.enter(tenant_id, TokenState::Refreshing);
        tracing::info!(tenant_id = %tenant_id, "refreshing access token");

        let record = match self.store.find_by_tenant(tenant_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(session.fail(tenant_id, AuthError::NotAuthorized(tenant_id.clone()))),
            Err(e) => {
                // Nothing spent yet; stay stale so the next caller retries.
                session.enter(tenant_id, TokenState::Valid);
                return Err(AuthError::Storage(e.to_string()));
            }
        };

        let refresh_token = match record.oauth_bundle.refresh_token.clone() {
            Some(token) => token,
            None => {
                let failure = AuthError::RefreshFailed {
                    message: "no refresh token stored".to_string(),
                };
                return Err(session.fail(tenant_id, failure));
            }
        };

        if let Err(e) = self.store.retire_refresh_token(tenant_id).await {
            session.enter(tenant_id, TokenState::Valid);
            return Err(AuthError::Storage(e.to_string()));
        }

        let issued = match tokio::time::timeout(self.timeout, self.platform.refresh_token(&refresh_token)).await {
            Ok(Ok(issued)) => issued,
            Ok(Err(e)) => {
                tracing::warn!(tenant_id = %tenant_id, error = %e, "token refresh rejected");
                let failure = AuthError::RefreshFailed { message: e.message };
                return Err(session.fail(tenant_id, failure));
            }
            Err(_) => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "token refresh timed out"
                );
                return Err(session.fail(tenant_id, AuthError::RefreshTimedOut));
            }
        };

        let bundle = record.oauth_bundle.rotated(issued);
        match self.store.update_oauth_bundle(tenant_id, &bundle).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(session.fail(tenant_id, AuthError::NotAuthorized(tenant_id.clone())))
            }
            Err(e) => {
                tracing::error!(tenant_id = %tenant_id, error = %e, "refreshed tokens could not be stored");
                return Err(session.fail(tenant_id, AuthError::Storage(e.to_string())));
            }
        }

        session.enter(tenant_id, TokenState::Valid);
        session.access_token = Some(bundle.access_token.clone());
        session.stale = false;
        session.last_failure = None;

        tracing::info!(tenant_id = %tenant_id, "access token refreshed");
        Ok(bundle.access_token)
    }
}

/// Owns the token state machine for every tenant.
pub struct TokenLifecycleManager {
    store: Arc<dyn CredentialStore>,
    platform: Arc<dyn PlatformClient>,
    refresh_timeout: Duration,
    sessions: StdMutex<HashMap<TenantId, Arc<Mutex<TokenSession>>>>,
}

impl TokenLifecycleManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        platform: Arc<dyn PlatformClient>,
        refresh_timeout: Duration,
    ) -> Self {
        Self {
            store,
            platform,
            refresh_timeout,
            sessions: StdMutex::new(HashMap::new()),
        }
    }

    fn session(&self, tenant_id: &TenantId) -> Arc<Mutex<TokenSession>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.entry(tenant_id.clone()).or_default().clone()
    }

    async fn lock_session(&self, tenant_id: &TenantId) -> OwnedMutexGuard<TokenSession> {
        self.session(tenant_id).lock_owned().await
    }

    /// Performs the authorization-code grant and stores the bundle.
    ///
    /// Nothing is written unless the exchange succeeds. The store write
    /// happens under the tenant lock, after any in-flight refresh settles.
    pub async fn exchange_code(&self, code: Option<&str>) -> Result<TenantAuthorization, AuthError> {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::MissingCode)?;

        let authorization = self.platform.exchange_code(code).await.map_err(|e| {
            tracing::warn!(status = ?e.status, error = %e, "authorization code exchange failed");
            match e.code {
                PlatformErrorCode::InvalidResponse => AuthError::InvalidGrant(e.message),
                _ => AuthError::ExchangeRejected {
                    status: e.status,
                    message: e.message,
                },
            }
        })?;

        let mut session = self.lock_session(&authorization.tenant_id).await;

        self.store
            .upsert_authorization(&authorization)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        session.enter(&authorization.tenant_id, TokenState::Valid);
        session.access_token = Some(authorization.bundle.access_token.clone());
        session.stale = false;
        session.last_failure = None;

        tracing::info!(
            tenant_id = %authorization.tenant_id,
            account_id = %authorization.account_id,
            "tenant authorized"
        );
        Ok(authorization)
    }

    /// Returns a usable access token, refreshing first if the tenant is stale.
    ///
    /// A `Valid`, non-stale tenant is answered from cache (or the store on
    /// first use) with no platform call.
    pub async fn ensure_valid(&self, tenant_id: &TenantId) -> Result<String, AuthError> {
        let mut session = self.lock_session(tenant_id).await;
        let state = session.state;

        match state {
            TokenState::Invalid => Err(session.current_failure(tenant_id)),
            TokenState::Refreshing => Err(session.abandon(tenant_id)),
            TokenState::Valid if session.stale => self.refresh_detached(tenant_id, session).await,
            TokenState::Valid => match session.access_token.clone() {
                Some(token) => Ok(token),
                None => self.load_locked(tenant_id, &mut session).await,
            },
        }
    }

    /// Refreshes now, regardless of the stale flag.
    ///
    /// Callers waiting on the same tenant share the outcome.
    pub async fn refresh(&self, tenant_id: &TenantId) -> Result<String, AuthError> {
        let mut session = self.lock_session(tenant_id).await;
        let state = session.state;

        match state {
            TokenState::Invalid => Err(session.current_failure(tenant_id)),
            TokenState::Refreshing => Err(session.abandon(tenant_id)),
            TokenState::Valid => {
                session.stale = true;
                self.refresh_detached(tenant_id, session).await
            }
        }
    }

    /// Records that `rejected_token` got a 401.
    ///
    /// Ignored when the session already moved past that token, so callers
    /// holding an outdated token do not trigger a second refresh.
    pub async fn mark_stale(&self, tenant_id: &TenantId, rejected_token: &str) {
        let mut session = self.lock_session(tenant_id).await;

        if session.state != TokenState::Valid {
            return;
        }
        let matches = match session.access_token.as_deref() {
            Some(current) => current == rejected_token,
            None => true,
        };
        if matches {
            tracing::debug!(tenant_id = %tenant_id, "access token marked stale");
            session.stale = true;
        }
    }

    /// Drops in-process state for a tenant that was removed.
    pub fn forget(&self, tenant_id: &TenantId) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(tenant_id);
    }

    /// Current state, if the tenant has been seen by this process.
    pub async fn state(&self, tenant_id: &TenantId) -> Option<TokenState> {
        let session = {
            let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            sessions.get(tenant_id).cloned()
        }?;
        let state = session.lock().await.state;
        Some(state)
    }

    async fn load_locked(
        &self,
        tenant_id: &TenantId,
        session: &mut TokenSession,
    ) -> Result<String, AuthError> {
        let record = self
            .store
            .find_by_tenant(tenant_id)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .ok_or_else(|| AuthError::NotAuthorized(tenant_id.clone()))?;

        let token = record.oauth_bundle.access_token;
        session.access_token = Some(token.clone());
        Ok(token)
    }

    /// Hands the held lock to a spawned refresh and waits for it.
    async fn refresh_detached(
        &self,
        tenant_id: &TenantId,
        mut session: OwnedMutexGuard<TokenSession>,
    ) -> Result<String, AuthError> {
        let flight = RefreshFlight {
            store: Arc::clone(&self.store),
            platform: Arc::clone(&self.platform),
            timeout: self.refresh_timeout,
        };
        let tenant = tenant_id.clone();

        let task = tokio::spawn(async move { flight.run(&tenant, &mut session).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(tenant_id = %tenant_id, error = %e, "refresh task failed");
                Err(AuthError::RefreshFailed {
                    message: "refresh task failed".to_string(),
                })
            }
        }
    }
}
