//! Mock platform client for testing.
//!
//! Scripted responses per operation, an optional delay on refresh grants
//! (to hold a refresh in flight while other callers pile up), and a call
//! log for assertions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, TenantId};
use crate::domain::integration::{
    ConnectPayload, IssuedTokens, OAuthBundle, TenantAuthorization,
};
use crate::ports::{PlatformClient, PlatformError, ProviderListing};

/// Mock platform client.
///
/// # Example
///
/// ```ignore
/// let platform = MockPlatformClient::new();
/// platform.push_connect_result(Err(PlatformError::from_status(401, "expired")));
///
/// // second connect attempt falls back to the default `Ok(())`
/// assert_eq!(platform.connect_calls(), 0);
/// ```
#[derive(Default, Clone)]
pub struct MockPlatformClient {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    exchange_results: VecDeque<Result<TenantAuthorization, PlatformError>>,
    refresh_results: VecDeque<Result<IssuedTokens, PlatformError>>,
    register_results: VecDeque<Result<(), PlatformError>>,
    connect_results: VecDeque<Result<(), PlatformError>>,
    deregister_results: VecDeque<Result<(), PlatformError>>,
    refresh_delay: Option<Duration>,
    refresh_counter: u32,
    call_log: Vec<PlatformCall>,
}

/// Recorded call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    ExchangeCode {
        code: String,
    },
    RefreshToken {
        refresh_token: String,
    },
    RegisterProvider {
        tenant_id: TenantId,
        access_token: String,
    },
    ConnectProvider {
        tenant_id: TenantId,
        access_token: String,
        payload: ConnectPayload,
    },
    DeregisterProvider {
        tenant_id: TenantId,
        access_token: String,
    },
}

impl MockPlatformClient {
    /// Create a mock where every provider call succeeds, refreshes mint
    /// `access-N`/`refresh-N` pairs and unscripted code exchanges fail.
    pub fn new() -> Self {
        Self::default()
    }

    /// A ready-made authorization for scripting exchanges.
    pub fn authorization(
        tenant_id: TenantId,
        account_id: AccountId,
        access_token: &str,
    ) -> TenantAuthorization {
        TenantAuthorization {
            tenant_id,
            account_id,
            user_id: None,
            user_type: Some("Location".to_string()),
            bundle: OAuthBundle::issued(IssuedTokens {
                access_token: access_token.to_string(),
                refresh_token: format!("{access_token}-refresh"),
                token_type: Some("Bearer".to_string()),
                expires_in: 86399,
                scope: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    pub fn push_exchange_result(&self, result: Result<TenantAuthorization, PlatformError>) {
        self.state().exchange_results.push_back(result);
    }

    pub fn push_refresh_result(&self, result: Result<IssuedTokens, PlatformError>) {
        self.state().refresh_results.push_back(result);
    }

    pub fn push_register_result(&self, result: Result<(), PlatformError>) {
        self.state().register_results.push_back(result);
    }

    pub fn push_connect_result(&self, result: Result<(), PlatformError>) {
        self.state().connect_results.push_back(result);
    }

    pub fn push_deregister_result(&self, result: Result<(), PlatformError>) {
        self.state().deregister_results.push_back(result);
    }

    /// Hold every refresh grant for `delay` before answering.
    pub fn set_refresh_delay(&self, delay: Duration) {
        self.state().refresh_delay = Some(delay);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertions
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state().call_log.clone()
    }

    pub fn refresh_calls(&self) -> usize {
        self.count(|c| matches!(c, PlatformCall::RefreshToken { .. }))
    }

    pub fn register_calls(&self) -> usize {
        self.count(|c| matches!(c, PlatformCall::RegisterProvider { .. }))
    }

    pub fn connect_calls(&self) -> usize {
        self.count(|c| matches!(c, PlatformCall::ConnectProvider { .. }))
    }

    pub fn deregister_calls(&self) -> usize {
        self.count(|c| matches!(c, PlatformCall::DeregisterProvider { .. }))
    }

    fn count(&self, predicate: impl Fn(&PlatformCall) -> bool) -> usize {
        self.state().call_log.iter().filter(|c| predicate(c)).count()
    }
}

#[async_trait]
impl PlatformClient for MockPlatformClient {
    async fn exchange_code(&self, code: &str) -> Result<TenantAuthorization, PlatformError> {
        let mut state = self.state();
        state.call_log.push(PlatformCall::ExchangeCode {
            code: code.to_string(),
        });
        state
            .exchange_results
            .pop_front()
            .unwrap_or_else(|| Err(PlatformError::from_status(400, "invalid_grant")))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<IssuedTokens, PlatformError> {
        let delay = {
            let mut state = self.state();
            state.call_log.push(PlatformCall::RefreshToken {
                refresh_token: refresh_token.to_string(),
            });
            state.refresh_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state();
        state.refresh_counter += 1;
        let n = state.refresh_counter;
        state.refresh_results.pop_front().unwrap_or_else(|| {
            Ok(IssuedTokens {
                access_token: format!("access-{n}"),
                refresh_token: format!("refresh-{n}"),
                token_type: None,
                expires_in: 86399,
                scope: None,
            })
        })
    }

    async fn register_provider(
        &self,
        tenant_id: &TenantId,
        access_token: &str,
        _listing: &ProviderListing,
    ) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.call_log.push(PlatformCall::RegisterProvider {
            tenant_id: tenant_id.clone(),
            access_token: access_token.to_string(),
        });
        state.register_results.pop_front().unwrap_or(Ok(()))
    }

    async fn connect_provider(
        &self,
        tenant_id: &TenantId,
        access_token: &str,
        payload: &ConnectPayload,
    ) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.call_log.push(PlatformCall::ConnectProvider {
            tenant_id: tenant_id.clone(),
            access_token: access_token.to_string(),
            payload: payload.clone(),
        });
        state.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn deregister_provider(
        &self,
        tenant_id: &TenantId,
        access_token: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.state();
        state.call_log.push(PlatformCall::DeregisterProvider {
            tenant_id: tenant_id.clone(),
            access_token: access_token.to_string(),
        });
        state.deregister_results.pop_front().unwrap_or(Ok(()))
    }
}
