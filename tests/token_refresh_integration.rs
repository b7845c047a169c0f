//! Integration tests for token refresh under concurrency.
//!
//! These tests drive `TokenLifecycleManager` the way concurrent request
//! handlers do:
//! 1. A fresh authorization is usable without a refresh
//! 2. N concurrent callers on a stale tenant share one refresh grant
//! 3. A failed or timed-out refresh is shared and terminal

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use ghl_bayarcash::adapters::{InMemoryCredentialStore, MockPlatformClient};
use ghl_bayarcash::application::TokenLifecycleManager;
use ghl_bayarcash::domain::foundation::{AccountId, TenantId};
use ghl_bayarcash::domain::integration::{AuthError, TenantIntegration, TokenState};
use ghl_bayarcash::ports::{CredentialStore, PlatformError};

// =============================================================================
// Test Infrastructure
// =============================================================================

const CALLERS: usize = 16;

fn tenant() -> TenantId {
    TenantId::new("T1").unwrap()
}

struct Harness {
    tokens: Arc<TokenLifecycleManager>,
    platform: MockPlatformClient,
    store: InMemoryCredentialStore,
}

async fn authorized_harness(refresh_timeout: Duration) -> Harness {
    let platform = MockPlatformClient::new();
    let store = InMemoryCredentialStore::new();
    store
        .insert(TenantIntegration::authorized(MockPlatformClient::authorization(
            tenant(),
            AccountId::new("A1").unwrap(),
            "at-0",
        )))
        .await;

    let tokens = Arc::new(TokenLifecycleManager::new(
        Arc::new(store.clone()),
        Arc::new(platform.clone()),
        refresh_timeout,
    ));

    Harness {
        tokens,
        platform,
        store,
    }
}

async fn ensure_valid_concurrently(tokens: &Arc<TokenLifecycleManager>) -> Vec<Result<String, AuthError>> {
    join_all((0..CALLERS).map(|_| {
        let tokens = Arc::clone(tokens);
        async move { tokens.ensure_valid(&tenant()).await }
    }))
    .await
}

// =============================================================================
// Exchange
// =============================================================================

#[tokio::test]
async fn exchanged_token_is_served_without_refresh() {
    let platform = MockPlatformClient::new();
    platform.push_exchange_result(Ok(MockPlatformClient::authorization(
        tenant(),
        AccountId::new("A1").unwrap(),
        "fresh",
    )));
    let tokens = TokenLifecycleManager::new(
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(platform.clone()),
        Duration::from_secs(1),
    );

    tokens.exchange_code(Some("code-123")).await.unwrap();
    let token = tokens.ensure_valid(&tenant()).await.unwrap();

    assert_eq!(token, "fresh");
    assert_eq!(platform.refresh_calls(), 0);
}

// =============================================================================
// Single-flight refresh
// =============================================================================

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let h = authorized_harness(Duration::from_secs(2)).await;
    h.platform.set_refresh_delay(Duration::from_millis(50));

    assert_eq!(h.tokens.ensure_valid(&tenant()).await.unwrap(), "at-0");
    h.tokens.mark_stale(&tenant(), "at-0").await;

    let results = ensure_valid_concurrently(&h.tokens).await;

    assert_eq!(h.platform.refresh_calls(), 1);
    assert!(results.iter().all(|r| r.as_deref() == Ok("access-1")));
    assert_eq!(h.tokens.state(&tenant()).await, Some(TokenState::Valid));

    let stored = h.store.find_by_tenant(&tenant()).await.unwrap().unwrap();
    assert_eq!(stored.oauth_bundle.access_token, "access-1");
    assert_eq!(stored.oauth_bundle.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn cold_start_stale_tenant_refreshes_once() {
    let h = authorized_harness(Duration::from_secs(2)).await;
    h.platform.set_refresh_delay(Duration::from_millis(20));

    // Nothing cached yet: the stale mark applies to whatever is stored
    h.tokens.mark_stale(&tenant(), "at-0").await;
    let results = ensure_valid_concurrently(&h.tokens).await;

    assert_eq!(h.platform.refresh_calls(), 1);
    assert!(results.iter().all(|r| r.as_deref() == Ok("access-1")));
}

#[tokio::test]
async fn late_stale_report_for_old_token_does_not_refresh_again() {
    let h = authorized_harness(Duration::from_secs(2)).await;
    h.tokens.ensure_valid(&tenant()).await.unwrap();
    h.tokens.mark_stale(&tenant(), "at-0").await;
    assert_eq!(h.tokens.ensure_valid(&tenant()).await.unwrap(), "access-1");

    // A slow caller reports the 401 it got on the previous token
    h.tokens.mark_stale(&tenant(), "at-0").await;
    assert_eq!(h.tokens.ensure_valid(&tenant()).await.unwrap(), "access-1");

    assert_eq!(h.platform.refresh_calls(), 1);
}

// =============================================================================
// Failure is shared and terminal
// =============================================================================

#[tokio::test]
async fn concurrent_callers_share_one_failure() {
    let h = authorized_harness(Duration::from_secs(2)).await;
    h.platform.set_refresh_delay(Duration::from_millis(20));
    h.platform
        .push_refresh_result(Err(PlatformError::from_status(400, "invalid_grant")));

    h.tokens.ensure_valid(&tenant()).await.unwrap();
    h.tokens.mark_stale(&tenant(), "at-0").await;
    let results = ensure_valid_concurrently(&h.tokens).await;

    assert_eq!(h.platform.refresh_calls(), 1);
    let first = results[0].clone().unwrap_err();
    assert!(matches!(first, AuthError::RefreshFailed { .. }));
    assert!(results.iter().all(|r| r.as_ref().err() == Some(&first)));
    assert_eq!(h.tokens.state(&tenant()).await, Some(TokenState::Invalid));

    // The rotated-away refresh token is never replayed
    let stored = h.store.find_by_tenant(&tenant()).await.unwrap().unwrap();
    assert!(stored.oauth_bundle.refresh_token.is_none());
}

#[tokio::test]
async fn timed_out_refresh_fails_closed() {
    let h = authorized_harness(Duration::from_millis(30)).await;
    h.platform.set_refresh_delay(Duration::from_millis(500));

    h.tokens.ensure_valid(&tenant()).await.unwrap();
    h.tokens.mark_stale(&tenant(), "at-0").await;
    let results = ensure_valid_concurrently(&h.tokens).await;

    assert_eq!(h.platform.refresh_calls(), 1);
    assert!(results.iter().all(|r| r == &Err(AuthError::RefreshTimedOut)));
    assert_eq!(h.tokens.state(&tenant()).await, Some(TokenState::Invalid));

    // Later callers get the same answer without another grant
    assert_eq!(
        h.tokens.ensure_valid(&tenant()).await,
        Err(AuthError::RefreshTimedOut)
    );
    assert_eq!(h.platform.refresh_calls(), 1);
}

#[tokio::test]
async fn reauthorization_recovers_an_invalid_tenant() {
    let h = authorized_harness(Duration::from_secs(1)).await;
    h.platform
        .push_refresh_result(Err(PlatformError::from_status(401, "revoked")));
    h.tokens.refresh(&tenant()).await.unwrap_err();
    assert_eq!(h.tokens.state(&tenant()).await, Some(TokenState::Invalid));

    h.platform.push_exchange_result(Ok(MockPlatformClient::authorization(
        tenant(),
        AccountId::new("A1").unwrap(),
        "again",
    )));
    h.tokens.exchange_code(Some("new-code")).await.unwrap();

    assert_eq!(h.tokens.ensure_valid(&tenant()).await.unwrap(), "again");
    assert_eq!(h.tokens.state(&tenant()).await, Some(TokenState::Valid));
}
