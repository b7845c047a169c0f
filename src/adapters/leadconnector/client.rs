//! LeadConnector platform client.
//!
//! Implements `PlatformClient` against the LeadConnector REST API: the
//! OAuth token endpoint (form-encoded grants) and the custom payment
//! provider endpoints (JSON, bearer token, `Version` header).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::domain::foundation::{AccountId, TenantId, UserId};
use crate::domain::integration::{
    ConnectPayload, IssuedTokens, OAuthBundle, TenantAuthorization,
};
use crate::ports::{PlatformClient, PlatformError, ProviderListing};

use super::wire::{upstream_message, TokenResponse};

/// LeadConnector API configuration.
#[derive(Clone)]
pub struct LeadConnectorConfig {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    token_url: String,
    api_base_url: String,
    api_version: String,
    timeout: Duration,
}

impl LeadConnectorConfig {
    /// Create a configuration with production endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
            token_url: "https://services.leadconnectorhq.com/oauth/token".to_string(),
            api_base_url: "https://services.leadconnectorhq.com".to_string(),
            api_version: "2021-07-28".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Override the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Override the API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the `Version` header value.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Bound every outbound call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// LeadConnector platform adapter.
pub struct LeadConnectorClient {
    config: LeadConnectorConfig,
    http_client: reqwest::Client,
}

impl LeadConnectorClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LeadConnectorConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn provider_url(&self) -> String {
        format!("{}/payments/custom-provider/provider", self.config.api_base_url)
    }

    fn connect_url(&self) -> String {
        format!("{}/payments/custom-provider/connect", self.config.api_base_url)
    }

    async fn token_grant<T: Serialize + ?Sized>(
        &self,
        form: &T,
    ) -> Result<TokenResponse, PlatformError> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .timeout(self.config.timeout)
            .form(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let message = upstream_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "token request failed".to_string());
            return Err(PlatformError::from_status(status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            PlatformError::invalid_response(format!("Failed to parse token response: {}", e))
        })
    }

    async fn send_provider_call(
        &self,
        request: reqwest::RequestBuilder,
        tenant_id: &TenantId,
        access_token: &str,
        operation: &str,
    ) -> Result<(), PlatformError> {
        let response = request
            .query(&[("locationId", tenant_id.as_str())])
            .bearer_auth(access_token)
            .header("Version", &self.config.api_version)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = upstream_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| format!("{} failed", operation));
        tracing::debug!(status = status.as_u16(), operation, "platform call rejected");
        Err(PlatformError::from_status(status.as_u16(), message))
    }
}

fn transport_error(e: reqwest::Error) -> PlatformError {
    if e.is_timeout() {
        PlatformError::timeout(e.to_string())
    } else {
        PlatformError::network(e.to_string())
    }
}

#[async_trait]
impl PlatformClient for LeadConnectorClient {
    async fn exchange_code(&self, code: &str) -> Result<TenantAuthorization, PlatformError> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        let token = self.token_grant(&form).await?;

        let tenant_id = token
            .location_id
            .as_deref()
            .map(TenantId::new)
            .transpose()
            .ok()
            .flatten()
            .ok_or_else(|| PlatformError::invalid_response("Token response has no locationId"))?;
        let account_id = token
            .company_id
            .as_deref()
            .map(AccountId::new)
            .transpose()
            .ok()
            .flatten()
            .ok_or_else(|| PlatformError::invalid_response("Token response has no companyId"))?;
        let user_id = token
            .user_id
            .as_deref()
            .and_then(|id| UserId::new(id).ok());

        Ok(TenantAuthorization {
            tenant_id,
            account_id,
            user_id,
            user_type: token.user_type.clone(),
            bundle: OAuthBundle::issued(token.tokens()),
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<IssuedTokens, PlatformError> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        Ok(self.token_grant(&form).await?.tokens())
    }

    async fn register_provider(
        &self,
        tenant_id: &TenantId,
        access_token: &str,
        listing: &ProviderListing,
    ) -> Result<(), PlatformError> {
        let request = self
            .http_client
            .post(self.provider_url())
            .json(listing);
        self.send_provider_call(request, tenant_id, access_token, "register provider")
            .await
    }

    async fn connect_provider(
        &self,
        tenant_id: &TenantId,
        access_token: &str,
        payload: &ConnectPayload,
    ) -> Result<(), PlatformError> {
        let request = self
            .http_client
            .post(self.connect_url())
            .json(payload);
        self.send_provider_call(request, tenant_id, access_token, "connect provider")
            .await
    }

    async fn deregister_provider(
        &self,
        tenant_id: &TenantId,
        access_token: &str,
    ) -> Result<(), PlatformError> {
        let request = self.http_client.delete(self.provider_url());
        self.send_provider_call(request, tenant_id, access_token, "deregister provider")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::integration::ProviderKeySummary;
    use crate::ports::PlatformErrorCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LeadConnectorClient {
        let config = LeadConnectorConfig::new(
            "client-1",
            SecretString::new("shh".to_string()),
            "https://app.example.com/oauth/callback",
        )
        .with_token_url(format!("{}/oauth/token", server.uri()))
        .with_api_base_url(server.uri())
        .with_timeout(Duration::from_secs(2));
        LeadConnectorClient::new(config)
    }

    fn tenant() -> TenantId {
        TenantId::new("loc_1").unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Token grants
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn exchange_code_posts_form_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc"))
            .and(body_string_contains("client_secret=shh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-1",
                "refresh_token": "rt-1",
                "expires_in": 86399,
                "userType": "Location",
                "locationId": "loc_1",
                "companyId": "comp_1",
                "userId": "user_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let authorization = client_for(&server).exchange_code("abc").await.unwrap();

        assert_eq!(authorization.tenant_id.as_str(), "loc_1");
        assert_eq!(authorization.account_id.as_str(), "comp_1");
        assert_eq!(authorization.bundle.access_token, "at-1");
        assert_eq!(authorization.bundle.token_type, "Bearer");
    }

    #[tokio::test]
    async fn exchange_code_surfaces_upstream_status_and_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).exchange_code("stale").await.unwrap_err();

        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "invalid_grant");
    }

    #[tokio::test]
    async fn exchange_code_requires_location_and_company() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-1",
                "refresh_token": "rt-1",
                "expires_in": 86399,
                "companyId": "comp_1"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).exchange_code("abc").await.unwrap_err();
        assert_eq!(err.code, PlatformErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn refresh_posts_refresh_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=rt-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-2",
                "refresh_token": "rt-2",
                "expires_in": 86399
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = client_for(&server).refresh_token("rt-1").await.unwrap();
        assert_eq!(tokens.access_token, "at-2");
        assert_eq!(tokens.refresh_token, "rt-2");
        assert!(tokens.token_type.is_none());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Provider calls
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn register_sends_bearer_and_version_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/custom-provider/provider"))
            .and(query_param("locationId", "loc_1"))
            .and(header("Authorization", "Bearer at-1"))
            .and(header("Version", "2021-07-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let listing = ProviderListing::for_deployment(
            "BayarCash",
            "FPX",
            "https://app.example.com",
            "https://api.example.com",
        );
        client_for(&server)
            .register_provider(&tenant(), "at-1", &listing)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn connect_sends_key_summaries_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/custom-provider/connect"))
            .and(query_param("locationId", "loc_1"))
            .and(body_json(json!({
                "test": {"apiKey": "key", "publishableKey": "portal"}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let payload = ConnectPayload {
            live: None,
            test: Some(ProviderKeySummary {
                api_key: "key".into(),
                publishable_key: "portal".into(),
            }),
        };
        client_for(&server)
            .connect_provider(&tenant(), "at-1", &payload)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn provider_401_is_classified_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/payments/custom-provider/provider"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid JWT"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .deregister_provider(&tenant(), "expired")
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.message, "Invalid JWT");
    }

    #[tokio::test]
    async fn slow_platform_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let config = LeadConnectorConfig::new("c", SecretString::new("s".to_string()), "r")
            .with_token_url(format!("{}/oauth/token", server.uri()))
            .with_timeout(Duration::from_millis(100));
        let err = LeadConnectorClient::new(config)
            .refresh_token("rt")
            .await
            .unwrap_err();

        assert_eq!(err.code, PlatformErrorCode::Timeout);
    }
}
