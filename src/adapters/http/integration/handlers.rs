//! HTTP handlers for the integration endpoints.
//!
//! These handlers connect Axum routes to the application workflows.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;

use crate::application::{
    CompleteAuthorizationCommand, CompleteAuthorizationHandler, ConfigureOutcome,
    CreatePaymentIntentCommand, DeprovisionOutcome, DeprovisioningWorkflow, PaymentDispatcher,
    ProviderRegistrationWorkflow, RecordProviderKeysCommand, RecordProviderKeysHandler,
    SaveSettingsCommand, SaveSettingsHandler, TokenLifecycleManager,
};
use crate::domain::foundation::{TenantId, ValidationError};
use crate::domain::integration::{AuthError, IntegrationError, UninstallEvent};
use crate::ports::{CredentialStore, PaymentGateway, PlatformClient, ProviderListing};

use super::dto::{
    ConnectProviderRequest, ErrorResponse, HealthResponse, LocationQuery, OAuthCallbackQuery,
    PaymentIntentResponse, PaymentQueryRequest, PaymentQueryResponse, ProcessPaymentRequest,
    SaveSettingsRequest, SaveSettingsResponse, SuccessResponse, UninstallResponse,
    UninstallWebhookRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Deployment settings the HTTP surface needs besides the ports.
#[derive(Debug, Clone)]
pub struct IntegrationSettings {
    /// Root of the settings and checkout UI; redirects and return URLs hang off it.
    pub frontend_url: String,
    pub listing: ProviderListing,
    pub refresh_timeout: Duration,
    pub trust_unverified_charges: bool,
}

/// Shared state: the long-lived workflows plus what the per-request
/// handlers are built from.
#[derive(Clone)]
pub struct IntegrationAppState {
    pub store: Arc<dyn CredentialStore>,
    pub tokens: Arc<TokenLifecycleManager>,
    pub registration: Arc<ProviderRegistrationWorkflow>,
    pub dispatcher: Arc<PaymentDispatcher>,
    pub deprovisioning: Arc<DeprovisioningWorkflow>,
    pub frontend_url: String,
    pub trust_unverified_charges: bool,
}

impl IntegrationAppState {
    /// Wires the workflows around one shared token manager.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        platform: Arc<dyn PlatformClient>,
        gateway: Arc<dyn PaymentGateway>,
        settings: IntegrationSettings,
    ) -> Self {
        let frontend_url = settings.frontend_url.trim_end_matches('/').to_string();
        let tokens = Arc::new(TokenLifecycleManager::new(
            store.clone(),
            platform.clone(),
            settings.refresh_timeout,
        ));
        let registration = Arc::new(ProviderRegistrationWorkflow::new(
            platform,
            store.clone(),
            tokens.clone(),
            settings.listing,
        ));
        let dispatcher = Arc::new(PaymentDispatcher::new(
            store.clone(),
            gateway,
            frontend_url.clone(),
        ));
        let deprovisioning = Arc::new(DeprovisioningWorkflow::new(store.clone(), tokens.clone()));

        Self {
            store,
            tokens,
            registration,
            dispatcher,
            deprovisioning,
            frontend_url,
            trust_unverified_charges: settings.trust_unverified_charges,
        }
    }

    pub fn complete_authorization_handler(&self) -> CompleteAuthorizationHandler {
        CompleteAuthorizationHandler::new(self.tokens.clone(), self.registration.clone())
    }

    pub fn save_settings_handler(&self) -> SaveSettingsHandler {
        SaveSettingsHandler::new(self.store.clone(), self.registration.clone())
    }

    pub fn record_provider_keys_handler(&self) -> RecordProviderKeysHandler {
        RecordProviderKeysHandler::new(self.store.clone())
    }

    fn frontend_redirect(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Redirect, IntegrationApiError> {
        let url = reqwest::Url::parse_with_params(&format!("{}/{}", self.frontend_url, path), params)
            .map_err(|e| IntegrationError::Infrastructure(format!("bad frontend URL: {e}")))?;
        Ok(Redirect::to(url.as_str()))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Platform-facing endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// GET /oauth/callback - Exchange the code, register the provider, redirect the browser
pub async fn oauth_callback(
    State(state): State<IntegrationAppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Redirect, IntegrationApiError> {
    let handler = state.complete_authorization_handler();

    match handler
        .handle(CompleteAuthorizationCommand { code: query.code })
        .await
    {
        Ok(result) => state.frontend_redirect(
            "settings",
            &[
                ("location_id", result.tenant_id.as_str()),
                ("status", "success"),
            ],
        ),
        Err(err) => {
            tracing::warn!(error = %err, "authorization callback failed");
            let message = match &err {
                AuthError::ExchangeRejected { message, .. } => message.clone(),
                other => other.to_string(),
            };
            let code = err.redirect_code();
            state.frontend_redirect(
                "install-failed",
                &[("error", message.as_str()), ("code", code.as_str())],
            )
        }
    }
}

/// POST /webhook/uninstall
pub async fn uninstall_webhook(
    State(state): State<IntegrationAppState>,
    Json(request): Json<UninstallWebhookRequest>,
) -> Result<impl IntoResponse, IntegrationApiError> {
    let event = UninstallEvent::parse(
        request.event_type.as_deref(),
        request.account_id.as_deref(),
        request.tenant_id.as_deref(),
    )?;

    let response = match state.deprovisioning.handle(event).await? {
        DeprovisionOutcome::TenantRemoved { tenant_id, existed } => UninstallResponse::Tenant {
            tenant_id: tenant_id.to_string(),
            removed: usize::from(existed),
        },
        DeprovisionOutcome::AccountRemoved {
            account_id,
            removed,
        } => UninstallResponse::Account {
            account_id: account_id.to_string(),
            removed,
        },
    };

    Ok(Json(response))
}

/// POST /payments/custom-provider/connect?locationId=...
pub async fn connect_provider(
    State(state): State<IntegrationAppState>,
    Query(query): Query<LocationQuery>,
    Json(request): Json<ConnectProviderRequest>,
) -> Result<impl IntoResponse, IntegrationApiError> {
    let tenant_id = required_tenant(query.location_id.as_deref(), "locationId")?;

    state
        .record_provider_keys_handler()
        .handle(RecordProviderKeysCommand {
            tenant_id,
            live: request.live.map(Into::into),
            test: request.test.map(Into::into),
        })
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /payments/custom-provider/provider?locationId=...
pub async fn deregister_provider(
    State(state): State<IntegrationAppState>,
    Query(query): Query<LocationQuery>,
) -> Result<impl IntoResponse, IntegrationApiError> {
    let tenant_id = required_tenant(query.location_id.as_deref(), "locationId")?;
    state.registration.deregister(&tenant_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/bayarcash-query (alias /api/payment-query)
///
/// No authenticated upstream verification exists, so charges are reported
/// as failed unless the deployment explicitly opts into trusting them.
pub async fn payment_query(
    State(state): State<IntegrationAppState>,
    Json(request): Json<PaymentQueryRequest>,
) -> Result<impl IntoResponse, IntegrationApiError> {
    if request.query_type.as_deref() != Some("verify") {
        return Err(IntegrationError::validation("type", "only \"verify\" queries are supported").into());
    }
    let charge_id = request
        .charge_id
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| IntegrationError::validation("chargeId", "is required"))?;

    if state.trust_unverified_charges {
        tracing::warn!(
            charge_id = %charge_id,
            transaction_id = ?request.transaction_id,
            "payment query answered as success without upstream verification"
        );
        Ok(Json(PaymentQueryResponse::verified()))
    } else {
        tracing::info!(charge_id = %charge_id, "payment query answered as failed, verification unavailable");
        Ok(Json(PaymentQueryResponse::unverified()))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// UI-facing endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/process-payment
pub async fn process_payment(
    State(state): State<IntegrationAppState>,
    Json(request): Json<ProcessPaymentRequest>,
) -> Result<impl IntoResponse, IntegrationApiError> {
    let tenant_id = required_tenant(request.tenant_id.as_deref(), "locationId")?;
    let amount = request
        .amount
        .ok_or_else(|| IntegrationError::validation("amount", "is required"))?;

    let intent = state
        .dispatcher
        .handle(CreatePaymentIntentCommand {
            tenant_id,
            mode: request.mode,
            amount,
            currency: request.currency,
            order_id: request.order_id,
            payer_name: request.customer_name,
            payer_email: request.customer_email,
        })
        .await?;

    Ok(Json(PaymentIntentResponse::from(intent)))
}

/// POST /api/settings
pub async fn save_settings(
    State(state): State<IntegrationAppState>,
    Json(request): Json<SaveSettingsRequest>,
) -> Result<impl IntoResponse, IntegrationApiError> {
    let tenant_id = required_tenant(request.tenant_id.as_deref(), "tenant_id")?;
    let (live, test) = request.environments();

    let outcome = state
        .save_settings_handler()
        .handle(SaveSettingsCommand {
            tenant_id,
            live,
            test,
        })
        .await?;

    Ok(Json(SaveSettingsResponse {
        success: true,
        provider_configured: outcome == ConfigureOutcome::Pushed,
    }))
}

fn required_tenant(raw: Option<&str>, field: &str) -> Result<TenantId, IntegrationError> {
    match raw.filter(|s| !s.trim().is_empty()) {
        Some(id) => Ok(TenantId::new(id)?),
        None => Err(IntegrationError::validation(field, "is required")),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper that converts integration errors to HTTP responses.
#[derive(Debug)]
pub struct IntegrationApiError(IntegrationError);

impl From<IntegrationError> for IntegrationApiError {
    fn from(err: IntegrationError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for IntegrationApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntegrationApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            IntegrationError::Auth(AuthError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            IntegrationError::Auth(AuthError::MissingCode) => StatusCode::BAD_REQUEST,
            IntegrationError::Auth(_) => StatusCode::UNAUTHORIZED,
            IntegrationError::CredentialsIncomplete { .. }
            | IntegrationError::AmbiguousEnvironment { .. }
            | IntegrationError::InvalidEvent { .. }
            | IntegrationError::Validation { .. } => StatusCode::BAD_REQUEST,
            IntegrationError::TenantNotFound(_) => StatusCode::NOT_FOUND,
            IntegrationError::Dispatch { .. }
            | IntegrationError::RegistrationFailed { .. }
            | IntegrationError::ConfigFailed { .. }
            | IntegrationError::DeregistrationFailed { .. } => StatusCode::BAD_GATEWAY,
            IntegrationError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IntegrationApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.code();

        let body = match &self.0 {
            IntegrationError::Infrastructure(detail) => {
                tracing::error!(error = %detail, "request failed on infrastructure error");
                ErrorResponse::new(code, "Internal server error")
            }
            IntegrationError::Auth(AuthError::Storage(detail)) => {
                tracing::error!(error = %detail, "token storage failed");
                ErrorResponse::new(code, "Internal server error")
            }
            IntegrationError::Dispatch {
                code: upstream,
                message,
            } => ErrorResponse::new(code, message.clone())
                .with_details(json!({ "upstreamCode": upstream })),
            IntegrationError::CredentialsIncomplete {
                environment,
                missing,
            } => ErrorResponse::new(code, self.0.to_string())
                .with_details(json!({ "environment": environment.as_str(), "missing": missing })),
            other => ErrorResponse::new(code, other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
