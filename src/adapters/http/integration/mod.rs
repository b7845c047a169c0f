//! HTTP adapter for the integration endpoints.
//!
//! Exposes the tenant lifecycle and payment dispatch over REST:
//! - `GET /oauth/callback` - Complete an install
//! - `POST /webhook/uninstall` - Remove a tenant or a whole account
//! - `POST /payments/custom-provider/connect` - Record keys pushed by the platform
//! - `DELETE /payments/custom-provider/provider` - Deregister the provider
//! - `POST /api/bayarcash-query` - Charge verification (fail-closed by default), also at `/api/payment-query`
//! - `POST /api/process-payment` - Create a payment intent
//! - `POST /api/settings` - Save gateway credentials
//! - `GET /health`

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{IntegrationApiError, IntegrationAppState, IntegrationSettings};
pub use routes::integration_router;
