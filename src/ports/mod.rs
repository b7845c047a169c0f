//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage
//!
//! - `CredentialStore` - Per-tenant authorization and gateway credentials
//!
//! ## Outbound
//!
//! - `PlatformClient` - OAuth grants and payment provider listing on the platform
//! - `PaymentGateway` - Payment intent creation

mod credential_store;
mod payment_gateway;
mod platform_client;

pub use credential_store::CredentialStore;
pub use payment_gateway::{
    GatewayError, GatewayErrorCode, PaymentGateway, PaymentIntent, PaymentIntentRequest,
};
pub use platform_client::{PlatformClient, PlatformError, PlatformErrorCode, ProviderListing};
