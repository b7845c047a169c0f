//! Integration domain: tenant authorization, gateway credentials and
//! the events that create and remove them.

mod amount;
mod credentials;
mod environment;
mod errors;
mod oauth;
mod tenant_integration;
mod token_state;
mod uninstall;

pub use amount::Amount;
pub use credentials::{
    ConnectPayload, EnvironmentCredentials, GatewayCredentials, PlatformKeys,
    ProviderKeySummary, UsableCredentials,
};
pub use environment::GatewayEnvironment;
pub use errors::{AuthError, IntegrationError};
pub use oauth::{IssuedTokens, OAuthBundle, TenantAuthorization};
pub use tenant_integration::TenantIntegration;
pub use token_state::TokenState;
pub use uninstall::{UninstallEvent, UninstallScope, UNINSTALL_EVENT_TYPE};
