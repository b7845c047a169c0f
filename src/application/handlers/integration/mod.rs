//! Integration handlers.
//!
//! - `TokenLifecycleManager` - OAuth token state machine with single-flight refresh
//! - `PaymentDispatcher` - Environment-scoped payment intent creation
//! - `ProviderRegistrationWorkflow` - Register, configure, deregister with one 401 retry
//! - `DeprovisioningWorkflow` - Tenant and account uninstall
//! - `CompleteAuthorizationHandler`, `SaveSettingsHandler`, `RecordProviderKeysHandler` -
//!   inbound flows composed from the above

mod complete_authorization;
mod deprovisioning;
mod payment_dispatcher;
mod provider_registration;
mod record_provider_keys;
mod save_settings;
mod token_lifecycle;

pub use complete_authorization::{
    CompleteAuthorizationCommand, CompleteAuthorizationHandler, CompleteAuthorizationResult,
};
pub use deprovisioning::{DeprovisionOutcome, DeprovisioningWorkflow};
pub use payment_dispatcher::{CreatePaymentIntentCommand, PaymentDispatcher};
pub use provider_registration::{ConfigureOutcome, ProviderRegistrationWorkflow};
pub use record_provider_keys::{RecordProviderKeysCommand, RecordProviderKeysHandler};
pub use save_settings::{SaveSettingsCommand, SaveSettingsHandler};
pub use token_lifecycle::TokenLifecycleManager;
