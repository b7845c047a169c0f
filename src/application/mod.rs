//! Application layer - Commands, workflows and handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    CompleteAuthorizationCommand, CompleteAuthorizationHandler, CompleteAuthorizationResult,
    ConfigureOutcome, CreatePaymentIntentCommand, DeprovisionOutcome, DeprovisioningWorkflow,
    PaymentDispatcher, ProviderRegistrationWorkflow, RecordProviderKeysCommand,
    RecordProviderKeysHandler, SaveSettingsCommand, SaveSettingsHandler, TokenLifecycleManager,
};
