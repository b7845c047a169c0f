//! Application handlers.
//!
//! Command handlers and workflows that orchestrate domain operations.

pub mod integration;

pub use integration::{
    CompleteAuthorizationCommand, CompleteAuthorizationHandler, CompleteAuthorizationResult,
    ConfigureOutcome, CreatePaymentIntentCommand, DeprovisionOutcome, DeprovisioningWorkflow,
    PaymentDispatcher, ProviderRegistrationWorkflow, RecordProviderKeysCommand,
    RecordProviderKeysHandler, SaveSettingsCommand, SaveSettingsHandler, TokenLifecycleManager,
};
