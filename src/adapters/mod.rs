//! Adapters - Implementations of port interfaces.
//!
//! - `postgres` - Credential store over sqlx
//! - `memory` - In-memory credential store
//! - `leadconnector` - Platform client (OAuth grants, provider registration)
//! - `bayarcash` - Payment gateway client
//! - `http` - Axum REST surface

pub mod bayarcash;
pub mod http;
pub mod leadconnector;
pub mod memory;
pub mod postgres;

pub use bayarcash::{BayarCashClient, BayarCashConfig, MockPaymentGateway};
pub use leadconnector::{LeadConnectorClient, LeadConnectorConfig, MockPlatformClient};
pub use memory::InMemoryCredentialStore;
pub use postgres::PostgresCredentialStore;
