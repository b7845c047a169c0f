//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresCredentialStore` - Tenant authorization and gateway credentials

mod credential_store;

pub use credential_store::PostgresCredentialStore;
