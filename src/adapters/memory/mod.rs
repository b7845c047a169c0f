//! In-memory adapters for tests and database-less runs.

mod in_memory_credential_store;

pub use in_memory_credential_store::InMemoryCredentialStore;
