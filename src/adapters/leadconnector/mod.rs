//! LeadConnector (platform) adapter.
//!
//! Implements the `PlatformClient` port:
//! - OAuth authorization-code and refresh-token grants
//! - Custom payment provider register, connect and deregister
//!
//! # Security
//!
//! - The client secret is held as `secrecy::SecretString`
//! - Tokens never appear in logs

mod client;
mod mock_platform_client;
mod wire;

pub use client::{LeadConnectorClient, LeadConnectorConfig};
pub use mock_platform_client::{MockPlatformClient, PlatformCall};
