//! Gateway environment selection.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::IntegrationError;

/// Mutually exclusive credential scope for gateway calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayEnvironment {
    /// Production gateway, real money.
    Live,
    /// Sandbox gateway.
    Test,
}

impl GatewayEnvironment {
    /// Both environments, live first.
    pub const ALL: [GatewayEnvironment; 2] = [GatewayEnvironment::Live, GatewayEnvironment::Test];

    /// Resolves the caller-supplied mode.
    ///
    /// Only the exact values `live` and `test` are accepted. Anything else,
    /// including an absent mode, fails closed: there is no default.
    pub fn from_mode(mode: Option<&str>) -> Result<Self, IntegrationError> {
        match mode {
            Some("live") => Ok(GatewayEnvironment::Live),
            Some("test") => Ok(GatewayEnvironment::Test),
            other => Err(IntegrationError::ambiguous_environment(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayEnvironment::Live => "live",
            GatewayEnvironment::Test => "test",
        }
    }
}

impl fmt::Display for GatewayEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
