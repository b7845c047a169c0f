//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables carry the `GHL_BAYARCASH`
//! prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use ghl_bayarcash::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod gateway;
mod platform;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use platform::PlatformConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// OAuth app and platform API (LeadConnector)
    pub platform: PlatformConfig,

    /// Payment gateway (BayarCash)
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` when present, then reads `GHL_BAYARCASH__*` variables:
    ///
    /// - `GHL_BAYARCASH__SERVER__PORT=3000` -> `server.port = 3000`
    /// - `GHL_BAYARCASH__PLATFORM__CLIENT_ID=...` -> `platform.client_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or a value
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GHL_BAYARCASH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all sections. Production tightens URL checks to HTTPS.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let production = self.is_production();
        self.server.validate()?;
        self.database.validate()?;
        self.platform.validate(production)?;
        self.gateway.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[(&str, &str)] = &[
        ("GHL_BAYARCASH__DATABASE__URL", "postgresql://test@localhost/test"),
        ("GHL_BAYARCASH__PLATFORM__CLIENT_ID", "client-id"),
        ("GHL_BAYARCASH__PLATFORM__CLIENT_SECRET", "client-secret"),
        (
            "GHL_BAYARCASH__PLATFORM__REDIRECT_URI",
            "https://api.example.com/oauth/callback",
        ),
    ];

    const OPTIONAL: &[&str] = &[
        "GHL_BAYARCASH__SERVER__PORT",
        "GHL_BAYARCASH__SERVER__ENVIRONMENT",
        "GHL_BAYARCASH__GATEWAY__TRUST_UNVERIFIED_CHARGES",
    ];

    fn set_minimal_env() {
        for (key, value) in VARS {
            env::set_var(key, value);
        }
    }

    fn clear_env() {
        for (key, _) in VARS {
            env::remove_var(key);
        }
        for key in OPTIONAL {
            env::remove_var(key);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.platform.client_id, "client-id");
        assert_eq!(config.platform.api_version, "2021-07-28");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_fail_closed_on_payment_query() {
        let config = load_with(&[]).unwrap();
        assert!(!config.gateway.trust_unverified_charges);
        assert_eq!(config.server.environment, Environment::Development);
    }

    #[test]
    fn test_nested_overrides() {
        let config = load_with(&[
            ("GHL_BAYARCASH__SERVER__PORT", "8081"),
            ("GHL_BAYARCASH__GATEWAY__TRUST_UNVERIFIED_CHARGES", "true"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 8081);
        assert!(config.gateway.trust_unverified_charges);
    }

    #[test]
    fn test_production_rejects_plain_http_public_urls() {
        let config = load_with(&[("GHL_BAYARCASH__SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
        // Default frontend URL is http://localhost
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MustBeHttps("FRONTEND_URL"))
        ));
    }
}
