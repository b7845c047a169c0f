//! Tracing subscriber setup.
//!
//! JSON lines in production, human-readable output everywhere else. The
//! filter comes from `RUST_LOG` when set, otherwise from `server.log_level`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ServerConfig;

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if server.is_production() {
        registry
            .with(fmt::layer().json().with_current_span(false).with_target(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    // Err only when a subscriber is already installed
    let _ = result;
}
