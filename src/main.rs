//! ghl-bayarcash service entry point.

use std::sync::Arc;

use tokio::net::TcpListener;

use ghl_bayarcash::adapters::http::{app, IntegrationAppState, IntegrationSettings};
use ghl_bayarcash::adapters::{
    BayarCashClient, LeadConnectorClient, PostgresCredentialStore,
};
use ghl_bayarcash::config::AppConfig;
use ghl_bayarcash::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let store = Arc::new(PostgresCredentialStore::new(pool.clone()));
    let platform = Arc::new(LeadConnectorClient::new(config.platform.client_config()));
    let gateway = Arc::new(BayarCashClient::new(config.gateway.client_config()));

    if config.gateway.trust_unverified_charges {
        tracing::warn!("payment queries will report success without upstream verification");
    }

    let state = IntegrationAppState::new(
        store,
        platform,
        gateway,
        IntegrationSettings {
            frontend_url: config.server.frontend_url.clone(),
            listing: config.platform.provider_listing(&config.server),
            refresh_timeout: config.platform.refresh_timeout(),
            trust_unverified_charges: config.gateway.trust_unverified_charges,
        },
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "ghl-bayarcash listening");

    axum::serve(listener, app(state, &config.server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("database pool closed, shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining requests");
}
