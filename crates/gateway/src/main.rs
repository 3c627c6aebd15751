//! OpLang gateway
//!
//! Runs the OpLang data source behind an HTTP API so dashboard hosts can
//! query it, and reports backend reachability through health checks.

use anyhow::{Context, Result};
use oplang_gateway::{api, config::GatewayConfig};
use oplang_lib::{health::components, DataSource, HealthRegistry, StructuredLogger};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const GATEWAY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // JSON output with env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting oplang-gateway");

    let config = GatewayConfig::load()?;
    info!(
        backend_url = %config.backend_url,
        listen_port = config.listen_port,
        "Gateway configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::BACKEND).await;
    health_registry.register(components::GATEWAY).await;

    let datasource = DataSource::connect(&config.datasource_settings())
        .context("failed to build backend client")?;

    let logger = StructuredLogger::new(&config.datasource_name);
    logger.log_startup(GATEWAY_VERSION, &config.backend_url);

    let app_state = Arc::new(api::AppState::new(
        Arc::new(datasource),
        health_registry.clone(),
    ));

    // an unreachable backend leaves the gateway up but not ready
    api::check_backend(&app_state).await;
    health_registry.set_ready(true).await;

    let server = tokio::spawn(api::serve(config.listen_port, app_state));

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
        served = server => {
            served.context("API server task failed")??;
            logger.log_shutdown("API server exited");
        }
    }

    info!("Shutting down");
    Ok(())
}
