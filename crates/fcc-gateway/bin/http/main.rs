mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use fcc_core::Registry;
use fcc_gateway::{App, AppState};
use fcc_shortener::{ShortenerService, ShortenerSettings, TokioResolver};
use fcc_storage::{InMemoryRegistry, MySqlRegistry};
use fcc_telemetry::TelemetryConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let _telemetry = fcc_telemetry::init(
        TelemetryConfig::builder()
            .service_name("fcc-gateway")
            .format(config.log_format.into())
            .otlp_endpoint(config.otlp_endpoint.clone())
            .build(),
    )?;

    let listen_addr = config.bind_addr();
    let settings = config.shortener_settings();

    info!(
        listen_addr = %listen_addr,
        storage_backend = %config.storage,
        dns_timeout_ms = config.dns_timeout_ms,
        storage_timeout_ms = config.storage_timeout_ms,
        max_allocation_attempts = config.max_allocation_attempts,
        "starting gateway"
    );

    match config.storage {
        StorageBackendArg::InMemory => {
            run_server(listen_addr, InMemoryRegistry::new(), settings).await?;
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .context("mysql dsn is required when storage backend is mysql")?;
            let registry = MySqlRegistry::connect(&mysql_dsn)
                .await
                .context("failed to connect to mysql")?;
            registry
                .ensure_schema()
                .await
                .context("failed to create url mapping tables")?;
            run_server(listen_addr, registry, settings).await?;
        }
    }

    Ok(())
}

async fn run_server<R: Registry>(
    listen_addr: SocketAddr,
    registry: R,
    settings: ShortenerSettings,
) -> anyhow::Result<()> {
    let shortener = ShortenerService::with_settings(registry, TokioResolver, settings);
    let app = App::router(AppState::new(Arc::new(shortener)));

    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
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

    info!("shutdown signal received");
}
