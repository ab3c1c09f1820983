//! appstats Server
//!
//! Serves read-only JSON queries over registered applications and their
//! usage events, backed by Postgres.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};

use appstats_core::config::{Config, load_config};
use appstats_server::storage::AnalyticsDatabase;
use appstats_server::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "appstats-server")]
#[command(version, about = "appstats server - read-only analytics query API")]
struct Args {
    /// JSON config file. Environment variables (`APPSTATS_*`) override it.
    #[arg(long, env = "APPSTATS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Full database URL; takes precedence over the individual --db-* options.
    #[arg(long)]
    database_url: Option<String>,

    /// Database host.
    #[arg(long)]
    db_host: Option<String>,

    /// Database port.
    #[arg(long)]
    db_port: Option<u16>,

    /// Database user.
    #[arg(long)]
    db_user: Option<String>,

    /// Database name.
    #[arg(long)]
    db_name: Option<String>,

    /// Maximum concurrent database connections.
    #[arg(long)]
    max_connections: Option<u32>,

    /// Log level filter (e.g. "info", "debug", "warn").
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "APPSTATS_LOG_JSON")]
    log_json: bool,

    /// OpenTelemetry OTLP endpoint for traces and metrics export
    /// (e.g. `http://localhost:4317`). Requires the `metrics` feature.
    #[cfg(feature = "metrics")]
    #[arg(long, env = "APPSTATS_METRICS_ENDPOINT")]
    metrics_endpoint: Option<String>,
}

impl Args {
    /// Apply CLI options on top of the file/env configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(addr) = self.addr {
            config.server.addr = addr;
        }
        if let Some(level) = &self.log_level {
            config.server.log_level.clone_from(level);
        }
        if let Some(url) = &self.database_url {
            config.database.url = Some(url.clone());
        }
        if let Some(host) = &self.db_host {
            config.database.host.clone_from(host);
        }
        if let Some(port) = self.db_port {
            config.database.port = port;
        }
        if let Some(user) = &self.db_user {
            config.database.user.clone_from(user);
        }
        if let Some(name) = &self.db_name {
            config.database.dbname.clone_from(name);
        }
        if let Some(max) = self.max_connections {
            config.database.max_connections = max;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);

    let level = &config.server.log_level;
    let log_filter = format!("appstats_server={level},appstats_core={level},tower_http={level}");

    #[cfg(feature = "metrics")]
    let metrics_guard = appstats_core::tracing_init::init_tracing_with_metrics(
        &log_filter,
        args.log_json,
        args.metrics_endpoint.as_deref(),
    );
    #[cfg(not(feature = "metrics"))]
    appstats_core::tracing_init::init_tracing(&log_filter, args.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.addr,
        max_connections = config.database.max_connections,
        "Starting appstats-server"
    );

    let db = match AnalyticsDatabase::open(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            error!(
                error = %e,
                url = %config.database.redacted_url(),
                "Database connectivity check failed"
            );
            return Err(e.into());
        }
    };

    let app = build_router(AppState::new(db.clone()));
    let listener = tokio::net::TcpListener::bind(config.server.addr).await?;
    info!(addr = %config.server.addr, "Analytics initialized, serving requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;

    #[cfg(feature = "metrics")]
    if let Some(guard) = metrics_guard {
        if let Err(e) = guard.shutdown() {
            warn!(error = %e, "OpenTelemetry shutdown failed");
        }
    }

    info!("appstats-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
