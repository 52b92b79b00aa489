//! watchq-server - watch queue backend
//!
//! Serves the queue and tag registry over HTTP for the web frontend and the
//! browser extension.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watchq_common::config::{find_config_file, RootFolderInitializer, TomlConfig};
use watchq_common::db::init_database;
use watchq_server::config::{Args, ServerConfig};
use watchq_server::resolver::YouTubeResolver;
use watchq_server::{build_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config file errors are reported once logging is up
    let config_path = args.config.clone().or_else(find_config_file);
    let (toml, config_error) = match config_path.as_deref().map(TomlConfig::load) {
        Some(Ok(toml)) => (toml, None),
        Some(Err(e)) => (TomlConfig::default(), Some(e)),
        None => (TomlConfig::default(), None),
    };
    let config = ServerConfig::resolve(&args, &toml);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_directive().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting watchq-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match (&config_path, config_error) {
        (Some(path), Some(e)) => warn!("Ignoring config file {}: {}", path.display(), e),
        (Some(path), None) => info!("Config file: {}", path.display()),
        (None, _) => info!("No config file found, using defaults"),
    }

    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let resolver = YouTubeResolver::new(config.youtube_api_key.clone())
        .context("Failed to build YouTube client")?;

    let state = AppState::new(pool, Arc::new(resolver));
    let app = build_app(state, &config.allowed_origins);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("watchq-server listening on http://{}", addr);
    info!("Allowed origins: {}", config.allowed_origins.join(", "));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
