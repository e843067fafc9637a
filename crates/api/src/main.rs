//! syncer-web - HTTP API server for the cloud-syncer S3 client

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use syncer_api::{AppState, Credentials, S3Connector};
use syncer_core::ConfigStore;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// syncer-web - serve the configured bucket over HTTP
#[derive(Parser, Debug)]
#[command(name = "syncer-web")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "SYNCER_WEB_BIND", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Browser origin allowed to call the API
    #[arg(long, env = "SYNCER_WEB_CORS_ORIGIN", default_value = "http://localhost:5173")]
    cors_origin: String,

    /// Config file path (default: ~/.cloud_storage_syncer/config.json)
    #[arg(long, env = "SYNCER_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    /// Basic auth username
    #[arg(long, env = "WEB_USERNAME", default_value = "admin")]
    username: String,

    /// Basic auth password
    #[arg(
        long,
        env = "WEB_PASSWORD",
        default_value = "cloudsyncer2025",
        hide_env_values = true,
        hide_default_value = true
    )]
    password: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_store =
        ConfigStore::resolve(args.config_path).context("failed to resolve configuration path")?;
    if !config_store.exists() {
        tracing::warn!(
            path = %config_store.config_path().display(),
            "No configuration found; file routes will fail until `syncer config setup` is run"
        );
    }

    let state = AppState::new(
        config_store,
        Credentials::new(args.username, args.password),
        Arc::new(S3Connector),
    );
    let app = syncer_api::router(state).layer(syncer_api::cors_layer(&args.cors_origin)?);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    tracing::info!(addr = %args.bind, "syncer-web listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
