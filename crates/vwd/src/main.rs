//! vwd: vaultwire server daemon
//!
//! Usage:
//!   vwd [--config /etc/vaultwire/config.toml] [--listen ADDR]
//!
//! Accepts signed encrypted-file envelopes over HTTP, verifies them, and
//! persists accepted records through the storage layer.

mod routes;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use vw_core::config::VwConfig;
use vw_storage::FileStore;

#[derive(Parser, Debug)]
#[command(name = "vwd", version, about = "vaultwire server daemon")]
struct Cli {
    /// Path to vaultwire.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "VW_CONFIG",
        default_value = "/etc/vaultwire/config.toml"
    )]
    config: PathBuf,

    /// Listen address override (e.g. 0.0.0.0:8080)
    #[arg(long, env = "VW_LISTEN")]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "VW_LOG", default_value = "info")]
    log: String,

    /// Log format (json, text)
    #[arg(long, env = "VW_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log, &cli.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "vwd starting"
    );

    let mut config = load_config(&cli.config).await?;
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }

    let operator = vw_storage::build_operator(&config.storage)?;
    let store = Arc::new(FileStore::new(operator));

    if let Err(e) = store.health().await {
        tracing::warn!(backend = %config.storage.backend, "storage not reachable at startup: {e}");
    } else {
        info!(backend = %config.storage.backend, "storage: connected");
    }

    let app = routes::router(routes::AppState { store });

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .map_err(|e| anyhow::anyhow!("bind {}: {e}", config.server.listen))?;

    info!(addr = %config.server.listen, "listening on /upload, /download, /healthz, /readyz");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("server: {e}"))
}

async fn load_config(path: &PathBuf) -> Result<VwConfig> {
    if path.exists() {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("reading config {}: {e}", path.display()))?;
        VwConfig::from_toml(&content)
    } else {
        tracing::warn!(
            "config file not found: {}  (using defaults)",
            path.display()
        );
        Ok(VwConfig::default())
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
        }
    }
}
