//! meditraced — the MediTrace daemon.
//!
//! Single binary around the traceability ledger:
//! - World-state store (redb)
//! - HTTP gateway (axum)
//! - Scripted end-to-end demo
//!
//! # Usage
//!
//! ```text
//! meditraced serve --port 3000 --data-dir /var/lib/meditrace
//! meditraced demo
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use meditrace_gateway::GatewayConfig;
use meditrace_state::StateStore;

mod demo;

#[derive(Parser)]
#[command(name = "meditraced", about = "MediTrace traceability daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP gateway over a persistent world state.
    Serve {
        /// Port to listen on (overrides the config file).
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for the world-state database (overrides the
        /// config file).
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Gateway configuration file (TOML).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Replay the end-to-end traceability walkthrough in memory.
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,meditraced=debug,meditrace=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            data_dir,
            config,
        } => serve(port, data_dir, config).await,
        Command::Demo => demo::run(),
    }
}

async fn serve(
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    config: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = match config {
        Some(path) => GatewayConfig::from_file(&path)?,
        None => GatewayConfig::default(),
    };
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(data_dir) = data_dir {
        config.server.data_dir = data_dir;
    }

    info!(
        org = %config.identity.org,
        channel = %config.identity.channel,
        contract = %config.identity.contract,
        "MediTrace daemon starting"
    );

    std::fs::create_dir_all(&config.server.data_dir)?;
    let db_path = config.server.data_dir.join("meditrace.redb");

    let store = StateStore::open(&db_path)?;
    info!(path = ?db_path, "world state opened");

    let router = meditrace_gateway::build_router(store, config.context());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!(%addr, "gateway starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("MediTrace daemon stopped");
    Ok(())
}
