//! Top-level CLI for the LogRelay dispatch engine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logrelay_core::Engine;

use crate::config;
use crate::transport::ReqwestTransport;

/// LogRelay: a log-packet distributor that forwards batched packets to
/// weighted downstream analyzers, tolerating failures via retry and health
/// monitoring.
#[derive(Debug, Parser)]
#[command(name = "logrelay")]
#[command(about = "LogRelay: weighted log-packet dispatch engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the dispatch engine: loads config, starts the worker pool and
    /// health monitor, and prints periodic statistics snapshots.
    Run {
        /// Path to the config file (default: XDG config dir).
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// How often to print a statistics snapshot, in seconds.
        #[arg(long, default_value = "10", value_name = "SECONDS")]
        report_interval: u64,

        /// Grace period to allow in-flight transports to finish on
        /// shutdown (Ctrl-C), in seconds.
        #[arg(long, default_value = "5", value_name = "SECONDS")]
        shutdown_grace: u64,
    },

    /// Create a default config file (if one doesn't already exist) and
    /// print its path, without starting the engine.
    InitConfig {
        /// Path to write the config file (default: XDG config dir).
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

impl CliCommand {
    /// Parses `std::env::args` and runs the selected command.
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        cli.command.run().await
    }

    async fn run(self) -> Result<()> {
        match self {
            CliCommand::Run { config, report_interval, shutdown_grace } => {
                run_engine(config.as_deref(), Duration::from_secs(report_interval), Duration::from_secs(shutdown_grace)).await
            }
            CliCommand::InitConfig { config } => {
                let path = match config {
                    Some(p) => p,
                    None => config::default_config_path()?,
                };
                let _ = config::load_or_init(Some(&path))?;
                println!("config ready at {}", path.display());
                Ok(())
            }
        }
    }
}

async fn run_engine(config_path: Option<&std::path::Path>, report_interval: Duration, shutdown_grace: Duration) -> Result<()> {
    let file_config = config::load_or_init(config_path)?;
    let engine_config = file_config.into_engine_config()?;

    let transport = Arc::new(ReqwestTransport::new());
    let engine = Engine::new(engine_config, transport)?;

    tracing::info!("starting dispatch engine");
    let workers = engine.spawn_workers();
    let health_monitor = engine.spawn_health_monitor();

    let mut ticker = tokio::time::interval(report_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let stats = engine.stats();
                tracing::info!(
                    received = stats.aggregate.received,
                    accepted = stats.aggregate.accepted,
                    rejected_overload = stats.aggregate.rejected_overload,
                    delivered = stats.aggregate.delivered,
                    failed_exhausted = stats.aggregate.failed_exhausted,
                    no_targets = stats.aggregate.no_targets,
                    depth = stats.depth,
                    "statistics snapshot"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received, draining");
                engine.shutdown(health_monitor, workers, shutdown_grace).await;
                break;
            }
        }
    }

    Ok(())
}
