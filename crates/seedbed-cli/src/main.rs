//! # seedbed-cli
//!
//! Binary entry point for Seedbed.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Logging initialization (`RUST_LOG` controlled)
//! - Wiring of the fixture engine to the HTTP transport and the system
//!   environment

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use seedbed_adapters::{ApiConfig, HttpExecutor};
use seedbed_core::{FixtureSet, Orchestrator, SystemEnvironment};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Seedbed - declarative API fixture runner for seeding test data
#[derive(Parser, Debug)]
#[command(name = "seedbed", version, about)]
struct Cli {
    /// Fixture file to execute
    file: PathBuf,

    /// API secret key used to authenticate requests
    #[arg(long, env = "SEEDBED_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Account to run requests on behalf of
    #[arg(long, env = "SEEDBED_ACCOUNT")]
    account: Option<String>,

    /// Base URL of the target API
    #[arg(long, env = "SEEDBED_BASE_URL")]
    base_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let set = FixtureSet::load(&cli.file)
        .with_context(|| format!("failed to load fixture file {}", cli.file.display()))?;

    let executor = HttpExecutor::new(ApiConfig {
        api_key: cli.api_key,
        account: cli.account,
        base_url: cli.base_url,
    })
    .context("failed to build HTTP client")?;
    let env = SystemEnvironment;

    let mut orchestrator = Orchestrator::new(&set, &executor, &env);
    let attempted = orchestrator.run().await.context("fixture run failed")?;
    info!("Executed {} fixture step(s)", attempted.len());

    orchestrator
        .update_env()
        .context("failed to update env file")?;

    Ok(())
}
