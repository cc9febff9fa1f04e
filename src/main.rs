// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]

//! vk-harvest CLI
//!
//! Command-line interface for collecting VK collections

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vk_harvest::cli::{Cli, Runner};
use vk_harvest::RunState;

/// Exit code for a run that stopped early but saved its data
const EXIT_PARTIAL: i32 = 2;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vk_harvest={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runner = Runner::new(cli);
    match runner.run().await {
        Ok(RunState::Done) => Ok(()),
        Ok(_) => std::process::exit(EXIT_PARTIAL),
        Err(e) => {
            tracing::error!(error = %e, "Collection failed");
            Err(e.into())
        }
    }
}
