//! Grandview - front-desk room board and housekeeping tracker
//!
//! Command line front-end over the Grandview core façades.

use std::process;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod config;
mod state;

use cli::Cli;
use config::Config;
use state::AppState;

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }
    };

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::debug!(
        operator = %config.operator_name,
        policy = ?config.transition_policy,
        "Starting Grandview"
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        let state = AppState::new(&config)?;
        cli::run(&state, cli.command).await
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
