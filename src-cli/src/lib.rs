//! IIFactor command-line application: a thin shell over `iifactor-store`
//! and `iifactor-otp`.
//!
//! Parses arguments, opens the data directory, runs one command and prints
//! its output. All logic lives in the two library crates.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use state::AppState;

/// Environment variable holding the log filter (e.g. `debug`,
/// `iifactor_store=trace`).
pub const LOG_ENV: &str = "IIFACTOR_LOG";

/// Run the application with the process arguments.
#[must_use]
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let data_dir = cli.data_dir.clone().unwrap_or_else(state::default_data_dir);
    tracing::debug!(path = %data_dir.display(), "using data directory");

    let result = AppState::open(data_dir)
        .and_then(|mut state| commands::dispatch(&mut state, cli.command));

    match result {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(output.as_bytes()).and_then(|()| stdout.flush()) {
                tracing::warn!("failed to write output: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Install a stderr `fmt` subscriber filtered by [`LOG_ENV`], default `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
