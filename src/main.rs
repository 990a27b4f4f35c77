//! ectoken: an offline-first CLI for Edgecast CDN access tokens.
//!
//! Entry point for the application. Parses CLI arguments, sets up
//! logging, and delegates to the appropriate command handler.

#![forbid(unsafe_code)]

mod cli;
mod commands;

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands, LogFormat};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Parse CLI arguments and dispatch to the appropriate command handler.
///
/// Returns `ExitCode` so the caller can exit without `process::exit`,
/// allowing all destructors (including `Zeroizing`) to run.
fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);
    debug!(command = ?cli.command, "dispatching");

    match &cli.command {
        Commands::Encrypt(args) => commands::encrypt::execute(args)?,
        Commands::Decrypt(args) => commands::decrypt::execute(args)?,
        Commands::Roundtrip(args) => commands::roundtrip::execute(args)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Initialize the tracing subscriber. Logs go to stderr so stdout stays
/// pipeable; `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8, format: LogFormat) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_ansi(io::stderr().is_terminal())
                    .with_target(false),
            )
            .init(),
    }
}
