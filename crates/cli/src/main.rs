// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mw - wait for machines to change state

mod commands;
mod error;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use commands::{wait, Context};
use error::CliError;
use output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "mw",
    version,
    about = "Machine Wait - block until a machine reaches a state"
)]
struct Cli {
    /// Config file (default: <config dir>/mw/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for a machine to finish starting or stopping
    Wait(wait::WaitArgs),
    /// Wait for a machine to reach whichever of several states comes first
    WaitAny(wait::WaitAnyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprint!("{}", CliError::new("Failed to start async runtime").with_source(e));
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, canceling wait");
            on_interrupt.cancel();
        }
    });

    let result = runtime.block_on(run(cli, cancel));
    // Abandoned watchers may still be parked in a blocking HTTP call
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    let ctx = Context::load(cli.config.as_deref(), cli.output, cancel)?;

    match cli.command {
        Commands::Wait(args) => wait::wait(&ctx, args).await,
        Commands::WaitAny(args) => wait::wait_any(&ctx, args).await,
    }
}

/// Log to stderr so stdout stays clean for results. `RUST_LOG` wins over `-v`.
fn setup_logging(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
