// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mw wait` and `mw wait-any`

use super::Context;
use crate::error::CliError;
use crate::output::{self, OutputFormat, RaceSummary, Reached, TerminalSink};
use clap::Args;
use mw_adapters::{MachinesApiAdapter, TracedStatusAdapter};
use mw_core::{Machine, StatusSink, TargetState, WaitAction, WaitError};
use mw_engine::{Race, Waiter};
use std::sync::Arc;
use std::time::Duration;

#[derive(Args)]
pub struct WaitArgs {
    /// Machine id
    pub machine: String,

    /// App the machine belongs to
    #[arg(short, long)]
    pub app: String,

    /// Action that was just issued: start or stop
    #[arg(long, default_value = "start")]
    pub action: String,

    /// Give up after this long (e.g. "90s", "5m"); defaults to the config's timeout
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,
}

#[derive(Args)]
pub struct WaitAnyArgs {
    /// Machine id
    pub machine: String,

    /// App the machine belongs to
    #[arg(short, long)]
    pub app: String,

    /// Candidate state, repeat for each (e.g. --state started --state stopped)
    #[arg(short, long = "state", required = true)]
    pub states: Vec<String>,

    /// Give up after this long; defaults to the config's timeout
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Show how every candidate ended, not just the winner
    #[arg(long)]
    pub report: bool,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s).map_err(|e| format!("invalid duration `{s}`: {e}"))
}

pub async fn wait(ctx: &Context, args: WaitArgs) -> Result<(), CliError> {
    // Reject a bad action before touching the network
    let action = WaitAction::parse(&args.action).map_err(CliError::wait_failed)?;

    let api = ctx.api()?;
    let machine = lookup(ctx, &api, &args.app, &args.machine).await?;
    let timeout = args.timeout.unwrap_or(ctx.config.timeout);
    let sink = sink_for(ctx.format);

    if let Some(sink) = &sink {
        sink.running(&format!(
            "Waiting for machine {} to reach {} state",
            machine.id,
            action.desired_state()
        ));
    }

    let waiter = Waiter::from_config(TracedStatusAdapter::new(api), &ctx.config);
    let state = waiter
        .wait_for_action(&machine, action, timeout, &ctx.cancel)
        .await
        .map_err(CliError::wait_failed)?;

    if let Some(sink) = &sink {
        sink.done(&format!("Machine {} reached {} state", machine.id, state));
    }
    output::print(
        &Reached {
            machine: machine.id.to_string(),
            state: state.to_string(),
        },
        ctx.format,
    );
    Ok(())
}

pub async fn wait_any(ctx: &Context, args: WaitAnyArgs) -> Result<(), CliError> {
    let states: Vec<TargetState> = args.states.iter().map(TargetState::new).collect();

    let api = ctx.api()?;
    let machine = Arc::new(lookup(ctx, &api, &args.app, &args.machine).await?);
    let timeout = args.timeout.unwrap_or(ctx.config.timeout);
    let sink = sink_for(ctx.format);
    let race = Race::new(TracedStatusAdapter::new(api));

    if args.report {
        let report = race
            .run(Arc::clone(&machine), &states, timeout, &ctx.cancel, sink)
            .await
            .map_err(CliError::wait_failed)?;
        output::print(&RaceSummary::new(machine.id.as_str(), &report), ctx.format);
        report.into_result().map_err(CliError::wait_failed)?;
        return Ok(());
    }

    let state = race
        .wait_for_any(Arc::clone(&machine), &states, timeout, &ctx.cancel, sink)
        .await
        .map_err(CliError::wait_failed)?;
    output::print(
        &Reached {
            machine: machine.id.to_string(),
            state: state.to_string(),
        },
        ctx.format,
    );
    Ok(())
}

async fn lookup(
    ctx: &Context,
    api: &MachinesApiAdapter,
    app: &str,
    machine_id: &str,
) -> Result<Machine, CliError> {
    tokio::select! {
        _ = ctx.cancel.cancelled() => Err(CliError::wait_failed(WaitError::Canceled)),
        result = api.get_machine(app, machine_id) => {
            result.map_err(|e| CliError::machine_lookup_failed(app, machine_id, e))
        }
    }
}

/// Status lines go to the terminal only for human-readable output
fn sink_for(format: OutputFormat) -> Option<Arc<dyn StatusSink>> {
    match format {
        OutputFormat::Text => Some(Arc::new(TerminalSink)),
        OutputFormat::Json => None,
    }
}
