// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use mw_core::{RaceReport, StatusSink, WaitOutcome};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// A machine that reached a state
#[derive(Debug, Serialize)]
pub struct Reached {
    pub machine: String,
    pub state: String,
}

impl fmt::Display for Reached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Machine {} is {}", self.machine, self.state)
    }
}

/// One watcher's line in a race summary
#[derive(Debug, Serialize)]
pub struct WatcherLine {
    pub state: String,
    pub result: String,
}

/// Every watcher's outcome from a race
#[derive(Debug, Serialize)]
pub struct RaceSummary {
    pub machine: String,
    pub winner: Option<String>,
    pub watchers: Vec<WatcherLine>,
}

impl RaceSummary {
    pub fn new(machine: &str, report: &RaceReport) -> Self {
        let watchers = report
            .outcomes
            .iter()
            .map(|(state, outcome)| WatcherLine {
                state: state.to_string(),
                result: match outcome {
                    WaitOutcome::Succeeded(_) => "reached".to_string(),
                    WaitOutcome::Canceled => "canceled".to_string(),
                    other => other
                        .error()
                        .map(|e| e.to_string())
                        .unwrap_or_default(),
                },
            })
            .collect();

        Self {
            machine: machine.to_string(),
            winner: report.winner.as_ref().map(|s| s.to_string()),
            watchers,
        }
    }
}

impl fmt::Display for RaceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.winner {
            Some(state) => writeln!(f, "Machine {} is {}", self.machine, state)?,
            None => writeln!(f, "Machine {} reached none of the states", self.machine)?,
        }
        write!(f, "{:<12} RESULT", "STATE")?;
        for line in &self.watchers {
            write!(f, "\n{:<12} {}", line.state, line.result)?;
        }
        Ok(())
    }
}

/// Status lines for an interactive terminal, written to stderr
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalSink;

impl StatusSink for TerminalSink {
    fn running(&self, message: &str) {
        eprintln!("  {}", message);
    }

    fn done(&self, message: &str) {
        eprintln!("✔ {}", message);
    }
}
