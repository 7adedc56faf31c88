// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-target race coordinator
//!
//! Waits on several candidate states at once and resolves to whichever is
//! reached first. Candidates are raced, not ranked: the order they are listed
//! in carries no preference, so a caller that needs "prefer `started` over
//! `stopped`" must check the result itself.

use crate::deadline::{bounded, deadline_after, Bounded};
use mw_adapters::StatusAdapter;
use mw_core::{Machine, RaceReport, StatusSink, TargetState, WaitError, WaitOutcome};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// State shared by all watchers of one race
#[derive(Default)]
struct Shared {
    report: Mutex<RaceReport>,
    /// Signaled once per finished watcher
    finished: Notify,
}

/// Races one watcher per candidate state
#[derive(Clone)]
pub struct Race<S> {
    status: S,
}

impl<S: StatusAdapter> Race<S> {
    pub fn new(status: S) -> Self {
        Self { status }
    }

    /// Resolve to the first candidate state `machine` reaches.
    ///
    /// Without a winner, returns the error of the watcher that finished last;
    /// use [`Race::run`] to see every watcher's outcome.
    pub async fn wait_for_any(
        &self,
        machine: Arc<Machine>,
        states: &[TargetState],
        timeout: Duration,
        cancel: &CancellationToken,
        sink: Option<Arc<dyn StatusSink>>,
    ) -> Result<TargetState, WaitError> {
        self.run(machine, states, timeout, cancel, sink)
            .await?
            .into_result()
    }

    /// Run the race and report every watcher that finished before it ended.
    ///
    /// Returns as soon as a winner is recorded or every watcher has finished.
    /// Watchers still running at that point are cancelled.
    pub async fn run(
        &self,
        machine: Arc<Machine>,
        states: &[TargetState],
        timeout: Duration,
        cancel: &CancellationToken,
        sink: Option<Arc<dyn StatusSink>>,
    ) -> Result<RaceReport, WaitError> {
        if states.is_empty() {
            return Err(WaitError::NoCandidates);
        }

        let token = cancel.child_token();
        let _cancel_losers = token.clone().drop_guard();
        let deadline = deadline_after(timeout);
        let shared = Arc::new(Shared::default());

        tracing::debug!(
            machine = %machine.id,
            candidates = states.len(),
            timeout_ms = timeout.as_millis() as u64,
            "racing for machine state"
        );

        for state in states {
            let watcher = Watcher {
                status: self.status.clone(),
                machine: Arc::clone(&machine),
                state: state.clone(),
                timeout,
                deadline,
                token: token.clone(),
            };
            let shared = Arc::clone(&shared);
            let sink = sink.clone();

            tokio::spawn(async move {
                let state = watcher.state.clone();
                let machine_id = watcher.machine.id.clone();
                let outcome = watcher.watch().await;

                {
                    let mut report = shared.report.lock().unwrap_or_else(|e| e.into_inner());
                    if report.record(state.clone(), outcome) {
                        tracing::info!(machine = %machine_id, state = %state, "machine reached state");
                        if let Some(sink) = &sink {
                            sink.running(&format!("Machine {} reached {} state", machine_id, state));
                        }
                    }
                }
                shared.finished.notify_one();
            });
        }

        let total = states.len();
        loop {
            let finished = shared.finished.notified();
            {
                let report = shared.report.lock().unwrap_or_else(|e| e.into_inner());
                if report.winner.is_some() || report.completed() == total {
                    tracing::debug!(
                        machine = %machine.id,
                        winner = ?report.winner,
                        completed = report.completed(),
                        "race finished"
                    );
                    return Ok(report.clone());
                }
            }
            finished.await;
        }
    }
}

/// One candidate's watch
struct Watcher<S> {
    status: S,
    machine: Arc<Machine>,
    state: TargetState,
    timeout: Duration,
    deadline: Instant,
    token: CancellationToken,
}

impl<S: StatusAdapter> Watcher<S> {
    /// A single query, no retries; the race's deadline bounds it
    async fn watch(&self) -> WaitOutcome {
        let query = self.status.wait(&self.machine, &self.state, self.timeout);
        match bounded(query, self.deadline, &self.token).await {
            Bounded::Done(Ok(())) => WaitOutcome::Succeeded(self.state.clone()),
            Bounded::Done(Err(err)) => {
                tracing::debug!(
                    machine = %self.machine.id,
                    state = %self.state,
                    error = %err,
                    "watcher failed"
                );
                WaitOutcome::Failed(WaitError::Status(err))
            }
            Bounded::Canceled => WaitOutcome::Canceled,
            Bounded::Expired => WaitOutcome::TimedOut {
                machine_id: self.machine.id.clone(),
                desired_state: self.state.clone(),
                timeout: self.timeout,
            },
        }
    }
}

#[cfg(test)]
#[path = "race_tests.rs"]
mod tests;
