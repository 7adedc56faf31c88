// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-target waiter
//!
//! Waits for a machine to settle after a start or stop, retrying transient
//! query failures with exponential backoff until the caller's timeout.

use crate::deadline::{bounded, deadline_after, Bounded};
use mw_adapters::StatusAdapter;
use mw_core::{BackoffPolicy, Machine, TargetState, WaitAction, WaitConfig, WaitError, WaitOutcome};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default bound on one status query
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Waits for one machine to reach the state implied by an action
#[derive(Clone)]
pub struct Waiter<S> {
    status: S,
    attempt_timeout: Duration,
    backoff: BackoffPolicy,
}

impl<S: StatusAdapter> Waiter<S> {
    pub fn new(status: S) -> Self {
        Self {
            status,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            backoff: BackoffPolicy::default(),
        }
    }

    pub fn from_config(status: S, config: &WaitConfig) -> Self {
        Self {
            status,
            attempt_timeout: config.attempt_timeout,
            backoff: config.backoff,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    /// Wait until `machine` has finished `action` (`"start"` or `"stop"`).
    ///
    /// Returns the reached state. An unknown action fails before any query
    /// is issued.
    pub async fn wait_for(
        &self,
        machine: &Machine,
        action: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<TargetState, WaitError> {
        let action = WaitAction::parse(action)?;
        self.wait_for_action(machine, action, timeout, cancel).await
    }

    /// Wait until `machine` has finished an already validated `action`
    pub async fn wait_for_action(
        &self,
        machine: &Machine,
        action: WaitAction,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<TargetState, WaitError> {
        let desired = action.desired_state();
        let deadline = deadline_after(timeout);
        let timed_out = || WaitError::TimedOut {
            machine_id: machine.id.clone(),
            desired_state: desired.clone(),
            timeout,
        };

        let mut backoff = self.backoff.start();
        loop {
            tracing::debug!(
                machine = %machine.id,
                state = %desired,
                attempt = backoff.attempt() + 1,
                "waiting for state"
            );

            let query = self.status.wait(machine, &desired, self.attempt_timeout);
            let err = match bounded(query, deadline, cancel).await {
                Bounded::Done(Ok(())) => {
                    tracing::info!(machine = %machine.id, state = %desired, "machine reached state");
                    return Ok(desired);
                }
                Bounded::Done(Err(err)) => err,
                Bounded::Canceled => return Err(WaitError::Canceled),
                Bounded::Expired => return Err(timed_out()),
            };

            // The query may have failed because the overall wait ended
            if cancel.is_cancelled() {
                return Err(WaitError::Canceled);
            }
            if Instant::now() >= deadline {
                return Err(timed_out());
            }

            let err = err.check_retryable(machine, &desired)?;
            let delay = backoff.next_delay();
            tracing::warn!(
                machine = %machine.id,
                state = %desired,
                error = %err,
                retry_in_ms = delay.as_millis() as u64,
                "wait failed, retrying"
            );

            match bounded(tokio::time::sleep(delay), deadline, cancel).await {
                Bounded::Done(()) => {}
                Bounded::Canceled => return Err(WaitError::Canceled),
                Bounded::Expired => return Err(timed_out()),
            }
        }
    }

    /// Like [`Waiter::wait_for`], reported as a single outcome
    pub async fn wait_for_outcome(
        &self,
        machine: &Machine,
        action: &str,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> WaitOutcome {
        self.wait_for(machine, action, timeout, cancel).await.into()
    }
}

#[cfg(test)]
#[path = "waiter_tests.rs"]
mod tests;
