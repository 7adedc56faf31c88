// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for status queries and waits

use crate::machine::{Machine, MachineId, RestartPolicy};
use crate::state::TargetState;
use std::time::Duration;
use thiserror::Error;

/// Message fragment the API uses when a machine gave up on a transition
pub const UNREACHABLE_MARKER: &str = "failed to reach desired state";

/// Why a single status query failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query canceled")]
    Canceled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("bad request ({status}): {message}")]
    BadRequest { status: u16, message: String },
    #[error("machine {message}")]
    Unreachable { message: String },
    #[error("{0}")]
    Transient(String),
}

impl QueryError {
    /// Classify a free-form error message from the API
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(UNREACHABLE_MARKER) {
            QueryError::Unreachable { message }
        } else {
            QueryError::Transient(message)
        }
    }

    /// Decide whether a failed attempt to bring `machine` to `desired` is
    /// worth repeating.
    ///
    /// Returns the error back when another attempt could still succeed, or the
    /// wait's final error when it cannot: a machine that gave up on the
    /// transition and may not restart, or a request the API refused outright.
    pub fn check_retryable(
        self,
        machine: &Machine,
        desired: &TargetState,
    ) -> Result<QueryError, WaitError> {
        match self {
            QueryError::Unreachable { .. } if machine.restart_forbidden() => {
                Err(WaitError::RestartForbidden {
                    desired_state: desired.clone(),
                    policy: machine.restart_policy().unwrap_or(RestartPolicy::No),
                })
            }
            QueryError::BadRequest { .. } => Err(WaitError::Rejected(self)),
            err => Ok(err),
        }
    }
}

/// Final result of a failed wait
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    /// The caller aborted the wait
    #[error("wait canceled")]
    Canceled,

    #[error("timeout reached waiting for machine's state to change")]
    TimedOut {
        machine_id: MachineId,
        desired_state: TargetState,
        timeout: Duration,
    },

    #[error("machine failed to reach desired {desired_state} state, and restart policy was set to {policy} restart")]
    RestartForbidden {
        desired_state: TargetState,
        policy: RestartPolicy,
    },

    /// The API refused the request itself
    #[error("failed waiting for machine: {0}")]
    Rejected(QueryError),

    /// A watcher's query failed and it was not retried
    #[error("failed waiting for machine: {0}")]
    Status(QueryError),

    #[error("action must be either start or stop, got {0:?}")]
    InvalidAction(String),

    #[error("no candidate states to wait for")]
    NoCandidates,
}

impl WaitError {
    /// Longer explanation for display beneath the error message
    pub fn description(&self) -> Option<String> {
        match self {
            WaitError::TimedOut {
                machine_id,
                desired_state,
                timeout,
            } => Some(format!(
                "The machine {} took more than {} to reach \"{}\"",
                machine_id,
                humantime::format_duration(*timeout),
                desired_state
            )),
            WaitError::RestartForbidden { .. } => Some(
                "The machine will not be restarted automatically, so waiting longer cannot help"
                    .to_string(),
            ),
            _ => None,
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            WaitError::InvalidAction(_) | WaitError::NoCandidates => Some(
                "This is a bug in the wait function, please report it".to_string(),
            ),
            WaitError::TimedOut { .. } => {
                Some("Retry with a longer --timeout, or check the machine's logs".to_string())
            }
            WaitError::RestartForbidden { .. } => Some(
                "Inspect the machine's logs, or set a restart policy that allows restarts"
                    .to_string(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
