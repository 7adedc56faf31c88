// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-watcher outcomes and race reports

use crate::error::WaitError;
use crate::machine::MachineId;
use crate::state::TargetState;
use std::time::Duration;

/// How one watcher finished. Exactly one is produced per watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Succeeded(TargetState),
    Failed(WaitError),
    TimedOut {
        machine_id: MachineId,
        desired_state: TargetState,
        timeout: Duration,
    },
    Canceled,
}

impl WaitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WaitOutcome::Succeeded(_))
    }

    /// The error this outcome represents, if it is not a success
    pub fn error(&self) -> Option<WaitError> {
        match self {
            WaitOutcome::Succeeded(_) => None,
            WaitOutcome::Failed(err) => Some(err.clone()),
            WaitOutcome::TimedOut {
                machine_id,
                desired_state,
                timeout,
            } => Some(WaitError::TimedOut {
                machine_id: machine_id.clone(),
                desired_state: desired_state.clone(),
                timeout: *timeout,
            }),
            WaitOutcome::Canceled => Some(WaitError::Canceled),
        }
    }

    pub fn into_result(self) -> Result<TargetState, WaitError> {
        match self {
            WaitOutcome::Succeeded(state) => Ok(state),
            WaitOutcome::Failed(err) => Err(err),
            WaitOutcome::TimedOut {
                machine_id,
                desired_state,
                timeout,
            } => Err(WaitError::TimedOut {
                machine_id,
                desired_state,
                timeout,
            }),
            WaitOutcome::Canceled => Err(WaitError::Canceled),
        }
    }
}

impl From<Result<TargetState, WaitError>> for WaitOutcome {
    fn from(result: Result<TargetState, WaitError>) -> Self {
        match result {
            Ok(state) => WaitOutcome::Succeeded(state),
            Err(WaitError::Canceled) => WaitOutcome::Canceled,
            Err(WaitError::TimedOut {
                machine_id,
                desired_state,
                timeout,
            }) => WaitOutcome::TimedOut {
                machine_id,
                desired_state,
                timeout,
            },
            Err(err) => WaitOutcome::Failed(err),
        }
    }
}

/// Every watcher's outcome from one race, plus the winner if there was one.
///
/// `outcomes` is in completion order. The winner is the first success that
/// was recorded and is never replaced by a later one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaceReport {
    pub winner: Option<TargetState>,
    pub outcomes: Vec<(TargetState, WaitOutcome)>,
}

impl RaceReport {
    /// Record a watcher's outcome. Returns true if it became the winner.
    pub fn record(&mut self, state: TargetState, outcome: WaitOutcome) -> bool {
        let won = self.winner.is_none() && outcome.is_success();
        if won {
            self.winner = Some(state.clone());
        }
        self.outcomes.push((state, outcome));
        won
    }

    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }

    /// Error of the most recently completed watcher that failed
    pub fn last_error(&self) -> Option<WaitError> {
        self.outcomes.iter().rev().find_map(|(_, o)| o.error())
    }

    /// Errors of all failed watchers, in completion order
    pub fn errors(&self) -> Vec<(&TargetState, WaitError)> {
        self.outcomes
            .iter()
            .filter_map(|(state, o)| o.error().map(|e| (state, e)))
            .collect()
    }

    /// Collapse to the winner, or to the last loser's error
    pub fn into_result(self) -> Result<TargetState, WaitError> {
        if let Some(winner) = self.winner {
            return Ok(winner);
        }
        Err(self.last_error().unwrap_or(WaitError::NoCandidates))
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
