// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Target state labels

use crate::error::WaitError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A state a machine may reach.
///
/// Open set: the well-known labels below are what the API reports today, but
/// callers may wait on any label the API accepts. Labels carry no ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetState(String);

impl TargetState {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn started() -> Self {
        Self::new("started")
    }

    pub fn stopped() -> Self {
        Self::new("stopped")
    }

    pub fn suspended() -> Self {
        Self::new("suspended")
    }

    pub fn destroyed() -> Self {
        Self::new("destroyed")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetState {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TargetState {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Transition the single-target waiter knows how to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitAction {
    Start,
    Stop,
}

impl WaitAction {
    /// Parse an action label. Anything but `start` or `stop` is a caller bug.
    pub fn parse(action: &str) -> Result<Self, WaitError> {
        match action {
            "start" => Ok(WaitAction::Start),
            "stop" => Ok(WaitAction::Stop),
            other => Err(WaitError::InvalidAction(other.to_string())),
        }
    }

    /// The state a machine settles in once this action completes
    pub fn desired_state(self) -> TargetState {
        match self {
            WaitAction::Start => TargetState::started(),
            WaitAction::Stop => TargetState::stopped(),
        }
    }
}

impl fmt::Display for WaitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitAction::Start => f.write_str("start"),
            WaitAction::Stop => f.write_str("stop"),
        }
    }
}
