// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Machine handles as reported by the machines API

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a machine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(pub String);

impl MachineId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MachineId {
    fn from(s: String) -> Self {
        MachineId(s)
    }
}

impl From<&str> for MachineId {
    fn from(s: &str) -> Self {
        MachineId(s.to_string())
    }
}

/// What the platform does when the machine's process exits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    No,
    Always,
    OnFailure,
    SpotPrice,
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RestartPolicy::No => "no",
            RestartPolicy::Always => "always",
            RestartPolicy::OnFailure => "on-failure",
            RestartPolicy::SpotPrice => "spot-price",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartConfig {
    pub policy: RestartPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

/// The subset of machine configuration the waiter reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<RestartConfig>,
}

/// A machine being waited on.
///
/// Read-only for the duration of a wait; the race coordinator shares one
/// handle between all of its watchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    /// Owning app. Not part of the API's machine body, filled in by the caller.
    #[serde(default)]
    pub app: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    /// Last state reported by the API, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub config: MachineConfig,
}

impl Machine {
    pub fn new(app: impl Into<String>, id: impl Into<MachineId>) -> Self {
        Self {
            id: id.into(),
            app: app.into(),
            instance_id: None,
            state: None,
            config: MachineConfig::default(),
        }
    }

    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.config.restart = Some(RestartConfig {
            policy,
            max_retries: None,
        });
        self
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    /// The configured restart policy, if any
    pub fn restart_policy(&self) -> Option<RestartPolicy> {
        self.config.restart.as_ref().map(|r| r.policy)
    }

    /// True when the platform will never restart this machine on its own,
    /// so a failed transition will not heal by waiting longer.
    pub fn restart_forbidden(&self) -> bool {
        self.restart_policy() == Some(RestartPolicy::No)
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
