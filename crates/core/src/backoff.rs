// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff between retried status queries

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff parameters (no jitter)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// First delay
    #[serde(with = "humantime_serde")]
    pub min: Duration,
    /// Cap on any single delay
    #[serde(with = "humantime_serde")]
    pub max: Duration,
    /// Growth per attempt; values below 1.0 are treated as 1.0
    pub factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(500),
            max: Duration::from_secs(2),
            factor: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Delay for the given zero-based attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let min = self.min.min(self.max);
        let factor = if self.factor.is_finite() && self.factor > 1.0 {
            self.factor
        } else {
            1.0
        };

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = min.as_secs_f64() * factor.powi(exponent);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            return self.max;
        }
        Duration::from_secs_f64(secs)
    }

    /// Start a fresh backoff sequence
    pub fn start(&self) -> Backoff {
        Backoff::new(*self)
    }
}

/// Running backoff state for one retry loop.
///
/// Owned by a single waiter call and never shared between watchers.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempt: u32,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Delay before the next retry; grows until capped at `max`
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.policy.delay_for(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Number of delays handed out so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
