// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mw-core: shared types for the machwait (mw) tool
//!
//! This crate provides:
//! - Machine handles and target state labels
//! - The retry backoff policy
//! - The wait error taxonomy and per-watcher outcomes
//! - TOML configuration
//! - Progress sinks for UI feedback

pub mod backoff;
pub mod config;
pub mod error;
pub mod machine;
pub mod outcome;
pub mod state;
pub mod status;

// Re-exports
pub use backoff::{Backoff, BackoffPolicy};
pub use config::{ApiConfig, ConfigError, WaitConfig};
pub use error::{QueryError, WaitError};
pub use machine::{Machine, MachineConfig, MachineId, RestartConfig, RestartPolicy};
pub use outcome::{RaceReport, WaitOutcome};
pub use state::{TargetState, WaitAction};
pub use status::StatusSink;
