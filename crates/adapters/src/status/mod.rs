// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Machine status adapters

mod http;

pub use http::MachinesApiAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeReply, FakeStatusAdapter, StatusCall};

use async_trait::async_trait;
use mw_core::{Machine, QueryError, TargetState};
use std::time::Duration;

/// Adapter for the remote status service
#[async_trait]
pub trait StatusAdapter: Clone + Send + Sync + 'static {
    /// Block until `machine` reaches `state` or the server-side `timeout`
    /// elapses.
    ///
    /// Cancellation is expressed by dropping the returned future.
    async fn wait(
        &self,
        machine: &Machine,
        state: &TargetState,
        timeout: Duration,
    ) -> Result<(), QueryError>;
}
