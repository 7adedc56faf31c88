// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::status::StatusAdapter;
use async_trait::async_trait;
use mw_core::{Machine, QueryError, TargetState};
use std::time::Duration;
use tracing::Instrument;

/// Wrapper that adds tracing to any StatusAdapter
#[derive(Clone)]
pub struct TracedStatusAdapter<S> {
    inner: S,
}

impl<S> TracedStatusAdapter<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: StatusAdapter> StatusAdapter for TracedStatusAdapter<S> {
    async fn wait(
        &self,
        machine: &Machine,
        state: &TargetState,
        timeout: Duration,
    ) -> Result<(), QueryError> {
        let span = tracing::info_span!(
            "status.wait",
            machine = %machine.id,
            app = %machine.app,
            state = %state
        );

        async {
            tracing::debug!(timeout_ms = timeout.as_millis() as u64, "querying");

            let start = std::time::Instant::now();
            let result = self.inner.wait(machine, state, timeout).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "state reached"
                ),
                // Deadline is the normal end of a long poll
                Err(QueryError::DeadlineExceeded) => tracing::debug!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "query deadline exceeded"
                ),
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "query failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
