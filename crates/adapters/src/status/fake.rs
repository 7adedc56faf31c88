// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake status adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::StatusAdapter;
use async_trait::async_trait;
use mw_core::{Machine, MachineId, QueryError, TargetState};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Scripted reply to one status query
#[derive(Debug, Clone)]
pub enum FakeReply {
    Ok,
    Err(QueryError),
    /// Sleep, then behave like the inner reply
    After(Duration, Box<FakeReply>),
    /// Never resolves; only cancellation ends the query
    Pending,
}

impl FakeReply {
    pub fn after(delay: Duration, reply: FakeReply) -> Self {
        FakeReply::After(delay, Box::new(reply))
    }

    pub fn transient(message: &str) -> Self {
        FakeReply::Err(QueryError::Transient(message.to_string()))
    }
}

/// Recorded status query
#[derive(Debug, Clone)]
pub struct StatusCall {
    pub machine_id: MachineId,
    pub state: TargetState,
    pub timeout: Duration,
    pub at: Instant,
}

/// Fake status adapter for testing.
///
/// Each state has a script of replies consumed in order; the last reply
/// repeats forever. States without a script never resolve.
#[derive(Clone, Default)]
pub struct FakeStatusAdapter {
    scripts: Arc<Mutex<HashMap<TargetState, VecDeque<FakeReply>>>>,
    calls: Arc<Mutex<Vec<StatusCall>>>,
}

impl FakeStatusAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the script for `state`
    pub fn script(
        &self,
        state: impl Into<TargetState>,
        replies: impl IntoIterator<Item = FakeReply>,
    ) -> &Self {
        self.scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(state.into(), replies.into_iter().collect());
        self
    }

    /// Answer every query for `state` with `reply`
    pub fn reply(&self, state: impl Into<TargetState>, reply: FakeReply) -> &Self {
        self.script(state, [reply])
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StatusCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Recorded calls for one state
    pub fn calls_for(&self, state: &TargetState) -> Vec<StatusCall> {
        self.calls()
            .into_iter()
            .filter(|c| &c.state == state)
            .collect()
    }

    fn next_reply(&self, state: &TargetState) -> FakeReply {
        let mut scripts = self.scripts.lock().unwrap_or_else(|e| e.into_inner());
        match scripts.get_mut(state) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap_or(FakeReply::Pending),
            Some(script) => script.front().cloned().unwrap_or(FakeReply::Pending),
            None => FakeReply::Pending,
        }
    }
}

#[async_trait]
impl StatusAdapter for FakeStatusAdapter {
    async fn wait(
        &self,
        machine: &Machine,
        state: &TargetState,
        timeout: Duration,
    ) -> Result<(), QueryError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(StatusCall {
                machine_id: machine.id.clone(),
                state: state.clone(),
                timeout,
                at: Instant::now(),
            });

        let mut reply = self.next_reply(state);
        loop {
            match reply {
                FakeReply::Ok => return Ok(()),
                FakeReply::Err(err) => return Err(err),
                FakeReply::After(delay, next) => {
                    tokio::time::sleep(delay).await;
                    reply = *next;
                }
                FakeReply::Pending => return std::future::pending().await,
            }
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
