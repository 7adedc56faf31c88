// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress sinks for status-line feedback
//!
//! Sinks are best-effort: waits report into them but never depend on them.

/// Receives human-readable progress lines while a wait is running
pub trait StatusSink: Send + Sync {
    /// Something is still in progress
    fn running(&self, message: &str);

    /// A step finished
    fn done(&self, message: &str);
}
