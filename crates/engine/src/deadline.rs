// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounding futures by a deadline and a cancellation token

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Stand-in for "no deadline" when a timeout is too large to represent
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// The instant `timeout` from now, saturating at [`FAR_FUTURE`]
pub(crate) fn deadline_after(timeout: Duration) -> Instant {
    Instant::now() + timeout.min(FAR_FUTURE)
}

/// How a bounded future ended
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Bounded<T> {
    Done(T),
    Canceled,
    Expired,
}

/// Run `fut` until it finishes, `cancel` fires, or `deadline` passes.
///
/// Cancellation wins over completion, completion wins over the deadline.
/// The future is dropped when it loses.
pub(crate) async fn bounded<F: Future>(
    fut: F,
    deadline: Instant,
    cancel: &CancellationToken,
) -> Bounded<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Bounded::Canceled,
        out = fut => Bounded::Done(out),
        _ = tokio::time::sleep_until(deadline) => Bounded::Expired,
    }
}
