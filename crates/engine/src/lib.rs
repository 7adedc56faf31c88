// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! machwait engine: single-target waits and multi-target races

mod deadline;
mod race;
mod waiter;

pub use race::Race;
pub use tokio_util::sync::CancellationToken;
pub use waiter::Waiter;
