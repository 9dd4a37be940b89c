// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! baton-daemon: the agent process around `baton-core`.
//!
//! Wires the management-service fetcher, the container runtime adapter, and
//! the credential store into the reconcile loop that `batond` runs.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod engine;
pub mod env;
pub mod executor;
pub mod fetch;
pub mod lifecycle;

pub use config::Config;
pub use engine::{CycleOutcome, Engine};
pub use executor::{ApplySummary, Executor};
