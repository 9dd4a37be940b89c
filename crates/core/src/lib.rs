// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! baton-core: desired-state model and reconciliation planning.
//!
//! Pure data and logic, no I/O. The daemon crate supplies the fetcher,
//! the runtime adapter, and the loop that applies the plans produced here.

pub mod observed;
pub mod plan;
pub mod spec;

pub use observed::ObservedContainer;
pub use plan::{plan, Plan};
pub use spec::{validate_batch, ContainerSpec, RegistryAuth, SpecError};
