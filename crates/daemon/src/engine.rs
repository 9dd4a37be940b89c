// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reconcile loop: fetch, observe, plan, apply, sleep.
//!
//! A cycle can fail in two recoverable ways. A fetch failure makes the
//! cycle a no-op; an observation failure aborts it. Both are logged and
//! retried on the next interval, and neither ever brings the agent down.

use std::sync::Arc;
use std::time::Duration;

use baton_core::ObservedContainer;

use crate::adapters::{ContainerRuntime, RegistryAuthStore, RuntimeError};
use crate::config::Config;
use crate::executor::{ApplySummary, Executor};
use crate::fetch::ManagementApi;

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Desired state could not be fetched; nothing was touched.
    FetchFailed,
    /// The runtime could not be observed; nothing was touched.
    ObserveFailed,
    /// Local state already matched desired state.
    Converged,
    /// A plan was applied.
    Applied(ApplySummary),
}

/// Drives reconcile cycles against a management API and a container runtime.
pub struct Engine<M, R> {
    management: M,
    runtime: Arc<R>,
    executor: Executor<R>,
    self_name: String,
    poll_interval: Duration,
}

impl<M, R> Engine<M, R>
where
    M: ManagementApi,
    R: ContainerRuntime,
{
    pub fn new(management: M, runtime: Arc<R>, auth: RegistryAuthStore, config: &Config) -> Self {
        Self {
            management,
            executor: Executor::new(Arc::clone(&runtime), auth),
            runtime,
            self_name: config.self_name.clone(),
            poll_interval: config.poll_interval(),
        }
    }

    /// Run reconcile cycles forever, sleeping the poll interval between
    /// them. The sleep is a plain fixed delay; cycles are not aligned to
    /// wall-clock boundaries and nothing wakes the loop early.
    pub async fn run(&self) {
        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One fetch/observe/plan/apply pass.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let desired = match self.management.fetch_desired().await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(error = %e, "desired-state fetch failed, skipping cycle");
                return CycleOutcome::FetchFailed;
            }
        };

        let observed = match self.observe().await {
            Ok(containers) => containers,
            Err(e) => {
                tracing::error!(error = %e, "runtime observation failed, aborting cycle");
                return CycleOutcome::ObserveFailed;
            }
        };

        let plan = baton_core::plan(&desired, &observed);
        if plan.is_empty() {
            tracing::debug!(
                desired = desired.len(),
                observed = observed.len(),
                "state converged, nothing to do"
            );
            return CycleOutcome::Converged;
        }

        tracing::info!(
            create = plan.create.len(),
            update = plan.update.len(),
            remove = plan.remove.len(),
            "applying plan"
        );
        CycleOutcome::Applied(self.executor.apply(&plan).await)
    }

    /// Observe the runtime's containers, excluding the agent's own.
    async fn observe(&self) -> Result<Vec<ObservedContainer>, RuntimeError> {
        let mut observed = self.runtime.list().await?;
        observed.retain(|container| container.name != self.self_name);
        Ok(observed)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
