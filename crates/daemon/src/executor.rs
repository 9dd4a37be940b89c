// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan application against the container runtime.
//!
//! Actions run in a fixed order: removes, then creates, then updates. A
//! failing action is logged and counted; it never stops the rest of the
//! batch and never aborts the cycle.

use std::sync::Arc;
use std::time::Instant;

use baton_core::{ContainerSpec, Plan};
use thiserror::Error;

use crate::adapters::{ContainerRuntime, CredentialError, RegistryAuthStore, RuntimeError};

/// A single plan action that failed
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("credential install failed: {0}")]
    Credential(#[from] CredentialError),
}

/// Counts of what one apply pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Applies plans through a container runtime.
pub struct Executor<R> {
    runtime: Arc<R>,
    auth: RegistryAuthStore,
}

impl<R: ContainerRuntime> Executor<R> {
    pub fn new(runtime: Arc<R>, auth: RegistryAuthStore) -> Self {
        Self { runtime, auth }
    }

    /// Apply every action in `plan`: removes, then creates, then updates.
    pub async fn apply(&self, plan: &Plan) -> ApplySummary {
        let start = Instant::now();
        let mut summary = ApplySummary::default();

        for name in &plan.remove {
            match self.remove(name).await {
                Ok(()) => summary.removed += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(container = %name, error = %e, "remove failed");
                }
            }
        }
        for spec in &plan.create {
            match self.create(spec).await {
                Ok(()) => summary.created += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(container = %spec.slug, error = %e, "create failed");
                }
            }
        }
        for spec in &plan.update {
            match self.update(spec).await {
                Ok(()) => summary.updated += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(container = %spec.slug, error = %e, "update failed");
                }
            }
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            removed = summary.removed,
            failed = summary.failed,
            elapsed_ms,
            "plan applied"
        );
        summary
    }

    async fn remove(&self, name: &str) -> Result<(), ActionError> {
        tracing::info!(container = %name, "removing container");
        self.runtime.remove_container(name).await?;
        Ok(())
    }

    /// Launch a container, installing registry credentials for exactly the
    /// duration of the launch when the spec carries them.
    async fn create(&self, spec: &ContainerSpec) -> Result<(), ActionError> {
        tracing::info!(container = %spec.slug, image = %spec.image, "creating container");
        let _guard = match &spec.registry_auth {
            Some(auth) => Some(self.auth.install(auth).await?),
            None => None,
        };
        self.runtime.run(spec).await?;
        Ok(())
    }

    /// Replace a drifted container: remove it, untag the image reference it
    /// launched from so the relaunch pulls fresh instead of reusing the
    /// stale local tag, launch the new spec. Never patches a running
    /// container in place.
    async fn update(&self, spec: &ContainerSpec) -> Result<(), ActionError> {
        tracing::info!(container = %spec.slug, "updating container");
        self.runtime.remove_container(&spec.slug).await?;
        // Image removal can fail while other containers share the layers;
        // the update proceeds regardless.
        if let Err(e) = self.runtime.remove_image(&spec.image).await {
            tracing::warn!(container = %spec.slug, image = %spec.image, error = %e, "old image removal failed");
        }
        self.create(spec).await
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
