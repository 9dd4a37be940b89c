// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped registry credential installation.
//!
//! Launching a container from a private registry needs ambient auth in the
//! runtime's config directory. The store owns a private directory (the same
//! one [`DockerCli`](super::DockerCli) pins as `DOCKER_CONFIG`), writes
//! `config.json` on install, and removes it when the returned guard drops.
//! The credential file never outlives the launch that needed it, whether
//! the launch succeeded or failed.

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use baton_core::RegistryAuth;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from credential store operations
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to write credential file at {0}: {1}")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("failed to encode credential file: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Installs registry credentials for the duration of a single launch.
pub struct RegistryAuthStore {
    dir: PathBuf,
    gate: Arc<Mutex<()>>,
}

impl RegistryAuthStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, gate: Arc::new(Mutex::new(())) }
    }

    /// Write `config.json` for `auth` and return a guard that removes it on
    /// drop. The gate serializes credential windows, so concurrent launches
    /// can never read each other's credentials.
    pub async fn install(
        &self,
        auth: &RegistryAuth,
    ) -> Result<RegistryAuthGuard, CredentialError> {
        let permit = Arc::clone(&self.gate).lock_owned().await;

        let token = STANDARD.encode(format!("{}:{}", auth.username, auth.password));
        let mut auths = serde_json::Map::new();
        auths.insert(auth.registry.clone(), serde_json::json!({ "auth": token }));
        let body = serde_json::to_string(&serde_json::json!({ "auths": auths }))?;

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| CredentialError::Write(self.dir.clone(), e))?;
        let path = self.dir.join("config.json");
        std::fs::write(&path, body).map_err(|e| CredentialError::Write(path.clone(), e))?;

        tracing::debug!(registry = %auth.registry, "installed registry credentials");
        Ok(RegistryAuthGuard { path, _permit: permit })
    }
}

/// Removes the credential file when dropped.
pub struct RegistryAuthGuard {
    path: PathBuf,
    // NOTE(drop-order): `Drop::drop` runs before fields drop, so the file is
    // gone before the gate permit releases and the next install proceeds.
    _permit: tokio::sync::OwnedMutexGuard<()>,
}

impl Drop for RegistryAuthGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("released registry credentials"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "credential file removal failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
