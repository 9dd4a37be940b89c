// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent lifecycle management: startup, shutdown.
//!
//! Startup acquires the single-instance lock and probes the container
//! runtime before the reconcile loop starts, so a second agent instance or
//! an unreachable runtime fails fast instead of half-working.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;
use tracing::{info, warn};

use crate::adapters::{ContainerRuntime, RuntimeError};

/// Filesystem layout under the agent state directory.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root state directory (e.g. ~/.local/state/baton)
    pub state_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to the agent config file
    pub config_path: PathBuf,
    /// Private DOCKER_CONFIG directory for scoped registry credentials
    pub docker_config_dir: PathBuf,
}

impl Paths {
    /// Resolve the filesystem layout from the environment.
    pub fn load() -> Result<Self, StartupError> {
        let state_dir = crate::env::state_dir()?;
        Ok(Self {
            lock_path: state_dir.join("batond.pid"),
            config_path: crate::env::config_path(&state_dir),
            docker_config_dir: state_dir.join("docker-config"),
            state_dir,
        })
    }
}

/// Agent state during operation.
pub struct DaemonState {
    /// Filesystem layout
    pub paths: Paths,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
}

impl DaemonState {
    /// Shutdown the agent gracefully.
    pub fn shutdown(&mut self) {
        info!("Shutting down agent...");

        // 1. Remove PID file
        if self.paths.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.paths.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        // 2. Lock file is released automatically when self.lock_file is dropped

        info!("Agent shutdown complete");
    }
}

/// Start the agent
pub async fn startup<R: ContainerRuntime>(
    paths: &Paths,
    runtime: &R,
) -> Result<DaemonState, StartupError> {
    match startup_inner(paths, runtime).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock —
            // those files belong to the already-running agent.
            if !matches!(e, StartupError::AlreadyRunning(_)) {
                cleanup_on_failure(paths);
            }
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner<R: ContainerRuntime>(
    paths: &Paths,
    runtime: &R,
) -> Result<DaemonState, StartupError> {
    // 1. Create state directory
    std::fs::create_dir_all(&paths.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races
    // Use OpenOptions to avoid truncating the file before we hold the lock,
    // which would wipe the running agent's PID.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&paths.lock_path)?;
    lock_file.try_lock_exclusive().map_err(StartupError::AlreadyRunning)?;

    // Write PID to lock file (truncate now that we hold the lock)
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file; // Drop mutability

    // 3. Remove a stale credential file left behind by a crash. Credentials
    // are only ever installed for the duration of a single launch.
    let stale = paths.docker_config_dir.join("config.json");
    if stale.exists() {
        warn!(path = %stale.display(), "removing stale registry credential file");
        std::fs::remove_file(&stale)?;
    }

    // 4. Probe the container runtime so a missing or unreachable engine
    // fails startup instead of failing every cycle.
    runtime.ping().await?;

    info!(pid = std::process::id(), "Agent started");

    Ok(DaemonState { paths: paths.clone(), lock_file })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(paths: &Paths) {
    // Remove PID/lock file
    if paths.lock_path.exists() {
        let _ = std::fs::remove_file(&paths.lock_path);
    }
}

/// Startup errors. All of them are fatal: the process logs the error and
/// exits non-zero.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: agent already running?")]
    AlreadyRunning(#[source] std::io::Error),

    #[error("Failed to read config at {0}: {1}")]
    ConfigRead(PathBuf, #[source] std::io::Error),

    #[error("Invalid config at {0}: {1}")]
    ConfigParse(PathBuf, #[source] toml::de::Error),

    #[error("Config field `{0}` must not be empty")]
    ConfigField(&'static str),

    #[error("Container runtime is unreachable: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
