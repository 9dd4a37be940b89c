// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::{Path, PathBuf};

use crate::lifecycle::StartupError;

/// User-Agent header sent to the management service.
pub const USER_AGENT: &str = concat!("baton/", env!("CARGO_PKG_VERSION"));

/// Resolve state directory: BATON_STATE_DIR > XDG_STATE_HOME/baton > ~/.local/state/baton
pub fn state_dir() -> Result<PathBuf, StartupError> {
    if let Ok(dir) = std::env::var("BATON_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("baton"));
    }
    let home = std::env::var("HOME").map_err(|_| StartupError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/baton"))
}

/// Resolve the config file path: BATON_CONFIG > {state_dir}/config.toml
pub fn config_path(state_dir: &Path) -> PathBuf {
    match std::env::var("BATON_CONFIG") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => state_dir.join("config.toml"),
    }
}

/// Log filter env var read at startup (defaults to `info`).
pub const LOG_FILTER_VAR: &str = "BATON_LOG";
