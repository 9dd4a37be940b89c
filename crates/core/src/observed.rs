// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot of one container known to the local runtime.

use serde::{Deserialize, Serialize};

/// What the runtime reports about a container, running or stopped.
///
/// Produced by the runtime adapter's `list` operation; the reconciler only
/// ever reads it. `resolved_image` is the engine's image identity for the
/// container (the image ID), which is the same identity space the desired
/// spec's `digest` lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedContainer {
    /// Container name with the runtime's leading slash already stripped.
    pub name: String,
    /// Image identity the container is actually running.
    pub resolved_image: String,
    /// `KEY=VALUE` entries as reported by the runtime. Includes entries the
    /// runtime or the image injected on its own.
    pub env_snapshot: Vec<String>,
}

impl ObservedContainer {
    pub fn new(
        name: impl Into<String>,
        resolved_image: impl Into<String>,
        env_snapshot: Vec<String>,
    ) -> Self {
        Self { name: name.into(), resolved_image: resolved_image.into(), env_snapshot }
    }
}
