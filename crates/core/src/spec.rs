// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desired-state container specification served by the management service.
//!
//! The wire format is strict: unknown or missing fields fail deserialization,
//! and a batch that passes serde still goes through [`validate_batch`] before
//! the rest of the agent sees it. Inner layers can therefore assume every
//! spec they receive is well-formed.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Registry credentials for pulling a private image.
///
/// Installed into the agent's credential store for the duration of the
/// launch that needs them, never longer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryAuth {
    pub username: String,
    pub password: String,
    /// Registry host the credentials belong to (e.g. "registry.example.com").
    pub registry: String,
}

/// One desired container.
///
/// `slug` doubles as the name of the container this spec manages; the
/// reconciler matches it against observed container names with exact
/// string equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContainerSpec {
    /// Identity key. Unique within a batch, equals the managed container name.
    pub slug: String,
    /// Repository reference as sent by the management service, without tag
    /// or digest. Launch, pull and image removal all use `image`, the full
    /// reference.
    pub name: String,
    /// Full image reference passed to the runtime on launch.
    pub image: String,
    /// Resolved image identity a converged container must be running.
    pub digest: String,
    /// `KEY=VALUE` entries injected into the container.
    pub environment: Vec<String>,
    /// Opaque runtime launch flags, passed through verbatim. A `BTreeMap`
    /// keeps flag ordering deterministic across cycles.
    pub launch_parameters: BTreeMap<String, Value>,
    /// Credentials for pulling `image`, when the registry is private.
    #[serde(default)]
    pub registry_auth: Option<RegistryAuth>,
}

impl ContainerSpec {
    /// Semantic validation beyond what serde enforces.
    pub fn validate(&self) -> Result<(), SpecError> {
        for (field, value) in [
            ("slug", &self.slug),
            ("name", &self.name),
            ("image", &self.image),
            ("digest", &self.digest),
        ] {
            if value.trim().is_empty() {
                return Err(SpecError::EmptyField(field));
            }
        }
        if let Some(auth) = &self.registry_auth {
            if auth.username.trim().is_empty() {
                return Err(SpecError::EmptyAuthField("username"));
            }
            if auth.registry.trim().is_empty() {
                return Err(SpecError::EmptyAuthField("registry"));
            }
        }
        Ok(())
    }
}

/// Validate a whole desired-state batch.
///
/// Rejects the batch if any spec fails [`ContainerSpec::validate`] or if two
/// specs share a slug. An ambiguous identity key would make the planner
/// flap between create and remove across cycles, so the batch is refused
/// whole rather than partially applied.
pub fn validate_batch(specs: &[ContainerSpec]) -> Result<(), SpecError> {
    let mut seen = HashSet::new();
    for spec in specs {
        spec.validate()?;
        if !seen.insert(spec.slug.as_str()) {
            return Err(SpecError::DuplicateSlug(spec.slug.clone()));
        }
    }
    Ok(())
}

/// Validation failures for desired-state batches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("container spec has an empty `{0}` field")]
    EmptyField(&'static str),

    #[error("registry auth has an empty `{0}` field")]
    EmptyAuthField(&'static str),

    #[error("duplicate slug `{0}` in desired-state batch")]
    DuplicateSlug(String),
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
