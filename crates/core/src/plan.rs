// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation planning: desired specs vs observed containers.
//!
//! [`plan`] is a pure function. It does no I/O, touches no clocks, and for
//! the same inputs always produces the same [`Plan`]. Applying a plan and
//! planning again against the converged state yields an empty plan.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::observed::ObservedContainer;
use crate::spec::ContainerSpec;

/// Actions required to converge local state onto desired state.
///
/// The three sets are disjoint: a slug appears in at most one of them.
/// The executor applies `remove` first, then `create`, then `update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Desired containers with no observed counterpart.
    pub create: Vec<ContainerSpec>,
    /// Desired containers whose observed counterpart drifted.
    pub update: Vec<ContainerSpec>,
    /// Observed container names no desired spec claims.
    pub remove: Vec<String>,
}

impl Plan {
    /// True when local state already matches desired state.
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.remove.is_empty()
    }

    /// Total number of actions in the plan.
    pub fn action_count(&self) -> usize {
        self.create.len() + self.update.len() + self.remove.len()
    }
}

/// Compute the plan that converges `observed` onto `desired`.
///
/// Matching is exact string equality between `spec.slug` and
/// `observed.name`. Desired specs keep their input order within `create`
/// and `update`; `remove` keeps the observed order, deduplicated. If the
/// runtime ever reports two containers with the same name, the first
/// occurrence wins.
///
/// An empty `desired` slice is a valid instruction: it plans the removal of
/// every observed container.
pub fn plan(desired: &[ContainerSpec], observed: &[ObservedContainer]) -> Plan {
    let mut by_name: HashMap<&str, &ObservedContainer> = HashMap::new();
    for container in observed {
        by_name.entry(container.name.as_str()).or_insert(container);
    }

    let mut create = Vec::new();
    let mut update = Vec::new();
    for spec in desired {
        match by_name.get(spec.slug.as_str()) {
            None => create.push(spec.clone()),
            Some(container) if drifted(spec, container) => update.push(spec.clone()),
            Some(_) => {}
        }
    }

    let desired_slugs: HashSet<&str> = desired.iter().map(|s| s.slug.as_str()).collect();
    let mut seen = HashSet::new();
    let mut remove = Vec::new();
    for container in observed {
        if !desired_slugs.contains(container.name.as_str())
            && seen.insert(container.name.as_str())
        {
            remove.push(container.name.clone());
        }
    }

    Plan { create, update, remove }
}

/// Whether an observed container has drifted from its spec.
///
/// Environment comparison is asymmetric on purpose: every desired entry
/// must be present in the snapshot, but extra observed entries are ignored.
/// Runtimes and images inject variables (`PATH`, `HOSTNAME`, image
/// defaults) that no spec declares; a symmetric comparison would drift
/// every container on every cycle.
fn drifted(spec: &ContainerSpec, observed: &ObservedContainer) -> bool {
    if spec.environment.iter().any(|entry| !observed.env_snapshot.contains(entry)) {
        return true;
    }
    observed.resolved_image != spec.digest
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
