// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the workspace specs.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

pub use baton_core::{ContainerSpec, ObservedContainer, RegistryAuth};
pub use baton_daemon::adapters::{FakeRuntime, RegistryAuthStore, RuntimeCall};
pub use baton_daemon::config::{Config, RequestConfig};
pub use baton_daemon::engine::{CycleOutcome, Engine};
pub use baton_daemon::fetch::FakeManagement;

/// A wired-up agent: real engine, fake collaborators, throwaway state dir.
pub struct Agent {
    pub management: FakeManagement,
    pub runtime: Arc<FakeRuntime>,
    pub engine: Engine<FakeManagement, FakeRuntime>,
    /// Where the credential store materializes `config.json`.
    pub credential_file: PathBuf,
    _state_dir: tempfile::TempDir,
}

/// The container name the agent runs under in these specs.
pub const SELF_NAME: &str = "baton-agent";

pub fn agent() -> Agent {
    let state_dir = tempfile::tempdir().expect("temp state dir");
    let config_dir = state_dir.path().join("docker-config");
    let config = Config {
        management_url: "https://mgmt.example.com/api/v1".to_string(),
        project: "acme".to_string(),
        channel: "production".to_string(),
        key: "0123abcd".to_string(),
        self_name: SELF_NAME.to_string(),
        request: RequestConfig::default(),
    };

    let management = FakeManagement::new();
    let runtime = Arc::new(FakeRuntime::new());
    let auth = RegistryAuthStore::new(config_dir.clone());
    let engine = Engine::new(management.clone(), Arc::clone(&runtime), auth, &config);

    Agent {
        management,
        runtime,
        engine,
        credential_file: config_dir.join("config.json"),
        _state_dir: state_dir,
    }
}

/// A desired spec for `slug` pinned to `digest`.
pub fn spec(slug: &str, digest: &str, env: &[&str]) -> ContainerSpec {
    ContainerSpec {
        slug: slug.to_string(),
        name: format!("registry.example.com/acme/{slug}"),
        image: format!("registry.example.com/acme/{slug}:latest"),
        digest: digest.to_string(),
        environment: env.iter().map(|e| e.to_string()).collect(),
        launch_parameters: BTreeMap::new(),
        registry_auth: None,
    }
}

/// An observed container unrelated to any spec.
pub fn running(name: &str, image: &str) -> ObservedContainer {
    ObservedContainer::new(name, image, Vec::new())
}

/// The observed state a converged runtime reports for `spec`.
pub fn converged(spec: &ContainerSpec) -> ObservedContainer {
    let mut env = spec.environment.clone();
    env.push("PATH=/usr/local/bin:/usr/bin".to_string());
    ObservedContainer::new(spec.slug.clone(), spec.digest.clone(), env)
}

/// Names the runtime currently reports, in order.
pub fn observed_names(agent: &Agent) -> Vec<String> {
    agent.runtime.observed().into_iter().map(|c| c.name).collect()
}
