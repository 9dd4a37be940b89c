// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapters for external I/O: the container runtime and the registry
//! credential store.

pub mod auth;
pub mod docker;

pub use auth::{CredentialError, RegistryAuthGuard, RegistryAuthStore};
pub use docker::DockerCli;

use async_trait::async_trait;
use baton_core::{ContainerSpec, ObservedContainer};
use thiserror::Error;

/// Errors from container runtime operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to exec docker: {0}")]
    Exec(#[source] std::io::Error),

    #[error("{command} failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("could not parse {command} output: {detail}")]
    Parse { command: &'static str, detail: String },

    #[error("launch parameter `{0}` has an unsupported value shape")]
    UnsupportedParameter(String),
}

/// The container runtime seam.
///
/// One production implementation ([`DockerCli`]) and one fake for tests.
/// `list` is the read side the reconciler plans against; the remaining
/// operations are the write side the executor applies plans through.
#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    /// Snapshot every container the runtime knows, stopped ones included.
    /// A stopped container still holds its name, so it must remain visible
    /// to the planner for matching and removal.
    async fn list(&self) -> Result<Vec<ObservedContainer>, RuntimeError>;

    /// Launch a container for `spec`, detached, with restart policy `always`
    /// and the container name set to `spec.slug`.
    async fn run(&self, spec: &ContainerSpec) -> Result<(), RuntimeError>;

    /// Force-remove a container by name. Removing a container that does not
    /// exist is a success, so removes are idempotent.
    async fn remove_container(&self, name: &str) -> Result<(), RuntimeError>;

    /// Force-remove an image reference.
    async fn remove_image(&self, image: &str) -> Result<(), RuntimeError>;

    /// Probe runtime reachability. Used once at startup.
    async fn ping(&self) -> Result<(), RuntimeError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{ContainerRuntime, RuntimeError};
    use async_trait::async_trait;
    use baton_core::{ContainerSpec, ObservedContainer};
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// Recorded runtime operation
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RuntimeCall {
        List,
        Run { slug: String },
        RemoveContainer { name: String },
        RemoveImage { image: String },
        Ping,
    }

    type RunHook = Box<dyn Fn(&ContainerSpec) + Send>;

    struct FakeRuntimeState {
        observed: Vec<ObservedContainer>,
        calls: Vec<RuntimeCall>,
        fail_list: bool,
        fail_ping: bool,
        fail_runs: HashSet<String>,
        fail_removes: HashSet<String>,
        fail_image_removes: HashSet<String>,
        run_hook: Option<RunHook>,
    }

    /// Fake container runtime for testing.
    ///
    /// Behaves like a tiny runtime: `run` replaces the observed entry for
    /// the slug with a converged one (plus an injected `PATH` entry, the way
    /// real runtimes add variables no spec declares) and `remove_container`
    /// deletes by name. Failures are scripted per name.
    #[derive(Clone)]
    pub struct FakeRuntime {
        inner: Arc<Mutex<FakeRuntimeState>>,
    }

    impl Default for FakeRuntime {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeRuntimeState {
                    observed: Vec::new(),
                    calls: Vec::new(),
                    fail_list: false,
                    fail_ping: false,
                    fail_runs: HashSet::new(),
                    fail_removes: HashSet::new(),
                    fail_image_removes: HashSet::new(),
                    run_hook: None,
                })),
            }
        }
    }

    impl FakeRuntime {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed the observed container list.
        pub fn set_observed(&self, observed: Vec<ObservedContainer>) {
            self.inner.lock().observed = observed;
        }

        /// Current observed container list.
        pub fn observed(&self) -> Vec<ObservedContainer> {
            self.inner.lock().observed.clone()
        }

        /// Get all recorded operations in order.
        pub fn calls(&self) -> Vec<RuntimeCall> {
            self.inner.lock().calls.clone()
        }

        /// Make the next `list` calls fail.
        pub fn fail_list(&self) {
            self.inner.lock().fail_list = true;
        }

        /// Make `ping` fail.
        pub fn fail_ping(&self) {
            self.inner.lock().fail_ping = true;
        }

        /// Make `run` fail for the given slug.
        pub fn fail_run(&self, slug: &str) {
            self.inner.lock().fail_runs.insert(slug.to_string());
        }

        /// Make `remove_container` fail for the given name.
        pub fn fail_remove(&self, name: &str) {
            self.inner.lock().fail_removes.insert(name.to_string());
        }

        /// Make `remove_image` fail for the given reference.
        pub fn fail_remove_image(&self, image: &str) {
            self.inner.lock().fail_image_removes.insert(image.to_string());
        }

        /// Install a hook invoked at the start of every `run` call. Lets
        /// tests observe the world as it is while a launch is in flight.
        pub fn on_run(&self, hook: impl Fn(&ContainerSpec) + Send + 'static) {
            self.inner.lock().run_hook = Some(Box::new(hook));
        }

        fn scripted_failure(command: &str, detail: &str) -> RuntimeError {
            RuntimeError::Command {
                command: command.to_string(),
                stderr: format!("scripted failure: {detail}"),
            }
        }
    }

    #[async_trait]
    impl ContainerRuntime for FakeRuntime {
        async fn list(&self) -> Result<Vec<ObservedContainer>, RuntimeError> {
            let mut state = self.inner.lock();
            state.calls.push(RuntimeCall::List);
            if state.fail_list {
                return Err(Self::scripted_failure("docker ps", "list"));
            }
            Ok(state.observed.clone())
        }

        async fn run(&self, spec: &ContainerSpec) -> Result<(), RuntimeError> {
            let mut state = self.inner.lock();
            state.calls.push(RuntimeCall::Run { slug: spec.slug.clone() });
            if let Some(hook) = &state.run_hook {
                hook(spec);
            }
            if state.fail_runs.contains(spec.slug.as_str()) {
                return Err(Self::scripted_failure("docker run", &spec.slug));
            }
            let mut env = spec.environment.clone();
            env.push("PATH=/usr/local/bin:/usr/bin".to_string());
            state.observed.retain(|c| c.name != spec.slug);
            state.observed.push(ObservedContainer::new(
                spec.slug.clone(),
                spec.digest.clone(),
                env,
            ));
            Ok(())
        }

        async fn remove_container(&self, name: &str) -> Result<(), RuntimeError> {
            let mut state = self.inner.lock();
            state.calls.push(RuntimeCall::RemoveContainer { name: name.to_string() });
            if state.fail_removes.contains(name) {
                return Err(Self::scripted_failure("docker rm", name));
            }
            // Absent containers are a success, like the real adapter.
            state.observed.retain(|c| c.name != name);
            Ok(())
        }

        async fn remove_image(&self, image: &str) -> Result<(), RuntimeError> {
            let mut state = self.inner.lock();
            state.calls.push(RuntimeCall::RemoveImage { image: image.to_string() });
            if state.fail_image_removes.contains(image) {
                return Err(Self::scripted_failure("docker rmi", image));
            }
            Ok(())
        }

        async fn ping(&self) -> Result<(), RuntimeError> {
            let mut state = self.inner.lock();
            state.calls.push(RuntimeCall::Ping);
            if state.fail_ping {
                return Err(Self::scripted_failure("docker version", "ping"));
            }
            Ok(())
        }
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRuntime, RuntimeCall};
