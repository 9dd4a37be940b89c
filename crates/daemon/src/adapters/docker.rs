// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker CLI adapter.
//!
//! Drives the `docker` binary through `tokio::process`. Every invocation
//! pins `DOCKER_CONFIG` to the agent's private credential directory, so the
//! ambient auth the CLI sees is exactly what the credential store installed
//! and the host's own `~/.docker/config.json` is never read or written.

use std::path::PathBuf;

use async_trait::async_trait;
use baton_core::{ContainerSpec, ObservedContainer};
use serde_json::Value;

use super::{ContainerRuntime, RuntimeError};

/// Container runtime adapter backed by the Docker CLI.
pub struct DockerCli {
    binary: PathBuf,
    config_dir: PathBuf,
}

impl DockerCli {
    /// `config_dir` becomes `DOCKER_CONFIG` for every invocation. It is the
    /// same directory the credential store writes `config.json` into.
    pub fn new(config_dir: PathBuf) -> Self {
        Self { binary: PathBuf::from("docker"), config_dir }
    }

    /// Drive a stand-in binary instead of `docker` from PATH.
    #[cfg(test)]
    fn with_binary(binary: PathBuf, config_dir: PathBuf) -> Self {
        Self { binary, config_dir }
    }

    /// Run a docker CLI command and return stdout on success.
    async fn run_docker(&self, args: &[&str]) -> Result<String, RuntimeError> {
        tracing::debug!(subcommand = args.first().copied().unwrap_or(""), "running docker command");
        let output = tokio::process::Command::new(&self.binary)
            .args(args)
            .env("DOCKER_CONFIG", &self.config_dir)
            .output()
            .await
            .map_err(RuntimeError::Exec)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(RuntimeError::Command {
                command: format!("docker {}", args.first().copied().unwrap_or("")),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerCli {
    async fn list(&self) -> Result<Vec<ObservedContainer>, RuntimeError> {
        // -a includes stopped containers: a stopped container still holds
        // its name, so it must stay visible for drift matching and removal.
        let ids = self.run_docker(&["ps", "-aq"]).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut args = vec!["inspect"];
        args.extend(ids.lines());
        let raw = self.run_docker(&args).await?;
        parse_inspect(&raw)
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<(), RuntimeError> {
        let args = build_run_args(spec)?;
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_docker(&arg_refs).await?;
        Ok(())
    }

    async fn remove_container(&self, name: &str) -> Result<(), RuntimeError> {
        match self.run_docker(&["rm", "-f", name]).await {
            Ok(_) => Ok(()),
            // Force-removing an absent container is a success; removes stay
            // idempotent across overlapping cycles.
            Err(RuntimeError::Command { stderr, .. }) if stderr.contains("No such container") => {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn remove_image(&self, image: &str) -> Result<(), RuntimeError> {
        self.run_docker(&["rmi", "-f", image]).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), RuntimeError> {
        self.run_docker(&["version", "--format", "{{.Server.Version}}"]).await?;
        Ok(())
    }
}

/// Assemble the `docker run` argument list for a spec.
fn build_run_args(spec: &ContainerSpec) -> Result<Vec<String>, RuntimeError> {
    let mut args: Vec<String> =
        ["run", "-d", "--restart", "always", "--name"].into_iter().map(str::to_string).collect();
    args.push(spec.slug.clone());

    for (flag, value) in &spec.launch_parameters {
        push_launch_parameter(&mut args, flag, value)?;
    }
    for entry in &spec.environment {
        args.push("-e".to_string());
        args.push(entry.clone());
    }
    args.push(spec.image.clone());
    Ok(args)
}

/// Append one launch parameter as CLI flags.
///
/// Keys are flag names without dashes ("publish", "m"); arrays repeat the
/// flag per element, `true` renders the bare flag, `false` and `null` render
/// nothing. Nested objects have no CLI form and fail the launch.
fn push_launch_parameter(
    args: &mut Vec<String>,
    flag: &str,
    value: &Value,
) -> Result<(), RuntimeError> {
    let option = if flag.starts_with('-') {
        flag.to_string()
    } else if flag.chars().count() == 1 {
        format!("-{flag}")
    } else {
        format!("--{flag}")
    };

    match value {
        Value::Null | Value::Bool(false) => {}
        Value::Bool(true) => args.push(option),
        Value::Array(items) => {
            for item in items {
                let rendered = scalar(item)
                    .ok_or_else(|| RuntimeError::UnsupportedParameter(flag.to_string()))?;
                args.push(option.clone());
                args.push(rendered);
            }
        }
        other => {
            let rendered = scalar(other)
                .ok_or_else(|| RuntimeError::UnsupportedParameter(flag.to_string()))?;
            args.push(option);
            args.push(rendered);
        }
    }
    Ok(())
}

/// Render a scalar JSON value as a CLI argument.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse `docker inspect` JSON into observed containers.
fn parse_inspect(raw: &str) -> Result<Vec<ObservedContainer>, RuntimeError> {
    let docs: Vec<Value> = serde_json::from_str(raw)
        .map_err(|e| RuntimeError::Parse { command: "docker inspect", detail: e.to_string() })?;

    let mut containers = Vec::with_capacity(docs.len());
    for doc in &docs {
        let name =
            doc.get("Name").and_then(Value::as_str).ok_or_else(|| missing_field("Name"))?;
        let image =
            doc.get("Image").and_then(Value::as_str).ok_or_else(|| missing_field("Image"))?;
        // Config.Env comes back null for containers launched without one.
        let env = doc
            .pointer("/Config/Env")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        // The engine reports names with a leading slash.
        containers.push(ObservedContainer::new(name.trim_start_matches('/'), image, env));
    }
    Ok(containers)
}

fn missing_field(field: &'static str) -> RuntimeError {
    RuntimeError::Parse { command: "docker inspect", detail: format!("missing {field}") }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
