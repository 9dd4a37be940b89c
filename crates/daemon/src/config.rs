// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration.
//!
//! Loaded once at startup from a TOML file and never mutated afterwards.
//! Everything that varies per deployment lives here; everything that varies
//! per machine (state directory, log filter) comes from the environment.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::lifecycle::StartupError;

/// Immutable agent configuration.
///
/// ```toml
/// management_url = "https://mgmt.example.com/api/v1"
/// project        = "acme"
/// channel        = "production"
/// key            = "0123abcd"
/// self_name      = "baton-agent"
///
/// [request]
/// timeout_secs  = 30
/// interval_secs = 60
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the management service, without trailing slash.
    pub management_url: String,
    /// Project whose desired state this agent converges.
    pub project: String,
    /// Channel (e.g. "production", "staging") within the project.
    pub channel: String,
    /// API key sent as `Authorization: Token {key}`.
    pub key: String,
    /// Name of the container the agent itself runs in. Excluded from
    /// observation so the agent never reconciles itself away.
    pub self_name: String,
    #[serde(default)]
    pub request: RequestConfig,
}

/// Request-related tunables, all optional in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestConfig {
    /// Management request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Seconds to sleep between reconcile cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs(), interval_secs: default_interval_secs() }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_secs() -> u64 {
    60
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, StartupError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StartupError::ConfigRead(path.to_path_buf(), e))?;
        let mut config: Config = toml::from_str(&raw)
            .map_err(|e| StartupError::ConfigParse(path.to_path_buf(), e))?;
        config.management_url = config.management_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), StartupError> {
        for (field, value) in [
            ("management_url", &self.management_url),
            ("project", &self.project),
            ("channel", &self.channel),
            ("key", &self.key),
            ("self_name", &self.self_name),
        ] {
            if value.trim().is_empty() {
                return Err(StartupError::ConfigField(field));
            }
        }
        Ok(())
    }

    /// Desired-state endpoint for this agent's project and channel.
    pub fn endpoint(&self) -> String {
        format!("{}/{}/{}/", self.management_url, self.project, self.channel)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.request.interval_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
