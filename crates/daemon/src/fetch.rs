// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desired-state fetching from the management service.
//!
//! Validation happens here, at the boundary: a batch that reaches the rest
//! of the agent has already passed schema decoding and
//! [`baton_core::validate_batch`]. Anything wrong with a response turns the
//! current cycle into a no-op, never more than that.

use async_trait::async_trait;
use baton_core::{validate_batch, ContainerSpec, SpecError};
use thiserror::Error;

use crate::config::Config;

/// Client-side view of the management service.
#[async_trait]
pub trait ManagementApi: Send + Sync + 'static {
    /// Fetch the desired-state batch for this agent's project and channel.
    async fn fetch_desired(&self) -> Result<Vec<ContainerSpec>, FetchError>;
}

/// Errors from desired-state fetching
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("management service returned {status} for {url}")]
    Status { status: reqwest::StatusCode, url: String },

    #[error("undecodable response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid desired-state batch: {0}")]
    Schema(#[from] SpecError),
}

/// HTTP client for the management service.
///
/// Sends `GET {management_url}/{project}/{channel}/` with token auth. The
/// `gzip` feature handles content negotiation and transparent
/// decompression; setting `Accept-Encoding` by hand would turn that off.
pub struct ManagementClient {
    http: reqwest::Client,
    endpoint: String,
    key: String,
}

impl ManagementClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(crate::env::USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { http, endpoint: config.endpoint(), key: config.key.clone() })
    }
}

#[async_trait]
impl ManagementApi for ManagementClient {
    async fn fetch_desired(&self) -> Result<Vec<ContainerSpec>, FetchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status, url: self.endpoint.clone() });
        }

        // Decode from the body text rather than response.json() so decode
        // failures carry the serde error instead of a generic reqwest one.
        let body = response.text().await?;
        let specs: Vec<ContainerSpec> =
            serde_json::from_str(&body).map_err(FetchError::Decode)?;
        validate_batch(&specs)?;
        Ok(specs)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{FetchError, ManagementApi};
    use async_trait::async_trait;
    use baton_core::{ContainerSpec, SpecError};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Fake management service for testing.
    ///
    /// Serves a scripted batch, or a scripted failure.
    #[derive(Clone)]
    pub struct FakeManagement {
        inner: Arc<Mutex<FakeManagementState>>,
    }

    struct FakeManagementState {
        desired: Vec<ContainerSpec>,
        fail: bool,
        fetches: usize,
    }

    impl Default for FakeManagement {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeManagementState {
                    desired: Vec::new(),
                    fail: false,
                    fetches: 0,
                })),
            }
        }
    }

    impl FakeManagement {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve this batch on subsequent fetches.
        pub fn set_desired(&self, desired: Vec<ContainerSpec>) {
            let mut state = self.inner.lock();
            state.desired = desired;
            state.fail = false;
        }

        /// Fail subsequent fetches.
        pub fn fail_fetches(&self) {
            self.inner.lock().fail = true;
        }

        /// Number of fetches served so far.
        pub fn fetches(&self) -> usize {
            self.inner.lock().fetches
        }
    }

    #[async_trait]
    impl ManagementApi for FakeManagement {
        async fn fetch_desired(&self) -> Result<Vec<ContainerSpec>, FetchError> {
            let mut state = self.inner.lock();
            state.fetches += 1;
            if state.fail {
                return Err(FetchError::Schema(SpecError::EmptyField("slug")));
            }
            Ok(state.desired.clone())
        }
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeManagement;

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
