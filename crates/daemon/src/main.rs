// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! batond: single-host container reconciliation agent.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use baton_daemon::adapters::{DockerCli, RegistryAuthStore};
use baton_daemon::config::Config;
use baton_daemon::engine::Engine;
use baton_daemon::env;
use baton_daemon::fetch::ManagementClient;
use baton_daemon::lifecycle::{self, Paths};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(env::LOG_FILTER_VAR)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let paths = Paths::load()?;
    let config = Config::load(&paths.config_path).context("loading agent configuration")?;

    let runtime = Arc::new(DockerCli::new(paths.docker_config_dir.clone()));
    let mut state = lifecycle::startup(&paths, runtime.as_ref()).await?;

    let management = ManagementClient::new(&config).context("building management client")?;
    let auth = RegistryAuthStore::new(paths.docker_config_dir.clone());
    let engine = Engine::new(management, Arc::clone(&runtime), auth, &config);

    tracing::info!(
        endpoint = %config.endpoint(),
        self_name = %config.self_name,
        interval_secs = config.request.interval_secs,
        "agent ready"
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    tokio::select! {
        _ = engine.run() => {}
        _ = &mut ctrl_c => {
            tracing::info!("interrupt received");
        }
    }

    state.shutdown();
    Ok(())
}
