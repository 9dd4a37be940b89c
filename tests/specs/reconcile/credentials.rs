// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry credential scoping specs
//!
//! The credential file exists exactly for the duration of a launch that
//! needs it, and at no other moment of the cycle.

use crate::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn private_spec(slug: &str) -> ContainerSpec {
    let mut spec = spec(slug, "sha256:1111", &[]);
    spec.registry_auth = Some(RegistryAuth {
        username: "bot".to_string(),
        password: "s3cret".to_string(),
        registry: "registry.example.com".to_string(),
    });
    spec
}

/// Record whether the credential file is on disk at launch time.
fn watch_launches(agent: &Agent) -> Arc<AtomicBool> {
    let seen = Arc::new(AtomicBool::new(false));
    let path = agent.credential_file.clone();
    let flag = Arc::clone(&seen);
    agent.runtime.on_run(move |_| {
        if path.exists() {
            flag.store(true, Ordering::SeqCst);
        }
    });
    seen
}

#[tokio::test]
async fn credentials_exist_only_while_launching() {
    let agent = agent();
    let seen_during_launch = watch_launches(&agent);
    agent.management.set_desired(vec![private_spec("web")]);
    assert!(!agent.credential_file.exists());

    let outcome = agent.engine.run_cycle().await;

    match outcome {
        CycleOutcome::Applied(summary) => assert_eq!(summary.created, 1),
        other => panic!("expected a create, got {other:?}"),
    }
    assert!(seen_during_launch.load(Ordering::SeqCst));
    assert!(!agent.credential_file.exists());
}

#[tokio::test]
async fn credentials_are_released_when_the_launch_fails() {
    let agent = agent();
    agent.runtime.fail_run("web");
    agent.management.set_desired(vec![private_spec("web")]);

    let outcome = agent.engine.run_cycle().await;

    match outcome {
        CycleOutcome::Applied(summary) => assert_eq!(summary.failed, 1),
        other => panic!("expected a failed create, got {other:?}"),
    }
    assert!(!agent.credential_file.exists());
}

#[tokio::test]
async fn public_images_never_create_a_credential_file() {
    let agent = agent();
    let seen_during_launch = watch_launches(&agent);
    agent.management.set_desired(vec![spec("web", "sha256:1111", &["PORT=80"])]);

    agent.engine.run_cycle().await;

    assert!(!seen_during_launch.load(Ordering::SeqCst));
    assert!(!agent.credential_file.exists());
}

#[tokio::test]
async fn a_mixed_batch_scopes_credentials_per_launch() {
    let agent = agent();
    agent.management.set_desired(vec![private_spec("web"), spec("api", "sha256:2", &[])]);

    let outcome = agent.engine.run_cycle().await;

    match outcome {
        CycleOutcome::Applied(summary) => assert_eq!(summary.created, 2),
        other => panic!("expected two creates, got {other:?}"),
    }
    assert!(!agent.credential_file.exists());
}
