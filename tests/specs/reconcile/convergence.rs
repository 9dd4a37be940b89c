// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Convergence specs
//!
//! From a drifted host to the desired state in one cycle, and nothing to do
//! on the next.

use crate::prelude::*;

#[tokio::test]
async fn drifted_host_converges_in_one_cycle() {
    let agent = agent();
    // Desired: web on a new digest, api brand new.
    let web = spec("web", "sha256:new", &["PORT=80"]);
    let api = spec("api", "sha256:2222", &[]);
    agent.management.set_desired(vec![web.clone(), api.clone()]);
    // Observed: web on a stale digest, plus an orphan nobody asked for.
    agent.runtime.set_observed(vec![
        ObservedContainer::new("web", "sha256:old", vec!["PORT=80".to_string()]),
        running("nginx", "sha256:9999"),
    ]);

    let outcome = agent.engine.run_cycle().await;

    let summary = match outcome {
        CycleOutcome::Applied(summary) => summary,
        other => panic!("expected an applied cycle, got {other:?}"),
    };
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.created, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 0);

    // Fixed order: observe, remove the orphan, create, then the
    // destroy-and-recreate update.
    assert_eq!(
        agent.runtime.calls(),
        vec![
            RuntimeCall::List,
            RuntimeCall::RemoveContainer { name: "nginx".to_string() },
            RuntimeCall::Run { slug: "api".to_string() },
            RuntimeCall::RemoveContainer { name: "web".to_string() },
            RuntimeCall::RemoveImage { image: web.image.clone() },
            RuntimeCall::Run { slug: "web".to_string() },
        ]
    );

    let mut names = observed_names(&agent);
    names.sort();
    assert_eq!(names, vec!["api".to_string(), "web".to_string()]);
}

#[tokio::test]
async fn second_cycle_is_converged() {
    let agent = agent();
    agent.management.set_desired(vec![spec("web", "sha256:new", &["PORT=80"])]);
    agent.runtime.set_observed(vec![running("nginx", "sha256:9999")]);

    assert!(matches!(agent.engine.run_cycle().await, CycleOutcome::Applied(_)));
    assert_eq!(agent.engine.run_cycle().await, CycleOutcome::Converged);
    assert_eq!(agent.management.fetches(), 2);
}

#[tokio::test]
async fn empty_desired_state_is_a_full_teardown() {
    let agent = agent();
    agent.runtime.set_observed(vec![
        running("x", "sha256:1"),
        running("y", "sha256:2"),
    ]);

    let outcome = agent.engine.run_cycle().await;

    match outcome {
        CycleOutcome::Applied(summary) => {
            assert_eq!(summary.removed, 2);
            assert_eq!(summary.created + summary.updated + summary.failed, 0);
        }
        other => panic!("expected teardown, got {other:?}"),
    }
    assert!(observed_names(&agent).is_empty());
}

#[tokio::test]
async fn the_agent_never_reconciles_itself_away() {
    let agent = agent();
    // Empty desired state would tear down anything visible.
    agent.runtime.set_observed(vec![
        running(SELF_NAME, "sha256:self"),
        running("nginx", "sha256:9999"),
    ]);

    let outcome = agent.engine.run_cycle().await;

    match outcome {
        CycleOutcome::Applied(summary) => assert_eq!(summary.removed, 1),
        other => panic!("expected one removal, got {other:?}"),
    }
    assert_eq!(observed_names(&agent), vec![SELF_NAME.to_string()]);
}

#[tokio::test]
async fn extra_runtime_env_does_not_flap() {
    let agent = agent();
    let web = spec("web", "sha256:1", &["PORT=80"]);
    agent.management.set_desired(vec![web.clone()]);
    // The runtime reports injected variables the spec never declared.
    agent.runtime.set_observed(vec![converged(&web)]);

    assert_eq!(agent.engine.run_cycle().await, CycleOutcome::Converged);
    assert_eq!(agent.engine.run_cycle().await, CycleOutcome::Converged);
}
