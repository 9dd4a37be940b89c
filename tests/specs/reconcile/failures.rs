// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure-handling specs
//!
//! Cycle-level failures degrade to no-ops; action-level failures are
//! isolated to the one container they hit. Nothing here is ever fatal.

use crate::prelude::*;

#[tokio::test]
async fn a_failed_fetch_touches_nothing() {
    let agent = agent();
    agent.management.fail_fetches();
    agent.runtime.set_observed(vec![running("web", "sha256:1")]);

    let outcome = agent.engine.run_cycle().await;

    assert_eq!(outcome, CycleOutcome::FetchFailed);
    assert!(agent.runtime.calls().is_empty());
    assert_eq!(observed_names(&agent), vec!["web".to_string()]);
}

#[tokio::test]
async fn the_cycle_after_a_failed_fetch_reconciles_normally() {
    let agent = agent();
    agent.management.fail_fetches();
    agent.runtime.set_observed(vec![running("nginx", "sha256:9")]);

    assert_eq!(agent.engine.run_cycle().await, CycleOutcome::FetchFailed);

    agent.management.set_desired(vec![]);
    match agent.engine.run_cycle().await {
        CycleOutcome::Applied(summary) => assert_eq!(summary.removed, 1),
        other => panic!("expected the retry cycle to apply, got {other:?}"),
    }
}

#[tokio::test]
async fn an_unobservable_runtime_aborts_the_cycle() {
    let agent = agent();
    agent.management.set_desired(vec![spec("web", "sha256:1", &[])]);
    agent.runtime.fail_list();

    let outcome = agent.engine.run_cycle().await;

    assert_eq!(outcome, CycleOutcome::ObserveFailed);
    // Observation was attempted; nothing was mutated.
    assert_eq!(agent.runtime.calls(), vec![RuntimeCall::List]);
}

#[tokio::test]
async fn one_failing_create_leaves_the_rest_of_the_batch_applied() {
    let agent = agent();
    agent.runtime.fail_run("b");
    agent.management.set_desired(vec![
        spec("a", "sha256:1", &[]),
        spec("b", "sha256:2", &[]),
        spec("c", "sha256:3", &[]),
    ]);

    let outcome = agent.engine.run_cycle().await;

    match outcome {
        CycleOutcome::Applied(summary) => {
            assert_eq!(summary.created, 2);
            assert_eq!(summary.failed, 1);
        }
        other => panic!("expected partial application, got {other:?}"),
    }
    // All three launches were attempted, in order.
    assert_eq!(
        agent.runtime.calls(),
        vec![
            RuntimeCall::List,
            RuntimeCall::Run { slug: "a".to_string() },
            RuntimeCall::Run { slug: "b".to_string() },
            RuntimeCall::Run { slug: "c".to_string() },
        ]
    );

    let mut names = observed_names(&agent);
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "c".to_string()]);
}

#[tokio::test]
async fn a_failed_action_is_retried_on_the_next_cycle() {
    let agent = agent();
    agent.runtime.fail_run("web");
    agent.management.set_desired(vec![spec("web", "sha256:1", &[])]);

    match agent.engine.run_cycle().await {
        CycleOutcome::Applied(summary) => assert_eq!(summary.failed, 1),
        other => panic!("expected a failed create, got {other:?}"),
    }

    // The planner sees the container still missing and tries again.
    match agent.engine.run_cycle().await {
        CycleOutcome::Applied(summary) => assert_eq!(summary.failed, 1),
        other => panic!("expected a retried create, got {other:?}"),
    }
}
