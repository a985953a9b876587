//! # Bail Integration Tests / 快速失败集成测试
//!
//! Stopping after the first failure, and caller-side cancellation.
//!
//! 第一次失败后停止，以及调用方取消。

mod common;

use common::*;
use suitekit::{HookPhase, Registry, RunOptions, TestStatus};
use tokio_util::sync::CancellationToken;

fn two_suites(log: &Log, first_body: suitekit::Action) -> Registry {
    let mut registry = Registry::new();
    registry
        .describe("first", |r| {
            r.hook(HookPhase::AfterEach, push(log, "first afterEach"))?;
            r.hook(HookPhase::AfterAll, push(log, "first afterAll"))?;
            r.add_test("a", first_body)?;
            r.add_test("b", push(log, "first b"))?;
            r.describe("nested", |r| r.add_test("c", push(log, "nested c")))?;
            Ok(())
        })
        .unwrap();
    registry
        .describe("second", |r| {
            r.hook(HookPhase::BeforeAll, push(log, "second beforeAll"))?;
            r.add_test("d", push(log, "second d"))
        })
        .unwrap();
    registry
}

#[tokio::test]
async fn test_bail_stops_new_tests_but_finishes_cleanup() {
    let log = new_log();
    let registry = two_suites(&log, push_then_fail(&log, "first a", "nope"));

    let results = registry.run(RunOptions::new().bail(true)).await;

    assert_eq!(
        entries(&log),
        strings(&["first a", "first afterEach", "first afterAll"])
    );
    assert_eq!(outline(&results), vec![row("first", "a", TestStatus::Failed)]);
}

#[tokio::test]
async fn test_without_bail_everything_runs() {
    let log = new_log();
    let registry = two_suites(&log, push_then_fail(&log, "first a", "nope"));

    let results = registry.run(RunOptions::new()).await;

    assert_eq!(
        entries(&log),
        strings(&[
            "first a",
            "first afterEach",
            "first b",
            "first afterEach",
            "nested c",
            "first afterEach",
            "first afterAll",
            "second beforeAll",
            "second d",
        ])
    );
    assert_eq!(results.len(), 4);
}

#[tokio::test]
async fn test_bail_on_before_all_failure_stops_later_suites() {
    let log = new_log();
    let mut registry = Registry::new();
    registry
        .describe("first", |r| {
            r.hook(HookPhase::BeforeAll, fail("setup broke"))?;
            r.add_test("a", push(&log, "a"))
        })
        .unwrap();
    registry
        .describe("second", |r| r.add_test("b", push(&log, "b")))
        .unwrap();

    let results = registry.run(RunOptions::new().bail(true)).await;

    assert!(entries(&log).is_empty());
    assert_eq!(
        outline(&results),
        vec![row("first", "(beforeAll hook)", TestStatus::Failed)]
    );
}

#[tokio::test]
async fn test_bail_on_after_all_failure_stops_later_suites() {
    let log = new_log();
    let mut registry = Registry::new();
    registry
        .describe("first", |r| {
            r.hook(HookPhase::AfterAll, fail("teardown broke"))?;
            r.add_test("a", push(&log, "a"))
        })
        .unwrap();
    registry
        .describe("second", |r| r.add_test("b", push(&log, "b")))
        .unwrap();

    let results = registry.run(RunOptions::new().bail(true)).await;

    assert_eq!(entries(&log), strings(&["a"]));
    assert_eq!(
        outline(&results),
        vec![
            row("first", "a", TestStatus::Passed),
            row("first", "(afterAll hook)", TestStatus::Failed),
        ]
    );
}

#[tokio::test]
async fn test_bail_unwinds_after_all_of_every_entered_ancestor() {
    let log = new_log();
    let mut registry = Registry::new();
    registry
        .describe("outer", |r| {
            r.hook(HookPhase::AfterAll, push(&log, "outer afterAll"))?;
            r.describe("inner", |r| {
                r.hook(HookPhase::AfterAll, push(&log, "inner afterAll"))?;
                r.add_test("boom", fail("nope"))
            })?;
            r.describe("later", |r| {
                r.hook(HookPhase::AfterAll, push(&log, "later afterAll"))?;
                r.add_test("skipped", push(&log, "later test"))
            })?;
            Ok(())
        })
        .unwrap();

    registry.run(RunOptions::new().bail(true)).await;

    assert_eq!(
        entries(&log),
        strings(&["inner afterAll", "outer afterAll"])
    );
}

#[tokio::test]
async fn test_cancelled_token_prevents_any_suite_from_starting() {
    let log = new_log();
    let registry = two_suites(&log, push(&log, "first a"));
    let token = CancellationToken::new();
    token.cancel();

    let results = registry.run(RunOptions::new().cancel(token)).await;

    assert!(results.is_empty());
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn test_cancelling_mid_run_stops_after_the_current_test() {
    let log = new_log();
    let token = CancellationToken::new();
    let trigger = token.clone();
    let first_log = log.clone();
    let registry = two_suites(
        &log,
        suitekit::action(move || {
            let trigger = trigger.clone();
            let log = first_log.clone();
            async move {
                log.lock().unwrap().push("first a".to_string());
                trigger.cancel();
                Ok(())
            }
        }),
    );

    let results = registry.run(RunOptions::new().cancel(token)).await;

    assert_eq!(
        entries(&log),
        strings(&["first a", "first afterEach", "first afterAll"])
    );
    assert_eq!(outline(&results), vec![row("first", "a", TestStatus::Passed)]);
}
