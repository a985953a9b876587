//! # Registry Integration Tests / 注册表集成测试
//!
//! Registration, listing, selection and event streaming.
//!
//! 注册、列举、选择和事件流。

mod common;

use common::*;
use futures::StreamExt;
use suitekit::{
    expect_error, HookPhase, Matcher, Only, RegistrationError, Registry, RunEvent, RunOptions,
    TestInfo, TestStatus,
};

fn nested() -> Registry {
    let mut registry = Registry::new();
    registry
        .describe("X", |r| {
            r.it("a", || async { Ok(()) })?;
            r.describe("Y", |r| r.it("b", || async { Ok(()) }))?;
            Ok(())
        })
        .unwrap();
    registry
}

#[test]
fn test_list_tests_reports_full_paths() {
    let registry = nested();
    assert_eq!(
        registry.list_tests(),
        vec![TestInfo::new("X", "a"), TestInfo::new("X > Y", "b")]
    );
}

#[test]
fn test_misuse_outside_describe_is_rejected() {
    let mut registry = Registry::new();

    let err = registry.it("loose", || async { Ok(()) }).unwrap_err();
    assert_eq!(err, RegistrationError::TestOutsideSuite { name: "loose".into() });
    assert!(err.to_string().contains("describe"));

    let err = registry.hook(HookPhase::BeforeEach, noop()).unwrap_err();
    assert_eq!(
        err,
        RegistrationError::HookOutsideSuite { phase: "beforeEach".into() }
    );
    assert!(err.to_string().starts_with("beforeEach"));

    assert!(registry.is_empty());
}

#[test]
fn test_misuse_error_propagates_out_of_describe() {
    let mut registry = Registry::new();
    let outcome = registry.describe("outer", |r| {
        r.it("fine", || async { Ok(()) })?;
        Err(RegistrationError::HookOutsideSuite { phase: "afterAll".into() })
    });
    assert!(outcome.is_err());

    // The scope cursor is back at the root: a loose test is still rejected.
    assert!(registry.it("loose", || async { Ok(()) }).is_err());
}

#[tokio::test]
async fn test_reset_gives_independent_runs() {
    let log = new_log();
    let mut registry = Registry::new();
    registry
        .describe("old", |r| r.add_test("t", push(&log, "old")))
        .unwrap();
    registry.reset();
    assert!(registry.is_empty());
    assert!(registry.list_tests().is_empty());

    registry
        .describe("new", |r| r.add_test("t", push(&log, "new")))
        .unwrap();
    let results = registry.run(RunOptions::new()).await;

    assert_eq!(entries(&log), strings(&["new"]));
    assert_eq!(outline(&results), vec![row("new", "t", TestStatus::Passed)]);
}

#[tokio::test]
async fn test_empty_registry_completes_with_no_results() {
    let (events, sink) = event_sink();
    let results = Registry::new().run(RunOptions::new().on_event(sink)).await;

    assert!(results.is_empty());
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].is_complete());
}

#[tokio::test]
async fn test_only_skips_other_tests_but_enters_their_suites() {
    let log = new_log();
    let mut registry = Registry::new();
    registry
        .describe("X", |r| {
            r.hook(HookPhase::BeforeAll, push(&log, "X beforeAll"))?;
            r.hook(HookPhase::AfterAll, push(&log, "X afterAll"))?;
            r.add_test("a", push(&log, "a"))?;
            r.describe("Y", |r| r.add_test("b", push(&log, "b")))?;
            Ok(())
        })
        .unwrap();

    let only = Only {
        suite: Some("X > Y".into()),
        test: Some("b".into()),
    };
    let results = registry.run(RunOptions::new().only(only)).await;

    assert_eq!(entries(&log), strings(&["X beforeAll", "b", "X afterAll"]));
    assert_eq!(
        outline(&results),
        vec![row("X", "a", TestStatus::Skipped), row("X > Y", "b", TestStatus::Passed)]
    );
}

#[tokio::test]
async fn test_filter_skipped_tests_emit_no_events() {
    let (events, sink) = event_sink();
    let results = nested()
        .run(
            RunOptions::new()
                .filter(|_suite, test| test == "a")
                .on_event(sink),
        )
        .await;

    assert_eq!(
        outline(&results),
        vec![row("X", "a", TestStatus::Passed), row("X > Y", "b", TestStatus::Skipped)]
    );
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], RunEvent::Start { test, .. } if test == "a"));
    assert!(matches!(&events[1], RunEvent::Pass { test, .. } if test == "a"));
}

#[tokio::test]
async fn test_events_follow_execution_and_complete_carries_results() {
    let mut registry = Registry::new();
    registry
        .describe("S", |r| {
            r.add_test("ok", noop())?;
            r.add_test("bad", fail("nope"))
        })
        .unwrap();

    let (events, sink) = event_sink();
    let results = registry.run(RunOptions::new().on_event(sink)).await;

    let events = events.lock().unwrap();
    let kinds: Vec<&str> = events
        .iter()
        .map(|event| match event {
            RunEvent::Start { .. } => "start",
            RunEvent::Pass { .. } => "pass",
            RunEvent::Fail { .. } => "fail",
            RunEvent::Complete { .. } => "complete",
        })
        .collect();
    assert_eq!(kinds, vec!["start", "pass", "start", "fail", "complete"]);

    match events.last().unwrap() {
        RunEvent::Complete { results: reported } => assert_eq!(reported, &results),
        other => panic!("unexpected last event {other:?}"),
    }
    match &events[3] {
        RunEvent::Fail { error, .. } => assert_eq!(error.message, "nope"),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_spawn_run_streams_events_and_returns_registry() {
    let registry = nested();
    let (stream, handle) = registry.spawn_run(RunOptions::new());

    let events: Vec<RunEvent> = stream.collect().await;
    let (registry, results) = handle.await.unwrap();

    assert_eq!(events.len(), 5);
    assert!(events.last().unwrap().is_complete());
    assert_eq!(results.len(), 2);

    let again = registry.run(RunOptions::new()).await;
    assert_eq!(outline(&again), outline(&results));
}

#[tokio::test]
async fn test_expect_error_inside_a_test_body() {
    let mut registry = Registry::new();
    registry
        .describe("matchers", |r| {
            r.it("accepts the expected failure", || async {
                let parsed: anyhow::Result<u32> = "nan".parse::<u32>().map_err(Into::into);
                expect_error(parsed, &Matcher::substring("invalid digit"))
            })?;
            r.it("rejects success", || async {
                let parsed: anyhow::Result<u32> = "7".parse::<u32>().map_err(Into::into);
                expect_error(parsed, &Matcher::substring("invalid digit"))
            })
        })
        .unwrap();

    let results = registry.run(RunOptions::new()).await;

    assert_eq!(results[0].status, TestStatus::Passed);
    assert_eq!(results[1].status, TestStatus::Failed);
    assert!(results[1]
        .error
        .as_ref()
        .unwrap()
        .message
        .contains("but the operation succeeded"));
}
