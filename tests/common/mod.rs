// Shared test helpers for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;
use suitekit::{action, Action, RunEvent, TestResult, TestStatus};

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// An action that appends `entry` to the log.
pub fn push(log: &Log, entry: &str) -> Action {
    let log = log.clone();
    let entry = entry.to_string();
    action(move || {
        let log = log.clone();
        let entry = entry.clone();
        async move {
            log.lock().unwrap().push(entry);
            Ok(())
        }
    })
}

/// Appends `entry` only after yielding to the runtime for a while.
pub fn push_later(log: &Log, entry: &str, delay_ms: u64) -> Action {
    let log = log.clone();
    let entry = entry.to_string();
    action(move || {
        let log = log.clone();
        let entry = entry.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            log.lock().unwrap().push(entry);
            Ok(())
        }
    })
}

/// An action that resolves to an error with `message`.
pub fn fail(message: &str) -> Action {
    let message = message.to_string();
    action(move || {
        let message = message.clone();
        async move { Err(anyhow::anyhow!("{message}")) }
    })
}

/// Appends `entry`, then fails with `message`.
pub fn push_then_fail(log: &Log, entry: &str, message: &str) -> Action {
    let log = log.clone();
    let entry = entry.to_string();
    let message = message.to_string();
    action(move || {
        let log = log.clone();
        let entry = entry.clone();
        let message = message.clone();
        async move {
            log.lock().unwrap().push(entry);
            Err(anyhow::anyhow!("{message}"))
        }
    })
}

pub fn noop() -> Action {
    action(|| async { Ok(()) })
}

/// Collects every event into a shared vector.
pub fn event_sink() -> (Arc<Mutex<Vec<RunEvent>>>, impl FnMut(&RunEvent) + Send + 'static) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    let sink = move |event: &RunEvent| sink_events.lock().unwrap().push(event.clone());
    (events, sink)
}

/// `(suite, test, status)` triples, convenient for whole-run assertions.
pub fn outline(results: &[TestResult]) -> Vec<(String, String, TestStatus)> {
    results
        .iter()
        .map(|r| (r.suite.clone(), r.test.clone(), r.status))
        .collect()
}

pub fn row(suite: &str, test: &str, status: TestStatus) -> (String, String, TestStatus) {
    (suite.to_string(), test.to_string(), status)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
