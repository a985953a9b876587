//! # Execution Engine Module / 执行引擎模块
//!
//! Walks a finished suite tree depth-first, running hooks and tests strictly
//! one at a time. Results are accumulated in production order and every step is
//! reported through [`RunEvent`]s.
//!
//! 深度优先遍历已构建的套件树，严格逐个运行钩子和测试。
//! 结果按产生顺序累积，每一步都通过 [`RunEvent`] 报告。
//!
//! ## Visit order / 访问顺序
//!
//! For every suite: mark entered, run pending `beforeAll` hooks, run own tests,
//! visit children, then run own `afterAll` hooks. A failed `beforeAll` skips
//! the tests, the children and the `afterAll` of that suite.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::core::error::{normalize, Thrown};
use crate::core::hooks::{collect, invoke, run_sequence};
use crate::core::models::{
    Action, HookPhase, RunEvent, SuiteId, TestCase, TestResult, AFTER_ALL_HOOK, BEFORE_ALL_HOOK,
};
use crate::core::registry::Registry;

/// Predicate over `(suite path, test name)`; tests it rejects are skipped.
pub type TestFilter = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

/// Receives every [`RunEvent`] as it happens.
pub type EventSink = Box<dyn FnMut(&RunEvent) + Send>;

/// Exact-match restriction on suite path and/or test name.
/// 对套件路径和/或测试名称的精确匹配限制。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Only {
    #[serde(default)]
    pub suite: Option<String>,
    #[serde(default)]
    pub test: Option<String>,
}

impl Only {
    pub fn matches(&self, suite: &str, test: &str) -> bool {
        self.suite.as_deref().is_none_or(|s| s == suite) && self.test.as_deref().is_none_or(|t| t == test)
    }
}

/// Options recognized by [`Registry::run`].
/// [`Registry::run`] 可识别的选项。
#[derive(Default)]
pub struct RunOptions {
    /// Skip tests this predicate rejects / 跳过此谓词拒绝的测试
    pub filter: Option<TestFilter>,
    /// Exact-match restriction / 精确匹配限制
    pub only: Option<Only>,
    /// Stop starting new tests and suites after the first failure / 第一次失败后停止启动新的测试和套件
    pub bail: bool,
    /// Streamed notifications / 流式通知
    pub on_event: Option<EventSink>,
    /// Caller-side cancellation, checked at the same points as bail / 调用方取消，与 bail 在相同位置检查
    pub cancel: Option<CancellationToken>,
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("filter", &self.filter.is_some())
            .field("only", &self.only)
            .field("bail", &self.bail)
            .field("on_event", &self.on_event.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn only(mut self, only: Only) -> Self {
        self.only = Some(only);
        self
    }

    pub fn bail(mut self, bail: bool) -> Self {
        self.bail = bail;
        self
    }

    pub fn on_event<F>(mut self, sink: F) -> Self
    where
        F: FnMut(&RunEvent) + Send + 'static,
    {
        self.on_event = Some(Box::new(sink));
        self
    }

    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn selects(&self, suite: &str, test: &str) -> bool {
        self.only.as_ref().is_none_or(|only| only.matches(suite, test))
            && self.filter.as_ref().is_none_or(|filter| filter(suite, test))
    }
}

/// Run-time flags, indexed by node id. Rebuilt for every run.
/// 运行时标志，按节点 id 索引。每次运行都会重建。
#[derive(Debug, Clone)]
struct RunState {
    entered: Vec<bool>,
    ran_before_all: Vec<bool>,
    before_all_ok: Vec<bool>,
}

impl RunState {
    fn new(len: usize) -> Self {
        Self {
            entered: vec![false; len],
            ran_before_all: vec![false; len],
            before_all_ok: vec![false; len],
        }
    }
}

struct Execution<'a> {
    registry: &'a Registry,
    options: RunOptions,
    state: RunState,
    results: Vec<TestResult>,
    bail: CancellationToken,
}

impl<'a> Execution<'a> {
    fn new(registry: &'a Registry, options: RunOptions) -> Self {
        let bail = options
            .cancel
            .as_ref()
            .map(CancellationToken::child_token)
            .unwrap_or_default();
        Self {
            registry,
            options,
            state: RunState::new(registry.len()),
            results: Vec::new(),
            bail,
        }
    }

    fn bailed(&self) -> bool {
        self.bail.is_cancelled()
    }

    fn emit(&mut self, event: RunEvent) {
        if let Some(sink) = self.options.on_event.as_mut() {
            sink(&event);
        }
    }

    async fn run(mut self) -> Vec<TestResult> {
        let registry = self.registry;
        for &suite in &registry.root().children {
            if self.bailed() {
                break;
            }
            self.visit(suite).await;
        }
        let results = std::mem::take(&mut self.results);
        self.emit(RunEvent::Complete {
            results: results.clone(),
        });
        results
    }

    fn visit(&mut self, id: SuiteId) -> BoxFuture<'_, ()> {
        async move {
            let registry = self.registry;
            let node = registry.node(id);
            let path = registry.suite_path(id);

            self.state.entered[id.index()] = true;
            let before_all_ok = self.run_before_all(id, &path).await;

            if before_all_ok && !self.bailed() {
                for test in &node.tests {
                    if self.bailed() {
                        break;
                    }
                    if !self.options.selects(&path, &test.name) {
                        self.results.push(TestResult::skipped(path.clone(), test.name.clone()));
                        continue;
                    }
                    let passed = self.run_test(id, &path, test).await;
                    if !passed && self.options.bail {
                        self.bail.cancel();
                        break;
                    }
                }
            }

            if before_all_ok && !self.bailed() {
                for &child in &node.children {
                    if self.bailed() {
                        break;
                    }
                    self.visit(child).await;
                }
            }

            if self.state.entered[id.index()] && before_all_ok {
                let started = Instant::now();
                if let Err(thrown) = run_sequence(&node.hooks.after_all).await {
                    self.hook_failed(&path, AFTER_ALL_HOOK, started.elapsed(), thrown);
                }
            }
        }
        .boxed()
    }

    /// Runs the not-yet-run part of the ancestor chain's `beforeAll` hooks, outer to inner.
    async fn run_before_all(&mut self, id: SuiteId, path: &str) -> bool {
        if self.state.ran_before_all[id.index()] {
            return self.state.before_all_ok[id.index()];
        }
        let registry = self.registry;
        let pending: Vec<SuiteId> = registry
            .ancestry(id)
            .into_iter()
            .filter(|ancestor| !self.state.ran_before_all[ancestor.index()])
            .collect();
        for ancestor in &pending {
            self.state.ran_before_all[ancestor.index()] = true;
        }
        let hooks: Vec<Action> = pending
            .iter()
            .flat_map(|ancestor| registry.node(*ancestor).hooks.before_all.iter().cloned())
            .collect();

        let started = Instant::now();
        match run_sequence(&hooks).await {
            Ok(()) => {
                for ancestor in &pending {
                    self.state.before_all_ok[ancestor.index()] = true;
                }
                true
            }
            Err(thrown) => {
                self.hook_failed(path, BEFORE_ALL_HOOK, started.elapsed(), thrown);
                false
            }
        }
    }

    /// Runs one test with its `beforeEach`/`afterEach` chains. Returns `true` when it passed.
    async fn run_test(&mut self, id: SuiteId, path: &str, test: &TestCase) -> bool {
        self.emit(RunEvent::Start {
            suite: path.to_string(),
            test: test.name.clone(),
        });

        let started = Instant::now();
        let before_each = collect(self.registry, id, HookPhase::BeforeEach);
        let mut outcome = run_sequence(&before_each).await;
        if outcome.is_ok() {
            outcome = invoke(&test.body).await;
        }
        let duration = started.elapsed();

        let after_each = collect(self.registry, id, HookPhase::AfterEach);
        let cleanup = run_sequence(&after_each).await;

        let failure = match (outcome, cleanup) {
            (Err(thrown), _) | (Ok(()), Err(thrown)) => Some(thrown),
            (Ok(()), Ok(())) => None,
        };

        match failure {
            None => {
                self.emit(RunEvent::Pass {
                    suite: path.to_string(),
                    test: test.name.clone(),
                    duration,
                });
                self.results.push(TestResult::passed(path, test.name.clone(), duration));
                true
            }
            Some(thrown) => {
                let error = normalize(thrown);
                self.emit(RunEvent::Fail {
                    suite: path.to_string(),
                    test: test.name.clone(),
                    duration,
                    error: error.clone(),
                });
                self.results.push(TestResult::failed(path, test.name.clone(), duration, error));
                false
            }
        }
    }

    fn hook_failed(&mut self, path: &str, name: &str, duration: Duration, thrown: Thrown) {
        let error = normalize(thrown);
        self.emit(RunEvent::Fail {
            suite: path.to_string(),
            test: name.to_string(),
            duration,
            error: error.clone(),
        });
        self.results.push(TestResult::failed(path, name, duration, error));
        if self.options.bail {
            self.bail.cancel();
        }
    }
}

impl Registry {
    /// Runs every registered suite and returns the results in production order.
    ///
    /// 运行所有已注册的套件，并按产生顺序返回结果。
    pub async fn run(&self, options: RunOptions) -> Vec<TestResult> {
        Execution::new(self, options).run().await
    }

    /// Runs on a tokio task, streaming events as they are produced.
    ///
    /// The stream ends after the `Complete` event. The join handle hands the
    /// registry back together with the results so it can be run again.
    ///
    /// 在 tokio 任务上运行，并在事件产生时流式输出。
    pub fn spawn_run(
        self,
        mut options: RunOptions,
    ) -> (
        UnboundedReceiverStream<RunEvent>,
        JoinHandle<(Registry, Vec<TestResult>)>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut downstream = options.on_event.take();
        options.on_event = Some(Box::new(move |event: &RunEvent| {
            if let Some(sink) = downstream.as_mut() {
                sink(event);
            }
            // The receiver may already be gone; the run still completes.
            let _ = tx.send(event.clone());
        }));

        let handle = tokio::spawn(async move {
            let results = self.run(options).await;
            (self, results)
        });
        (UnboundedReceiverStream::new(rx), handle)
    }
}
