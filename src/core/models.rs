//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures shared by the registry, the hook
//! collector and the execution engine: suite nodes, test cases, hook phases,
//! results, events and structured errors.
//!
//! 此模块定义了注册表、钩子收集器和执行引擎共享的核心数据结构：
//! 套件节点、测试用例、钩子阶段、结果、事件和结构化错误。

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::infra::t;

/// The future produced by every hook or test body.
/// 每个钩子或测试主体产生的 future。
pub type ActionFuture = BoxFuture<'static, anyhow::Result<()>>;

/// A zero-argument action that may suspend. Shared so a tree can be run more than once.
/// 一个可能挂起的零参数动作。使用共享指针，以便同一棵树可以多次运行。
pub type Action = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

/// Wraps an async closure into an [`Action`].
pub fn action<F, Fut>(f: F) -> Action
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Index of a suite node inside the registry arena.
/// 套件节点在注册表 arena 中的索引。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuiteId(pub(crate) usize);

impl SuiteId {
    /// The implicit root scope. It never carries tests or hooks.
    pub const ROOT: SuiteId = SuiteId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// The four lifecycle phases a hook can be bound to.
/// 钩子可以绑定的四个生命周期阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookPhase {
    BeforeAll,
    BeforeEach,
    AfterEach,
    AfterAll,
}

impl HookPhase {
    /// Setup phases are collected outermost-first, teardown phases innermost-first.
    /// 准备阶段由外向内收集，清理阶段由内向外收集。
    pub fn is_setup(self) -> bool {
        matches!(self, HookPhase::BeforeAll | HookPhase::BeforeEach)
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookPhase::BeforeAll => "beforeAll",
            HookPhase::BeforeEach => "beforeEach",
            HookPhase::AfterEach => "afterEach",
            HookPhase::AfterAll => "afterAll",
        };
        f.write_str(name)
    }
}

/// Hook lists of a single scope, each in registration order.
#[derive(Default, Clone)]
pub struct HookSet {
    pub before_all: Vec<Action>,
    pub before_each: Vec<Action>,
    pub after_each: Vec<Action>,
    pub after_all: Vec<Action>,
}

impl HookSet {
    pub fn get(&self, phase: HookPhase) -> &[Action] {
        match phase {
            HookPhase::BeforeAll => &self.before_all,
            HookPhase::BeforeEach => &self.before_each,
            HookPhase::AfterEach => &self.after_each,
            HookPhase::AfterAll => &self.after_all,
        }
    }

    pub fn push(&mut self, phase: HookPhase, action: Action) {
        match phase {
            HookPhase::BeforeAll => self.before_all.push(action),
            HookPhase::BeforeEach => self.before_each.push(action),
            HookPhase::AfterEach => self.after_each.push(action),
            HookPhase::AfterAll => self.after_all.push(action),
        }
    }

    pub fn len(&self) -> usize {
        self.before_all.len() + self.before_each.len() + self.after_each.len() + self.after_all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One `describe` scope of the suite tree.
/// 套件树中的一个 `describe` 作用域。
pub struct SuiteNode {
    /// Display name with `@tag` tokens stripped / 去除 `@tag` 标记后的显示名称
    pub name: String,
    /// Tags extracted from the declared name / 从声明名称中提取的标签
    pub tags: Vec<String>,
    /// Parent scope, `None` only for the root / 父作用域，仅根节点为 `None`
    pub parent: Option<SuiteId>,
    /// Child scopes in declaration order / 按声明顺序排列的子作用域
    pub children: Vec<SuiteId>,
    /// Tests in declaration order / 按声明顺序排列的测试
    pub tests: Vec<TestCase>,
    pub hooks: HookSet,
}

impl SuiteNode {
    pub(crate) fn new(name: String, tags: Vec<String>, parent: Option<SuiteId>) -> Self {
        Self {
            name,
            tags,
            parent,
            children: Vec::new(),
            tests: Vec::new(),
            hooks: HookSet::default(),
        }
    }
}

impl fmt::Debug for SuiteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteNode")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("tests", &self.tests)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// A single registered test.
/// 单个已注册的测试。
#[derive(Clone)]
pub struct TestCase {
    pub name: String,
    pub tags: Vec<String>,
    pub body: Action,
    /// The owning scope, fixed at registration / 所属作用域，注册时确定
    pub suite: SuiteId,
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("suite", &self.suite)
            .finish_non_exhaustive()
    }
}

/// A `{suite, test}` pair as returned by `Registry::list_tests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestInfo {
    pub suite: String,
    pub test: String,
}

impl TestInfo {
    pub fn new(suite: impl Into<String>, test: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
        }
    }
}

/// Final status of a test or hook pseudo-test.
/// 测试或钩子伪测试的最终状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// An error record extracted from a failed hook or test body.
/// 从失败的钩子或测试主体中提取的错误记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredError {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default)]
    pub stack: Vec<String>,
}

impl StructuredError {
    /// A record carrying only a message.
    pub fn message_only(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            file: None,
            line: None,
            column: None,
            stack: Vec::new(),
        }
    }

    /// `file:line:column` when a source location was recovered.
    pub fn location(&self) -> Option<String> {
        match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(column)) => Some(format!("{file}:{line}:{column}")),
            (Some(file), Some(line), None) => Some(format!("{file}:{line}")),
            _ => None,
        }
    }
}

impl fmt::Display for StructuredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)?;
        if let Some(location) = self.location() {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}

impl std::error::Error for StructuredError {}

/// The recorded outcome of one test, or of a failed `beforeAll`/`afterAll` sequence.
///
/// 一个测试（或失败的 `beforeAll`/`afterAll` 序列）的记录结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Suite path joined with `" > "`, root excluded / 用 `" > "` 连接的套件路径，不含根节点
    pub suite: String,
    pub test: String,
    pub status: TestStatus,
    pub duration: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StructuredError>,
}

impl TestResult {
    pub fn passed(suite: impl Into<String>, test: impl Into<String>, duration: Duration) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
            status: TestStatus::Passed,
            duration,
            error: None,
        }
    }

    pub fn failed(
        suite: impl Into<String>,
        test: impl Into<String>,
        duration: Duration,
        error: StructuredError,
    ) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
            status: TestStatus::Failed,
            duration,
            error: Some(error),
        }
    }

    pub fn skipped(suite: impl Into<String>, test: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
            status: TestStatus::Skipped,
            duration: Duration::ZERO,
            error: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == TestStatus::Failed
    }

    /// True for the synthetic `(beforeAll hook)` / `(afterAll hook)` records.
    pub fn is_hook_failure(&self) -> bool {
        self.test == BEFORE_ALL_HOOK || self.test == AFTER_ALL_HOOK
    }

    /// `suite > test`, or just the test name for suites without a path.
    pub fn full_name(&self) -> String {
        if self.suite.is_empty() {
            self.test.clone()
        } else {
            format!("{} > {}", self.suite, self.test)
        }
    }

    /// Gets the CSS class used by the HTML report.
    pub fn get_status_class(&self) -> &'static str {
        match self.status {
            TestStatus::Passed => "status-Passed",
            TestStatus::Failed => "status-Failed",
            TestStatus::Skipped => "status-Skipped",
        }
    }

    /// Gets the localized status label.
    /// 获取本地化的状态标签。
    pub fn get_status_str(&self, locale: &str) -> String {
        match self.status {
            TestStatus::Passed => t!("report.status_passed", locale = locale).to_string(),
            TestStatus::Failed => t!("report.status_failed", locale = locale).to_string(),
            TestStatus::Skipped => t!("report.status_skipped", locale = locale).to_string(),
        }
    }
}

/// Test name used for a failed `beforeAll` sequence.
pub const BEFORE_ALL_HOOK: &str = "(beforeAll hook)";
/// Test name used for a failed `afterAll` sequence.
pub const AFTER_ALL_HOOK: &str = "(afterAll hook)";

/// A lifecycle notification streamed while a run progresses.
/// 运行过程中流式发送的生命周期通知。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RunEvent {
    Start {
        suite: String,
        test: String,
    },
    Pass {
        suite: String,
        test: String,
        duration: Duration,
    },
    Fail {
        suite: String,
        test: String,
        duration: Duration,
        error: StructuredError,
    },
    Complete {
        results: Vec<TestResult>,
    },
}

impl RunEvent {
    pub fn is_complete(&self) -> bool {
        matches!(self, RunEvent::Complete { .. })
    }
}
