//! # Suite Registry Module / 套件注册模块
//!
//! Builds the suite tree as registration calls execute top-to-bottom. Nodes
//! live in an arena indexed by [`SuiteId`]; the "current scope" cursor is a
//! stack owned by the registry and pushed/popped around every `describe` body.
//!
//! 在注册调用自上而下执行时构建套件树。节点存放在以 [`SuiteId`] 索引的
//! arena 中；“当前作用域”游标是注册表拥有的栈，在每个 `describe` 主体前后压入/弹出。

use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use crate::core::error::RegistrationError;
use crate::core::models::{action, Action, HookPhase, SuiteId, SuiteNode, TestCase, TestInfo};

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)@([A-Za-z0-9_\-]+)").expect("tag pattern is valid"));

/// Splits `@tag` tokens out of a declared name.
/// 从声明的名称中拆分出 `@tag` 标记。
///
/// ```
/// let (name, tags) = suitekit::core::registry::extract_tags("parses @slow numbers @parser");
/// assert_eq!(name, "parses numbers");
/// assert_eq!(tags, vec!["slow", "parser"]);
/// ```
pub fn extract_tags(raw: &str) -> (String, Vec<String>) {
    let tags = TAG_RE
        .captures_iter(raw)
        .map(|caps| caps[1].to_string())
        .collect();
    let stripped = TAG_RE.replace_all(raw, "");
    let name = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    (name, tags)
}

/// The suite tree plus the registration cursor.
/// 套件树以及注册游标。
pub struct Registry {
    nodes: Vec<SuiteNode>,
    scope: Vec<SuiteId>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("nodes", &self.nodes)
            .field("scope", &self.scope)
            .finish()
    }
}

impl Registry {
    /// Creates a registry holding only the implicit root scope.
    pub fn new() -> Self {
        Self {
            nodes: vec![SuiteNode::new(String::new(), Vec::new(), None)],
            scope: vec![SuiteId::ROOT],
        }
    }

    /// The scope new registrations attach to.
    pub fn current_scope(&self) -> SuiteId {
        self.scope.last().copied().unwrap_or(SuiteId::ROOT)
    }

    /// Declares a nested suite and runs `body` with it as the current scope.
    ///
    /// The previous scope is restored after `body` returns, whether it returned
    /// an error or panicked; a panic is resumed once the cursor is restored.
    ///
    /// 声明一个嵌套套件，并以其为当前作用域运行 `body`。
    /// 无论 `body` 返回错误还是 panic，之后都会恢复先前的作用域。
    pub fn describe<F>(&mut self, name: &str, body: F) -> Result<SuiteId, RegistrationError>
    where
        F: FnOnce(&mut Registry) -> Result<(), RegistrationError>,
    {
        let parent = self.current_scope();
        let (name, tags) = extract_tags(name);
        let id = SuiteId(self.nodes.len());
        self.nodes.push(SuiteNode::new(name, tags, Some(parent)));
        self.nodes[parent.0].children.push(id);

        let depth = self.scope.len();
        self.scope.push(id);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(self)));
        self.scope.truncate(depth);

        match outcome {
            Ok(result) => result.map(|()| id),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Declares a test in the current scope.
    pub fn it<F, Fut>(&mut self, name: &str, body: F) -> Result<(), RegistrationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.add_test(name, action(body))
    }

    /// Declares a test from an already-built [`Action`].
    pub fn add_test(&mut self, name: &str, body: Action) -> Result<(), RegistrationError> {
        let suite = self.current_scope();
        let (name, tags) = extract_tags(name);
        if suite == SuiteId::ROOT {
            return Err(RegistrationError::TestOutsideSuite { name });
        }
        self.nodes[suite.0].tests.push(TestCase {
            name,
            tags,
            body,
            suite,
        });
        Ok(())
    }

    /// Appends a hook for `phase` to the current scope.
    pub fn hook(&mut self, phase: HookPhase, hook: Action) -> Result<(), RegistrationError> {
        let suite = self.current_scope();
        if suite == SuiteId::ROOT {
            return Err(RegistrationError::HookOutsideSuite {
                phase: phase.to_string(),
            });
        }
        self.nodes[suite.0].hooks.push(phase, hook);
        Ok(())
    }

    pub fn before_all<F, Fut>(&mut self, f: F) -> Result<(), RegistrationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hook(HookPhase::BeforeAll, action(f))
    }

    pub fn before_each<F, Fut>(&mut self, f: F) -> Result<(), RegistrationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hook(HookPhase::BeforeEach, action(f))
    }

    pub fn after_each<F, Fut>(&mut self, f: F) -> Result<(), RegistrationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hook(HookPhase::AfterEach, action(f))
    }

    pub fn after_all<F, Fut>(&mut self, f: F) -> Result<(), RegistrationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hook(HookPhase::AfterAll, action(f))
    }

    pub fn node(&self, id: SuiteId) -> &SuiteNode {
        &self.nodes[id.0]
    }

    pub fn root(&self) -> &SuiteNode {
        &self.nodes[SuiteId::ROOT.0]
    }

    /// Number of nodes in the arena, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Ancestor chain from the outermost declared suite down to `id`, root excluded.
    /// 从最外层已声明套件到 `id` 的祖先链，不含根节点。
    pub fn ancestry(&self, id: SuiteId) -> Vec<SuiteId> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == SuiteId::ROOT {
                break;
            }
            chain.push(current);
            cursor = self.nodes[current.0].parent;
        }
        chain.reverse();
        chain
    }

    /// Ancestor names joined with `" > "`, root excluded.
    pub fn suite_path(&self, id: SuiteId) -> String {
        self.ancestry(id)
            .into_iter()
            .map(|node| self.nodes[node.0].name.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }

    /// Enumerates every test in traversal order without running anything.
    /// 按遍历顺序枚举所有测试，不执行任何内容。
    pub fn list_tests(&self) -> Vec<TestInfo> {
        let mut out = Vec::new();
        self.collect_tests(SuiteId::ROOT, &mut out);
        out
    }

    fn collect_tests(&self, id: SuiteId, out: &mut Vec<TestInfo>) {
        let node = &self.nodes[id.0];
        if !node.tests.is_empty() {
            let path = self.suite_path(id);
            out.extend(node.tests.iter().map(|test| TestInfo::new(path.clone(), test.name.clone())));
        }
        for child in &node.children {
            self.collect_tests(*child, out);
        }
    }

    /// Drops every suite, test and hook, restoring the empty-root state.
    pub fn reset(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0] = SuiteNode::new(String::new(), Vec::new(), None);
        self.scope.clear();
        self.scope.push(SuiteId::ROOT);
    }
}
