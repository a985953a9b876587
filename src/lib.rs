//! # Suitekit Library / Suitekit 库
//!
//! A test-authoring DSL with nested suites and lifecycle hooks, plus the engine
//! that runs them one action at a time, in a well-defined order.
//!
//! 一个支持嵌套套件和生命周期钩子的测试编写 DSL，以及按明确顺序逐个运行它们的引擎。
//!
//! ## Modules / 模块
//!
//! - `core` - Suite registry, hook collector, execution engine and error normalizer
//! - `infra` - Infrastructure services like panic capture and i18n
//! - `reporting` - Console, HTML and JSON reporting
//! - `cli` - Command-line glue for harness binaries and the `suitekit` tool
//!
//! - `core` - 套件注册表、钩子收集器、执行引擎和错误规范化器
//! - `infra` - 基础设施服务，如 panic 捕获和国际化
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 测试二进制和 `suitekit` 工具的命令行胶水代码
//!
//! ## Example / 示例
//!
//! ```
//! use suitekit::{Registry, RunOptions, TestStatus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let mut registry = Registry::new();
//! registry.describe("math", |r| {
//!     r.it("adds", || async {
//!         assert_eq!(1 + 1, 2);
//!         Ok(())
//!     })
//! })?;
//!
//! let results = registry.run(RunOptions::new()).await;
//! assert_eq!(results[0].status, TestStatus::Passed);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::error::RegistrationError;
pub use core::matcher::{expect_error, Matcher};
pub use core::models::{action, Action, HookPhase, RunEvent, StructuredError, TestInfo, TestResult, TestStatus};
pub use core::registry::Registry;
pub use core::runner::{Only, RunOptions};

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for console and report output. It attempts to match the full
/// locale (e.g., "zh-CN"), then just the language code (e.g., "en"), and
/// finally falls back to the default language ("en").
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    rust_i18n::set_locale(resolve_locale(&locale));
}

/// Maps a requested locale onto one the crate ships translations for.
/// 将请求的语言区域映射到本 crate 提供翻译的语言区域。
pub fn resolve_locale(requested: &str) -> &'static str {
    let available = rust_i18n::available_locales!();
    if let Some(found) = available.iter().copied().find(|l| *l == requested) {
        return found;
    }
    requested
        .split('-')
        .next()
        .and_then(|lang| available.iter().copied().find(|l| *l == lang))
        .unwrap_or("en")
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
