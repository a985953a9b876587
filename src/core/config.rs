//! # Configuration Module / 配置模块
//!
//! Loads the `Suitekit.toml` run configuration and maps it onto [`RunOptions`].
//!
//! 加载 `Suitekit.toml` 运行配置，并将其映射为 [`RunOptions`]。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::runner::{Only, RunOptions};
use crate::infra::t;

/// Default configuration file name looked up by the harness glue.
pub const DEFAULT_CONFIG_FILE: &str = "Suitekit.toml";

/// Where to write reports after a run.
/// 运行后报告的写入位置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub html: Option<PathBuf>,
    #[serde(default)]
    pub json: Option<PathBuf>,
}

/// Run configuration, loaded from a TOML file.
/// 从 TOML 文件加载的运行配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// The language for console and report messages (e.g., "en", "zh-CN").
    /// Defaults to "en" if not specified.
    ///
    /// 控制台和报告消息的语言（例如 "en", "zh-CN"）。如果未指定，则默认为 "en"。
    #[serde(default = "default_language")]
    pub language: String,

    /// Stop starting tests and suites after the first failure.
    /// 第一次失败后停止启动新的测试和套件。
    #[serde(default)]
    pub bail: bool,

    /// Case-insensitive substring matched against `"<suite> > <test>"`.
    /// 与 `"<suite> > <test>"` 匹配的不区分大小写的子串。
    #[serde(default)]
    pub grep: Option<String>,

    #[serde(default)]
    pub only: Option<Only>,

    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            bail: false,
            grep: None,
            only: None,
            report: ReportConfig::default(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

/// Reads and parses a run configuration file.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
    let config: RunConfig = toml::from_str(&content)
        .with_context(|| t!("config.parse_failed", path = path.display()).to_string())?;
    Ok(config)
}

/// Loads `path` when given, otherwise `Suitekit.toml` if present, otherwise defaults.
/// 若给定 `path` 则加载之，否则加载存在的 `Suitekit.toml`，否则使用默认值。
pub fn resolve_run_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(path) => load_run_config(path),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                load_run_config(fallback)
            } else {
                Ok(RunConfig::default())
            }
        }
    }
}

impl RunOptions {
    /// Builds run options from a configuration. Event sinks are left to the caller.
    pub fn from_config(config: &RunConfig) -> Self {
        let mut options = RunOptions::new().bail(config.bail);
        if let Some(only) = &config.only {
            options = options.only(only.clone());
        }
        if let Some(grep) = config.grep.as_deref().filter(|g| !g.is_empty()) {
            let needle = grep.to_lowercase();
            options = options.filter(move |suite, test| {
                format!("{suite} > {test}").to_lowercase().contains(&needle)
            });
        }
        options
    }
}
