//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command of the `suitekit` tool,
//! which creates a default run configuration file.
//!
//! 此模块实现了 `suitekit` 工具的 `init` 命令，用于创建默认的运行配置文件。

use anyhow::{Context, Result};
use colored::*;
use std::{fs, path::Path};

use crate::infra::t;

pub const DEFAULT_CONFIG: &str = r#"# Suitekit run configuration / Suitekit 运行配置

# Language for console and report output / 控制台和报告输出的语言
language = "en"

# Stop starting new tests after the first failure / 第一次失败后停止启动新测试
bail = false

# Only run tests whose "suite > test" name contains this text
# 仅运行 "suite > test" 名称包含此文本的测试
# grep = "parser"

# Exact-match restriction / 精确匹配限制
# [only]
# suite = "Parser > numbers"
# test = "parses integers"

[report]
# html = "target/suitekit/report.html"
# json = "target/suitekit/report.json"
"#;

/// Writes the default configuration to `output`.
/// Returns `false` without touching anything when the file exists and `force` is not set.
///
/// 将默认配置写入 `output`。当文件已存在且未设置 `force` 时，不做任何修改并返回 `false`。
pub fn execute(output: &Path, force: bool, locale: &str) -> Result<bool> {
    if output.exists() && !force {
        println!(
            "{}",
            t!("init.file_exists", locale = locale, path = output.display()).red()
        );
        println!("{}", t!("init.use_force", locale = locale).yellow());
        return Ok(false);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                t!("init.create_parent_dir_failed", locale = locale, path = parent.display()).to_string()
            })?;
        }
    }

    fs::write(output, DEFAULT_CONFIG).with_context(|| {
        t!("init.write_failed", locale = locale, path = output.display()).to_string()
    })?;

    println!(
        "{}",
        t!("init.success", locale = locale, path = output.display()).green()
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{load_run_config, RunConfig};
    use tempfile::tempdir;

    #[test]
    fn default_config_parses_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("Suitekit.toml");
        assert!(execute(&path, false, "en").unwrap());
        assert_eq!(load_run_config(&path).unwrap(), RunConfig::default());
    }

    #[test]
    fn existing_file_is_kept_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Suitekit.toml");
        fs::write(&path, "bail = true\n").unwrap();

        assert!(!execute(&path, false, "en").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "bail = true\n");

        assert!(execute(&path, true, "en").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
