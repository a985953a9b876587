//! # JSON Reporting Module / JSON 报告模块
//!
//! Machine-readable report of a run: counts, a generation timestamp and every result.
//!
//! 运行的机器可读报告：计数、生成时间戳以及所有结果。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::models::TestResult;
use crate::reporting::console::count;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonReport {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<TestResult>,
}

impl JsonReport {
    pub fn new(results: &[TestResult]) -> Self {
        let (passed, failed, skipped) = count(results);
        Self {
            generated_at: Utc::now(),
            total: results.len(),
            passed,
            failed,
            skipped,
            results: results.to_vec(),
        }
    }
}

/// Writes a pretty-printed JSON report to `output_path`.
/// 将格式化的 JSON 报告写入 `output_path`。
pub fn write_json_report(results: &[TestResult], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(&JsonReport::new(results))?;
    fs::write(output_path, body)
        .with_context(|| format!("Failed to write JSON report: {}", output_path.display()))?;
    Ok(())
}
