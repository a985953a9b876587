//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders an HTML report with summary counters, a results table
//! and collapsible error details for every failure.
//!
//! 此模块生成 HTML 报告，包含摘要计数、结果表格以及每个失败的可折叠错误详情。

use anyhow::{Context, Result};
use maud::{html, Markup, DOCTYPE};
use std::fs;
use std::path::Path;

use crate::core::models::{TestResult, TestStatus};
use crate::infra::t;
use crate::reporting::console::count;

const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", sans-serif; margin: 2em; color: #222; }
.summary-container { display: flex; gap: 2em; margin-bottom: 1.5em; }
.summary-item { display: flex; flex-direction: column; align-items: center; }
.count { font-size: 2em; font-weight: bold; }
.passed-text { color: #2e7d32; } .failed-text { color: #c62828; } .skipped-text { color: #757575; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #ddd; padding: 6px 10px; text-align: left; }
.status-Passed { color: #2e7d32; } .status-Failed { color: #c62828; } .status-Skipped { color: #757575; }
.duration-cell { text-align: right; }
details pre { background: #f6f6f6; padding: 8px; overflow-x: auto; }
"#;

/// Renders the report markup without touching the file system.
/// 仅渲染报告标记，不访问文件系统。
pub fn render_html_report(results: &[TestResult], locale: &str) -> Markup {
    let (passed, failed, skipped) = count(results);
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", locale = locale)) }
                style { (maud::PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header", locale = locale)) }
                div class="summary-container" {
                    (summary_item(results.len(), "", &t!("html_report.summary.total", locale = locale)))
                    (summary_item(passed, "passed-text", &t!("html_report.summary.passed", locale = locale)))
                    (summary_item(failed, "failed-text", &t!("html_report.summary.failed", locale = locale)))
                    (summary_item(skipped, "skipped-text", &t!("html_report.summary.skipped", locale = locale)))
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.table.suite", locale = locale)) }
                            th { (t!("html_report.table.name", locale = locale)) }
                            th { (t!("html_report.table.status", locale = locale)) }
                            th class="duration-cell" { (t!("html_report.table.duration", locale = locale)) }
                        }
                    }
                    tbody {
                        @for result in results {
                            tr {
                                td { (result.suite) }
                                td {
                                    (result.test)
                                    @if let Some(error) = &result.error {
                                        details {
                                            summary { (t!("html_report.toggle_output", locale = locale)) }
                                            pre {
                                                (error.name) ": " (error.message) "\n"
                                                @if let Some(location) = error.location() {
                                                    (t!("summary.location", locale = locale, location = location)) "\n"
                                                }
                                                @for line in &error.stack {
                                                    (line) "\n"
                                                }
                                            }
                                        }
                                    }
                                }
                                td class=(result.get_status_class()) { (result.get_status_str(locale)) }
                                td class="duration-cell" {
                                    @if result.status == TestStatus::Skipped {
                                        "N/A"
                                    } @else {
                                        (format!("{:.2?}", result.duration))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn summary_item(value: usize, class: &str, label: &str) -> Markup {
    html! {
        div class="summary-item" {
            span class={ "count " (class) } { (value) }
            span class="label" { (label) }
        }
    }
}

/// Generates an HTML report from test results and writes it to `output_path`.
///
/// 从测试结果生成 HTML 报告并写入 `output_path`。
///
/// # Errors / 错误
/// Fails if the file cannot be written / 无法写入文件时失败
pub fn generate_html_report(results: &[TestResult], output_path: &Path, locale: &str) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }
    let markup = render_html_report(results, locale);
    fs::write(output_path, markup.into_string())
        .with_context(|| format!("Failed to write HTML report: {}", output_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::StructuredError;
    use std::time::Duration;

    #[test]
    fn failures_are_escaped_and_detailed() {
        let results = vec![
            TestResult::passed("A", "ok", Duration::from_millis(3)),
            TestResult::failed(
                "A",
                "bad",
                Duration::ZERO,
                StructuredError::message_only("Panic", "left <1> != right <2>"),
            ),
        ];
        let page = render_html_report(&results, "en").into_string();
        assert!(page.contains("status-Failed"));
        assert!(page.contains("left &lt;1&gt; != right &lt;2&gt;"));
        assert!(page.contains("<details>"));
    }

    #[test]
    fn error_location_is_localized() {
        let mut error = StructuredError::message_only("Panic", "boom");
        error.file = Some("tests/math_tests.rs".into());
        error.line = Some(7);
        error.column = Some(3);
        let results = vec![TestResult::failed("A", "bad", Duration::ZERO, error)];

        let en = render_html_report(&results, "en").into_string();
        assert!(en.contains("at tests/math_tests.rs:7:3"));
        let zh = render_html_report(&results, "zh-CN").into_string();
        assert!(zh.contains("位置 tests/math_tests.rs:7:3"));
    }
}
