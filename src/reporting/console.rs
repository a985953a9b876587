//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints run progress and summaries to the console.
//! It provides colorful, formatted output with internationalization support.
//!
//! 此模块在控制台打印运行进度和摘要。
//! 它提供支持国际化的彩色格式化输出。

use colored::*;

use crate::core::models::{RunEvent, TestInfo, TestResult, TestStatus};
use crate::infra::t;

fn display_name(suite: &str, test: &str) -> String {
    if suite.is_empty() {
        test.to_string()
    } else {
        format!("{suite} > {test}")
    }
}

/// Builds an event sink that prints one line per lifecycle event.
/// Meant to be plugged into `RunOptions::on_event`.
///
/// 构建一个为每个生命周期事件打印一行的事件接收器。
/// 用于 `RunOptions::on_event`。
pub fn event_printer(locale: &str) -> impl FnMut(&RunEvent) + Send + 'static {
    let locale = locale.to_string();
    move |event: &RunEvent| match event {
        RunEvent::Start { suite, test } => {
            println!(
                "{}",
                t!("run.start", locale = &locale, name = display_name(suite, test)).blue()
            );
        }
        RunEvent::Pass { suite, test, duration } => {
            println!(
                "{}",
                t!(
                    "run.pass",
                    locale = &locale,
                    name = display_name(suite, test),
                    duration = format!("{:.2?}", duration)
                )
                .green()
            );
        }
        RunEvent::Fail { suite, test, duration, error } => {
            println!(
                "{}",
                t!(
                    "run.fail",
                    locale = &locale,
                    name = display_name(suite, test),
                    duration = format!("{:.2?}", duration)
                )
                .red()
            );
            println!("  {}", error.message.red());
        }
        RunEvent::Complete { results } => {
            let (passed, failed, skipped) = count(results);
            println!(
                "{}",
                t!(
                    "run.complete",
                    locale = &locale,
                    passed = passed,
                    failed = failed,
                    skipped = skipped
                )
                .bold()
            );
        }
    }
}

/// Counts passed, failed and skipped results.
pub fn count(results: &[TestResult]) -> (usize, usize, usize) {
    results.iter().fold((0, 0, 0), |(p, f, s), r| match r.status {
        TestStatus::Passed => (p + 1, f, s),
        TestStatus::Failed => (p, f + 1, s),
        TestStatus::Skipped => (p, f, s + 1),
    })
}

/// Prints a formatted summary of test results to the console.
/// Displays a table with test status, name and duration,
/// using color coding to highlight different statuses.
///
/// 在控制台打印格式化的测试结果摘要。
/// 显示一个包含测试状态、名称和持续时间的表格，使用颜色编码突出显示不同的状态。
///
/// # Output Format / 输出格式
/// ```text
/// --- Test Summary ---
///   - Passed     | math > adds                              |    1.23ms
///   - Failed     | math > divides                           |    0.45ms
///   - Skipped    | math > slow                              |       N/A
/// ```
pub fn print_summary(results: &[TestResult], locale: &str) {
    println!("\n{}", t!("summary.banner", locale = locale).bold());

    for result in results {
        let status_str = result.get_status_str(locale);
        let duration_str = match result.status {
            TestStatus::Skipped => "N/A".to_string(),
            _ => format!("{:.2?}", result.duration),
        };

        let status_colored = match result.status {
            TestStatus::Passed => status_str.green(),
            TestStatus::Failed => status_str.red(),
            TestStatus::Skipped => status_str.dimmed(),
        };

        println!(
            "  - {:<10} | {:<40} | {:>10}",
            status_colored,
            result.full_name(),
            duration_str
        );
    }
}

/// Prints detailed information about failed tests and hooks.
/// Shows the error message, its best-guess source location and the stack.
///
/// 打印失败的测试和钩子的详细信息。
/// 显示错误消息、最可能的源位置以及堆栈。
pub fn print_failure_details(results: &[TestResult], locale: &str) {
    let failures: Vec<&TestResult> = results.iter().filter(|r| r.is_failure()).collect();
    if failures.is_empty() {
        return;
    }

    println!("\n{}", t!("summary.failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in failures.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            failures.len(),
            t!("summary.failure_header", locale = locale).red(),
            result.full_name().cyan()
        );

        if let Some(error) = &result.error {
            println!("\n{}: {}", error.name.yellow(), error.message);
            if let Some(location) = error.location() {
                println!("  {}", t!("summary.location", locale = locale, location = location));
            }
            for line in &error.stack {
                println!("{}", line.dimmed());
            }
        }
        println!("\n{}", "-".repeat(80));
    }
}

/// Prints the enumerated tests, one per line.
pub fn print_test_list(tests: &[TestInfo], locale: &str) {
    println!("{}", t!("list.header", locale = locale, count = tests.len()).bold());
    for info in tests {
        println!("  {}", display_name(&info.suite, &info.test));
    }
}
