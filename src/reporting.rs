//! # Reporting Module / 报告模块
//!
//! This module handles the display of run progress and the generation of test
//! reports: colored console output, HTML and JSON files, all localized.
//!
//! 此模块处理运行进度的显示和测试报告的生成：
//! 彩色控制台输出、HTML 和 JSON 文件，均支持国际化。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{event_printer, print_failure_details, print_summary};
pub use html::generate_html_report;
pub use json::write_json_report;
