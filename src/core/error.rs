//! # Error Normalizer Module / 错误规范化模块
//!
//! Turns whatever a hook or test body failed with into a [`StructuredError`]:
//! a returned `anyhow::Error` or a caught panic payload. Stack lines are scanned
//! for `file.rs:line:column` frames and the frame most likely to come from test
//! code supplies the reported location.
//!
//! 将钩子或测试主体的失败（返回的 `anyhow::Error` 或捕获的 panic 负载）
//! 转换为 [`StructuredError`]。扫描堆栈行中的 `file.rs:line:column` 帧，
//! 最可能来自测试代码的帧提供报告的位置。

use once_cell::sync::Lazy;
use regex::Regex;
use std::any::Any;
use std::backtrace::BacktraceStatus;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

use crate::core::models::StructuredError;
use crate::infra::panic::PanicSite;

/// Misuse of the registration API. Raised to the registering caller, never recorded as a result.
/// 注册 API 的误用。直接返回给注册调用方，从不作为结果记录。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("test \"{name}\" must be declared inside a describe block")]
    TestOutsideSuite { name: String },
    #[error("{phase} hook must be declared inside a describe block")]
    HookOutsideSuite { phase: String },
}

/// A failure raised by a hook or test body.
/// 钩子或测试主体引发的失败。
pub enum Thrown {
    /// The action resolved to `Err`.
    Error(anyhow::Error),
    /// The action panicked, either while building its future or while it was polled.
    Panic {
        payload: Box<dyn Any + Send>,
        site: Option<PanicSite>,
    },
}

impl std::fmt::Debug for Thrown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Thrown::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Thrown::Panic { site, .. } => f.debug_struct("Panic").field("site", site).finish_non_exhaustive(),
        }
    }
}

impl From<anyhow::Error> for Thrown {
    fn from(err: anyhow::Error) -> Self {
        Thrown::Error(err)
    }
}

static FRAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<file>(?:[A-Za-z]:)?[^\s:]+\.rs):(?P<line>\d+):(?P<column>\d+)")
        .expect("frame pattern is valid")
});

/// A `file:line:column` triple recovered from a stack line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Normalizes a thrown value. Never panics; internal failures degrade to a minimal record.
/// 规范化抛出的值。从不 panic；内部失败会降级为最小记录。
pub fn normalize(thrown: Thrown) -> StructuredError {
    match panic::catch_unwind(AssertUnwindSafe(|| normalize_inner(thrown))) {
        Ok(err) => err,
        Err(payload) => StructuredError::message_only(
            "Error",
            format!("Unknown error ({})", payload_message(payload.as_ref()).unwrap_or("normalization failed")),
        ),
    }
}

fn normalize_inner(thrown: Thrown) -> StructuredError {
    match thrown {
        Thrown::Error(err) => {
            let message = format!("{err:#}");
            let backtrace = err.backtrace();
            let stack: Vec<String> = if backtrace.status() == BacktraceStatus::Captured {
                backtrace.to_string().lines().map(str::to_string).collect()
            } else {
                Vec::new()
            };
            locate(StructuredError {
                name: "Error".to_string(),
                message,
                file: None,
                line: None,
                column: None,
                stack,
            })
        }
        Thrown::Panic { payload, site } => {
            let message = match payload_message(payload.as_ref()) {
                Some(msg) => msg.to_string(),
                None => "Unknown error (non-string panic payload)".to_string(),
            };
            let mut stack = Vec::new();
            if let Some(site) = site {
                stack.push(format!("panicked at {}:{}:{}", site.file, site.line, site.column));
                stack.extend(site.backtrace);
            }
            locate(StructuredError {
                name: "Panic".to_string(),
                message,
                file: None,
                line: None,
                column: None,
                stack,
            })
        }
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return Some(*msg);
    }
    payload.downcast_ref::<String>().map(String::as_str)
}

fn locate(mut err: StructuredError) -> StructuredError {
    let mut frames = parse_frames(&err.stack);
    frames.sort_by_key(|frame| frame_rank(&frame.file));
    if let Some(frame) = frames.into_iter().next() {
        err.file = Some(frame.file);
        err.line = Some(frame.line);
        err.column = Some(frame.column);
    }
    err
}

/// Extracts every recognizable frame, in stack order.
pub fn parse_frames(stack: &[String]) -> Vec<Frame> {
    stack
        .iter()
        .filter_map(|line| {
            let caps = FRAME_RE.captures(line)?;
            Some(Frame {
                file: caps["file"].to_string(),
                line: caps["line"].parse().ok()?,
                column: caps["column"].parse().ok()?,
            })
        })
        .collect()
}

/// 0 for test sources, 1 for other user code, 2 for toolchain and dependency internals.
fn frame_rank(file: &str) -> u8 {
    let path = file.replace('\\', "/");
    if path.contains("/rustc/")
        || path.contains(".cargo/registry")
        || path.contains("/library/std/")
        || path.contains("/library/core/")
        || path.contains("/library/alloc/")
    {
        return 2;
    }
    let file_name = path.rsplit('/').next().unwrap_or(&path);
    if path.starts_with("tests/")
        || path.contains("/tests/")
        || file_name.ends_with("_test.rs")
        || file_name.ends_with("_tests.rs")
        || file_name == "tests.rs"
    {
        0
    } else {
        1
    }
}
