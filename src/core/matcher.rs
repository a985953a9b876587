//! # Error Matcher Module / 错误匹配模块
//!
//! A small "expect this to fail" helper for test bodies. The kind of check is
//! chosen by the [`Matcher`] variant rather than by inspecting the value at run time.
//!
//! 测试主体中用于“期望失败”的小工具。检查类型由 [`Matcher`] 变体决定，
//! 而不是在运行时检查值的形状。

use anyhow::{anyhow, Result};
use regex::Regex;
use std::fmt;

/// What an expected error has to look like.
/// 期望错误应具有的形态。
pub enum Matcher {
    /// The rendered error chain contains this text.
    Substring(String),
    /// The rendered error chain matches this pattern.
    Pattern(Regex),
    /// Some error in the chain is of the named concrete type.
    InstanceShape {
        type_name: &'static str,
        check: fn(&anyhow::Error) -> bool,
    },
    /// Arbitrary check.
    Predicate(Box<dyn Fn(&anyhow::Error) -> bool + Send + Sync>),
}

impl Matcher {
    pub fn substring(text: impl Into<String>) -> Self {
        Matcher::Substring(text.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Matcher::Pattern(Regex::new(pattern)?))
    }

    /// Matches when any error in the chain downcasts to `E`.
    pub fn instance_of<E>() -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Matcher::InstanceShape {
            type_name: std::any::type_name::<E>(),
            check: |err| err.chain().any(|cause| cause.is::<E>()),
        }
    }

    pub fn predicate<F>(check: F) -> Self
    where
        F: Fn(&anyhow::Error) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate(Box::new(check))
    }

    pub fn matches(&self, err: &anyhow::Error) -> bool {
        match self {
            Matcher::Substring(text) => format!("{err:#}").contains(text.as_str()),
            Matcher::Pattern(re) => re.is_match(&format!("{err:#}")),
            Matcher::InstanceShape { check, .. } => check(err),
            Matcher::Predicate(check) => check(err),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Substring(text) => write!(f, "an error containing {text:?}"),
            Matcher::Pattern(re) => write!(f, "an error matching /{}/", re.as_str()),
            Matcher::InstanceShape { type_name, .. } => write!(f, "an error of type {type_name}"),
            Matcher::Predicate(_) => f.write_str("an error satisfying the predicate"),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matcher({self})")
    }
}

/// Succeeds only when `result` is an error accepted by `matcher`.
///
/// ```
/// use suitekit::core::matcher::{expect_error, Matcher};
///
/// let parsed: anyhow::Result<u32> = "x".parse::<u32>().map_err(Into::into);
/// expect_error(parsed, &Matcher::instance_of::<std::num::ParseIntError>()).unwrap();
/// ```
pub fn expect_error<T>(result: Result<T>, matcher: &Matcher) -> Result<()> {
    match result {
        Ok(_) => Err(anyhow!("expected {matcher}, but the operation succeeded")),
        Err(err) if matcher.matches(&err) => Ok(()),
        Err(err) => Err(anyhow!("expected {matcher}, got: {err:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn substring_and_pattern() {
        let err = anyhow!("connection refused").context("fetching config");
        assert!(Matcher::substring("refused").matches(&err));
        assert!(Matcher::pattern(r"^fetching .+: connection").unwrap().matches(&err));
        assert!(!Matcher::substring("timeout").matches(&err));
    }

    #[test]
    fn instance_shape_walks_the_chain() {
        let err = anyhow::Error::new(io::Error::other("gone")).context("reading");
        assert!(Matcher::instance_of::<io::Error>().matches(&err));
        assert!(!Matcher::instance_of::<std::fmt::Error>().matches(&err));
    }

    #[test]
    fn expect_error_reports_success_as_failure() {
        let err = expect_error(Ok::<_, anyhow::Error>(1), &Matcher::substring("x")).unwrap_err();
        assert_eq!(err.to_string(), "expected an error containing \"x\", but the operation succeeded");

        let pred = Matcher::predicate(|e| e.to_string().len() > 3);
        assert!(expect_error::<()>(Err(anyhow!("long enough")), &pred).is_ok());
        assert!(expect_error::<()>(Err(anyhow!("no")), &pred).is_err());
    }
}
