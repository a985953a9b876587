//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Suitekit: the suite
//! registry, the hook collector, the execution engine and the error normalizer,
//! together with the shared data models and run configuration.
//!
//! 此模块包含 Suitekit 的核心功能：套件注册表、钩子收集器、执行引擎和错误规范化器，
//! 以及共享数据模型和运行配置。

pub mod config;
pub mod error;
pub mod hooks;
pub mod matcher;
pub mod models;
pub mod registry;
pub mod runner;

// Re-exports
pub use models::{RunEvent, TestResult, TestStatus};
pub use registry::Registry;
pub use runner::{Only, RunOptions};
