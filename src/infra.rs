//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Suitekit,
//! such as panic-site capture and i18n support.
//!
//! 此模块为 Suitekit 提供基础设施服务，
//! 如 panic 位置捕获和国际化支持。

pub mod panic;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
