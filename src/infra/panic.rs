//! # Panic Capture Module / Panic 捕获模块
//!
//! Records where a panic happened so a caught panic can be turned into a
//! located error record. A process-wide hook is installed once; it stores the
//! panic site in a thread-local slot and forwards to the previous hook unless
//! the current thread is running a hook or test body.
//!
//! 记录 panic 发生的位置，以便将捕获的 panic 转换为带位置的错误记录。
//! 进程级钩子只安装一次；它将 panic 位置存储在线程局部槽中，
//! 除非当前线程正在运行钩子或测试主体，否则转发给之前的钩子。

use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic;
use std::sync::Once;

/// Where a panic was raised, plus the rendered backtrace if one was captured.
/// panic 的发生位置，以及捕获到的回溯（如果有）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicSite {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub backtrace: Vec<String>,
}

thread_local! {
    static LAST_SITE: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
    static CAPTURING: Cell<usize> = const { Cell::new(0) };
}

static INSTALL: Once = Once::new();

/// Installs the recording hook. Safe to call any number of times.
pub fn install_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if let Some(location) = info.location() {
                let backtrace = Backtrace::capture();
                let lines = if backtrace.status() == BacktraceStatus::Captured {
                    backtrace.to_string().lines().map(str::to_string).collect()
                } else {
                    Vec::new()
                };
                let site = PanicSite {
                    file: location.file().to_string(),
                    line: location.line(),
                    column: location.column(),
                    backtrace: lines,
                };
                LAST_SITE.with(|slot| *slot.borrow_mut() = Some(site));
            }
            if CAPTURING.with(Cell::get) == 0 {
                previous(info);
            }
        }));
    });
}

/// Silences the default panic output on this thread while alive.
pub struct CaptureGuard {
    _private: (),
}

impl CaptureGuard {
    pub fn new() -> Self {
        install_hook();
        CAPTURING.with(|depth| depth.set(depth.get() + 1));
        LAST_SITE.with(|slot| slot.borrow_mut().take());
        Self { _private: () }
    }
}

impl Default for CaptureGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        CAPTURING.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Takes the most recent panic site recorded on this thread.
pub fn take_site() -> Option<PanicSite> {
    LAST_SITE.with(|slot| slot.borrow_mut().take())
}
