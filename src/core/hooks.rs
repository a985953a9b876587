//! # Hook Collector Module / 钩子收集模块
//!
//! Computes which lifecycle callbacks apply to a scope for a given phase and
//! runs action sequences strictly one after another.
//!
//! 计算给定阶段下适用于某作用域的生命周期回调，并严格逐个运行动作序列。

use futures::future::poll_fn;
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};

use crate::core::error::Thrown;
use crate::core::models::{Action, HookPhase, SuiteId};
use crate::core::registry::Registry;
use crate::infra::panic::{take_site, CaptureGuard};

/// Collects the hooks of `phase` along the ancestor chain of `scope`.
///
/// Setup phases come outermost-first, teardown phases innermost-first; a
/// scope's own hooks always keep their registration order.
///
/// 沿 `scope` 的祖先链收集 `phase` 阶段的钩子。
/// 准备阶段由外向内，清理阶段由内向外；同一作用域内保持注册顺序。
pub fn collect(registry: &Registry, scope: SuiteId, phase: HookPhase) -> Vec<Action> {
    let mut chain = registry.ancestry(scope);
    if !phase.is_setup() {
        chain.reverse();
    }
    chain
        .into_iter()
        .flat_map(|id| registry.node(id).hooks.get(phase).iter().cloned())
        .collect()
}

/// Runs a single action to completion, converting errors and panics into [`Thrown`].
pub async fn invoke(action: &Action) -> Result<(), Thrown> {
    let started = {
        let _guard = CaptureGuard::new();
        panic::catch_unwind(AssertUnwindSafe(|| action()))
    };
    let future = match started {
        Ok(future) => future,
        Err(payload) => {
            return Err(Thrown::Panic {
                payload,
                site: take_site(),
            });
        }
    };

    // The guard is re-armed on every poll since the task may hop threads between polls.
    let mut guarded = AssertUnwindSafe(future).catch_unwind();
    let outcome = poll_fn(move |cx| {
        let _guard = CaptureGuard::new();
        guarded.poll_unpin(cx)
    })
    .await;

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Thrown::Error(err)),
        Err(payload) => Err(Thrown::Panic {
            payload,
            site: take_site(),
        }),
    }
}

/// Awaits each action in order, stopping at the first failure.
/// 按顺序等待每个动作，在第一个失败处停止。
pub async fn run_sequence(actions: &[Action]) -> Result<(), Thrown> {
    for action in actions {
        invoke(action).await?;
    }
    Ok(())
}
