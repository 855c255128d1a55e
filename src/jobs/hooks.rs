//! Per-job lifecycle hooks.
//!
//! Hooks are the per-job counterpart to bus subscribers: they run on the
//! firing's own execution context, synchronously relative to the task.
//!
//! - [`BeforeHook`] runs immediately prior to task invocation, in
//!   registration order. A failing before hook prevents task invocation for
//!   that firing and is reported as an execution error for that tick.
//! - [`AfterHook`] runs immediately after the firing completes (success or
//!   failure, including before-hook rejections), in registration order, and
//!   observes the outcome.
//!
//! Hooks must not block indefinitely: a hanging hook blocks that job's own
//! subsequent firings (under singleton modes) but never other jobs.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::TaskError;

/// Hook invoked before the task, able to veto the firing.
pub type BeforeHook = Arc<dyn Fn(Uuid, &str) -> Result<(), TaskError> + Send + Sync>;

/// Hook invoked after the firing with its outcome.
pub type AfterHook = Arc<dyn Fn(Uuid, &str, &Result<(), TaskError>) + Send + Sync>;

/// Ordered hook lists for one job. Immutable after admission.
#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) before: Vec<BeforeHook>,
    pub(crate) after: Vec<AfterHook>,
}
