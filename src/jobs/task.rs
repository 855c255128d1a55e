//! # Task abstraction and function-backed task implementation.
//!
//! This module defines the [`Task`] trait (async, cancelable) and a
//! convenient function-backed implementation [`TaskFn`]. The common handle
//! type is [`TaskRef`], an `Arc<dyn Task>` suitable for sharing across the
//! runtime.
//!
//! A task receives a [`CancellationToken`] that is tripped on scheduler
//! shutdown; tasks that check it exit promptly, tasks that ignore it run to
//! completion and shutdown waits for them.
//!
//! ## Bound arguments
//! The scheduler invokes every task with the same fixed shape. Call
//! arguments are captured by the closure (or carried in the implementing
//! struct) at registration time, which turns an arity mismatch into a
//! compile error instead of a runtime one.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a task (`Arc<dyn Task>`).
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit of work.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use cronvisor::{Task, TaskError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Task for Heartbeat {
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Executes one firing of the task until completion or cancellation.
    ///
    /// Implementations should check `ctx.is_cancelled()` at convenient points
    /// and exit quickly to honor graceful shutdown.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per firing, so concurrent
/// executions of the same job (under [`SingletonMode::None`]) never share
/// hidden mutable state; shared state must be an explicit `Arc` inside the
/// closure.
///
/// [`SingletonMode::None`]: crate::SingletonMode::None
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use cronvisor::{TaskFn, TaskRef, TaskError};
///
/// // "bound arguments" are plain captures:
/// let greeting = String::from("hello");
/// let t: TaskRef = TaskFn::arc(move |_ctx: CancellationToken| {
///     let greeting = greeting.clone();
///     async move {
///         println!("{greeting}");
///         Ok::<_, TaskError>(())
///     }
/// });
/// ```
pub struct TaskFn<F> {
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn task_fn_runs_captured_closure() {
        let t: TaskRef = TaskFn::arc(|_ctx: CancellationToken| async { Ok(()) });
        assert!(t.run(CancellationToken::new()).await.is_ok());
    }

    #[tokio::test]
    async fn task_fn_observes_cancellation() {
        let t: TaskRef = TaskFn::arc(|ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            Ok(())
        });
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(t.run(token).await, Err(TaskError::Canceled)));
    }
}
