//! # Single-firing execution.
//!
//! [`run_firing`] executes one due firing of one job: before hooks in
//! registration order, then the task body, then after hooks with the
//! outcome. It is spawned by the dispatch loop and reports back through the
//! loop's `JoinSet` by returning the job id.
//!
//! ## Rules
//! - **Panic isolation**: panics in the task body or in any hook are caught
//!   and recorded as an execution failure for this run only; they never
//!   unwind into the dispatch loop.
//! - **Hook veto**: the first failing before hook prevents task invocation;
//!   after hooks still observe the error.
//! - **Graceful cancellation**: a task returning [`TaskError::Canceled`] is
//!   reported as a completed run, not a failed one.
//! - **Outcome events**: exactly one of `JobCompleted` / `JobFailed` is
//!   published per firing.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{Hooks, TaskRef};

/// Everything one firing needs, captured before the job table lock is
/// released.
pub(crate) struct Firing {
    pub(crate) id: Uuid,
    pub(crate) label: Arc<str>,
    /// 1-based run counter this firing will complete.
    pub(crate) run: u64,
    pub(crate) task: TaskRef,
    pub(crate) hooks: Arc<Hooks>,
    pub(crate) bus: Bus,
    pub(crate) ctx: CancellationToken,
}

/// Executes one firing to completion and returns the job id for run
/// accounting.
pub(crate) async fn run_firing(firing: Firing) -> Uuid {
    let Firing {
        id,
        label,
        run,
        task,
        hooks,
        bus,
        ctx,
    } = firing;

    let mut outcome: Result<(), TaskError> = Ok(());

    for hook in &hooks.before {
        match std::panic::catch_unwind(AssertUnwindSafe(|| hook(id, &label))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                outcome = Err(err);
                break;
            }
            Err(payload) => {
                outcome = Err(TaskError::Panicked {
                    info: panic_message(payload),
                });
                break;
            }
        }
    }

    if outcome.is_ok() {
        outcome = match AssertUnwindSafe(task.run(ctx)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(TaskError::Panicked {
                info: panic_message(payload),
            }),
        };
    }

    for hook in &hooks.after {
        let _ = std::panic::catch_unwind(AssertUnwindSafe(|| hook(id, &label, &outcome)));
    }

    let base = || Event::new(EventKind::JobCompleted).with_job(label.clone()).with_id(id).with_run(run);
    match &outcome {
        Ok(()) => bus.publish(base()),
        Err(err) if err.is_cancellation() => bus.publish(base()),
        Err(err) => bus.publish(
            Event::new(EventKind::JobFailed)
                .with_job(label.clone())
                .with_id(id)
                .with_run(run)
                .with_reason(err.to_string()),
        ),
    }

    id
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::TaskFn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn firing(task: TaskRef, hooks: Hooks, bus: &Bus) -> Firing {
        Firing {
            id: Uuid::new_v4(),
            label: Arc::from("t"),
            run: 1,
            task,
            hooks: Arc::new(hooks),
            bus: bus.clone(),
            ctx: CancellationToken::new(),
        }
    }

    async fn next_outcome(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Event {
        loop {
            let ev = rx.recv().await.expect("event");
            if matches!(ev.kind, EventKind::JobCompleted | EventKind::JobFailed) {
                return ev;
            }
        }
    }

    #[tokio::test]
    async fn success_publishes_completed() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let f = firing(
            TaskFn::arc(|_ctx: CancellationToken| async { Ok(()) }),
            Hooks::default(),
            &bus,
        );
        run_firing(f).await;
        let ev = next_outcome(&mut rx).await;
        assert_eq!(ev.kind, EventKind::JobCompleted);
        assert_eq!(ev.run, Some(1));
    }

    #[tokio::test]
    async fn failure_publishes_failed_with_reason() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let f = firing(
            TaskFn::arc(|_ctx: CancellationToken| async { Err(TaskError::fail("boom")) }),
            Hooks::default(),
            &bus,
        );
        run_firing(f).await;
        let ev = next_outcome(&mut rx).await;
        assert_eq!(ev.kind, EventKind::JobFailed);
        assert!(ev.reason.as_deref().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn panic_is_isolated_and_reported() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let f = firing(
            TaskFn::arc(|_ctx: CancellationToken| async { panic!("kaboom") }),
            Hooks::default(),
            &bus,
        );
        run_firing(f).await;
        let ev = next_outcome(&mut rx).await;
        assert_eq!(ev.kind, EventKind::JobFailed);
        assert!(ev.reason.as_deref().unwrap().contains("kaboom"));
    }

    #[tokio::test]
    async fn cancellation_counts_as_completed() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let f = firing(
            TaskFn::arc(|_ctx: CancellationToken| async { Err(TaskError::Canceled) }),
            Hooks::default(),
            &bus,
        );
        run_firing(f).await;
        let ev = next_outcome(&mut rx).await;
        assert_eq!(ev.kind, EventKind::JobCompleted);
    }

    #[tokio::test]
    async fn failing_before_hook_prevents_task_but_after_hooks_observe_error() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let ran = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut hooks = Hooks::default();
        hooks
            .before
            .push(Arc::new(|_, _| Err(TaskError::fail("vetoed"))));
        let seen2 = seen.clone();
        hooks.after.push(Arc::new(move |_, _, outcome| {
            seen2.lock().unwrap().push(outcome.is_err());
        }));

        let ran2 = ran.clone();
        let f = firing(
            TaskFn::arc(move |_ctx: CancellationToken| {
                let ran = ran2.clone();
                async move {
                    ran.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
            hooks,
            &bus,
        );
        run_firing(f).await;

        let ev = next_outcome(&mut rx).await;
        assert_eq!(ev.kind, EventKind::JobFailed);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(*seen.lock().unwrap(), vec![true]);
    }

    #[tokio::test]
    async fn hooks_run_in_registration_order() {
        let bus = Bus::new(16);
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut hooks = Hooks::default();
        for tag in ["before-1", "before-2"] {
            let order = order.clone();
            hooks.before.push(Arc::new(move |_, _| {
                order.lock().unwrap().push(tag);
                Ok(())
            }));
        }
        for tag in ["after-1", "after-2"] {
            let order = order.clone();
            hooks.after.push(Arc::new(move |_, _, _| {
                order.lock().unwrap().push(tag);
            }));
        }

        let order2 = order.clone();
        let f = firing(
            TaskFn::arc(move |_ctx: CancellationToken| {
                let order = order2.clone();
                async move {
                    order.lock().unwrap().push("task");
                    Ok(())
                }
            }),
            hooks,
            &bus,
        );
        run_firing(f).await;

        assert_eq!(
            *order.lock().unwrap(),
            vec!["before-1", "before-2", "task", "after-1", "after-2"]
        );
    }
}
