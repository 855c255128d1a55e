//! # Dispatch loop.
//!
//! One loop per scheduler evaluates the job table, sleeps until the nearest
//! fire time, and reacts to three other wake sources: table changes
//! (`wake`), execution completions (the `JoinSet`), and shutdown (the
//! runtime cancellation token).
//!
//! ```text
//!        ┌────────────────────────────────────────────────┐
//!        │                 dispatch loop                  │
//!        │                                                │
//!  wake ─┼─▶ select! ──▶ fire_due ──▶ spawn run_firing ───┼──▶ JoinSet
//!        │      ▲                                         │      │
//!        │      └──────────── on_completion ◀─────────────┼──────┘
//!        └────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - **Single evaluator**: all job-table mutation happens here (and in the
//!   scheduler's admission path), which gives strict dispatch ordering per
//!   job without per-job locks.
//! - **Time base**: due-ness is decided against `Utc::now()` at evaluation
//!   time; the tokio sleep is only a wake-up hint.
//! - **Draining**: once the runtime token is cancelled no new firings are
//!   dispatched (including parked retries); the loop exits when the
//!   `JoinSet` is empty and then signals the `stopped` watch.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::core::executor::{self, Firing};
use crate::core::scheduler::SchedulerInner;
use crate::events::{Event, EventKind};
use crate::jobs::{Job, SingletonMode};

pub(crate) async fn run(inner: Arc<SchedulerInner>) {
    let mut inflight: JoinSet<Uuid> = JoinSet::new();
    let token = inner.runtime_token.clone();

    loop {
        let draining = token.is_cancelled();
        if draining && inflight.is_empty() {
            break;
        }

        let next_due = if draining {
            None
        } else {
            inner.table().next_due()
        };

        tokio::select! {
            _ = token.cancelled(), if !draining => {
                // re-evaluate with draining set
            }
            joined = inflight.join_next(), if !inflight.is_empty() => {
                // Err means the execution task itself was cancelled or
                // panicked outside run_firing's isolation; nothing to
                // account in that case.
                if let Some(Ok(id)) = joined {
                    on_completion(&inner, &mut inflight, id, draining);
                }
            }
            _ = inner.wake.notified() => {
                // table changed (admission or removal)
            }
            _ = sleep_until(next_due) => {
                fire_due(&inner, &mut inflight);
            }
        }
    }

    inner.bus.publish(Event::new(EventKind::AllStoppedWithin));
    // send_replace stores the value even when no receiver is subscribed yet;
    // shutdown() may only subscribe after the loop has already exited
    inner.stopped_tx.send_replace(true);
}

/// Sleeps until `due`, or forever when there is nothing scheduled.
async fn sleep_until(due: Option<DateTime<Utc>>) {
    match due {
        Some(at) => {
            let wait = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Evaluates due jobs in admission order and dispatches or defers each one
/// according to its singleton policy.
fn fire_due(inner: &Arc<SchedulerInner>, inflight: &mut JoinSet<Uuid>) {
    let now = Utc::now();
    let mut table = inner.table();

    for id in table.due_ids(now) {
        let Some(job) = table.get_mut(id) else {
            continue;
        };

        // every remaining run in the budget is already in flight; stop
        // firing and let the completion handler retire the job
        if job.run_budget_committed() {
            job.next_run_at = None;
            continue;
        }

        match job.singleton {
            SingletonMode::Skip if job.in_flight > 0 => {
                // missed tick: discard the firing, advance the schedule
                job.next_run_at = job.trigger.next_after(now, Some(now));
                inner.bus.publish(
                    Event::new(EventKind::JobSkipped)
                        .with_job(job.label.clone())
                        .with_id(job.id)
                        .with_reason("singleton_running")
                        .with_next_run(job.next_run_at),
                );
            }
            SingletonMode::Reschedule if job.in_flight > 0 => {
                if !job.retry_pending {
                    job.retry_pending = true;
                    inner.bus.publish(
                        Event::new(EventKind::JobDeferred)
                            .with_job(job.label.clone())
                            .with_id(job.id),
                    );
                }
            }
            _ => dispatch_one(inner, inflight, job, now),
        }
    }
}

/// Starts one firing: advances the schedule, publishes `JobStarting`, and
/// spawns the execution onto the `JoinSet`.
fn dispatch_one(
    inner: &Arc<SchedulerInner>,
    inflight: &mut JoinSet<Uuid>,
    job: &mut Job,
    now: DateTime<Utc>,
) {
    job.in_flight += 1;
    job.next_run_at = job.trigger.next_after(now, Some(now));

    let run = job.runs_completed + u64::from(job.in_flight);
    inner.bus.publish(
        Event::new(EventKind::JobStarting)
            .with_job(job.label.clone())
            .with_id(job.id)
            .with_run(run)
            .with_next_run(job.next_run_at),
    );

    inflight.spawn(executor::run_firing(Firing {
        id: job.id,
        label: job.label.clone(),
        run,
        task: job.task.clone(),
        hooks: job.hooks.clone(),
        bus: inner.bus.clone(),
        ctx: inner.runtime_token.child_token(),
    }));
}

/// Accounts one completed execution: run budget, trigger exhaustion, and
/// parked `Reschedule` retries.
fn on_completion(
    inner: &Arc<SchedulerInner>,
    inflight: &mut JoinSet<Uuid>,
    id: Uuid,
    draining: bool,
) {
    let mut table = inner.table();
    let Some(job) = table.get_mut(id) else {
        // removed while running; nothing left to account
        return;
    };

    job.in_flight = job.in_flight.saturating_sub(1);
    job.runs_completed += 1;

    if job.run_limit_reached() {
        finish(inner, &mut table, id, "run_limit_reached");
        return;
    }
    if job.trigger_exhausted() {
        finish(inner, &mut table, id, "trigger_exhausted");
        return;
    }

    if !draining && job.retry_pending && job.in_flight == 0 {
        job.retry_pending = false;
        dispatch_one(inner, inflight, job, Utc::now());
    }
}

fn finish(
    inner: &Arc<SchedulerInner>,
    table: &mut crate::jobs::JobTable,
    id: Uuid,
    reason: &'static str,
) {
    if let Some(job) = table.remove(id) {
        inner.bus.publish(
            Event::new(EventKind::JobFinished)
                .with_job(job.label.clone())
                .with_id(job.id)
                .with_run(job.runs_completed)
                .with_reason(reason),
        );
    }
}
