//! Internal job state and the scheduler's job table.
//!
//! [`Job`] bundles a trigger, a task, identity, and the mutable scheduling
//! state for one job. All mutation happens under the dispatch loop's
//! exclusive access to the [`JobTable`]; execution contexts receive an
//! immutable snapshot and report back through the loop's completion channel.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::jobs::{Hooks, JobHandle, TaskRef};
use crate::triggers::Trigger;

/// Per-job concurrency policy: what happens when a job becomes due while a
/// previous execution is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingletonMode {
    /// Always execute; overlapping executions of the same job may run
    /// concurrently. Dispatch order is still strict.
    #[default]
    None,
    /// Discard the due firing entirely — no task, no hooks — and advance the
    /// schedule (a missed tick).
    Skip,
    /// Park the due firing and retry at the next evaluation tick; once the
    /// in-flight execution completes, fire immediately.
    Reschedule,
}

/// Mutable scheduling state for one admitted job.
pub(crate) struct Job {
    pub(crate) id: Uuid,
    pub(crate) name: Option<String>,
    /// Display label for events and hooks: the name, or the id rendered.
    pub(crate) label: Arc<str>,
    pub(crate) tags: BTreeSet<String>,
    pub(crate) trigger: Trigger,
    pub(crate) task: TaskRef,
    pub(crate) singleton: SingletonMode,
    pub(crate) max_runs: Option<u64>,
    pub(crate) hooks: Arc<Hooks>,

    pub(crate) runs_completed: u64,
    pub(crate) next_run_at: Option<DateTime<Utc>>,
    /// Executions started but not yet completed. A counter, not a flag:
    /// `SingletonMode::None` allows overlap.
    pub(crate) in_flight: u32,
    /// A `Reschedule` firing is parked, waiting for the in-flight execution.
    pub(crate) retry_pending: bool,
}

impl Job {
    pub(crate) fn snapshot(&self) -> JobHandle {
        JobHandle {
            id: self.id,
            name: self.name.clone(),
            tags: self.tags.clone(),
            next_run_at: self.next_run_at,
            runs_completed: self.runs_completed,
        }
    }

    /// True once the run budget is spent.
    pub(crate) fn run_limit_reached(&self) -> bool {
        self.max_runs.is_some_and(|m| self.runs_completed >= m)
    }

    /// True once every remaining run in the budget is already in flight;
    /// dispatching another firing would overrun `max_runs`.
    pub(crate) fn run_budget_committed(&self) -> bool {
        self.max_runs
            .is_some_and(|m| self.runs_completed + u64::from(self.in_flight) >= m)
    }

    /// True once the trigger has nothing more to offer and nothing is
    /// running or parked.
    pub(crate) fn trigger_exhausted(&self) -> bool {
        self.next_run_at.is_none() && self.in_flight == 0 && !self.retry_pending
    }
}

/// Insertion-ordered job table owned by the scheduler.
///
/// Iteration order for display is the admission order, which keeps
/// [`Scheduler::jobs`](crate::Scheduler::jobs) deterministic.
#[derive(Default)]
pub(crate) struct JobTable {
    jobs: HashMap<Uuid, Job>,
    order: Vec<Uuid>,
}

impl JobTable {
    pub(crate) fn insert(&mut self, job: Job) {
        self.order.push(job.id);
        self.jobs.insert(job.id, job);
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> Option<Job> {
        let job = self.jobs.remove(&id)?;
        self.order.retain(|o| *o != id);
        Some(job)
    }

    pub(crate) fn get_mut(&mut self, id: Uuid) -> Option<&mut Job> {
        self.jobs.get_mut(&id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Earliest upcoming run across active jobs.
    ///
    /// Jobs parked by `Reschedule` deferral are woken by their completion,
    /// not by time, so they do not contribute a sleep target.
    pub(crate) fn next_due(&self) -> Option<DateTime<Utc>> {
        self.jobs
            .values()
            .filter(|j| !(j.retry_pending && j.in_flight > 0))
            .filter_map(|j| j.next_run_at)
            .min()
    }

    /// Ids of jobs due at `now`, in admission order (strict same-job
    /// dispatch ordering follows from the single evaluating loop).
    pub(crate) fn due_ids(&self, now: DateTime<Utc>) -> Vec<Uuid> {
        self.order
            .iter()
            .filter(|id| {
                self.jobs
                    .get(id)
                    .and_then(|j| j.next_run_at)
                    .is_some_and(|at| at <= now)
            })
            .copied()
            .collect()
    }

    /// Snapshots in admission order.
    pub(crate) fn snapshots(&self) -> Vec<JobHandle> {
        self.order
            .iter()
            .filter_map(|id| self.jobs.get(id))
            .map(Job::snapshot)
            .collect()
    }

    /// Labels of jobs with executions still in flight (stuck-job reporting
    /// for shutdown).
    pub(crate) fn in_flight_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .jobs
            .values()
            .filter(|j| j.in_flight > 0)
            .map(|j| j.label.to_string())
            .collect();
        labels.sort_unstable();
        labels
    }

    /// Recomputes every job's next run from `now` (used by `start`).
    pub(crate) fn reschedule_all(&mut self, now: DateTime<Utc>) {
        for job in self.jobs.values_mut() {
            job.next_run_at = job.trigger.next_after(now, None);
        }
    }
}
