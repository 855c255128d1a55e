//! Read-only job snapshot handed to callers.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Owned snapshot of an admitted job.
///
/// Returned by [`Scheduler::new_job`](crate::Scheduler::new_job) and
/// [`Scheduler::jobs`](crate::Scheduler::jobs). The snapshot is taken at call
/// time and never exposes the scheduler's mutable state by reference.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub(crate) id: Uuid,
    pub(crate) name: Option<String>,
    pub(crate) tags: BTreeSet<String>,
    pub(crate) next_run_at: Option<DateTime<Utc>>,
    pub(crate) runs_completed: u64,
}

impl JobHandle {
    /// Opaque id, unique for the process lifetime.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Optional human-readable display name (not required to be unique).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Tag set, in lexicographic order.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Next scheduled run at snapshot time; `None` once the trigger is
    /// exhausted.
    pub fn next_run_at(&self) -> Option<DateTime<Utc>> {
        self.next_run_at
    }

    /// Completed run count at snapshot time.
    pub fn runs_completed(&self) -> u64 {
        self.runs_completed
    }
}
