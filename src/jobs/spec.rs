//! # Job specification: trigger, task, and options.
//!
//! [`JobSpec`] is the configuration bundle handed to
//! [`Scheduler::new_job`](crate::Scheduler::new_job). Options mirror the
//! registration surface:
//!
//! - [`with_name`](JobSpec::with_name) — display name
//! - [`with_tags`](JobSpec::with_tags) — tag set
//! - [`with_singleton`](JobSpec::with_singleton) — concurrency policy
//! - [`with_run_limit`](JobSpec::with_run_limit) — total run budget
//! - [`with_before_hook`](JobSpec::with_before_hook) /
//!   [`with_after_hook`](JobSpec::with_after_hook) — lifecycle listeners,
//!   invoked in registration order
//!
//! Validation happens at admission, not at firing time: a malformed trigger
//! or conflicting option is a definition error and the job never enters the
//! active set.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use cronvisor::{JobSpec, SingletonMode, TaskError, TaskFn, Trigger};
//!
//! let spec = JobSpec::new(
//!     Trigger::interval(Duration::from_secs(5)),
//!     TaskFn::arc(|_ctx: CancellationToken| async { Ok::<_, TaskError>(()) }),
//! )
//! .with_name("heartbeat")
//! .with_tags(["interval", "simple"])
//! .with_singleton(SingletonMode::Skip)
//! .with_run_limit(10);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{JobError, TaskError};
use crate::jobs::job::{Job, SingletonMode};
use crate::jobs::{Hooks, TaskRef};
use crate::triggers::Trigger;

/// Specification for a job awaiting admission.
pub struct JobSpec {
    trigger: Trigger,
    task: TaskRef,
    name: Option<String>,
    tags: BTreeSet<String>,
    singleton: SingletonMode,
    max_runs: Option<u64>,
    hooks: Hooks,
}

impl JobSpec {
    /// Creates a specification with default options: no name, no tags,
    /// `SingletonMode::None`, unbounded runs, no hooks.
    pub fn new(trigger: Trigger, task: TaskRef) -> Self {
        Self {
            trigger,
            task,
            name: None,
            tags: BTreeSet::new(),
            singleton: SingletonMode::default(),
            max_runs: None,
            hooks: Hooks::default(),
        }
    }

    /// Sets the display name (not required to be unique).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the tag set.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the concurrency policy applied when the job becomes due while a
    /// previous execution is still running.
    pub fn with_singleton(mut self, mode: SingletonMode) -> Self {
        self.singleton = mode;
        self
    }

    /// Limits the total number of completed runs; the job is removed
    /// atomically with the completion of run `n`. Completion, not success,
    /// consumes the budget. `n` must be at least 1.
    pub fn with_run_limit(mut self, n: u64) -> Self {
        self.max_runs = Some(n);
        self
    }

    /// Registers a hook invoked before the task; a returned error prevents
    /// task invocation for that firing.
    pub fn with_before_hook<F>(mut self, f: F) -> Self
    where
        F: Fn(Uuid, &str) -> Result<(), TaskError> + Send + Sync + 'static,
    {
        self.hooks.before.push(Arc::new(f));
        self
    }

    /// Registers a hook invoked after every completed firing with its
    /// outcome.
    pub fn with_after_hook<F>(mut self, f: F) -> Self
    where
        F: Fn(Uuid, &str, &Result<(), TaskError>) + Send + Sync + 'static,
    {
        self.hooks.after.push(Arc::new(f));
        self
    }

    /// Validates the spec and produces the internal job with its initial
    /// next-run time.
    pub(crate) fn into_job(self, now: DateTime<Utc>) -> Result<Job, JobError> {
        self.trigger.validate(now)?;
        if self.max_runs == Some(0) {
            return Err(JobError::ZeroRunLimit);
        }

        let next_run_at = self.trigger.next_after(now, None);
        if next_run_at.is_none() {
            return Err(JobError::NeverFires);
        }

        let id = Uuid::new_v4();
        let label: Arc<str> = match &self.name {
            Some(name) => Arc::from(name.as_str()),
            None => Arc::from(id.to_string()),
        };

        Ok(Job {
            id,
            name: self.name,
            label,
            tags: self.tags,
            trigger: self.trigger,
            task: self.task,
            singleton: self.singleton,
            max_runs: self.max_runs,
            hooks: Arc::new(self.hooks),
            runs_completed: 0,
            next_run_at,
            in_flight: 0,
            retry_pending: false,
        })
    }
}
