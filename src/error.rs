//! Error types used by the cronvisor runtime and jobs.
//!
//! This module defines three error enums, one per failure class:
//!
//! - [`JobError`] — definition errors, surfaced synchronously from
//!   [`Scheduler::new_job`](crate::Scheduler::new_job); a job that fails
//!   definition is never admitted to the active set.
//! - [`TaskError`] — execution errors raised by a single firing (task body or
//!   a before hook); recorded against that run and never propagated to the
//!   dispatch loop or other jobs.
//! - [`SchedulerError`] — lifecycle errors raised by the scheduler itself,
//!   such as a shutdown exceeding its grace period.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// # Errors rejecting a job definition.
///
/// All variants are produced by [`Scheduler::new_job`](crate::Scheduler::new_job)
/// (or by [`Trigger::cron`](crate::Trigger::cron), which fails fast on parse).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JobError {
    /// Cron expression could not be parsed.
    #[error("invalid cron expression {expression:?}: {detail}")]
    InvalidCron {
        /// The expression as supplied by the caller.
        expression: String,
        /// Parser diagnostic.
        detail: String,
    },

    /// Fixed interval of zero would fire the job in a tight loop.
    #[error("interval must be greater than zero")]
    ZeroInterval,

    /// Random interval bounds are unusable.
    #[error("random interval requires 0 < min <= max (got min={min:?}, max={max:?})")]
    InvalidRandomRange {
        /// Lower bound as supplied.
        min: Duration,
        /// Upper bound as supplied.
        max: Duration,
    },

    /// Calendar trigger has no times of day to fire at.
    #[error("calendar trigger requires at least one time of day")]
    EmptyAtTimes,

    /// Calendar stride of zero never selects a day.
    #[error("calendar stride must be at least 1")]
    ZeroStride,

    /// Weekly calendar trigger with an empty weekday set never matches.
    #[error("weekly calendar trigger requires at least one weekday")]
    EmptyWeekdays,

    /// One-time run instant is not in the future.
    #[error("one-time run must be in the future (got {at})")]
    OneTimeInPast {
        /// The requested instant.
        at: DateTime<Utc>,
    },

    /// A run limit of zero conflicts with scheduling the job at all.
    #[error("run limit must be at least 1")]
    ZeroRunLimit,

    /// Trigger parsed but produces no upcoming run time.
    #[error("trigger never produces an upcoming run time")]
    NeverFires,

    /// The scheduler has been shut down; no new jobs are admitted.
    #[error("scheduler is shut down")]
    SchedulerStopped,
}

/// # Errors produced by a single job firing.
///
/// Returned by [`Task::run`](crate::Task::run) implementations and by before
/// hooks. The scheduler records the failure for that run (bus event, after
/// hooks) and keeps the job scheduled.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task execution failed for this firing.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task observed cancellation and exited early (graceful, not a failure).
    #[error("context cancelled")]
    Canceled,

    /// Task body panicked; the panic was caught and isolated to this firing.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl TaskError {
    /// Convenience constructor for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// True for graceful cancellation, which is reported as a completed run
    /// rather than a failed one.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

/// # Errors produced by the scheduler lifecycle.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// `start` was called more than once.
    #[error("scheduler already started")]
    AlreadyStarted,

    /// `start` was called on a scheduler that has been shut down.
    /// A shut-down scheduler cannot be restarted.
    #[error("scheduler has been shut down and cannot be restarted")]
    Terminated,

    /// Shutdown grace period was exceeded; some executions were still in
    /// flight. The process should still proceed to terminate.
    #[error("shutdown grace {grace:?} exceeded; still running: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of jobs with executions still in flight.
        stuck: Vec<String>,
    },

    /// No active job with the given id.
    #[error("no job with id {id}")]
    JobNotFound {
        /// The id that was looked up.
        id: Uuid,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::AlreadyStarted => "scheduler_already_started",
            SchedulerError::Terminated => "scheduler_terminated",
            SchedulerError::GraceExceeded { .. } => "scheduler_grace_exceeded",
            SchedulerError::JobNotFound { .. } => "scheduler_job_not_found",
        }
    }
}
