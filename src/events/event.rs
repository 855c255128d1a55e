//! # Runtime events emitted by the scheduler and job executions.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Admission events**: jobs entering and leaving the active set
//! - **Firing events**: per-run execution flow (starting, completed, failed,
//!   skipped, deferred)
//! - **Shutdown events**: graceful termination progress
//! - **Subscriber events**: delivery problems in the fan-out layer
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! job's id and display name, run counters, and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use cronvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::JobFailed)
//!     .with_job("nightly-report")
//!     .with_reason("boom")
//!     .with_run(3);
//!
//! assert_eq!(ev.kind, EventKind::JobFailed);
//! assert_eq!(ev.job.as_deref(), Some("nightly-report"));
//! assert_eq!(ev.run, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Admission events ===
    /// Job admitted to the active set.
    ///
    /// Sets: `job`, `id`, `next_run`.
    JobAdded,

    /// Job explicitly removed by the caller.
    ///
    /// Sets: `job`, `id`.
    JobRemoved,

    /// Job left the active set on its own: run limit reached or a one-time
    /// trigger fired.
    ///
    /// Sets: `job`, `id`, `run`, `reason` (`run_limit_reached` /
    /// `trigger_exhausted`).
    JobFinished,

    // === Firing events ===
    /// A due job was dispatched and its execution is starting.
    ///
    /// Sets: `job`, `id`, `run` (1-based, the run this firing will complete),
    /// `next_run` (already advanced past this firing).
    JobStarting,

    /// Execution completed without error (or exited gracefully on
    /// cancellation).
    ///
    /// Sets: `job`, `id`, `run`.
    JobCompleted,

    /// Execution failed: the task returned an error, panicked, or a before
    /// hook rejected the firing.
    ///
    /// Sets: `job`, `id`, `run`, `reason`.
    JobFailed,

    /// A due firing was discarded because a previous execution is still in
    /// flight (`SingletonMode::Skip`).
    ///
    /// Sets: `job`, `id`, `next_run`.
    JobSkipped,

    /// A due firing was parked until the in-flight execution completes
    /// (`SingletonMode::Reschedule`).
    ///
    /// Sets: `job`, `id`.
    JobDeferred,

    // === Shutdown events ===
    /// Shutdown requested; no further firings will be dispatched.
    ShutdownRequested,

    /// All in-flight executions drained and the dispatch loop stopped.
    AllStoppedWithin,

    /// Grace period exceeded; some executions were still in flight.
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `job` (subscriber name), `reason`.
    SubscriberOverflow,

    /// Subscriber panicked while processing an event.
    ///
    /// Sets: `job` (subscriber name), `reason`.
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: DateTime<Utc>,
    /// Event classification.
    pub kind: EventKind,

    /// Display name of the job (or subscriber), if applicable.
    pub job: Option<Arc<str>>,
    /// Opaque job id, if applicable.
    pub id: Option<Uuid>,
    /// Run counter associated with the event (1-based).
    pub run: Option<u64>,
    /// Human-readable reason (errors, skip causes, etc.).
    pub reason: Option<Arc<str>>,
    /// The job's next scheduled run after this event, if known.
    pub next_run: Option<DateTime<Utc>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: Utc::now(),
            kind,
            job: None,
            id: None,
            run: None,
            reason: None,
            next_run: None,
        }
    }

    /// Attaches a job (or subscriber) display name.
    #[inline]
    pub fn with_job(mut self, job: impl Into<Arc<str>>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Attaches the job id.
    #[inline]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Attaches a run counter.
    #[inline]
    pub fn with_run(mut self, run: u64) -> Self {
        self.run = Some(run);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the next scheduled run time.
    #[inline]
    pub fn with_next_run(mut self, next: Option<DateTime<Utc>>) -> Self {
        self.next_run = next;
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_job(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_job(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::JobStarting);
        let b = Event::new(EventKind::JobCompleted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_set_fields() {
        let id = Uuid::new_v4();
        let ev = Event::new(EventKind::JobSkipped)
            .with_job("ticker")
            .with_id(id)
            .with_run(7)
            .with_reason("singleton_running");
        assert_eq!(ev.job.as_deref(), Some("ticker"));
        assert_eq!(ev.id, Some(id));
        assert_eq!(ev.run, Some(7));
        assert_eq!(ev.reason.as_deref(), Some("singleton_running"));
    }
}
