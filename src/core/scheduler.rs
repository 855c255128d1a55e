//! # Scheduler: public API and lifecycle.
//!
//! [`Scheduler`] owns the job table, the event bus, and the dispatch loop.
//! It moves through four states:
//!
//! ```text
//!   Created ──start()──▶ Running ──shutdown()──▶ ShuttingDown ──▶ Stopped
//!      │                                                            ▲
//!      └────────────────────shutdown()───────────────────────────────┘
//! ```
//!
//! ## Rules
//! - **Single start**: `start` succeeds exactly once; a second call returns
//!   [`SchedulerError::AlreadyStarted`], a call after shutdown returns
//!   [`SchedulerError::Terminated`]. No restart.
//! - **Admission any time before shutdown**: jobs may be added before or
//!   after `start`; jobs added before `start` get their first run computed
//!   from the `start` instant.
//! - **Idempotent shutdown**: concurrent and repeated `shutdown` calls all
//!   wait for the same drain and return the same way.
//! - **Grace**: shutdown cancels the runtime token, then waits up to the
//!   configured grace for in-flight executions; on timeout it reports the
//!   stuck jobs and returns [`SchedulerError::GraceExceeded`].

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch, Notify};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::core::dispatch;
use crate::error::{JobError, SchedulerError};
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{JobHandle, JobSpec, JobTable};
use crate::subscribers::{Subscriber, SubscriberSet};

const CREATED: u8 = 0;
const RUNNING: u8 = 1;
const SHUTTING_DOWN: u8 = 2;
const STOPPED: u8 = 3;

/// Shared scheduler state behind the public handle.
pub(crate) struct SchedulerInner {
    pub(crate) cfg: SchedulerConfig,
    pub(crate) bus: Bus,
    /// Registered subscribers; workers are spawned on `start`.
    subscribers: Vec<Arc<dyn Subscriber>>,
    state: AtomicU8,
    table: Mutex<JobTable>,
    /// Pinged on table changes so the dispatch loop re-evaluates its sleep.
    pub(crate) wake: Notify,
    /// Cancelled on shutdown; every firing gets a child token.
    pub(crate) runtime_token: CancellationToken,
    /// Flipped to `true` by the dispatch loop once fully drained.
    pub(crate) stopped_tx: watch::Sender<bool>,
}

impl SchedulerInner {
    pub(crate) fn table(&self) -> MutexGuard<'_, JobTable> {
        // table critical sections never panic; recover the guard if one did
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Builder for a [`Scheduler`] with optional event subscribers.
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    subscribers: Vec<Arc<dyn Subscriber>>,
}

impl SchedulerBuilder {
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, sub: Arc<dyn Subscriber>) -> Self {
        self.subscribers.push(sub);
        self
    }

    /// Replaces the subscriber list.
    pub fn with_subscribers(mut self, subs: Vec<Arc<dyn Subscriber>>) -> Self {
        self.subscribers = subs;
        self
    }

    pub fn build(self) -> Scheduler {
        let bus = Bus::new(self.cfg.bus_capacity);
        let (stopped_tx, _) = watch::channel(false);
        Scheduler {
            inner: Arc::new(SchedulerInner {
                cfg: self.cfg,
                bus,
                subscribers: self.subscribers,
                state: AtomicU8::new(CREATED),
                table: Mutex::new(JobTable::default()),
                wake: Notify::new(),
                runtime_token: CancellationToken::new(),
                stopped_tx,
            }),
        }
    }
}

/// Handle to one scheduler instance. Cheap to clone; all clones share the
/// same state.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl Scheduler {
    /// Creates a scheduler with no subscribers.
    pub fn new(cfg: SchedulerConfig) -> Self {
        SchedulerBuilder::new(cfg).build()
    }

    /// Starts building a scheduler.
    pub fn builder(cfg: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    fn state(&self) -> u8 {
        self.inner.state.load(Ordering::Acquire)
    }

    fn transition(&self, from: u8, to: u8) -> bool {
        self.inner
            .state
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Validates the spec and admits the job.
    ///
    /// Works in `Created` and `Running`; returns
    /// [`JobError::SchedulerStopped`] once shutdown has begun. The returned
    /// handle is a snapshot taken at admission.
    pub fn new_job(&self, spec: JobSpec) -> Result<JobHandle, JobError> {
        if matches!(self.state(), SHUTTING_DOWN | STOPPED) {
            return Err(JobError::SchedulerStopped);
        }

        let job = spec.into_job(Utc::now())?;
        let handle = job.snapshot();
        self.inner.bus.publish(
            Event::new(EventKind::JobAdded)
                .with_job(job.label.clone())
                .with_id(job.id)
                .with_next_run(job.next_run_at),
        );
        self.inner.table().insert(job);
        self.inner.wake.notify_one();
        Ok(handle)
    }

    /// Removes a job from the active set.
    ///
    /// An in-flight execution of the removed job runs to completion but no
    /// further firings are dispatched.
    pub fn remove_job(&self, id: Uuid) -> Result<(), SchedulerError> {
        let removed = self.inner.table().remove(id);
        match removed {
            Some(job) => {
                self.inner.bus.publish(
                    Event::new(EventKind::JobRemoved)
                        .with_job(job.label.clone())
                        .with_id(job.id),
                );
                self.inner.wake.notify_one();
                Ok(())
            }
            None => Err(SchedulerError::JobNotFound { id }),
        }
    }

    /// Snapshots of all active jobs, in admission order.
    pub fn jobs(&self) -> Vec<JobHandle> {
        self.inner.table().snapshots()
    }

    /// Subscribes to the event bus directly (an alternative to registered
    /// [`Subscriber`]s, used by e.g. the UI event stream).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Begins dispatching. Must be called from within a tokio runtime.
    ///
    /// Jobs admitted before `start` get their first run recomputed relative
    /// to this instant.
    pub fn start(&self) -> Result<(), SchedulerError> {
        if !self.transition(CREATED, RUNNING) {
            return match self.state() {
                RUNNING => Err(SchedulerError::AlreadyStarted),
                _ => Err(SchedulerError::Terminated),
            };
        }

        self.inner.table().reschedule_all(Utc::now());
        self.spawn_subscriber_listener();
        tokio::spawn(dispatch::run(Arc::clone(&self.inner)));
        Ok(())
    }

    fn spawn_subscriber_listener(&self) {
        if self.inner.subscribers.is_empty() {
            return;
        }
        let set = SubscriberSet::new(self.inner.subscribers.clone(), &self.inner.bus);
        let mut rx = self.inner.bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    /// Stops dispatching, cancels in-flight executions, and waits for them
    /// to drain.
    ///
    /// Safe to call from any state and from multiple callers; every call
    /// observes the same drain. Returns [`SchedulerError::GraceExceeded`]
    /// when executions outlive the configured grace.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        loop {
            match self.state() {
                STOPPED => return Ok(()),
                CREATED => {
                    // never started: nothing to drain
                    if self.transition(CREATED, STOPPED) {
                        return Ok(());
                    }
                }
                RUNNING => {
                    if self.transition(RUNNING, SHUTTING_DOWN) {
                        self.inner
                            .bus
                            .publish(Event::new(EventKind::ShutdownRequested));
                        self.inner.runtime_token.cancel();
                        self.inner.wake.notify_one();
                    }
                }
                _ => break, // ShuttingDown: wait for the drain below
            }
        }

        let mut stopped_rx = self.inner.stopped_tx.subscribe();
        let drained = async move {
            while !*stopped_rx.borrow_and_update() {
                if stopped_rx.changed().await.is_err() {
                    break;
                }
            }
        };

        match self.inner.cfg.grace_deadline() {
            None => drained.await,
            Some(grace) => {
                if tokio::time::timeout(grace, drained).await.is_err() {
                    let stuck = self.inner.table().in_flight_labels();
                    self.inner.bus.publish(
                        Event::new(EventKind::GraceExceeded)
                            .with_reason(format!("still running: {stuck:?}")),
                    );
                    self.inner.state.store(STOPPED, Ordering::Release);
                    return Err(SchedulerError::GraceExceeded { grace, stuck });
                }
            }
        }

        self.inner.state.store(STOPPED, Ordering::Release);
        Ok(())
    }
}
