//! # cronvisor
//!
//! **Cronvisor** is a recurring-job scheduling library for Rust.
//!
//! It provides primitives to define jobs from triggers (intervals, cron
//! expressions, calendar rules, one-time instants) and async tasks, and a
//! scheduler that dispatches them with per-job concurrency policies, run
//! limits, lifecycle hooks, and graceful shutdown.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   JobSpec    │   │   JobSpec    │   │   JobSpec    │
//!     │ (trigger #1) │   │ (trigger #2) │   │ (trigger #3) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler                                                        │
//! │  - JobTable (admission-ordered, next_run_at per job)              │
//! │  - Bus (broadcast events)                                         │
//! │  - dispatch loop (single evaluator)                               │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │  run_firing  │   │  run_firing  │   │  run_firing  │   │
//!     │ (one firing) │   │ (one firing) │   │ (one firing) │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │                  │                  │                 │
//!      │ Publishes        │ Publishes        │ Publishes       │
//!      │ - JobStarting    │ - JobStarting    │ - JobStarting   │
//!      │ - JobCompleted   │ - JobFailed      │ - JobSkipped    │
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │               (capacity: SchedulerConfig::bus_capacity)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                     ┌─────────────┴─────────────┐
//!                     ▼                           ▼
//!          ┌──────────────────────┐     ┌───────────────────┐
//!          │ subscriber listener  │     │  ui event stream  │
//!          │   (SubscriberSet)    │     │  (`ui` feature)   │
//!          └──┬─────────┬─────────┘     └───────────────────┘
//!             ▼         ▼
//!          worker1 … workerN
//!             ▼         ▼
//!        sub1.on_event  subN.on_event
//! ```
//!
//! ### Firing lifecycle
//! ```text
//! JobSpec ──► Scheduler::new_job ──► JobTable ──► dispatch loop
//!
//! loop {
//!   ├─► sleep until the nearest next_run_at (or a wake/completion/shutdown)
//!   ├─► for each due job, by singleton policy:
//!   │       ├─ None                      ─► dispatch (overlap allowed)
//!   │       ├─ Skip, previous running    ─► JobSkipped, advance schedule
//!   │       ├─ Reschedule, running       ─► JobDeferred, park until done
//!   │       └─ otherwise                 ─► dispatch
//!   │
//!   ├─► dispatch = advance next_run_at, publish JobStarting,
//!   │              spawn run_firing (before hooks ─► task ─► after hooks)
//!   │
//!   └─► on completion:
//!         ├─ run limit reached   ─► JobFinished, remove
//!         ├─ trigger exhausted   ─► JobFinished, remove
//!         └─ parked retry        ─► dispatch immediately
//! }
//!
//! shutdown(): cancel tokens ─► drain in-flight (within grace) ─► Stopped
//! ```
//!
//! ## Features
//! | Area            | Description                                                       | Key types / traits                  |
//! |-----------------|-------------------------------------------------------------------|-------------------------------------|
//! | **Triggers**    | Interval, random interval, cron, calendar, one-time.              | [`Trigger`], [`Calendar`]           |
//! | **Jobs**        | Tasks plus options: names, tags, run limits, hooks.               | [`JobSpec`], [`Task`], [`TaskFn`]   |
//! | **Concurrency** | Per-job overlap policy.                                           | [`SingletonMode`]                   |
//! | **Scheduling**  | Dispatch loop, admission, removal, graceful shutdown.             | [`Scheduler`]                       |
//! | **Events**      | Broadcast bus plus isolated per-subscriber fan-out.               | [`Event`], [`Subscriber`]           |
//! | **Errors**      | Typed errors per failure class.                                   | [`JobError`], [`TaskError`], [`SchedulerError`] |
//!
//! ## Optional features
//! - `ui`: HTTP/WebSocket boundary with Basic authentication
//!   ([`UiServer`], [`BasicAuth`]).
//!
//! ## Example
//! ```rust,no_run
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use cronvisor::{JobSpec, Scheduler, SchedulerConfig, TaskFn, Trigger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scheduler = Scheduler::new(SchedulerConfig::default());
//!
//!     scheduler.new_job(
//!         JobSpec::new(
//!             Trigger::interval(Duration::from_secs(10)),
//!             TaskFn::arc(|_ctx: CancellationToken| async {
//!                 println!("tick");
//!                 Ok(())
//!             }),
//!         )
//!         .with_name("ticker"),
//!     )?;
//!
//!     scheduler.start()?;
//!     tokio::signal::ctrl_c().await?;
//!     scheduler.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod jobs;
mod subscribers;
mod triggers;

// ---- Public re-exports ----

pub use config::SchedulerConfig;
pub use core::{Scheduler, SchedulerBuilder};
pub use error::{JobError, SchedulerError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use jobs::{
    AfterHook, BeforeHook, JobHandle, JobSpec, SingletonMode, Task, TaskFn, TaskRef,
};
pub use subscribers::{LogWriter, Subscriber};
pub use triggers::{Calendar, CronSchedule, Trigger};

// Optional: the HTTP/WebSocket boundary for dashboard frontends.
// Enable with: `--features ui`
#[cfg(feature = "ui")]
mod server;
#[cfg(feature = "ui")]
pub use server::{BasicAuth, UiError, UiServer, PASSWORD_ENV, USERNAME_ENV};
