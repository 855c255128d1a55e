//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the scheduler, the dispatch
//! loop, and individual job executions.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Scheduler` (admission/lifecycle), the dispatch loop
//!   (firing decisions), `executor::run_firing` (per-run outcomes), and
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the scheduler's subscriber listener (fans out to
//!   `SubscriberSet`) and, with the `ui` feature, the WebSocket event stream.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
