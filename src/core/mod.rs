//! Runtime core: the scheduler and its dispatch loop.
//!
//! The only public API from this module is [`Scheduler`] (and its builder),
//! which owns the job table, runs the dispatch loop, and coordinates
//! graceful shutdown.
//!
//! Internal modules:
//! - [`scheduler`]: public API surface, state machine, shutdown coordination;
//! - [`dispatch`]: the loop that wakes at the nearest fire time, applies the
//!   singleton policy, and accounts completed runs;
//! - [`executor`]: executes one firing (before hooks → task → after hooks)
//!   with panic isolation and event publishing.

mod dispatch;
mod executor;
mod scheduler;

pub use scheduler::{Scheduler, SchedulerBuilder};

pub(crate) use executor::panic_message;
