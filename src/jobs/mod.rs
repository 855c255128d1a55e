//! # Job abstractions and specifications.
//!
//! This module provides the core job-related types:
//! - [`Task`] — trait for implementing async cancelable units of work
//! - [`TaskFn`] — function-backed task implementation
//! - [`TaskRef`] — shared reference to a task (`Arc<dyn Task>`)
//! - [`JobSpec`] — specification bundling a trigger, a task, and options
//! - [`JobHandle`] — read-only snapshot of an admitted job
//! - [`SingletonMode`] — per-job concurrency policy
//! - [`BeforeHook`], [`AfterHook`] — per-job lifecycle listeners

mod handle;
mod hooks;
mod job;
mod spec;
mod task;

pub use handle::JobHandle;
pub use hooks::{AfterHook, BeforeHook};
pub use job::SingletonMode;
pub use spec::JobSpec;
pub use task::{Task, TaskFn, TaskRef};

pub(crate) use hooks::Hooks;
pub(crate) use job::{Job, JobTable};
