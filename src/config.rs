//! # Global scheduler configuration.
//!
//! Provides [`SchedulerConfig`], the centralized settings for the scheduler
//! runtime.
//!
//! ## Sentinel values
//! - `grace = 0s` → shutdown waits indefinitely for in-flight executions
//! - `bus_capacity` is clamped to a minimum of 1 by the bus

use std::time::Duration;

/// Global configuration for the scheduler runtime.
///
/// ## Field semantics
/// - `grace`: maximum wait for in-flight executions during shutdown
///   (`0s` = wait without a deadline)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Maximum time [`Scheduler::shutdown`](crate::Scheduler::shutdown) waits
    /// for in-flight executions before returning
    /// [`SchedulerError::GraceExceeded`](crate::SchedulerError::GraceExceeded).
    ///
    /// In-flight tasks are signalled via their cancellation token but never
    /// force-terminated; a task that ignores the token keeps running past the
    /// grace deadline.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Subscribers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip the oldest items.
    pub bus_capacity: usize,
}

impl Default for SchedulerConfig {
    /// Provides a default configuration:
    /// - `grace = 30s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}

impl SchedulerConfig {
    /// Returns the shutdown grace as an `Option`, treating `0s` as "no deadline".
    pub fn grace_deadline(&self) -> Option<Duration> {
        if self.grace.is_zero() {
            None
        } else {
            Some(self.grace)
        }
    }
}
