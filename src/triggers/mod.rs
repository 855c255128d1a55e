//! Trigger rules: when a job runs next.
//!
//! This module groups the five trigger kinds and their evaluation:
//! - [`Trigger`] — tagged union over the rule kinds, with validation and
//!   next-run evaluation
//! - [`CronSchedule`] — parsed 5/6-field cron expression
//! - [`Calendar`] — daily/weekly time-of-day rule with a matching-day stride
//!
//! ## Contract
//! `next_after(after, last_run)` is pure and deterministic except for the
//! random-interval rule, which draws uniformly from `[min, max]` on each
//! call. Evaluation never fails after a trigger passed definition-time
//! validation; `None` means the trigger is exhausted (one-time rules after
//! their instant).

mod calendar;
mod cron;
mod trigger;

pub use calendar::Calendar;
pub use cron::CronSchedule;
pub use trigger::Trigger;
