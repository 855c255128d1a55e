//! Cron expression parsing and evaluation.
//!
//! [`CronSchedule`] wraps [`cron::Schedule`] and normalizes the two accepted
//! layouts:
//! - **5 fields** (`min hour dom mon dow`) when seconds are disabled; a `0`
//!   seconds field is prepended before parsing, so the job fires at second 0
//!   of each matching minute.
//! - **6 fields** (`sec min hour dom mon dow`) when seconds are enabled.
//!
//! Parsing fails fast at definition time with a descriptive error; evaluation
//! thereafter never fails. The original expression is preserved for
//! [`Display`](std::fmt::Display), so formatting and reparsing yields an
//! equivalent schedule.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;

use crate::error::JobError;

/// Parsed cron expression.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    schedule: Schedule,
    expression: String,
    with_seconds: bool,
}

impl CronSchedule {
    /// Parses a cron expression.
    ///
    /// `with_seconds` selects the field layout: `false` expects the standard
    /// 5-field form, `true` expects 6 fields with a leading seconds field.
    ///
    /// # Examples
    ///
    /// ```
    /// use cronvisor::CronSchedule;
    ///
    /// // Every minute
    /// let every_minute = CronSchedule::parse("* * * * *", false).unwrap();
    ///
    /// // Every 30 seconds
    /// let half_minute = CronSchedule::parse("*/30 * * * * *", true).unwrap();
    ///
    /// // Field-count mismatch is a definition error
    /// assert!(CronSchedule::parse("* * * * * *", false).is_err());
    /// ```
    pub fn parse(expression: &str, with_seconds: bool) -> Result<Self, JobError> {
        let expression = expression.trim().to_string();
        let fields = expression.split_whitespace().count();
        let expected = if with_seconds { 6 } else { 5 };
        if fields != expected {
            return Err(JobError::InvalidCron {
                expression,
                detail: format!("expected {expected} fields, got {fields}"),
            });
        }

        let normalized = if with_seconds {
            expression.clone()
        } else {
            format!("0 {expression}")
        };
        let schedule = Schedule::from_str(&normalized).map_err(|e| JobError::InvalidCron {
            expression: expression.clone(),
            detail: e.to_string(),
        })?;

        Ok(Self {
            schedule,
            expression,
            with_seconds,
        })
    }

    /// The expression as supplied by the caller.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether the expression carries a seconds field.
    pub fn with_seconds(&self) -> bool {
        self.with_seconds
    }

    /// Next matching time strictly after `after`.
    pub(crate) fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn five_field_fires_at_second_zero() {
        let cs = CronSchedule::parse("* * * * *", false).unwrap();
        let next = cs.next_after(at(2026, 1, 5, 10, 0, 15)).unwrap();
        assert_eq!(next, at(2026, 1, 5, 10, 1, 0));
        assert_eq!(next.second(), 0);
    }

    #[test]
    fn six_field_uses_seconds() {
        let cs = CronSchedule::parse("*/30 * * * * *", true).unwrap();
        let next = cs.next_after(at(2026, 1, 5, 10, 0, 0)).unwrap();
        assert_eq!(next, at(2026, 1, 5, 10, 0, 30));
    }

    #[test]
    fn next_is_strictly_after() {
        let cs = CronSchedule::parse("30 9 * * *", false).unwrap();
        let exactly = at(2026, 1, 5, 9, 30, 0);
        let next = cs.next_after(exactly).unwrap();
        assert!(next > exactly);
        assert_eq!(next, at(2026, 1, 6, 9, 30, 0));
    }

    #[test]
    fn field_count_mismatch_is_rejected() {
        assert!(matches!(
            CronSchedule::parse("* * * * * *", false),
            Err(JobError::InvalidCron { .. })
        ));
        assert!(matches!(
            CronSchedule::parse("* * * * *", true),
            Err(JobError::InvalidCron { .. })
        ));
    }

    #[test]
    fn garbage_is_rejected_with_detail() {
        let err = CronSchedule::parse("not a cron at all x", false).unwrap_err();
        match err {
            JobError::InvalidCron { expression, detail } => {
                assert_eq!(expression, "not a cron at all x");
                assert!(!detail.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn display_round_trips_to_equivalent_schedule() {
        let original = CronSchedule::parse("*/5 8-18 * * MON-FRI", false).unwrap();
        let reparsed = CronSchedule::parse(&original.to_string(), false).unwrap();

        let mut probe = at(2026, 1, 5, 7, 59, 0);
        for _ in 0..10 {
            let a = original.next_after(probe).unwrap();
            let b = reparsed.next_after(probe).unwrap();
            assert_eq!(a, b);
            probe = a;
        }
    }
}
