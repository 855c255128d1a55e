//! # Trigger: the rule determining a job's next run time.
//!
//! [`Trigger`] is a tagged union over the five rule kinds. Structural
//! validation happens once, at job definition time; after that,
//! [`next_after`](Trigger::next_after) never fails — it returns `None` only
//! when the trigger is exhausted (a one-time rule past its instant), which
//! the scheduler treats as "remove the job after the in-flight run drains".
//!
//! ## Invariant
//! Every variant except `OneTime` produces a next run strictly greater than
//! the instant it was computed from. `Interval` and `RandomInterval` enforce
//! this through validation (`> 0` bounds); cron and calendar evaluation are
//! strictly-after by construction.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

use crate::error::JobError;

use super::{Calendar, CronSchedule};

/// Rule determining when a job fires.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Fixed interval: next = last + `d`.
    Interval(Duration),
    /// Random interval: next = last + uniform(`min`, `max`), inclusive.
    RandomInterval {
        /// Lower bound of the draw (must be > 0).
        min: Duration,
        /// Upper bound of the draw (must be >= `min`).
        max: Duration,
    },
    /// Standard 5- or 6-field cron expression.
    Cron(CronSchedule),
    /// Daily/weekly times of day with a matching-day stride.
    Calendar(Calendar),
    /// Fires exactly once at the given instant, then never recurs.
    OneTime(DateTime<Utc>),
}

impl Trigger {
    /// Fixed-interval rule.
    pub fn interval(d: Duration) -> Self {
        Trigger::Interval(d)
    }

    /// Random-interval rule with an inclusive uniform draw.
    pub fn random_interval(min: Duration, max: Duration) -> Self {
        Trigger::RandomInterval { min, max }
    }

    /// Cron rule; fails fast on a malformed expression.
    pub fn cron(expression: &str, with_seconds: bool) -> Result<Self, JobError> {
        Ok(Trigger::Cron(CronSchedule::parse(
            expression,
            with_seconds,
        )?))
    }

    /// Calendar rule (see [`Calendar::daily`] / [`Calendar::weekly`]).
    pub fn calendar(calendar: Calendar) -> Self {
        Trigger::Calendar(calendar)
    }

    /// One-time rule at a future instant.
    pub fn one_time(at: DateTime<Utc>) -> Self {
        Trigger::OneTime(at)
    }

    /// Structural validation, run once at job definition time.
    pub(crate) fn validate(&self, now: DateTime<Utc>) -> Result<(), JobError> {
        match self {
            Trigger::Interval(d) => {
                if d.is_zero() {
                    return Err(JobError::ZeroInterval);
                }
            }
            Trigger::RandomInterval { min, max } => {
                if min.is_zero() || max < min {
                    return Err(JobError::InvalidRandomRange {
                        min: *min,
                        max: *max,
                    });
                }
            }
            Trigger::Cron(_) => {} // parsing already validated the expression
            Trigger::Calendar(cal) => cal.validate()?,
            Trigger::OneTime(at) => {
                if *at <= now {
                    return Err(JobError::OneTimeInPast { at: *at });
                }
            }
        }
        Ok(())
    }

    /// Computes the next run time strictly after `after`.
    ///
    /// `last` is the previous firing time (`None` for the first evaluation);
    /// interval rules advance from it, cron rules scan from `after`, calendar
    /// rules anchor their stride at it. `None` means the trigger is
    /// exhausted.
    pub(crate) fn next_after(
        &self,
        after: DateTime<Utc>,
        last: Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        match self {
            Trigger::Interval(d) => Some(last.unwrap_or(after) + to_delta(*d)),
            Trigger::RandomInterval { min, max } => {
                // nanosecond draw: validated bounds (min > 0) keep the result
                // strictly after `last` even for sub-millisecond intervals
                let lo = clamp_nanos(*min);
                let hi = clamp_nanos(*max);
                let mut rng = rand::rng();
                let drawn = Duration::from_nanos(rng.random_range(lo..=hi));
                Some(last.unwrap_or(after) + to_delta(drawn))
            }
            Trigger::Cron(cs) => cs.next_after(after),
            Trigger::Calendar(cal) => cal.next_after(after, last),
            Trigger::OneTime(at) => {
                if *at > after {
                    Some(*at)
                } else {
                    None
                }
            }
        }
    }
}

fn to_delta(d: Duration) -> TimeDelta {
    TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX)
}

fn clamp_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap()
    }

    #[test]
    fn fixed_interval_spacing_is_exact() {
        let trigger = Trigger::interval(Duration::from_secs(10));
        let mut last = t0();
        for _ in 0..5 {
            let next = trigger.next_after(last, Some(last)).unwrap();
            assert_eq!(next - last, TimeDelta::seconds(10));
            last = next;
        }
    }

    #[test]
    fn random_interval_stays_within_bounds() {
        let min = Duration::from_secs(5);
        let max = Duration::from_secs(15);
        let trigger = Trigger::random_interval(min, max);
        let last = t0();
        for _ in 0..200 {
            let next = trigger.next_after(last, Some(last)).unwrap();
            let gap = next - last;
            assert!(gap >= TimeDelta::seconds(5), "gap {gap} below min");
            assert!(gap <= TimeDelta::seconds(15), "gap {gap} above max");
        }
    }

    #[test]
    fn random_interval_submillisecond_bounds_still_advance() {
        let trigger =
            Trigger::random_interval(Duration::from_micros(500), Duration::from_micros(800));
        let last = t0();
        for _ in 0..100 {
            let next = trigger.next_after(last, Some(last)).unwrap();
            assert!(next > last, "next must be strictly after last");
            let gap = next - last;
            assert!(gap >= TimeDelta::microseconds(500), "gap {gap} below min");
            assert!(gap <= TimeDelta::microseconds(800), "gap {gap} above max");
        }
    }

    #[test]
    fn random_interval_bounds_are_inclusive() {
        let d = Duration::from_secs(7);
        let trigger = Trigger::random_interval(d, d);
        let next = trigger.next_after(t0(), Some(t0())).unwrap();
        assert_eq!(next - t0(), TimeDelta::seconds(7));
    }

    #[test]
    fn one_time_fires_once_then_exhausts() {
        let at = t0() + TimeDelta::seconds(30);
        let trigger = Trigger::one_time(at);
        assert_eq!(trigger.next_after(t0(), None), Some(at));
        // evaluated again with the firing time as `after`
        assert_eq!(trigger.next_after(at, Some(at)), None);
    }

    #[test]
    fn validation_rejects_bad_definitions() {
        let now = t0();
        assert!(matches!(
            Trigger::interval(Duration::ZERO).validate(now),
            Err(JobError::ZeroInterval)
        ));
        assert!(matches!(
            Trigger::random_interval(Duration::from_secs(10), Duration::from_secs(5))
                .validate(now),
            Err(JobError::InvalidRandomRange { .. })
        ));
        assert!(matches!(
            Trigger::random_interval(Duration::ZERO, Duration::from_secs(5)).validate(now),
            Err(JobError::InvalidRandomRange { .. })
        ));
        assert!(matches!(
            Trigger::one_time(now - TimeDelta::seconds(1)).validate(now),
            Err(JobError::OneTimeInPast { .. })
        ));
        assert!(Trigger::interval(Duration::from_secs(1)).validate(now).is_ok());
    }
}
