//! Calendar trigger: daily/weekly times of day with a matching-day stride.
//!
//! A [`Calendar`] rule fires at a fixed set of times of day, on every
//! `stride`-th day that matches an optional weekday filter. "Daily" is the
//! degenerate case with no weekday filter; a stride of 1 selects every
//! matching day.
//!
//! ## Evaluation
//! Given `after` (the instant the next run is computed from) and the last
//! run, the rule finds the earliest `(day, time)` strictly after `after`:
//! - first the remaining times of day on the anchor day itself (the last
//!   run's day, or `after`'s day for the first run), in ascending order;
//! - then the first eligible day after the anchor, where eligible means the
//!   `stride`-th matching day, again taking times in ascending order.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};

use crate::error::JobError;

/// Daily/weekly time-of-day rule.
#[derive(Debug, Clone)]
pub struct Calendar {
    stride: u32,
    weekdays: Option<Vec<Weekday>>,
    at_times: Vec<NaiveTime>,
}

impl Calendar {
    /// Every `stride`-th day at the given times, no weekday filter.
    ///
    /// Times are sorted ascending and deduplicated; ties on the same day are
    /// resolved by ascending time order.
    pub fn daily(stride: u32, at_times: impl IntoIterator<Item = NaiveTime>) -> Self {
        Self::build(stride, None, at_times)
    }

    /// Every `stride`-th day matching the weekday filter, at the given times.
    pub fn weekly(
        stride: u32,
        weekdays: impl IntoIterator<Item = Weekday>,
        at_times: impl IntoIterator<Item = NaiveTime>,
    ) -> Self {
        let mut days: Vec<Weekday> = weekdays.into_iter().collect();
        days.sort_unstable_by_key(|d| d.num_days_from_monday());
        days.dedup();
        Self::build(stride, Some(days), at_times)
    }

    fn build(
        stride: u32,
        weekdays: Option<Vec<Weekday>>,
        at_times: impl IntoIterator<Item = NaiveTime>,
    ) -> Self {
        let mut times: Vec<NaiveTime> = at_times.into_iter().collect();
        times.sort_unstable();
        times.dedup();
        Self {
            stride,
            weekdays,
            at_times: times,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), JobError> {
        if self.stride == 0 {
            return Err(JobError::ZeroStride);
        }
        if self.at_times.is_empty() {
            return Err(JobError::EmptyAtTimes);
        }
        if let Some(days) = &self.weekdays {
            if days.is_empty() {
                return Err(JobError::EmptyWeekdays);
            }
        }
        Ok(())
    }

    /// Earliest `(day, time)` strictly after `after`.
    ///
    /// The stride is anchored at `last` (or at `after` for the first run):
    /// after the anchor day, the next eligible day is the `stride`-th
    /// matching day.
    pub(crate) fn next_after(
        &self,
        after: DateTime<Utc>,
        last: Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        let anchor = last.unwrap_or(after);
        let anchor_day = anchor.date_naive();

        // Remaining times on the anchor day itself.
        if self.day_matches(anchor_day) {
            for &t in &self.at_times {
                let candidate = anchor_day.and_time(t).and_utc();
                if candidate > after && candidate > anchor {
                    return Some(candidate);
                }
            }
        }

        let mut day = anchor_day.succ_opt()?;
        let mut matched = 0u32;
        loop {
            if self.day_matches(day) {
                matched += 1;
                if matched == self.stride {
                    for &t in &self.at_times {
                        let candidate = day.and_time(t).and_utc();
                        if candidate > after {
                            return Some(candidate);
                        }
                    }
                    // `after` is already past every time on this eligible day;
                    // keep striding.
                    matched = 0;
                }
            }
            day = day.succ_opt()?;
        }
    }

    fn day_matches(&self, day: NaiveDate) -> bool {
        match &self.weekdays {
            None => true,
            Some(days) => days.contains(&day.weekday()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    // 2026-01-05 is a Monday.

    #[test]
    fn daily_uses_later_time_on_same_day() {
        let cal = Calendar::daily(1, [hms(9, 0, 0), hms(14, 30, 0)]);
        let next = cal.next_after(at(2026, 1, 5, 10, 0, 0), None).unwrap();
        assert_eq!(next, at(2026, 1, 5, 14, 30, 0));
    }

    #[test]
    fn daily_rolls_over_to_next_day() {
        let cal = Calendar::daily(1, [hms(9, 0, 0)]);
        let next = cal.next_after(at(2026, 1, 5, 10, 0, 0), None).unwrap();
        assert_eq!(next, at(2026, 1, 6, 9, 0, 0));
    }

    #[test]
    fn daily_stride_skips_days_from_last_run() {
        let cal = Calendar::daily(2, [hms(9, 0, 0)]);
        let last = at(2026, 1, 5, 9, 0, 0);
        let next = cal.next_after(last, Some(last)).unwrap();
        assert_eq!(next, at(2026, 1, 7, 9, 0, 0));
    }

    #[test]
    fn ties_resolved_in_ascending_time_order() {
        // unsorted, duplicated input must not matter
        let cal = Calendar::daily(1, [hms(18, 0, 0), hms(6, 0, 0), hms(6, 0, 0)]);
        let next = cal.next_after(at(2026, 1, 5, 0, 0, 0), None).unwrap();
        assert_eq!(next, at(2026, 1, 5, 6, 0, 0));
    }

    #[test]
    fn weekly_honors_weekday_filter() {
        let cal = Calendar::weekly(
            1,
            [Weekday::Mon, Weekday::Wed, Weekday::Fri],
            [hms(9, 0, 0)],
        );
        // Monday after 09:00 → Wednesday 09:00
        let next = cal.next_after(at(2026, 1, 5, 10, 0, 0), None).unwrap();
        assert_eq!(next, at(2026, 1, 7, 9, 0, 0));
        assert_eq!(next.weekday(), Weekday::Wed);
    }

    #[test]
    fn weekly_stride_counts_matching_days_only() {
        let cal = Calendar::weekly(2, [Weekday::Mon, Weekday::Fri], [hms(9, 0, 0)]);
        let last = at(2026, 1, 5, 9, 0, 0); // Monday
        // matching days after: Fri 9th (1st), Mon 12th (2nd) → eligible
        let next = cal.next_after(last, Some(last)).unwrap();
        assert_eq!(next, at(2026, 1, 12, 9, 0, 0));
    }

    #[test]
    fn result_is_strictly_after_input() {
        let cal = Calendar::daily(1, [hms(9, 0, 0)]);
        let exactly = at(2026, 1, 5, 9, 0, 0);
        let next = cal.next_after(exactly, Some(exactly)).unwrap();
        assert!(next > exactly);
        assert_eq!(next, at(2026, 1, 6, 9, 0, 0));
    }

    #[test]
    fn validation_rejects_degenerate_rules() {
        assert!(matches!(
            Calendar::daily(0, [hms(9, 0, 0)]).validate(),
            Err(JobError::ZeroStride)
        ));
        assert!(matches!(
            Calendar::daily(1, []).validate(),
            Err(JobError::EmptyAtTimes)
        ));
        assert!(matches!(
            Calendar::weekly(1, [], [hms(9, 0, 0)]).validate(),
            Err(JobError::EmptyWeekdays)
        ));
    }
}
