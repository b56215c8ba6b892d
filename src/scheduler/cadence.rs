//! Fixed wall-clock anchors per job tag.
//!
//! Anchors do not depend on when a job was registered, so a restarted process
//! computes the same next firing as the one it replaced.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::types::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Mondays at 00:00 local time
    Weekly,
    /// The 1st of each month at 00:00 local time
    Monthly,
}

impl Cadence {
    pub fn for_period(period: Period) -> Self {
        match period {
            Period::Weekly => Cadence::Weekly,
            Period::Monthly => Cadence::Monthly,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Cadence::Weekly => "every Monday 00:00",
            Cadence::Monthly => "every 1st of the month 00:00",
        }
    }

    /// First anchor strictly after `after`.
    pub fn next_after(&self, after: NaiveDateTime) -> NaiveDateTime {
        let date = after.date();
        match self {
            Cadence::Weekly => {
                let days_to_monday = (7 - date.weekday().num_days_from_monday()) % 7;
                let candidate =
                    (date + Duration::days(i64::from(days_to_monday))).and_time(NaiveTime::MIN);
                if candidate > after {
                    candidate
                } else {
                    candidate + Duration::days(7)
                }
            }
            Cadence::Monthly => {
                let first = date - Duration::days(i64::from(date.day0()));
                first
                    .checked_add_months(Months::new(1))
                    // only reachable at the end of chrono's date range
                    .unwrap_or(NaiveDate::MAX)
                    .and_time(NaiveTime::MIN)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[rstest]
    // Friday
    #[case(at(2024, 3, 15, 9, 30), at(2024, 3, 18, 0, 0))]
    // Sunday just before midnight
    #[case(at(2024, 3, 17, 23, 59), at(2024, 3, 18, 0, 0))]
    // exactly on the anchor moves to the following week
    #[case(at(2024, 3, 18, 0, 0), at(2024, 3, 25, 0, 0))]
    // Monday morning
    #[case(at(2024, 3, 18, 0, 1), at(2024, 3, 25, 0, 0))]
    // across the year boundary
    #[case(at(2024, 12, 31, 12, 0), at(2025, 1, 6, 0, 0))]
    fn test_weekly_anchor(#[case] now: NaiveDateTime, #[case] expected: NaiveDateTime) {
        assert_eq!(Cadence::Weekly.next_after(now), expected);
    }

    #[rstest]
    #[case(at(2024, 3, 15, 9, 30), at(2024, 4, 1, 0, 0))]
    #[case(at(2024, 3, 1, 0, 0), at(2024, 4, 1, 0, 0))]
    #[case(at(2024, 1, 31, 23, 59), at(2024, 2, 1, 0, 0))]
    #[case(at(2024, 12, 1, 0, 0), at(2025, 1, 1, 0, 0))]
    fn test_monthly_anchor(#[case] now: NaiveDateTime, #[case] expected: NaiveDateTime) {
        assert_eq!(Cadence::Monthly.next_after(now), expected);
    }

    #[test]
    fn test_anchor_is_independent_of_registration_time() {
        let early = Cadence::Weekly.next_after(at(2024, 3, 12, 8, 0));
        let late = Cadence::Weekly.next_after(at(2024, 3, 16, 22, 0));
        assert_eq!(early, late);
    }
}
