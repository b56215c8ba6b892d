//! Playlist names derived from the period and the local time of the run.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};

use crate::types::Period;

/// Prefix naming the service the tracks were taken from
pub const SOURCE_NAME: &str = "LastFM";

/// Name of the playlist a run of `period` at `now` creates.
///
/// - weekly: `LastFM Top Tracks: Mar 08-Mar 15 2024`, covering the seven
///   days up to `now`, with the year of the first day
/// - monthly: `LastFM Top Tracks: February 2024`, the calendar month before
///   the one `now` falls in
pub fn playlist_name(period: Period, now: NaiveDateTime) -> String {
    match period {
        Period::Weekly => {
            let start = now - Duration::days(7);
            format!(
                "{} Top Tracks: {}-{} {}",
                SOURCE_NAME,
                start.format("%b %d"),
                now.format("%b %d"),
                start.year()
            )
        }
        Period::Monthly => {
            let previous = first_instant_of_month(now) - Duration::seconds(1);
            format!(
                "{} Top Tracks: {} {}",
                SOURCE_NAME,
                previous.format("%B"),
                previous.year()
            )
        }
    }
}

fn first_instant_of_month(now: NaiveDateTime) -> NaiveDateTime {
    let date = now.date();
    (date - Duration::days(i64::from(date.day0()))).and_time(NaiveTime::MIN)
}
