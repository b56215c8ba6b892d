use chrono::{Local, NaiveDateTime};

/// Source of the current local wall-clock time.
///
/// Playlist names and job anchors are expressed in local time (honouring
/// `TZ`), so the clock hands out naive local timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
