use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::cadence::Cadence;
use crate::types::{JobSnapshot, Period, SchedulerSnapshot};

#[derive(Debug, Clone)]
struct ScheduledJob {
    cadence: Cadence,
    enabled: bool,
    next_run: NaiveDateTime,
    last_run: Option<NaiveDateTime>,
}

/// What `start` did to a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    /// The tag was not registered and now is
    Scheduled,
    /// The tag was registered but disabled and is enabled again
    Resumed,
    /// The tag was already scheduled and enabled; nothing changed
    AlreadyScheduled,
}

/// Per-tag state machine plus the global pause flag.
///
/// `Unscheduled -> Scheduled(enabled) <-> Scheduled(disabled) -> Unscheduled`
///
/// Holds at most one entry per tag. The registry never looks at a clock
/// itself; callers pass `now`.
#[derive(Debug, Clone)]
pub struct JobRegistry {
    jobs: BTreeMap<Period, ScheduledJob>,
    running: bool,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: BTreeMap::new(),
            running: true,
        }
    }

    pub fn start(&mut self, period: Period, now: NaiveDateTime) -> StartOutcome {
        let cadence = Cadence::for_period(period);
        match self.jobs.get_mut(&period) {
            Some(job) if job.enabled => StartOutcome::AlreadyScheduled,
            Some(job) => {
                job.enabled = true;
                job.next_run = cadence.next_after(now);
                StartOutcome::Resumed
            }
            None => {
                self.jobs.insert(
                    period,
                    ScheduledJob {
                        cadence,
                        enabled: true,
                        next_run: cadence.next_after(now),
                        last_run: None,
                    },
                );
                StartOutcome::Scheduled
            }
        }
    }

    /// Removes the tag. Returns false when it was not registered.
    pub fn stop(&mut self, period: Period) -> bool {
        self.jobs.remove(&period).is_some()
    }

    /// Keeps the tag registered but stops it from firing. Returns false when
    /// the tag is not registered.
    pub fn disable(&mut self, period: Period) -> bool {
        match self.jobs.get_mut(&period) {
            Some(job) => {
                job.enabled = false;
                true
            }
            None => false,
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_enabled(&self, period: Period) -> bool {
        self.jobs.get(&period).is_some_and(|job| job.enabled)
    }

    /// Advances every job whose anchor has passed and returns the tags that
    /// should run now.
    ///
    /// Several missed anchors collapse into one firing. Disabled jobs and a
    /// paused registry advance their anchors without returning anything.
    pub fn tick(&mut self, now: NaiveDateTime) -> Vec<Period> {
        let running = self.running;
        let mut due = Vec::new();
        for (period, job) in self.jobs.iter_mut() {
            if job.next_run > now {
                continue;
            }
            job.next_run = job.cadence.next_after(now);
            if job.enabled && running {
                job.last_run = Some(now);
                due.push(*period);
            }
        }
        due
    }

    /// Earliest upcoming anchor of any registered job.
    pub fn next_wake(&self) -> Option<NaiveDateTime> {
        self.jobs.values().map(|job| job.next_run).min()
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            running: self.running,
            jobs: self
                .jobs
                .iter()
                .map(|(period, job)| JobSnapshot {
                    tag: *period,
                    cadence: job.cadence.describe().to_string(),
                    enabled: job.enabled,
                    next_run: job.next_run,
                    last_run: job.last_run,
                })
                .collect(),
        }
    }
}
