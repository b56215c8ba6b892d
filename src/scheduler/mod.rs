//! # Recurring Job Scheduler
//!
//! Fires [`PeriodJob::run`] for every enabled tag on its fixed anchor (see
//! [`Cadence`]).
//!
//! One timing loop evaluates the [`JobRegistry`] and pushes due tags onto a
//! channel. A single worker drains the channel, so jobs never overlap each
//! other and a slow run never holds up the timing loop. Admin operations and
//! the loop share the registry behind a mutex.
//!
//! The scheduler is an explicit instance: build it once at startup and hand
//! it to whatever needs it (HTTP handlers, the `serve` bootstrap).

mod cadence;
mod registry;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::{Mutex, Notify, mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    clock::Clock,
    error::SchedulerError,
    sync::Syncer,
    types::{Period, SchedulerSnapshot},
};

pub use cadence::Cadence;
pub use registry::{JobRegistry, StartOutcome};

/// Upper bound on how long the timing loop sleeps between evaluations
const MAX_SLEEP: Duration = Duration::from_secs(30);

/// The body a tag runs when it fires.
#[async_trait]
pub trait PeriodJob: Send + Sync {
    async fn run(&self, period: Period);
}

#[async_trait]
impl PeriodJob for Syncer {
    async fn run(&self, period: Period) {
        match self.sync(period).await {
            Ok(report) => info!(
                %period,
                playlist_id = %report.playlist_id,
                resolved = report.resolved_count(),
                skipped = report.skipped_count(),
                "Scheduled sync succeeded"
            ),
            Err(e) => error!(%period, error = %e, "Scheduled sync failed"),
        }
    }
}

struct Inner {
    clock: Arc<dyn Clock>,
    registry: Arc<Mutex<JobRegistry>>,
    set_up: Mutex<bool>,
    dispatch: mpsc::UnboundedSender<Period>,
    wake: Notify,
    shutdown: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Creates the scheduler and spawns its worker.
    ///
    /// Nothing fires until [`Scheduler::setup_schedule`] starts the timing
    /// loop. Must be called inside a tokio runtime.
    pub fn new(clock: Arc<dyn Clock>, job: Arc<dyn PeriodJob>) -> Self {
        let (dispatch, receiver) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let registry = Arc::new(Mutex::new(JobRegistry::new()));

        let worker = tokio::spawn(run_worker(
            job,
            Arc::clone(&registry),
            receiver,
            shutdown_rx,
        ));

        Self {
            inner: Arc::new(Inner {
                clock,
                registry,
                set_up: Mutex::new(false),
                dispatch,
                wake: Notify::new(),
                shutdown,
                tasks: Mutex::new(vec![worker]),
            }),
        }
    }

    /// Registers `enabled` and starts the timing loop.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::AlreadyRunning`] on every call after the first.
    pub async fn setup_schedule(&self, enabled: &[Period]) -> Result<(), SchedulerError> {
        let mut set_up = self.inner.set_up.lock().await;
        if *set_up {
            return Err(SchedulerError::AlreadyRunning);
        }

        {
            let now = self.inner.clock.now();
            let mut registry = self.inner.registry.lock().await;
            for period in enabled {
                registry.start(*period, now);
            }
        }
        *set_up = true;

        let scheduler = self.clone();
        let shutdown_rx = self.inner.shutdown.subscribe();
        let handle = tokio::spawn(async move { scheduler.run_loop(shutdown_rx).await });
        self.inner.tasks.lock().await.push(handle);

        info!(jobs = ?enabled, "Scheduler started");
        Ok(())
    }

    /// Registers or re-enables `tag`. A tag that is already scheduled and
    /// enabled is left alone.
    pub async fn start_job(&self, tag: &str) -> Result<StartOutcome, SchedulerError> {
        let period = parse_tag(tag)?;
        let now = self.inner.clock.now();
        let outcome = self.inner.registry.lock().await.start(period, now);
        self.inner.wake.notify_one();
        info!(%period, ?outcome, "Job started");
        Ok(outcome)
    }

    /// Unregisters `tag`. A run already in progress finishes. Returns false
    /// when the tag was not registered.
    pub async fn stop_job(&self, tag: &str) -> Result<bool, SchedulerError> {
        let period = parse_tag(tag)?;
        let removed = self.inner.registry.lock().await.stop(period);
        info!(%period, removed, "Job stopped");
        Ok(removed)
    }

    /// Keeps `tag` registered without firing it. Returns false when the tag
    /// was not registered.
    pub async fn disable_job(&self, tag: &str) -> Result<bool, SchedulerError> {
        let period = parse_tag(tag)?;
        let disabled = self.inner.registry.lock().await.disable(period);
        info!(%period, disabled, "Job disabled");
        Ok(disabled)
    }

    /// Resumes firing of all registered jobs.
    pub async fn start_scheduler(&self) {
        self.inner.registry.lock().await.resume();
        self.inner.wake.notify_one();
        info!("Scheduler resumed");
    }

    /// Pauses all registered jobs without unregistering them.
    pub async fn stop_scheduler(&self) {
        self.inner.registry.lock().await.pause();
        info!("Scheduler paused");
    }

    pub async fn jobs(&self) -> SchedulerSnapshot {
        self.inner.registry.lock().await.snapshot()
    }

    /// Evaluates the registry once and hands due tags to the worker.
    ///
    /// Called by the timing loop; returns the dispatched tags.
    pub async fn run_pending(&self) -> Vec<Period> {
        let now = self.inner.clock.now();
        let due = self.inner.registry.lock().await.tick(now);
        for period in &due {
            debug!(%period, "Dispatching job");
            if self.inner.dispatch.send(*period).is_err() {
                warn!(%period, "Worker is gone, dropping job");
            }
        }
        due
    }

    /// Stops the timing loop and the worker. A job in progress completes
    /// first; queued ones are dropped.
    pub async fn shutdown(&self) {
        let _ = self.inner.shutdown.send(true);
        let tasks: Vec<_> = self.inner.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Scheduler task ended abnormally");
            }
        }
        info!("Scheduler shut down");
    }

    async fn run_loop(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            self.run_pending().await;

            let sleep_for = self.time_until_next_wake().await;
            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {}
                _ = self.inner.wake.notified() => {}
                _ = shutdown.changed() => break,
            }
        }
        debug!("Timing loop stopped");
    }

    async fn time_until_next_wake(&self) -> Duration {
        let next = self.inner.registry.lock().await.next_wake();
        let now = self.inner.clock.now();
        match next {
            Some(next) => (next - now)
                .to_std()
                .unwrap_or(Duration::ZERO)
                .min(MAX_SLEEP),
            None => MAX_SLEEP,
        }
    }
}

fn parse_tag(tag: &str) -> Result<Period, SchedulerError> {
    tag.parse::<Period>()
        .map_err(|_| SchedulerError::InvalidTag(tag.to_string()))
}

/// Runs queued tags one at a time.
///
/// A tag that was stopped, disabled or paused while it waited in the queue is
/// dropped; only the job already running is allowed to finish.
async fn run_worker(
    job: Arc<dyn PeriodJob>,
    registry: Arc<Mutex<JobRegistry>>,
    mut receiver: mpsc::UnboundedReceiver<Period>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            next = receiver.recv() => match next {
                Some(period) => {
                    let runnable = {
                        let registry = registry.lock().await;
                        registry.is_running() && registry.is_enabled(period)
                    };
                    if runnable {
                        debug!(%period, "Running job");
                        job.run(period).await;
                    } else {
                        info!(%period, "Job stopped while queued, skipping");
                    }
                }
                None => break,
            },
        }
    }
    debug!("Worker stopped");
}
