//! Scheduled polling of the controller status page.
//!
//! This module provides [`Poller`], which runs poll cycles on a fixed
//! period and publishes their outcome through [`SensorEvents`].

use super::change::{MembershipDiff, SeenSet};
use super::error::PollError;
use crate::controller::StatusFetcher;
use crate::events::SensorEvents;
use crate::scrape::{SensorReading, StatusPage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Poll period used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Lifecycle state of a [`Poller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// No scheduler is running.
    Stopped,
    /// The scheduler is waiting for the next tick.
    Idle,
    /// A poll cycle is in progress.
    Cycling,
}

/// Outcome of one successful poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Every sensor reading on the page, in document order.
    pub readings: Vec<SensorReading>,
    /// Membership changes relative to the previous successful cycle.
    pub changes: MembershipDiff,
}

/// State shared between the poller handle and its scheduler task.
struct Shared<F> {
    fetcher: F,
    page: StatusPage,
    events: SensorEvents,
    /// Held for the whole cycle, so cycles never overlap.
    seen: tokio::sync::Mutex<SeenSet>,
    cycling: AtomicBool,
    interval: Duration,
}

impl<F: StatusFetcher> Shared<F> {
    async fn cycle(&self) -> Result<CycleReport, PollError> {
        let mut seen = self.seen.lock().await;
        self.cycling.store(true, Ordering::SeqCst);
        let result = self.cycle_locked(&mut seen).await;
        self.cycling.store(false, Ordering::SeqCst);
        result
    }

    async fn cycle_locked(&self, seen: &mut SeenSet) -> Result<CycleReport, PollError> {
        let document = self.fetcher.fetch().await?;
        let readings = self.page.parse(&document)?;

        let names: Vec<&str> = readings.iter().map(|r| r.name.as_str()).collect();
        let changes = seen.replace(&names);

        for name in &changes.removed {
            self.events.removed.emit(name);
        }
        for name in &changes.added {
            self.events.added.emit(name);
        }
        for reading in &readings {
            self.events.readings.emit(reading);
        }

        Ok(CycleReport { readings, changes })
    }
}

/// Periodic poller for the controller's sensor table.
///
/// Each cycle fetches the status page, parses it, diffs the sensor names
/// against the previous successful cycle, and publishes:
///
/// 1. one `removed` event per sensor that disappeared,
/// 2. one `added` event per new sensor,
/// 3. one `readings` event per sensor on the page.
///
/// A failed cycle publishes nothing and leaves the known sensor set as it
/// was, so the next successful cycle diffs against the last good state.
///
/// # Scheduling
///
/// [`Poller::start`] spawns a task that waits one full period, runs a
/// cycle to completion, and repeats. A slow cycle delays the next one
/// instead of overlapping it. [`Poller::stop`] never interrupts a cycle
/// in progress; it finishes and publishes normally, then the task exits.
///
/// # Type Parameters
///
/// * `F` - The [`StatusFetcher`] used to retrieve the status page
///
/// # Example
///
/// ```ignore
/// use ohs_monitor::monitor::Poller;
/// use std::time::Duration;
///
/// let poller = Poller::new(fetcher, Duration::from_secs(10));
/// poller.events().added.subscribe(|name: &String| {
///     println!("new sensor {name}");
///     Ok(())
/// });
/// poller.start();
/// ```
pub struct Poller<F> {
    shared: Arc<Shared<F>>,
    /// Dropping the sender also ends the scheduler task.
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl<F> std::fmt::Debug for Poller<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("interval", &self.shared.interval)
            .field("page", &self.shared.page)
            .field("events", &self.shared.events)
            .finish_non_exhaustive()
    }
}

impl<F: StatusFetcher + 'static> Poller<F> {
    /// Creates a stopped poller with the default status page layout.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The fetcher used to retrieve the status page
    /// * `interval` - The period between cycles
    #[must_use]
    pub fn new(fetcher: F, interval: Duration) -> Self {
        Self::with_status_page(fetcher, StatusPage::default(), interval)
    }

    /// Creates a stopped poller with a custom status page parser.
    #[must_use]
    pub fn with_status_page(fetcher: F, page: StatusPage, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                fetcher,
                page,
                events: SensorEvents::new(),
                seen: tokio::sync::Mutex::new(SeenSet::new()),
                cycling: AtomicBool::new(false),
                interval,
            }),
            shutdown: Mutex::new(None),
        }
    }

    /// Returns the event channels consumers subscribe to.
    #[must_use]
    pub fn events(&self) -> &SensorEvents {
        &self.shared.events
    }

    /// Returns the configured period between cycles.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PollerState {
        if self.shared.cycling.load(Ordering::SeqCst) {
            PollerState::Cycling
        } else if self.is_running() {
            PollerState::Idle
        } else {
            PollerState::Stopped
        }
    }

    /// Returns true if the scheduler has been started and not stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns the sensor names known as of the last successful cycle.
    ///
    /// Waits for an in-progress cycle to finish.
    pub async fn known_sensors(&self) -> Vec<String> {
        let seen = self.shared.seen.lock().await;
        seen.names().map(str::to_string).collect()
    }

    /// Runs one poll cycle immediately and publishes its events.
    ///
    /// Waits for an in-progress scheduled cycle to finish first.
    ///
    /// # Errors
    ///
    /// Returns [`PollError`] if the page could not be fetched or parsed.
    /// Nothing is published and the known sensor set is unchanged.
    pub async fn poll_once(&self) -> Result<CycleReport, PollError> {
        self.shared.cycle().await
    }

    /// Starts the scheduler. Has no effect if it is already running.
    ///
    /// Must be called from within a tokio runtime. Returns true if this
    /// call started the scheduler.
    pub fn start(&self) -> bool {
        let mut shutdown = self.shutdown.lock().unwrap_or_else(PoisonError::into_inner);
        if shutdown.is_some() {
            tracing::debug!("Poller already running");
            return false;
        }

        let (tx, rx) = watch::channel(false);
        *shutdown = Some(tx);
        tokio::spawn(schedule(Arc::clone(&self.shared), rx));

        tracing::info!(
            "Polling controller every {}s",
            self.shared.interval.as_secs_f64()
        );
        true
    }

    /// Stops the scheduler. Has no effect if it is not running.
    ///
    /// A cycle already in progress runs to completion. Returns true if
    /// this call stopped the scheduler.
    pub fn stop(&self) -> bool {
        let sender = self
            .shutdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        sender.is_some_and(|tx| {
            // The task may already be gone; a closed channel is fine.
            let _ = tx.send(true);
            tracing::info!("Poller stopped");
            true
        })
    }
}

/// Scheduler loop: wait one period, run one cycle, repeat until shutdown.
async fn schedule<F: StatusFetcher>(shared: Arc<Shared<F>>, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            () = tokio::time::sleep(shared.interval) => {}
        }

        match shared.cycle().await {
            Ok(report) => tracing::debug!(
                "Poll cycle complete: {} sensor(s), {} added, {} removed",
                report.readings.len(),
                report.changes.added.len(),
                report.changes.removed.len()
            ),
            Err(e) => tracing::error!("Poll cycle failed ({}): {e}", e.kind()),
        }
    }

    tracing::debug!("Poller task exiting");
}
