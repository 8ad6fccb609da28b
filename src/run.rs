//! Application execution logic.
//!
//! This module wires the configured poller to the binary's consumers
//! and runs it until a shutdown signal arrives.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::signal;

use ohs_monitor::config::ValidatedConfig;
use ohs_monitor::controller::{HttpStatusFetcher, ReqwestClient};
use ohs_monitor::events::SensorEvents;
use ohs_monitor::monitor::{PollError, Poller};
use ohs_monitor::scrape::{ReadingBuilder, RowExtractor, SensorReading, StatusPage};

/// Type alias for the application's poller.
type AppPoller = Poller<HttpStatusFetcher<ReqwestClient>>;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The single poll cycle of `once` failed.
    #[error("Poll failed: {0}")]
    Poll(#[from] PollError),

    /// Readings could not be rendered as JSON.
    #[error("Failed to render readings: {0}")]
    Render(#[from] serde_json::Error),
}

/// An alarm state change worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The sensor started alarming.
    Alarm {
        /// Sensor name
        name: String,
        /// Note from the reading
        note: String,
    },
    /// The sensor stopped alarming.
    Clear {
        /// Sensor name
        name: String,
        /// Note from the reading
        note: String,
    },
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alarm { name, note } => write!(f, "Alarm on {name} note: {note}"),
            Self::Clear { name, note } => write!(f, "Clear {name} note: {note}"),
        }
    }
}

/// Remembers each sensor's last alarm state and reports flips.
///
/// A sensor never seen before counts as clear, so its first reading is
/// reported only if it is alarming.
#[derive(Debug, Default)]
pub struct TransitionTracker {
    alarming: Mutex<HashMap<String, bool>>,
}

impl TransitionTracker {
    /// Records a reading and returns the transition it caused, if any.
    pub fn observe(&self, reading: &SensorReading) -> Option<Transition> {
        let mut states = self.alarming.lock().unwrap_or_else(PoisonError::into_inner);
        let was_alarming = states
            .insert(reading.name.clone(), reading.alarming)
            .unwrap_or(false);

        match (was_alarming, reading.alarming) {
            (false, true) => Some(Transition::Alarm {
                name: reading.name.clone(),
                note: reading.note.clone(),
            }),
            (true, false) => Some(Transition::Clear {
                name: reading.name.clone(),
                note: reading.note.clone(),
            }),
            _ => None,
        }
    }

    /// Drops a removed sensor so a later return starts fresh.
    pub fn forget(&self, name: &str) {
        self.alarming
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

/// Builds the poller from configuration.
fn build_poller(config: &ValidatedConfig) -> AppPoller {
    let fetcher = HttpStatusFetcher::new(
        ReqwestClient::new(),
        &config.endpoint,
        config.auth.clone(),
    )
    .with_retry_policy(config.retry_policy.clone());

    let page = StatusPage::new(
        RowExtractor::default(),
        ReadingBuilder::new(config.ok_threshold_secs),
    );

    Poller::with_status_page(fetcher, page, config.poll_interval)
}

/// Subscribes the binary's logging consumers to every channel.
fn subscribe_consumers(events: &SensorEvents) -> Arc<TransitionTracker> {
    let tracker = Arc::new(TransitionTracker::default());

    events.added.subscribe(|name: &String| {
        tracing::info!("+ sensor {name}");
        Ok(())
    });

    let on_removed = Arc::clone(&tracker);
    events.removed.subscribe(move |name: &String| {
        tracing::info!("- sensor {name}");
        on_removed.forget(name);
        Ok(())
    });

    let on_reading = Arc::clone(&tracker);
    events.readings.subscribe(move |reading| {
        tracing::debug!(
            "{} alarming={} note: {}",
            reading.name,
            reading.alarming,
            reading.note
        );
        if let Some(transition) = on_reading.observe(reading) {
            tracing::info!("{transition}");
        }
        Ok(())
    });

    tracker
}

/// Runs the poller until a shutdown signal is received.
///
/// Excluded from coverage - requires a live controller and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let poller = build_poller(&config);
    subscribe_consumers(poller.events());

    poller.start();
    shutdown_signal().await;

    tracing::info!("Shutdown signal received, stopping...");
    poller.stop();
    Ok(())
}

/// Runs a single poll cycle and prints the readings as JSON.
///
/// Excluded from coverage - requires a live controller.
#[cfg(not(tarpaulin_include))]
pub async fn execute_once(config: ValidatedConfig) -> Result<(), RunError> {
    let poller = build_poller(&config);
    let report = poller.poll_once().await?;

    println!("{}", render_readings(&report.readings)?);
    Ok(())
}

/// Renders readings as pretty-printed JSON.
fn render_readings(readings: &[SensorReading]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(readings)
}

/// Returns a future that completes when a shutdown signal is received.
///
/// If a handler cannot be installed the failure is logged and that
/// signal is ignored.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
