//! In-process sensor event fan-out.
//!
//! Three independent channels, each with a statically known payload:
//! - sensor added ([`SensorEvents::added`], payload: sensor name)
//! - sensor removed ([`SensorEvents::removed`], payload: sensor name)
//! - reading updated ([`SensorEvents::readings`], payload: [`SensorReading`])
//!
//! Emission is synchronous: every current subscriber is called in
//! subscription order before `emit` returns. There is no buffering or replay.

mod subscribers;

#[cfg(test)]
mod subscribers_tests;

pub use subscribers::{HandlerError, SubscriptionId, Subscribers};

use crate::scrape::SensorReading;

/// The three sensor event channels.
///
/// # Example
///
/// ```
/// use ohs_monitor::events::SensorEvents;
/// use std::sync::{Arc, Mutex};
///
/// let events = SensorEvents::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// events.added.subscribe(move |name: &String| {
///     sink.lock().unwrap().push(name.clone());
///     Ok(())
/// });
///
/// events.added.emit(&"Hallway".to_string());
/// assert_eq!(*seen.lock().unwrap(), vec!["Hallway".to_string()]);
/// ```
#[derive(Debug)]
pub struct SensorEvents {
    /// A sensor name appeared on the status page.
    pub added: Subscribers<String>,
    /// A sensor name disappeared from the status page.
    pub removed: Subscribers<String>,
    /// A sensor's state was read during a successful cycle.
    pub readings: Subscribers<SensorReading>,
}

impl SensorEvents {
    /// Creates the three channels with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            added: Subscribers::new("sensor-added"),
            removed: Subscribers::new("sensor-removed"),
            readings: Subscribers::new("reading-updated"),
        }
    }
}

impl Default for SensorEvents {
    fn default() -> Self {
        Self::new()
    }
}
