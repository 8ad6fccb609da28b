//! OHS Monitor: `OpenHomeSecurity` controller status poller
//!
//! A library for polling an alarm controller's HTML status page and
//! publishing typed sensor membership and state events.

pub mod config;
pub mod controller;
pub mod events;
pub mod monitor;
pub mod scrape;
pub mod time;
