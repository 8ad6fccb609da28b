//! Monitor layer for tracking the controller's sensor table.
//!
//! This module provides types and functions for:
//! - Detecting membership changes between cycles ([`diff`], [`SeenSet`])
//! - Running poll cycles on a schedule ([`Poller`], [`CycleReport`])
//! - Error handling ([`PollError`])

mod change;
mod error;
mod poller;

#[cfg(test)]
mod poller_tests;

pub use change::{MembershipDiff, SeenSet, diff};
pub use error::PollError;
pub use poller::{CycleReport, DEFAULT_POLL_INTERVAL, Poller, PollerState};
