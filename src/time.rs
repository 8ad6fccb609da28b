//! Suspension abstraction for testability.
//!
//! This module provides a [`Sleeper`] trait that allows injecting
//! instant or recording sleepers in tests while using the tokio timer
//! in production. The fetcher's backoff waits go through it.

use std::time::Duration;

/// Abstraction over asynchronous waiting.
///
/// Implementations suspend the current task for (at most) the requested
/// duration. Retry loops depend on this trait rather than on
/// [`tokio::time::sleep`] directly so tests can observe requested delays
/// without actually waiting.
///
/// # Example
///
/// ```
/// use ohs_monitor::time::{InstantSleeper, Sleeper};
/// use std::time::Duration;
///
/// # async fn example() {
/// InstantSleeper.sleep(Duration::from_secs(60)).await; // returns immediately
/// # }
/// ```
pub trait Sleeper: Send + Sync {
    /// Suspends for the given duration.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

/// Production sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately.
///
/// Useful in tests and for tight diagnostic loops where backoff
/// delays must not slow anything down.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}
