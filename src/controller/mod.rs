//! Controller access layer.
//!
//! This module provides types and traits for:
//! - Building HTTP requests ([`HttpRequest`], [`BasicAuth`])
//! - Handling HTTP responses ([`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - Fetching the status page with retries ([`StatusFetcher`], [`HttpStatusFetcher`])
//! - Retry policy configuration ([`RetryPolicy`])

mod client;
mod error;
mod fetcher;
mod request;
mod retry;


pub use client::ReqwestClient;
pub use error::{AttemptError, FetchError, HttpError};
pub use fetcher::{HttpStatusFetcher, IsRetryable, STATUS_PATH, StatusFetcher, status_url};
pub use request::{BasicAuth, HttpClient, HttpRequest, HttpResponse};
pub use retry::{RetryPolicy, RetryStep};
