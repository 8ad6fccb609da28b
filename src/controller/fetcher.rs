//! Status page fetcher trait and HTTP implementation.

use crate::time::{Sleeper, TokioSleeper};

use super::{
    AttemptError, BasicAuth, FetchError, HttpClient, HttpError, HttpRequest, RetryPolicy,
    RetryStep,
};
use http::header::{CONNECTION, HeaderValue};

/// Path of the status page relative to the controller endpoint.
pub const STATUS_PATH: &str = "z";

/// Trait for retrieving the raw controller status page.
///
/// Implementations handle retries internally and only report failure
/// once they have given up.
pub trait StatusFetcher: Send + Sync {
    /// Fetches the status page body as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if every attempt failed.
    fn fetch(&self) -> impl std::future::Future<Output = Result<String, FetchError>> + Send;
}

/// Builds the status page URL for a controller endpoint.
///
/// Appends [`STATUS_PATH`] to the endpoint's path, tolerating a trailing
/// slash: both `http://alarm.local` and `http://alarm.local/` map to
/// `http://alarm.local/z`.
#[must_use]
pub fn status_url(endpoint: &url::Url) -> url::Url {
    let mut url = endpoint.clone();
    let path = format!("{}/{STATUS_PATH}", endpoint.path().trim_end_matches('/'));
    url.set_path(&path);
    url
}

/// HTTP-based status fetcher with retry support.
///
/// Issues an authenticated `GET {endpoint}/z` with `Connection: close`.
/// Transient failures are retried according to the [`RetryPolicy`]; the
/// attempt loop walks `Fetching -> BackingOff -> Fetching` until it either
/// succeeds or the policy reports [`RetryStep::Exhausted`].
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used for backoff waits (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```
/// use ohs_monitor::controller::{BasicAuth, HttpStatusFetcher, ReqwestClient};
/// use url::Url;
///
/// let fetcher = HttpStatusFetcher::new(
///     ReqwestClient::new(),
///     &Url::parse("http://alarm.local").unwrap(),
///     BasicAuth::new("admin", "secret"),
/// );
/// assert_eq!(fetcher.url().as_str(), "http://alarm.local/z");
/// ```
#[derive(Debug)]
pub struct HttpStatusFetcher<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    url: url::Url,
    auth: BasicAuth,
    retry_policy: RetryPolicy,
}

impl<H> HttpStatusFetcher<H, TokioSleeper> {
    /// Creates a new fetcher for the given controller endpoint.
    ///
    /// Uses the default retry policy and [`TokioSleeper`] for delays.
    #[must_use]
    pub fn new(client: H, endpoint: &url::Url, auth: BasicAuth) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            url: status_url(endpoint),
            auth,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl<H, S> HttpStatusFetcher<H, S> {
    /// Sets a custom sleeper for backoff delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> HttpStatusFetcher<H, S2> {
        HttpStatusFetcher {
            client: self.client,
            sleeper,
            url: self.url,
            auth: self.auth,
            retry_policy: self.retry_policy,
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Returns the status page URL.
    #[must_use]
    pub const fn url(&self) -> &url::Url {
        &self.url
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

impl<H: HttpClient, S: Sleeper> HttpStatusFetcher<H, S> {
    fn build_request(&self) -> HttpRequest {
        HttpRequest::get(self.url.clone())
            .with_header(CONNECTION, HeaderValue::from_static("close"))
            .with_basic_auth(self.auth.clone())
    }

    /// Executes a single attempt.
    async fn execute_request(&self, request: &HttpRequest) -> Result<String, AttemptError> {
        let response = self.client.request(request.clone()).await?;

        if !response.is_success() {
            return Err(AttemptError::Status {
                status: response.status,
            });
        }

        Ok(response.text())
    }

    async fn fetch_with_retry(&self) -> Result<String, FetchError> {
        let request = self.build_request();
        let mut attempt_index = 0;

        loop {
            let error = match self.execute_request(&request).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            if !error.is_retryable() {
                return Err(FetchError::Permanent {
                    endpoint: self.url.clone(),
                    source: error,
                });
            }

            match self.retry_policy.next_step(attempt_index) {
                RetryStep::BackOff(delay) => {
                    tracing::warn!(
                        "Attempt {} against {} failed ({error}), retrying in {}ms",
                        attempt_index + 1,
                        self.url,
                        delay.as_millis(),
                    );
                    self.sleeper.sleep(delay).await;
                    attempt_index += 1;
                }
                RetryStep::Exhausted => {
                    return Err(FetchError::RetriesExhausted {
                        endpoint: self.url.clone(),
                        attempts: attempt_index + 1,
                        last_error: error,
                    });
                }
            }
        }
    }
}

impl<H: HttpClient, S: Sleeper> StatusFetcher for HttpStatusFetcher<H, S> {
    async fn fetch(&self) -> Result<String, FetchError> {
        self.fetch_with_retry().await
    }
}

/// Extension trait for checking if an error is retryable.
pub trait IsRetryable {
    /// Returns true if the error is potentially transient and should be retried.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for HttpError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            Self::InvalidUrl(_) => false,
        }
    }
}

impl IsRetryable for AttemptError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_retryable(),
            // The controller answers 401 while it reboots or when a session
            // is stuck; every status goes through the budget.
            Self::Status { .. } => true,
        }
    }
}
