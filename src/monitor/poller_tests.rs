//! Tests for `Poller`.

use super::{DEFAULT_POLL_INTERVAL, PollError, Poller, PollerState};
use crate::controller::{
    AttemptError, BasicAuth, FetchError, HttpClient, HttpError, HttpRequest, HttpResponse,
    HttpStatusFetcher, StatusFetcher,
};
use crate::events::SensorEvents;
use crate::scrape::fixtures::{LOGIN_PAGE, alarming_row, healthy_page, page, sensor_row};
use crate::time::InstantSleeper;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An event observed by a test subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Seen {
    Added(String),
    Removed(String),
    Reading(String),
}

type Log = Arc<Mutex<Vec<Seen>>>;

/// Subscribes to all three channels and records events in arrival order.
fn record(events: &SensorEvents) -> Log {
    let log: Log = Arc::default();

    let sink = Arc::clone(&log);
    events.added.subscribe(move |name: &String| {
        sink.lock().unwrap().push(Seen::Added(name.clone()));
        Ok(())
    });
    let sink = Arc::clone(&log);
    events.removed.subscribe(move |name: &String| {
        sink.lock().unwrap().push(Seen::Removed(name.clone()));
        Ok(())
    });
    let sink = Arc::clone(&log);
    events.readings.subscribe(move |reading| {
        sink.lock().unwrap().push(Seen::Reading(reading.name.clone()));
        Ok(())
    });

    log
}

fn drain(log: &Log) -> Vec<Seen> {
    std::mem::take(&mut *log.lock().unwrap())
}

fn added(name: &str) -> Seen {
    Seen::Added(name.to_string())
}

fn removed(name: &str) -> Seen {
    Seen::Removed(name.to_string())
}

fn reading(name: &str) -> Seen {
    Seen::Reading(name.to_string())
}

fn exhausted() -> FetchError {
    FetchError::RetriesExhausted {
        endpoint: url::Url::parse("http://alarm.local/z").unwrap(),
        attempts: 4,
        last_error: AttemptError::Http(HttpError::Timeout),
    }
}

/// Fetcher that serves a scripted sequence of pages.
///
/// Once the script runs out it keeps serving `fallback`, or fails if
/// there is none. Tracks how many fetches overlap.
#[derive(Default)]
struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<String, FetchError>>>,
    fallback: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(script: Vec<Result<String, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    fn repeating(page: String, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            fallback: Some(page),
            delay,
            ..Self::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StatusFetcher for Arc<ScriptedFetcher> {
    async fn fetch(&self) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        self.active.fetch_sub(1, Ordering::SeqCst);
        next.unwrap_or_else(|| self.fallback.clone().ok_or_else(exhausted))
    }
}

mod cycle {
    use super::*;

    #[tokio::test]
    async fn first_cycle_announces_every_sensor() {
        let fetcher = ScriptedFetcher::new(vec![Ok(healthy_page(&["Door", "Window"]))]);
        let poller = Poller::new(fetcher, DEFAULT_POLL_INTERVAL);
        let log = record(poller.events());

        let report = poller.poll_once().await.unwrap();

        assert_eq!(
            drain(&log),
            vec![
                added("Door"),
                added("Window"),
                reading("Door"),
                reading("Window")
            ]
        );
        assert_eq!(report.readings.len(), 2);
        assert_eq!(report.changes.added, vec!["Door", "Window"]);
        assert_eq!(poller.known_sensors().await, vec!["Door", "Window"]);
    }

    #[tokio::test]
    async fn unchanged_membership_only_publishes_readings() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(healthy_page(&["A", "B"])),
            Ok(healthy_page(&["A", "B"])),
        ]);
        let poller = Poller::new(fetcher, DEFAULT_POLL_INTERVAL);
        let log = record(poller.events());

        poller.poll_once().await.unwrap();
        drain(&log);
        let report = poller.poll_once().await.unwrap();

        assert!(report.changes.is_empty());
        assert_eq!(drain(&log), vec![reading("A"), reading("B")]);
    }

    #[tokio::test]
    async fn removals_precede_additions_precede_readings() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(healthy_page(&["A", "B"])),
            Ok(healthy_page(&["B", "C"])),
        ]);
        let poller = Poller::new(fetcher, DEFAULT_POLL_INTERVAL);
        let log = record(poller.events());

        poller.poll_once().await.unwrap();
        drain(&log);
        poller.poll_once().await.unwrap();

        assert_eq!(
            drain(&log),
            vec![removed("A"), added("C"), reading("B"), reading("C")]
        );
        assert_eq!(poller.known_sensors().await, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn same_size_swap_is_reported() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(healthy_page(&["A", "B", "C"])),
            Ok(healthy_page(&["A", "B", "D"])),
        ]);
        let poller = Poller::new(fetcher, DEFAULT_POLL_INTERVAL);

        poller.poll_once().await.unwrap();
        let report = poller.poll_once().await.unwrap();

        assert_eq!(report.changes.added, vec!["D"]);
        assert_eq!(report.changes.removed, vec!["C"]);
    }

    #[tokio::test]
    async fn fetch_failure_publishes_nothing_and_keeps_known_sensors() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(healthy_page(&["A", "B"])),
            Err(exhausted()),
            Ok(healthy_page(&["B", "C"])),
        ]);
        let poller = Poller::new(fetcher, DEFAULT_POLL_INTERVAL);
        let log = record(poller.events());

        poller.poll_once().await.unwrap();
        drain(&log);

        let error = poller.poll_once().await.unwrap_err();
        assert!(matches!(error, PollError::Fetch(_)));
        assert!(drain(&log).is_empty());
        assert_eq!(poller.known_sensors().await, vec!["A", "B"]);

        // The next good cycle diffs against the last good state.
        let report = poller.poll_once().await.unwrap();
        assert_eq!(report.changes.added, vec!["C"]);
        assert_eq!(report.changes.removed, vec!["A"]);
    }

    #[tokio::test]
    async fn unexpected_page_publishes_nothing() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(healthy_page(&["A"])),
            Ok(LOGIN_PAGE.to_string()),
        ]);
        let poller = Poller::new(fetcher, DEFAULT_POLL_INTERVAL);
        let log = record(poller.events());

        poller.poll_once().await.unwrap();
        drain(&log);

        let error = poller.poll_once().await.unwrap_err();
        assert!(matches!(error, PollError::Scrape(_)));
        assert!(drain(&log).is_empty());
        assert_eq!(poller.known_sensors().await, vec!["A"]);
    }

    #[tokio::test]
    async fn bad_duration_rejects_whole_page() {
        let bad = page(&[
            sensor_row(1, "A", "0d, 0:0:30", "-"),
            sensor_row(2, "B", "garbage", "-"),
        ]);
        let fetcher = ScriptedFetcher::new(vec![Ok(bad)]);
        let poller = Poller::new(fetcher, DEFAULT_POLL_INTERVAL);
        let log = record(poller.events());

        assert!(matches!(
            poller.poll_once().await,
            Err(PollError::Scrape(_))
        ));
        assert!(drain(&log).is_empty());
        assert!(poller.known_sensors().await.is_empty());
    }

    #[tokio::test]
    async fn reading_events_carry_derived_state() {
        let fetcher = ScriptedFetcher::new(vec![Ok(page(&[
            alarming_row(1, "Garage", "0d, 0:1:00"),
            sensor_row(2, "Porch", "0d, 0:0:5", "-"),
        ]))]);
        let poller = Poller::new(fetcher, DEFAULT_POLL_INTERVAL);
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        poller.events().readings.subscribe(move |r| {
            sink.lock().unwrap().push((r.alarming, r.note.clone()));
            Ok(())
        });

        poller.poll_once().await.unwrap();

        assert_eq!(
            *states.lock().unwrap(),
            vec![
                (true, "Actively alarming".to_string()),
                (true, "OK for: 5".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn failing_subscriber_does_not_abort_cycle() {
        let fetcher = ScriptedFetcher::new(vec![Ok(healthy_page(&["A", "B"]))]);
        let poller = Poller::new(fetcher, DEFAULT_POLL_INTERVAL);
        poller
            .events()
            .added
            .subscribe(|_: &String| Err("consumer offline".into()));
        let log = record(poller.events());

        poller.poll_once().await.unwrap();

        assert_eq!(drain(&log).len(), 4);
        assert_eq!(poller.known_sensors().await, vec!["A", "B"]);
    }
}

mod scheduling {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn waits_one_period_before_first_cycle() {
        let fetcher = ScriptedFetcher::repeating(healthy_page(&["A"]), Duration::ZERO);
        let poller = Poller::new(Arc::clone(&fetcher), Duration::from_secs(10));

        assert!(poller.start());
        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(fetcher.calls(), 0);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(fetcher.calls(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fetcher.calls(), 2);

        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let fetcher = ScriptedFetcher::repeating(healthy_page(&["A"]), Duration::ZERO);
        let poller = Poller::new(Arc::clone(&fetcher), Duration::from_secs(10));

        assert!(poller.start());
        assert!(!poller.start());
        tokio::time::sleep(Duration::from_millis(10_500)).await;

        // A second scheduler would have doubled the call count.
        assert_eq!(fetcher.calls(), 1);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_halts_polling() {
        let fetcher = ScriptedFetcher::repeating(healthy_page(&["A"]), Duration::ZERO);
        let poller = Poller::new(Arc::clone(&fetcher), Duration::from_secs(10));

        assert!(!poller.stop());
        poller.start();
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert!(poller.stop());
        assert!(!poller.stop());
        assert_eq!(poller.state(), PollerState::Stopped);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cycles_never_overlap() {
        let fetcher = ScriptedFetcher::repeating(healthy_page(&["A"]), Duration::from_secs(25));
        let poller = Poller::new(Arc::clone(&fetcher), Duration::from_secs(10));

        poller.start();
        tokio::time::sleep(Duration::from_secs(100)).await;
        poller.stop();

        // Cycles start at 10s, 45s and 80s.
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(fetcher.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_lets_in_flight_cycle_finish() {
        let fetcher = ScriptedFetcher::repeating(healthy_page(&["A", "B"]), Duration::from_secs(5));
        let poller = Poller::new(Arc::clone(&fetcher), Duration::from_secs(10));
        let log = record(poller.events());

        poller.start();
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(poller.state(), PollerState::Cycling);

        assert!(poller.stop());
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(
            drain(&log),
            vec![added("A"), added("B"), reading("A"), reading("B")]
        );
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(poller.state(), PollerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cycles_do_not_stop_the_scheduler() {
        let fetcher = ScriptedFetcher::new(vec![Err(exhausted()), Ok(healthy_page(&["A"]))]);
        let poller = Poller::new(Arc::clone(&fetcher), Duration::from_secs(10));
        let log = record(poller.events());

        poller.start();
        tokio::time::sleep(Duration::from_millis(20_500)).await;
        poller.stop();

        assert_eq!(fetcher.calls(), 2);
        assert_eq!(drain(&log), vec![added("A"), reading("A")]);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_resumes_polling() {
        let fetcher = ScriptedFetcher::repeating(healthy_page(&["A"]), Duration::ZERO);
        let poller = Poller::new(Arc::clone(&fetcher), Duration::from_secs(10));

        poller.start();
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        poller.stop();
        assert!(poller.start());
        assert!(poller.is_running());
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        poller.stop();

        assert_eq!(fetcher.calls(), 2);
    }

    #[test]
    fn debug_shows_interval() {
        let poller = Poller::new(ScriptedFetcher::new(vec![]), Duration::from_secs(7));
        let debug = format!("{poller:?}");
        assert!(debug.contains("Poller"));
        assert!(debug.contains("7s"));
        assert_eq!(poller.interval(), Duration::from_secs(7));
        assert_eq!(poller.state(), PollerState::Stopped);
    }
}

mod with_http_fetcher {
    use super::*;

    /// HTTP client serving a scripted sequence of responses.
    struct MockHttp {
        responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        calls: AtomicUsize,
    }

    impl MockHttp {
        fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl HttpClient for Arc<MockHttp> {
        async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(HttpError::Timeout))
        }
    }

    fn poller(client: &Arc<MockHttp>) -> Poller<HttpStatusFetcher<Arc<MockHttp>, InstantSleeper>> {
        let endpoint = url::Url::parse("http://alarm.local").unwrap();
        let fetcher = HttpStatusFetcher::new(
            Arc::clone(client),
            &endpoint,
            BasicAuth::new("admin", "secret"),
        )
        .with_sleeper(InstantSleeper);
        Poller::new(fetcher, DEFAULT_POLL_INTERVAL)
    }

    #[tokio::test]
    async fn transient_failures_within_budget_are_invisible() {
        let client = MockHttp::new(vec![
            Err(HttpError::Timeout),
            Err(HttpError::Timeout),
            Ok(HttpResponse::ok_text(healthy_page(&["Door"]))),
        ]);
        let poller = poller(&client);
        let log = record(poller.events());

        poller.poll_once().await.unwrap();

        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
        assert_eq!(drain(&log), vec![added("Door"), reading("Door")]);
    }

    #[tokio::test]
    async fn exhausted_retries_skip_the_cycle() {
        let client = MockHttp::new(vec![Ok(HttpResponse::ok_text(healthy_page(&["Door"])))]);
        let poller = poller(&client);
        let log = record(poller.events());
        poller.poll_once().await.unwrap();
        drain(&log);

        let error = poller.poll_once().await.unwrap_err();

        let PollError::Fetch(fetch) = &error else {
            panic!("expected fetch error, got {error:?}");
        };
        assert_eq!(fetch.attempts(), 4);
        assert!(error.to_string().contains("http://alarm.local/z"));
        assert!(drain(&log).is_empty());
        assert_eq!(poller.known_sensors().await, vec!["Door"]);
        // One good request plus four attempts for the failed cycle.
        assert_eq!(client.calls.load(Ordering::SeqCst), 5);
    }
}
