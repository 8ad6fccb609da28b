//! Tests for `Subscribers` and `SensorEvents`.

use super::*;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(
    log: &Log,
    label: &'static str,
) -> impl Fn(&String) -> Result<(), HandlerError> + Send + Sync + use<> {
    let log = Arc::clone(log);
    move |event: &String| {
        log.lock().unwrap().push(format!("{label}:{event}"));
        Ok(())
    }
}

mod delivery {
    use super::*;

    #[test]
    fn emits_to_all_subscribers_in_subscription_order() {
        let subscribers = Subscribers::new("test");
        let log = Log::default();
        subscribers.subscribe(recorder(&log, "first"));
        subscribers.subscribe(recorder(&log, "second"));
        subscribers.subscribe(recorder(&log, "third"));

        let delivered = subscribers.emit(&"x".to_string());

        assert_eq!(delivered, 3);
        assert_eq!(*log.lock().unwrap(), vec!["first:x", "second:x", "third:x"]);
    }

    #[test]
    fn emit_without_subscribers_is_noop() {
        let subscribers: Subscribers<String> = Subscribers::new("test");
        assert_eq!(subscribers.emit(&"x".to_string()), 0);
        assert!(subscribers.is_empty());
    }

    #[test]
    fn late_subscriber_does_not_see_past_events() {
        let subscribers = Subscribers::new("test");
        let log = Log::default();

        subscribers.emit(&"before".to_string());
        subscribers.subscribe(recorder(&log, "late"));
        subscribers.emit(&"after".to_string());

        assert_eq!(*log.lock().unwrap(), vec!["late:after"]);
    }

    #[test]
    fn channels_are_independent() {
        let events = SensorEvents::new();
        let log = Log::default();
        events.added.subscribe(recorder(&log, "added"));
        events.removed.subscribe(recorder(&log, "removed"));

        events.removed.emit(&"A".to_string());

        assert_eq!(*log.lock().unwrap(), vec!["removed:A"]);
        assert_eq!(events.added.len(), 1);
        assert!(events.readings.is_empty());
    }

    #[test]
    fn readings_channel_carries_typed_payload() {
        let events = SensorEvents::default();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        events.readings.subscribe(move |reading: &SensorReading| {
            sink.lock().unwrap().push(reading.clone());
            Ok(())
        });

        let reading = SensorReading::new("Door", true, "Actively alarming");
        events.readings.emit(&reading);

        assert_eq!(*received.lock().unwrap(), vec![reading]);
    }
}

mod failure_isolation {
    use super::*;

    #[test]
    fn failing_subscriber_does_not_block_others() {
        let subscribers = Subscribers::new("test");
        let log = Log::default();
        subscribers.subscribe(recorder(&log, "first"));
        subscribers.subscribe(|_: &String| Err("device offline".into()));
        subscribers.subscribe(recorder(&log, "third"));

        let delivered = subscribers.emit(&"x".to_string());

        assert_eq!(delivered, 2);
        assert_eq!(*log.lock().unwrap(), vec!["first:x", "third:x"]);
    }

    #[test]
    fn panicking_subscriber_does_not_block_others() {
        let subscribers = Subscribers::new("test");
        let log = Log::default();
        subscribers.subscribe(|_: &String| panic!("subscriber bug"));
        subscribers.subscribe(recorder(&log, "second"));

        let delivered = subscribers.emit(&"x".to_string());

        assert_eq!(delivered, 1);
        assert_eq!(*log.lock().unwrap(), vec!["second:x"]);
    }

    #[test]
    fn failing_subscriber_still_receives_later_events() {
        let subscribers = Subscribers::new("test");
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        subscribers.subscribe(move |_: &String| {
            *counter.lock().unwrap() += 1;
            Err("always fails".into())
        });

        subscribers.emit(&"a".to_string());
        subscribers.emit(&"b".to_string());

        assert_eq!(*calls.lock().unwrap(), 2);
    }
}

mod subscription_management {
    use super::*;

    #[test]
    fn unsubscribe_stops_delivery() {
        let subscribers = Subscribers::new("test");
        let log = Log::default();
        let id = subscribers.subscribe(recorder(&log, "gone"));
        subscribers.subscribe(recorder(&log, "kept"));

        assert!(subscribers.unsubscribe(id));
        subscribers.emit(&"x".to_string());

        assert_eq!(*log.lock().unwrap(), vec!["kept:x"]);
    }

    #[test]
    fn unsubscribe_unknown_id_returns_false() {
        let subscribers = Subscribers::new("test");
        let log = Log::default();
        let id = subscribers.subscribe(recorder(&log, "a"));

        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
    }

    #[test]
    fn subscriber_may_subscribe_during_emit() {
        let subscribers = Arc::new(Subscribers::new("test"));
        let log = Log::default();
        let inner = Arc::clone(&subscribers);
        let inner_log = Arc::clone(&log);
        subscribers.subscribe(move |_: &String| {
            inner.subscribe(recorder(&inner_log, "nested"));
            Ok(())
        });

        subscribers.emit(&"first".to_string());
        assert!(log.lock().unwrap().is_empty());

        subscribers.emit(&"second".to_string());
        assert_eq!(*log.lock().unwrap(), vec!["nested:second"]);
    }

    #[test]
    fn debug_shows_kind_and_count() {
        let subscribers: Subscribers<String> = Subscribers::new("sensor-added");
        subscribers.subscribe(|_| Ok(()));
        let rendered = format!("{subscribers:?}");
        assert!(rendered.contains("sensor-added"));
        assert!(rendered.contains("len: 1"));
    }

    #[test]
    fn sensor_events_channels_are_named() {
        let events = SensorEvents::new();
        assert_eq!(events.added.kind(), "sensor-added");
        assert_eq!(events.removed.kind(), "sensor-removed");
        assert_eq!(events.readings.kind(), "reading-updated");
    }
}
