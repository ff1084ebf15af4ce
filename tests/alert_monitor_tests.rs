use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use stockwatch::{
    error::{NotifyError, QuoteError},
    models::{Alert, Direction, NewAlert, Quote},
    services::{
        alert_monitor::{spawn_price_alert_monitor, AlertMonitor, MonitorOptions, TickReport},
        alert_store::AlertStore,
        notifier::Notifier,
        quote_source::QuoteSource,
    },
};

enum Scripted {
    Price(f64),
    Fail,
    Slow(f64, Duration),
}

/// Quote source answering from a fixed table and counting lookups per symbol.
#[derive(Default)]
struct FakeQuotes {
    table: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeQuotes {
    fn with(entries: Vec<(&str, Scripted)>) -> Arc<Self> {
        let table = entries.into_iter().map(|(s, v)| (s.to_string(), v)).collect();
        Arc::new(Self {
            table: Mutex::new(table),
            calls: Mutex::new(HashMap::new()),
        })
    }

    fn set(&self, symbol: &str, v: Scripted) {
        self.table.lock().unwrap().insert(symbol.to_string(), v);
    }

    fn calls(&self, symbol: &str) -> usize {
        self.calls.lock().unwrap().get(symbol).copied().unwrap_or(0)
    }
}

fn quote(price: f64) -> Quote {
    Quote { c: price, d: 0.0, dp: 0.0, h: price, l: price, o: price, pc: price, t: 0 }
}

#[async_trait]
impl QuoteSource for FakeQuotes {
    async fn quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        *self.calls.lock().unwrap().entry(symbol.to_string()).or_default() += 1;

        let scripted = match self.table.lock().unwrap().get(symbol) {
            Some(Scripted::Price(p)) => Ok(*p),
            Some(Scripted::Slow(p, d)) => Err((*p, *d)),
            Some(Scripted::Fail) | None => {
                return Err(QuoteError::Other(format!("no quote for {symbol}")));
            }
        };

        match scripted {
            Ok(p) => Ok(quote(p)),
            Err((p, d)) => {
                tokio::time::sleep(d).await;
                Ok(quote(p))
            }
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Records every send; optionally fails for one recipient.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, f64)>>,
    fail_for: Option<String>,
    delay: Option<Duration>,
    // remaining forced failures, across all recipients
    fail_times: Mutex<usize>,
}

impl RecordingNotifier {
    fn failing_for(email: &str) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_for: Some(email.to_string()),
            ..Self::default()
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    fn failing_once() -> Arc<Self> {
        Arc::new(Self {
            fail_times: Mutex::new(1),
            ..Self::default()
        })
    }

    fn sent(&self) -> Vec<(String, f64)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, alert: &Alert, current_price: f64) -> Result<(), NotifyError> {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        {
            let mut left = self.fail_times.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(NotifyError::Other("transient".to_string()));
            }
        }
        if self.fail_for.as_deref() == Some(alert.email.as_str()) {
            return Err(NotifyError::Other("smtp down".to_string()));
        }
        self.sent.lock().unwrap().push((alert.id.clone(), current_price));
        Ok(())
    }
}

fn new_alert(symbol: &str, threshold: f64, direction: Direction, email: &str) -> NewAlert {
    NewAlert {
        user_id: "demo-user".to_string(),
        symbol: symbol.to_string(),
        threshold,
        direction,
        email: email.to_string(),
    }
}

fn monitor(
    store: &AlertStore,
    quotes: Arc<FakeQuotes>,
    notifier: Arc<RecordingNotifier>,
    opts: MonitorOptions,
) -> AlertMonitor {
    AlertMonitor::new(store.clone(), quotes, notifier, opts)
}

#[tokio::test]
async fn create_then_tick_notifies_once_with_current_price() {
    let store = AlertStore::new();
    let alert = store
        .create(new_alert("AAPL", 150.0, Direction::Above, "a@b.com"))
        .await;

    let quotes = FakeQuotes::with(vec![("AAPL", Scripted::Price(151.0))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let m = monitor(&store, quotes, notifier.clone(), MonitorOptions::default());

    let report = m.run_tick().await;

    assert_eq!(notifier.sent(), vec![(alert.id, 151.0)]);
    assert_eq!(report.notified, 1);
    assert_eq!(report.crossed, 1);
}

#[tokio::test]
async fn above_threshold_is_strict() {
    for (price, expected) in [(100.01, 1), (100.00, 0), (99.99, 0)] {
        let store = AlertStore::new();
        store
            .create(new_alert("IDX", 100.0, Direction::Above, "a@b.com"))
            .await;

        let quotes = FakeQuotes::with(vec![("IDX", Scripted::Price(price))]);
        let notifier = Arc::new(RecordingNotifier::default());
        monitor(&store, quotes, notifier.clone(), MonitorOptions::default())
            .run_tick()
            .await;

        assert_eq!(notifier.sent().len(), expected, "price {price}");
    }
}

#[tokio::test]
async fn below_threshold_is_strict() {
    for (price, expected) in [(49.99, 1), (50.00, 0)] {
        let store = AlertStore::new();
        store
            .create(new_alert("IDX", 50.0, Direction::Below, "a@b.com"))
            .await;

        let quotes = FakeQuotes::with(vec![("IDX", Scripted::Price(price))]);
        let notifier = Arc::new(RecordingNotifier::default());
        monitor(&store, quotes, notifier.clone(), MonitorOptions::default())
            .run_tick()
            .await;

        assert_eq!(notifier.sent().len(), expected, "price {price}");
    }
}

#[tokio::test]
async fn inactive_alerts_are_never_looked_up() {
    let store = AlertStore::new();
    let alert = store
        .create(new_alert("TSLA", 10.0, Direction::Above, "a@b.com"))
        .await;
    store.toggle(&alert.id, "demo-user").await;

    let quotes = FakeQuotes::with(vec![("TSLA", Scripted::Price(1000.0))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let report = monitor(&store, quotes.clone(), notifier.clone(), MonitorOptions::default())
        .run_tick()
        .await;

    assert_eq!(report, TickReport::default());
    assert_eq!(quotes.calls("TSLA"), 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn quote_failure_is_isolated_to_its_alert() {
    let store = AlertStore::new();
    store
        .create(new_alert("BAD", 10.0, Direction::Above, "a@b.com"))
        .await;
    let good = store
        .create(new_alert("GOOD", 10.0, Direction::Above, "c@d.com"))
        .await;

    let quotes = FakeQuotes::with(vec![("BAD", Scripted::Fail), ("GOOD", Scripted::Price(11.0))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let report = monitor(&store, quotes, notifier.clone(), MonitorOptions::default())
        .run_tick()
        .await;

    assert_eq!(notifier.sent(), vec![(good.id, 11.0)]);
    assert_eq!(report.quote_failures, 1);
    assert_eq!(report.notified, 1);
}

#[tokio::test]
async fn zero_price_counts_as_quote_failure() {
    let store = AlertStore::new();
    store
        .create(new_alert("NOPE", 10.0, Direction::Below, "a@b.com"))
        .await;

    let quotes = FakeQuotes::with(vec![("NOPE", Scripted::Price(0.0))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let report = monitor(&store, quotes, notifier.clone(), MonitorOptions::default())
        .run_tick()
        .await;

    assert_eq!(report.quote_failures, 1);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn notifier_failure_does_not_abort_pass() {
    let store = AlertStore::new();
    store
        .create(new_alert("AAPL", 100.0, Direction::Above, "broken@b.com"))
        .await;
    let ok = store
        .create(new_alert("AAPL", 100.0, Direction::Above, "fine@b.com"))
        .await;

    let quotes = FakeQuotes::with(vec![("AAPL", Scripted::Price(120.0))]);
    let notifier = RecordingNotifier::failing_for("broken@b.com");
    let report = monitor(&store, quotes, notifier.clone(), MonitorOptions::default())
        .run_tick()
        .await;

    assert_eq!(report.crossed, 2);
    assert_eq!(report.notify_failures, 1);
    assert_eq!(notifier.sent(), vec![(ok.id, 120.0)]);
}

#[tokio::test]
async fn still_crossed_alert_fires_every_tick() {
    let store = AlertStore::new();
    store
        .create(new_alert("AAPL", 100.0, Direction::Above, "a@b.com"))
        .await;

    let quotes = FakeQuotes::with(vec![("AAPL", Scripted::Price(101.0))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let m = monitor(&store, quotes, notifier.clone(), MonitorOptions::default());

    m.run_tick().await;
    m.run_tick().await;

    assert_eq!(notifier.sent().len(), 2);
}

#[tokio::test]
async fn cooldown_suppresses_repeat_notifications() {
    let store = AlertStore::new();
    store
        .create(new_alert("AAPL", 100.0, Direction::Above, "a@b.com"))
        .await;

    let quotes = FakeQuotes::with(vec![("AAPL", Scripted::Price(101.0))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let opts = MonitorOptions {
        cooldown: Some(Duration::from_secs(3600)),
        ..MonitorOptions::default()
    };
    let m = monitor(&store, quotes, notifier.clone(), opts);

    m.run_tick().await;
    let second = m.run_tick().await;

    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(second.crossed, 1);
    assert_eq!(second.suppressed, 1);
}

#[tokio::test]
async fn overlapping_passes_send_once_within_cooldown() {
    let store = AlertStore::new();
    store
        .create(new_alert("AAPL", 100.0, Direction::Above, "a@b.com"))
        .await;

    let quotes = FakeQuotes::with(vec![("AAPL", Scripted::Price(101.0))]);
    let notifier = RecordingNotifier::slow(Duration::from_millis(100));
    let opts = MonitorOptions {
        cooldown: Some(Duration::from_secs(3600)),
        ..MonitorOptions::default()
    };
    let m = monitor(&store, quotes, notifier.clone(), opts);

    let (a, b) = tokio::join!(m.run_tick(), m.run_tick());

    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(a.notified + b.notified, 1);
    assert_eq!(a.suppressed + b.suppressed, 1);
}

#[tokio::test]
async fn failed_send_does_not_start_cooldown() {
    let store = AlertStore::new();
    let alert = store
        .create(new_alert("AAPL", 100.0, Direction::Above, "a@b.com"))
        .await;

    let quotes = FakeQuotes::with(vec![("AAPL", Scripted::Price(101.0))]);
    let notifier = RecordingNotifier::failing_once();
    let opts = MonitorOptions {
        cooldown: Some(Duration::from_secs(3600)),
        ..MonitorOptions::default()
    };
    let m = monitor(&store, quotes, notifier.clone(), opts);

    let first = m.run_tick().await;
    let second = m.run_tick().await;

    assert_eq!(first.notify_failures, 1);
    assert_eq!(second.notified, 1);
    assert_eq!(notifier.sent(), vec![(alert.id, 101.0)]);
}

#[tokio::test]
async fn toggled_off_alert_drops_out_next_tick_but_stays_stored() {
    let store = AlertStore::new();
    let alert = store
        .create(new_alert("AAPL", 100.0, Direction::Above, "a@b.com"))
        .await;

    let quotes = FakeQuotes::with(vec![("AAPL", Scripted::Price(101.0))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let m = monitor(&store, quotes.clone(), notifier.clone(), MonitorOptions::default());

    m.run_tick().await;
    store.toggle(&alert.id, "demo-user").await;
    m.run_tick().await;

    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(quotes.calls("AAPL"), 1);
    assert!(store.get(&alert.id).await.is_some());
}

#[tokio::test]
async fn price_moving_back_stops_notifications() {
    let store = AlertStore::new();
    store
        .create(new_alert("AAPL", 100.0, Direction::Above, "a@b.com"))
        .await;

    let quotes = FakeQuotes::with(vec![("AAPL", Scripted::Price(101.0))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let m = monitor(&store, quotes.clone(), notifier.clone(), MonitorOptions::default());

    m.run_tick().await;
    quotes.set("AAPL", Scripted::Price(99.0));
    m.run_tick().await;

    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn slow_quote_times_out_as_per_alert_failure() {
    let store = AlertStore::new();
    store
        .create(new_alert("SLOW", 10.0, Direction::Above, "a@b.com"))
        .await;
    store
        .create(new_alert("FAST", 10.0, Direction::Above, "c@d.com"))
        .await;

    let quotes = FakeQuotes::with(vec![
        ("SLOW", Scripted::Slow(20.0, Duration::from_secs(5))),
        ("FAST", Scripted::Price(20.0)),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let opts = MonitorOptions {
        quote_timeout: Duration::from_millis(50),
        ..MonitorOptions::default()
    };
    let report = monitor(&store, quotes, notifier.clone(), opts).run_tick().await;

    assert_eq!(report.quote_failures, 1);
    assert_eq!(report.notified, 1);
}

#[tokio::test]
async fn empty_store_is_a_no_op() {
    let store = AlertStore::new();
    let quotes = FakeQuotes::with(vec![]);
    let notifier = Arc::new(RecordingNotifier::default());

    let report = monitor(&store, quotes, notifier.clone(), MonitorOptions::default())
        .run_tick()
        .await;

    assert_eq!(report, TickReport::default());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn scheduler_keeps_ticking_and_sees_new_alerts() {
    let store = AlertStore::new();
    let quotes = FakeQuotes::with(vec![("AAPL", Scripted::Price(151.0))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let m = Arc::new(monitor(&store, quotes, notifier.clone(), MonitorOptions::default()));

    let handle = spawn_price_alert_monitor(m, Duration::from_millis(40));

    tokio::time::sleep(Duration::from_millis(60)).await;
    store
        .create(new_alert("AAPL", 150.0, Direction::Above, "a@b.com"))
        .await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.abort();

    assert!(notifier.sent().len() >= 2, "sent {:?}", notifier.sent());
}
