use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use futures_util::{stream, StreamExt};
use tokio::{task::JoinHandle, time};

use crate::{
    error::{NotifyError, QuoteError},
    models::Alert,
};

use super::{alert_store::AlertStore, notifier::Notifier, quote_source::QuoteSource};

#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub concurrency: usize,
    pub quote_timeout: Duration,
    pub notify_timeout: Duration,
    // None => notify on every tick while crossed
    pub cooldown: Option<Duration>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            quote_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(10),
            cooldown: None,
        }
    }
}

/// Counts for one pass over the store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub active: usize,
    pub crossed: usize,
    pub notified: usize,
    pub suppressed: usize,
    pub quote_failures: usize,
    pub notify_failures: usize,
}

enum Outcome {
    Quiet,
    Notified,
    Suppressed,
    QuoteFailed,
    NotifyFailed,
}

pub struct AlertMonitor {
    store: AlertStore,
    quotes: Arc<dyn QuoteSource>,
    notifier: Arc<dyn Notifier>,
    opts: MonitorOptions,
    // alert id => start of the latest claimed send, only used with a cooldown
    last_sent: Mutex<HashMap<String, Instant>>,
}

impl AlertMonitor {
    pub fn new(
        store: AlertStore,
        quotes: Arc<dyn QuoteSource>,
        notifier: Arc<dyn Notifier>,
        opts: MonitorOptions,
    ) -> Self {
        Self {
            store,
            quotes,
            notifier,
            opts,
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    /// One full pass over the active alerts. Never fails: quote and notify
    /// errors are logged and counted per alert.
    pub async fn run_tick(&self) -> TickReport {
        let active: Vec<Alert> = self
            .store
            .current()
            .await
            .into_iter()
            .filter(|a| a.active)
            .collect();

        let mut report = TickReport {
            active: active.len(),
            ..TickReport::default()
        };

        if active.is_empty() {
            tracing::debug!("no active alerts to process");
            return report;
        }

        tracing::info!(count = active.len(), source = self.quotes.name(), "processing active alerts");

        let outcomes: Vec<Outcome> = stream::iter(active)
            .map(|alert| async move { self.evaluate(&alert).await })
            .buffer_unordered(self.opts.concurrency.max(1))
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Outcome::Quiet => {}
                Outcome::Notified => {
                    report.crossed += 1;
                    report.notified += 1;
                }
                Outcome::Suppressed => {
                    report.crossed += 1;
                    report.suppressed += 1;
                }
                Outcome::QuoteFailed => report.quote_failures += 1,
                Outcome::NotifyFailed => {
                    report.crossed += 1;
                    report.notify_failures += 1;
                }
            }
        }

        tracing::info!(?report, "alert tick complete");
        report
    }

    async fn evaluate(&self, alert: &Alert) -> Outcome {
        let price = match self.fetch_price(&alert.symbol).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(alert_id = %alert.id, symbol = %alert.symbol, error = %e, "error processing alert");
                return Outcome::QuoteFailed;
            }
        };

        if !alert.is_crossed(price) {
            return Outcome::Quiet;
        }

        tracing::info!(
            alert_id = %alert.id,
            symbol = %alert.symbol,
            price,
            direction = alert.direction.as_str(),
            threshold = alert.threshold,
            "threshold crossed"
        );

        let claim = match self.claim_slot(&alert.id) {
            Some(claim) => claim,
            None => {
                tracing::debug!(alert_id = %alert.id, "notification suppressed by cooldown");
                return Outcome::Suppressed;
            }
        };

        match self.notify(alert, price).await {
            Ok(()) => Outcome::Notified,
            Err(e) => {
                self.release_slot(&alert.id, claim);
                tracing::error!(alert_id = %alert.id, to = %alert.email, error = %e, "error sending alert notification");
                Outcome::NotifyFailed
            }
        }
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        let quote = time::timeout(self.opts.quote_timeout, self.quotes.quote(symbol))
            .await
            .map_err(|_| QuoteError::Timeout {
                symbol: symbol.to_string(),
                secs: self.opts.quote_timeout.as_secs(),
            })??;

        let price = quote.c;
        if !price.is_finite() || price <= 0.0 {
            return Err(QuoteError::InvalidPrice {
                symbol: symbol.to_string(),
                price,
            });
        }

        Ok(price)
    }

    async fn notify(&self, alert: &Alert, price: f64) -> Result<(), NotifyError> {
        time::timeout(self.opts.notify_timeout, self.notifier.send(alert, price))
            .await
            .map_err(|_| NotifyError::Timeout {
                recipient: alert.email.clone(),
                secs: self.opts.notify_timeout.as_secs(),
            })?
    }

    /// Reserve the right to notify for `id`. Check and record happen under
    /// one lock, so overlapping passes cannot both send inside the window.
    /// Returns the claim time, or None while the alert is muted.
    fn claim_slot(&self, id: &str) -> Option<Option<Instant>> {
        let Some(cooldown) = self.opts.cooldown else {
            return Some(None);
        };

        let mut sent = self.last_sent.lock().unwrap_or_else(|p| p.into_inner());
        if sent.get(id).is_some_and(|at| at.elapsed() < cooldown) {
            return None;
        }

        let now = Instant::now();
        sent.insert(id.to_string(), now);
        Some(Some(now))
    }

    // A failed send gives the slot back, unless a later claim replaced it.
    fn release_slot(&self, id: &str, claim: Option<Instant>) {
        let Some(claimed_at) = claim else {
            return;
        };

        let mut sent = self.last_sent.lock().unwrap_or_else(|p| p.into_inner());
        if sent.get(id) == Some(&claimed_at) {
            sent.remove(id);
        }
    }
}

/// Run `monitor.run_tick()` every `every`, starting immediately.
///
/// Each pass is spawned on its own task, so a pass slower than the period
/// overlaps the next one instead of delaying it. Abort the returned handle
/// to stop scheduling.
pub fn spawn_price_alert_monitor(monitor: Arc<AlertMonitor>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        tracing::info!(every_secs = every.as_secs(), "alert monitor started");

        loop {
            interval.tick().await;

            let monitor = monitor.clone();
            tokio::spawn(async move {
                monitor.run_tick().await;
            });
        }
    })
}
