//! Library entrypoint for Stockwatch.
//!
//! `main.rs` only wires things together; integration tests under `tests/`
//! build the same `AppState`, routers and monitor from here.

use std::{sync::Arc, time::Duration};

pub mod config;
pub mod error;
pub mod logging;
pub mod models;

#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

pub mod controllers;
pub mod routes;

use services::{
    alert_monitor::{AlertMonitor, MonitorOptions},
    alert_store::AlertStore,
    api_usage::ApiUsage,
    finnhub::FinnhubClient,
    notifier::{EmailNotifier, LogNotifier, Notifier},
    quote_source::{FallbackQuotes, QuoteSource},
    synthetic::SyntheticQuotes,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub alerts: AlertStore,
    pub quotes: Arc<dyn QuoteSource>,
    pub usage: ApiUsage,
}

impl AppState {
    pub fn new(settings: config::Settings) -> Self {
        let usage = ApiUsage::new();
        let quotes = build_quote_source(&settings, &usage);

        Self {
            settings,
            alerts: AlertStore::new(),
            quotes,
            usage,
        }
    }

    /// The monitor shares this state's alert store and quote source.
    pub fn alert_monitor(&self, notifier: Arc<dyn Notifier>) -> AlertMonitor {
        AlertMonitor::new(
            self.alerts.clone(),
            self.quotes.clone(),
            notifier,
            monitor_options(&self.settings),
        )
    }
}

pub fn monitor_options(settings: &config::Settings) -> MonitorOptions {
    MonitorOptions {
        concurrency: settings.alert_concurrency,
        quote_timeout: settings.quote_timeout,
        notify_timeout: settings.notify_timeout,
        cooldown: settings.alert_cooldown,
    }
}

pub fn build_quote_source(settings: &config::Settings, usage: &ApiUsage) -> Arc<dyn QuoteSource> {
    let synthetic: Arc<dyn QuoteSource> = Arc::new(SyntheticQuotes::new(settings.synthetic_seed));

    if !settings.has_finnhub_key() {
        tracing::warn!("FINNHUB_API_KEY not set, serving synthetic quotes");
        return synthetic;
    }

    let live: Arc<dyn QuoteSource> = Arc::new(FinnhubClient::new(
        settings.finnhub_api_key.clone(),
        usage.clone(),
        provider_timeout(settings),
    ));

    if settings.quote_fallback {
        Arc::new(FallbackQuotes::new(live, synthetic))
    } else {
        live
    }
}

/// Per-request bound for the live provider. With the fallback enabled it is
/// half the monitor's quote timeout, leaving the synthetic answer room to
/// arrive inside that bound.
pub fn provider_timeout(settings: &config::Settings) -> Duration {
    if settings.quote_fallback {
        settings.quote_timeout / 2
    } else {
        settings.quote_timeout
    }
}

pub fn build_notifier(settings: &config::Settings) -> Arc<dyn Notifier> {
    if settings.has_mail_relay() {
        Arc::new(EmailNotifier::new(
            settings.mail_api_url.clone(),
            settings.mail_api_key.clone(),
            settings.mail_from.clone(),
        ))
    } else {
        tracing::warn!("MAIL_API_URL not set, alert emails will only be logged");
        Arc::new(LogNotifier::new(settings.mail_from.clone()))
    }
}
