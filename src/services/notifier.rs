//! Delivery of triggered alerts.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::{
    error::NotifyError,
    models::{Alert, Direction},
};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &Alert, current_price: f64) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl AlertEmail {
    pub fn compose(from: &str, alert: &Alert, current_price: f64) -> Self {
        let verb = match alert.direction {
            Direction::Above => "exceeded",
            Direction::Below => "fallen below",
        };

        let subject = format!(
            "Stock Alert: {} has {} {}",
            alert.symbol, verb, alert.threshold
        );

        let html = format!(
            "<h2>Stock Price Alert</h2>\n\
             <p>Hello,</p>\n\
             <p>This is an alert for the stock <strong>{sym}</strong>.</p>\n\
             <p>The current price is <strong>${price:.2}</strong>.</p>\n\
             <p>This price has {verb} your threshold of <strong>${threshold:.2}</strong>.</p>\n\
             <p>Thank you for using Stockwatch!</p>\n",
            sym = alert.symbol,
            price = current_price,
            verb = verb,
            threshold = alert.threshold,
        );

        Self {
            from: from.to_string(),
            to: alert.email.clone(),
            subject,
            html,
        }
    }
}

/// Sends alert emails through an HTTP mail relay.
#[derive(Clone)]
pub struct EmailNotifier {
    http: Client,
    url: String,
    api_key: String,
    from: String,
}

impl EmailNotifier {
    pub fn new(url: String, api_key: String, from: String) -> Self {
        Self {
            http: Client::new(),
            url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, alert: &Alert, current_price: f64) -> Result<(), NotifyError> {
        let mail = AlertEmail::compose(&self.from, alert, current_price);

        let mut req = self.http.post(&self.url).json(&mail);
        if !self.api_key.trim().is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        tracing::info!(to = %mail.to, symbol = %alert.symbol, "alert email sent");
        Ok(())
    }
}

/// Used when no mail relay is configured: the message only goes to the log.
#[derive(Clone)]
pub struct LogNotifier {
    from: String,
}

impl LogNotifier {
    pub fn new(from: String) -> Self {
        Self { from }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, alert: &Alert, current_price: f64) -> Result<(), NotifyError> {
        let mail = AlertEmail::compose(&self.from, alert, current_price);
        tracing::info!(to = %mail.to, subject = %mail.subject, "mail relay not configured, alert logged only");
        Ok(())
    }
}
