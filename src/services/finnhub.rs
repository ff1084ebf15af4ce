use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{error::QuoteError, models::Quote};

use super::{api_usage::ApiUsage, quote_source::QuoteSource};

const QUOTE_URL: &str = "https://finnhub.io/api/v1/quote";

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    api_key: String,
    quote_url: String,
    usage: ApiUsage,
}

impl FinnhubClient {
    /// `timeout` bounds every request, so a stalled upstream surfaces as a
    /// `QuoteError::Http` instead of hanging the caller.
    pub fn new(api_key: String, usage: ApiUsage, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to build finnhub http client, using defaults");
                Client::new()
            });

        Self {
            http,
            api_key,
            quote_url: QUOTE_URL.to_string(),
            usage,
        }
    }

    pub fn with_quote_url(mut self, url: impl Into<String>) -> Self {
        self.quote_url = url.into();
        self
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        if !self.has_key() {
            return Err(QuoteError::MissingKey);
        }

        self.usage.record();

        let res = self
            .http
            .get(&self.quote_url)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(QuoteError::Status { status, body });
        }

        Ok(res.json::<Quote>().await?)
    }
}

#[async_trait]
impl QuoteSource for FinnhubClient {
    async fn quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        self.fetch_quote(symbol).await
    }

    fn name(&self) -> &str {
        "finnhub"
    }
}
