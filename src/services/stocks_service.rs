use futures_util::future::join_all;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    services::api_usage::UsageStats,
    AppState,
};

pub struct TrackedIndex {
    pub symbol: &'static str,
    pub name: &'static str,
    pub market: &'static str,
}

pub const INDICES: &[TrackedIndex] = &[
    TrackedIndex { symbol: "AAPL", name: "Apple", market: "US" },
    TrackedIndex { symbol: "TSLA", name: "Tesla", market: "US" },
    TrackedIndex { symbol: "NVDA", name: "NVIDIA", market: "US" },
    TrackedIndex { symbol: "MSFT", name: "Microsoft", market: "US" },
    TrackedIndex { symbol: "GOOG", name: "Google", market: "US" },
    TrackedIndex { symbol: "AMZN", name: "Amazon", market: "US" },
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexView {
    pub symbol: String,
    pub display_symbol: String,
    pub name: String,
    pub market: String,

    // absent when the quote lookup failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteView {
    pub symbol: String,
    pub current_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub open_price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub percent_change: String,
    pub timestamp: i64,
}

/// Every tracked index, enriched with a live quote where one is available.
pub async fn indices(state: &AppState) -> Vec<IndexView> {
    let lookups = INDICES.iter().map(|idx| async move {
        let mut view = IndexView {
            symbol: idx.symbol.to_string(),
            display_symbol: idx.symbol.to_string(),
            name: idx.name.to_string(),
            market: idx.market.to_string(),
            current_price: None,
            previous_close: None,
            change: None,
            percent_change: None,
        };

        match state.quotes.quote(idx.symbol).await {
            Ok(q) => {
                view.current_price = Some(q.c);
                view.previous_close = Some(q.pc);
                view.change = Some(q.change());
                view.percent_change = Some(q.percent_change());
            }
            Err(e) => tracing::warn!(symbol = idx.symbol, error = %e, "index quote failed"),
        }

        view
    });

    join_all(lookups).await
}

pub async fn quote(state: &AppState, symbol: &str) -> AppResult<QuoteView> {
    let q = state.quotes.quote(symbol).await.map_err(|e| {
        tracing::error!(symbol, error = %e, "quote lookup failed");
        AppError::Upstream("Failed to fetch quote data".to_string())
    })?;

    Ok(QuoteView {
        symbol: symbol.to_string(),
        current_price: q.c,
        high_price: q.h,
        low_price: q.l,
        open_price: q.o,
        previous_close: q.pc,
        change: q.change(),
        percent_change: q.percent_change(),
        timestamp: q.t,
    })
}

pub fn usage_stats(state: &AppState) -> UsageStats {
    state.usage.stats()
}
