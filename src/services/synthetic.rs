//! Offline quote source: random jitter around a fixed base price per symbol.

use async_trait::async_trait;
use chrono::Utc;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::{error::QuoteError, models::Quote};

use super::quote_source::QuoteSource;

pub fn base_price(symbol: &str) -> f64 {
    match symbol.to_uppercase().as_str() {
        "AAPL" => 150.0,
        "MSFT" => 250.0,
        "GOOGL" | "GOOG" => 2800.0,
        "AMZN" => 3500.0,
        "TSLA" => 1000.0,
        "NVDA" => 200.0,
        "TSM" => 100.0,
        "META" => 300.0,
        "NFLX" => 500.0,
        "ORCL" => 50.0,
        _ => 1000.0,
    }
}

fn cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub struct SyntheticQuotes {
    rng: Mutex<StdRng>,
}

impl SyntheticQuotes {
    /// Same seed, same price sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }

    pub async fn generate(&self, symbol: &str) -> Quote {
        let factor: f64 = self.rng.lock().await.gen_range(0.98..1.02);
        let base = base_price(symbol);

        let c = cents(base * factor);
        let pc = cents(base * (factor - 0.02));
        let d = cents(c - pc);
        let dp = if pc == 0.0 { 0.0 } else { cents(d / pc * 100.0) };

        Quote {
            c,
            d,
            dp,
            h: cents(base * (factor + 0.01)),
            l: cents(base * (factor - 0.01)),
            o: cents(base * (factor - 0.005)),
            pc,
            t: Utc::now().timestamp(),
        }
    }
}

#[async_trait]
impl QuoteSource for SyntheticQuotes {
    async fn quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        Ok(self.generate(symbol).await)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
