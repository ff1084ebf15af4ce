//! Price lookup seam used by the alert monitor and the stocks API.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::QuoteError, models::Quote};

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the latest quote for `symbol`.
    async fn quote(&self, symbol: &str) -> Result<Quote, QuoteError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Tries `primary`; on any error answers from `fallback` instead.
pub struct FallbackQuotes {
    primary: Arc<dyn QuoteSource>,
    fallback: Arc<dyn QuoteSource>,
}

impl FallbackQuotes {
    pub fn new(primary: Arc<dyn QuoteSource>, fallback: Arc<dyn QuoteSource>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl QuoteSource for FallbackQuotes {
    async fn quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        match self.primary.quote(symbol).await {
            Ok(q) => Ok(q),
            Err(e) => {
                tracing::warn!(
                    symbol,
                    error = %e,
                    "{} quote failed, using {}",
                    self.primary.name(),
                    self.fallback.name()
                );
                self.fallback.quote(symbol).await
            }
        }
    }

    fn name(&self) -> &str {
        "fallback"
    }
}
