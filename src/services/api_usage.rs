use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

// Finnhub free tier: 60 calls per minute.
const PLAN_LIMIT: u64 = 60 * 24;

#[derive(Debug)]
struct Counters {
    total_requests: u64,
    requests_today: u64,
    last_reset: DateTime<Utc>,
}

/// Shared counter of live quote-provider requests.
#[derive(Debug, Clone)]
pub struct ApiUsage {
    inner: Arc<Mutex<Counters>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_requests: u64,
    pub requests_today: u64,
    pub remaining_quota: i64,
    pub plan_limit: u64,
}

impl Default for ApiUsage {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiUsage {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Counters {
                total_requests: 0,
                requests_today: 0,
                last_reset: Utc::now(),
            })),
        }
    }

    fn with_counters<T>(&self, now: DateTime<Utc>, f: impl FnOnce(&mut Counters) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if now.date_naive() != guard.last_reset.date_naive() {
            guard.requests_today = 0;
            guard.last_reset = now;
        }
        f(&mut guard)
    }

    pub fn record(&self) {
        self.record_at(Utc::now());
    }

    pub fn record_at(&self, now: DateTime<Utc>) {
        self.with_counters(now, |c| {
            c.total_requests += 1;
            c.requests_today += 1;
        });
    }

    pub fn stats(&self) -> UsageStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> UsageStats {
        self.with_counters(now, |c| UsageStats {
            total_requests: c.total_requests,
            requests_today: c.requests_today,
            remaining_quota: PLAN_LIMIT as i64 - c.requests_today as i64,
            plan_limit: PLAN_LIMIT,
        })
    }
}
