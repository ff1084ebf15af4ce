use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "above" => Some(Direction::Above),
            "below" => Some(Direction::Below),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }

    /// Strict comparison: a price sitting exactly on the threshold is not a crossing.
    pub fn is_crossed(&self, threshold: f64, price: f64) -> bool {
        match self {
            Direction::Above => price > threshold,
            Direction::Below => price < threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub user_id: String,
    pub symbol: String,
    pub threshold: f64,
    pub direction: Direction,
    pub email: String,
    pub created_at: DateTime<Utc>,

    // only the toggle endpoint flips this
    pub active: bool,
}

impl Alert {
    pub fn is_crossed(&self, price: f64) -> bool {
        self.direction.is_crossed(self.threshold, price)
    }
}

/// A validated create request, not yet stored.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub user_id: String,
    pub symbol: String,
    pub threshold: f64,
    pub direction: Direction,
    pub email: String,
}

impl NewAlert {
    pub fn into_alert(self) -> Alert {
        Alert {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id,
            symbol: self.symbol,
            threshold: self.threshold,
            direction: self.direction,
            email: self.email,
            created_at: Utc::now(),
            active: true,
        }
    }
}
