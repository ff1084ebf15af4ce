use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Quote {
    // current
    pub c: f64,
    // change
    #[serde(default, deserialize_with = "null_as_zero")]
    pub d: f64,
    // percent change
    #[serde(default, deserialize_with = "null_as_zero")]
    pub dp: f64,
    // high
    pub h: f64,
    // low
    pub l: f64,
    // open
    pub o: f64,
    // previous close
    pub pc: f64,
    // timestamp
    pub t: i64,
}

impl Quote {
    pub fn change(&self) -> f64 {
        self.c - self.pc
    }

    /// Percent change against the previous close, formatted to two decimals.
    pub fn percent_change(&self) -> String {
        if self.pc == 0.0 {
            return "0.00".to_string();
        }
        format!("{:.2}", self.change() / self.pc * 100.0)
    }
}

// Finnhub sends `null` for d/dp on symbols it does not know.
fn null_as_zero<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(de)?.unwrap_or(0.0))
}
