use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub finnhub_api_key: String,
    // serve synthetic quotes when the live provider errors out
    pub quote_fallback: bool,
    pub synthetic_seed: Option<u64>,

    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,

    // empty => every alerts request runs as the demo user
    pub auth_jwt_secret: String,

    pub alert_check_interval: Duration,
    pub alert_concurrency: usize,
    pub quote_timeout: Duration,
    pub notify_timeout: Duration,
    pub alert_cooldown: Option<Duration>,

    pub log_level: String,
    pub log_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            finnhub_api_key: String::new(),
            quote_fallback: true,
            synthetic_seed: None,
            mail_api_url: String::new(),
            mail_api_key: String::new(),
            mail_from: "alerts@stockwatch.local".to_string(),
            auth_jwt_secret: String::new(),
            alert_check_interval: Duration::from_secs(60),
            alert_concurrency: 4,
            quote_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(10),
            alert_cooldown: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn has_finnhub_key(&self) -> bool {
        !self.finnhub_api_key.trim().is_empty()
    }

    pub fn has_mail_relay(&self) -> bool {
        !self.mail_api_url.trim().is_empty()
    }

    pub fn auth_enabled(&self) -> bool {
        !self.auth_jwt_secret.trim().is_empty()
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn secs(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&n| n > 0)
        .map(Duration::from_secs)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = Settings::default();

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    let quote_fallback = env::var("QUOTE_FALLBACK")
        .ok()
        .and_then(|s| parse_bool(&s))
        .unwrap_or(defaults.quote_fallback);

    let synthetic_seed = env::var("SYNTHETIC_SEED")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok());

    let alert_concurrency = env::var("ALERT_CONCURRENCY")
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(defaults.alert_concurrency);

    let log_json = var_or("LOG_FORMAT", "pretty").eq_ignore_ascii_case("json");

    Settings {
        host: var_or("HOST", &defaults.host),
        port,
        finnhub_api_key: var_or("FINNHUB_API_KEY", ""),
        quote_fallback,
        synthetic_seed,
        mail_api_url: var_or("MAIL_API_URL", ""),
        mail_api_key: var_or("MAIL_API_KEY", ""),
        mail_from: var_or("MAIL_FROM", &defaults.mail_from),
        auth_jwt_secret: var_or("AUTH_JWT_SECRET", ""),
        alert_check_interval: secs("ALERT_CHECK_INTERVAL_SECS")
            .unwrap_or(defaults.alert_check_interval),
        alert_concurrency,
        quote_timeout: secs("QUOTE_TIMEOUT_SECS").unwrap_or(defaults.quote_timeout),
        notify_timeout: secs("NOTIFY_TIMEOUT_SECS").unwrap_or(defaults.notify_timeout),
        alert_cooldown: secs("ALERT_COOLDOWN_SECS"),
        log_level: var_or("LOG_LEVEL", &defaults.log_level),
        log_json,
    }
}
