use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{Alert, Direction, NewAlert},
    AppState,
};

const MISSING_FIELDS: &str =
    "Missing required fields. Please provide symbol, threshold, direction, and email.";

/// Raw POST /api/alerts body. Everything is optional here so that missing
/// fields produce our own 400 instead of a JSON rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    pub user_id: Option<String>,
    pub symbol: Option<String>,
    // number or numeric string
    pub threshold: Option<Value>,
    pub direction: Option<String>,
    pub email: Option<String>,
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn non_empty(v: Option<&String>) -> Option<&str> {
    v.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn parse_threshold(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn validate_create(req: &CreateAlertRequest, default_user: &str) -> AppResult<NewAlert> {
    let (Some(symbol), Some(threshold), Some(direction), Some(email)) = (
        non_empty(req.symbol.as_ref()),
        req.threshold.as_ref().filter(|v| !v.is_null()),
        non_empty(req.direction.as_ref()),
        non_empty(req.email.as_ref()),
    ) else {
        return Err(AppError::Validation(MISSING_FIELDS.to_string()));
    };

    let direction = Direction::parse(direction).ok_or_else(|| {
        AppError::Validation(r#"Direction must be either "above" or "below"."#.to_string())
    })?;

    let threshold = parse_threshold(threshold)
        .filter(|t| t.is_finite() && *t > 0.0)
        .ok_or_else(|| AppError::Validation("Threshold must be a positive number.".to_string()))?;

    if !email_re().is_match(email) {
        return Err(AppError::Validation("Please provide a valid email address.".to_string()));
    }

    let user_id = non_empty(req.user_id.as_ref()).unwrap_or(default_user);

    Ok(NewAlert {
        user_id: user_id.to_string(),
        symbol: symbol.to_uppercase(),
        threshold,
        direction,
        email: email.to_string(),
    })
}

pub async fn list_user_alerts(state: &AppState, user_id: &str) -> Vec<Alert> {
    state.alerts.list(user_id).await
}

pub async fn create_alert(state: &AppState, new_alert: NewAlert) -> Alert {
    let alert = state.alerts.create(new_alert).await;
    tracing::info!(alert_id = %alert.id, user_id = %alert.user_id, symbol = %alert.symbol, "alert created");
    alert
}

pub async fn delete_alert(state: &AppState, user_id: &str, alert_id: &str) -> AppResult<()> {
    if !state.alerts.delete(alert_id, user_id).await {
        return Err(AppError::NotFound("Alert not found".to_string()));
    }
    tracing::info!(alert_id, user_id, "alert deleted");
    Ok(())
}

pub async fn toggle_alert(state: &AppState, user_id: &str, alert_id: &str) -> AppResult<Alert> {
    let alert = state
        .alerts
        .toggle(alert_id, user_id)
        .await
        .ok_or_else(|| AppError::NotFound("Alert not found".to_string()))?;
    tracing::info!(alert_id, user_id, active = alert.active, "alert toggled");
    Ok(alert)
}
