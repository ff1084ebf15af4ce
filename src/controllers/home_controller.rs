use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

pub async fn home() -> impl IntoResponse {
    Json(json!({ "message": "Stock Index Values Tracker API" }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "OK", "timestamp": Utc::now() }))
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": format!("No route for {}", uri.path()) })),
    )
}
