use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{error::AppError, services::stocks_service, AppState};

// GET /api/stocks/indices
pub async fn get_indices(State(state): State<AppState>) -> Response {
    let data = stocks_service::indices(&state).await;
    Json(json!({ "success": true, "data": data })).into_response()
}

// GET /api/stocks/quote/:symbol
pub async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Response, AppError> {
    let data = stocks_service::quote(&state, symbol.trim()).await?;
    Ok(Json(json!({ "success": true, "data": data })).into_response())
}

// GET /api/stocks/stats
pub async fn get_stats(State(state): State<AppState>) -> Response {
    let data = stocks_service::usage_stats(&state);
    Json(json!({ "success": true, "data": data })).into_response()
}
