use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    models::CurrentUser,
    services::alerts_service::{self, CreateAlertRequest},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: Option<String>,
}

impl OwnerQuery {
    // explicit ?userId= wins over the authenticated identity
    fn owner<'a>(&'a self, user: &'a CurrentUser) -> &'a str {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(user.uid.as_str())
    }
}

// GET /api/alerts?userId=
pub async fn get_alerts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(q): Query<OwnerQuery>,
) -> Response {
    let alerts = alerts_service::list_user_alerts(&state, q.owner(&user)).await;
    Json(json!({ "success": true, "data": alerts })).into_response()
}

// POST /api/alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    body: Result<Json<CreateAlertRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(b)) => b,
        // no JSON content type => treat the body as empty
        Err(JsonRejection::MissingJsonContentType(_)) => CreateAlertRequest::default(),
        Err(rejection) => {
            return AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
                .into_response();
        }
    };

    let new_alert = match alerts_service::validate_create(&body, &user.uid) {
        Ok(a) => a,
        Err(e) => return e.into_response(),
    };

    let alert = alerts_service::create_alert(&state, new_alert).await;

    (StatusCode::CREATED, Json(json!({ "success": true, "data": alert }))).into_response()
}

// DELETE /api/alerts/:id
pub async fn delete_alert(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Query(q): Query<OwnerQuery>,
) -> Result<Response, AppError> {
    alerts_service::delete_alert(&state, q.owner(&user), &id).await?;

    Ok(Json(json!({ "success": true, "message": "Alert deleted successfully" })).into_response())
}

// PATCH /api/alerts/:id/toggle
pub async fn patch_toggle_alert(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Query(q): Query<OwnerQuery>,
) -> Result<Response, AppError> {
    let alert = alerts_service::toggle_alert(&state, q.owner(&user), &id).await?;

    Ok(Json(json!({ "success": true, "data": alert })).into_response())
}
