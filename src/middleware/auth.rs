use axum::{
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::CurrentUser, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // user id
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    // expiry (unix timestamp seconds), enforced when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

pub fn verify_token(secret: &str, token: &str) -> Result<CurrentUser, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["sub"]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;

    Ok(CurrentUser {
        uid: data.claims.sub,
        email: data.claims.email,
    })
}

/// Attach a `CurrentUser` to the request or reject it with 401.
///
/// Without `AUTH_JWT_SECRET` every request runs as the demo user.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if !state.settings.auth_enabled() {
        req.extensions_mut().insert(CurrentUser::demo());
        return next.run(req).await;
    }

    let Some(token) = bearer_token(req.headers()) else {
        return AppError::Unauthorized(
            "Unauthorized. Missing or invalid authorization header.".to_string(),
        )
        .into_response();
    };

    match verify_token(&state.settings.auth_jwt_secret, token) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "rejected bearer token");
            AppError::Unauthorized("Unauthorized. Invalid token.".to_string()).into_response()
        }
    }
}
