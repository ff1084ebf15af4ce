//! Error types shared by the HTTP layer and the alert monitor.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to API clients.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

/// Quote lookup failures.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("FINNHUB_API_KEY is missing")]
    MissingKey,

    #[error("quote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quote provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("quote for {symbol} timed out after {secs}s")]
    Timeout { symbol: String, secs: u64 },

    #[error("quote for {symbol} has unusable price {price}")]
    InvalidPrice { symbol: String, price: f64 },

    #[error("{0}")]
    Other(String),
}

/// Notification delivery failures.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("mail relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail relay rejected message with {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("notification to {recipient} timed out after {secs}s")]
    Timeout { recipient: String, secs: u64 },

    #[error("{0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
