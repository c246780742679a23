//! Common error type and result alias.
//!
//! `AppError` doubles as the HTTP error body: handlers return it directly and
//! the `IntoResponse` impl maps it to `400` for caller mistakes and `500` for
//! everything else, with a `{"error": "..."}` JSON payload.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Configuration(String),

    /// Remote service answered with a non-success status or an unusable body.
    /// `message` already carries the status when one is known.
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("Image generation failed")]
    GenerationFailed,

    #[error("Image generation timed out")]
    Timeout,

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to download image")]
    Download(String),

    #[error("Prompt construction error: {0}")]
    PromptConstruction(String),
}

impl AppError {
    /// Upstream failure with a known HTTP status.
    pub fn upstream_status(service: &str, status: u16, body: &str) -> Self {
        AppError::Upstream {
            status: Some(status),
            message: format!("{} API error: {} - {}", service, status, body),
        }
    }

    /// Upstream failure without a status (e.g. a 200 with no usable content).
    pub fn upstream(message: impl Into<String>) -> Self {
        AppError::Upstream { status: None, message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
