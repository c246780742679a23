//! Axum request handlers for the HTTP API.
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::routes::AppState;
use crate::api::types::{EnhanceRequest, EnhanceResponse, GenerateRequest, GenerateResponse};
use crate::error::{AppError, AppResult};

pub async fn root() -> &'static str {
    "Comic Image Generator"
}

pub async fn enhance_prompt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EnhanceRequest>, JsonRejection>,
) -> AppResult<Json<EnhanceResponse>> {
    let request_id = Uuid::new_v4();
    async move {
        let Json(body) = payload.map_err(invalid_body)?;
        let description = required(body.description, "Description is required")?;

        state
            .enhancer
            .enhance(&description)
            .await
            .map(|enhanced_prompt| Json(EnhanceResponse { enhanced_prompt }))
            .map_err(|e| {
                tracing::error!("Error enhancing prompt: {}", e);
                e
            })
    }
    .instrument(tracing::info_span!("enhance_prompt", %request_id))
    .await
}

pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let request_id = Uuid::new_v4();
    async move {
        let Json(body) = payload.map_err(invalid_body)?;
        let prompt = required(body.prompt, "Prompt is required")?;

        state
            .runner
            .generate(&prompt)
            .await
            .map(|image_url| Json(GenerateResponse { image_url }))
            .map_err(|e| {
                tracing::error!("Error generating image: {}", e);
                e
            })
    }
    .instrument(tracing::info_span!("generate_image", %request_id))
    .await
}

fn required(field: Option<String>, message: &str) -> AppResult<String> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput(message.to_string()))
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    tracing::warn!("Rejected request body: {}", rejection.body_text());
    AppError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(matches!(required(None, "x"), Err(AppError::InvalidInput(m)) if m == "x"));
        assert!(required(Some("  ".into()), "x").is_err());
        assert_eq!(required(Some(" ok ".into()), "x").unwrap(), " ok ");
    }
}
