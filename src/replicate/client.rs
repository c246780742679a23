//! Image generation through the Replicate predictions API.
//!
//! - `generate` submits a prediction for the styled prompt, then polls
//!   `/predictions/{id}` until it settles.
//! - Each status query is bounded by the poll policy's query timeout, so a
//!   hanging status endpoint only costs that attempt.
//! - Generation parameters are fixed constants of the service.
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::prompt::constructor::{PromptConstructor, NEGATIVE_PROMPT};
use crate::replicate::poll::{poll_until_done, PollPolicy, Prediction};
use crate::utils::redact::sanitize_body;

/// SDXL model version.
pub const MODEL_VERSION: &str = "ac732df83cea7fff18b8472768c88ad041fa750ff7682a21affe81863cbe77e4";
pub const WIDTH: u32 = 1024;
pub const HEIGHT: u32 = 1024;
pub const NUM_INFERENCE_STEPS: u32 = 25;
pub const GUIDANCE_SCALE: f32 = 7.5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ImageJobRunner {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    policy: PollPolicy,
    prompts: PromptConstructor,
}

#[derive(Debug, Serialize)]
struct PredictionRequest<'a> {
    version: &'a str,
    input: PredictionInput,
}

#[derive(Debug, Serialize)]
struct PredictionInput {
    prompt: String,
    negative_prompt: &'static str,
    width: u32,
    height: u32,
    num_inference_steps: u32,
    guidance_scale: f32,
}

impl ImageJobRunner {
    pub fn new(base_url: String, api_token: Option<String>) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        ImageJobRunner {
            client: Client::new(),
            base_url: base,
            api_token,
            policy: PollPolicy::default(),
            prompts: PromptConstructor::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.replicate_url.clone(), config.replicate_api_token.clone())
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.policy
    }

    /// Generate an image for `prompt` and return its URL.
    ///
    /// Blocks for up to `max_attempts * (interval + query_timeout)` while the
    /// job runs.
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        if prompt.trim().is_empty() {
            return Err(AppError::InvalidInput("Prompt is required".to_string()));
        }
        let token = self.api_token.as_deref().ok_or_else(|| {
            AppError::Configuration("Replicate API key not configured".to_string())
        })?;

        let id = self.submit(prompt, token).await?;
        let id = id.as_str();
        tracing::info!(
            prediction_id = %id,
            max_attempts = self.policy.max_attempts,
            "Polling prediction"
        );
        poll_until_done(self.policy, move |_| self.fetch_status(id, token)).await
    }

    async fn submit(&self, prompt: &str, token: &str) -> AppResult<String> {
        let url = format!("{}/predictions", self.base_url);
        let body = PredictionRequest {
            version: MODEL_VERSION,
            input: PredictionInput {
                prompt: self.prompts.styled_image_prompt(prompt)?,
                negative_prompt: NEGATIVE_PROMPT,
                width: WIDTH,
                height: HEIGHT,
                num_inference_steps: NUM_INFERENCE_STEPS,
                guidance_scale: GUIDANCE_SCALE,
            },
        };
        tracing::info!("Submitting prediction to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", token))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            let error_body = sanitize_body(&error_body, token);
            tracing::error!("Replicate API error: {} - {}", status, error_body);
            return Err(AppError::upstream_status("Replicate", status.as_u16(), &error_body));
        }

        let prediction: Prediction = response.json().await.map_err(|e| {
            AppError::upstream(format!("Failed to parse Replicate response: {}", e))
        })?;
        prediction
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::upstream("Replicate response missing prediction id"))
    }

    async fn fetch_status(&self, id: &str, token: &str) -> AppResult<Prediction> {
        let url = format!("{}/predictions/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", token))
            .timeout(self.policy.query_timeout)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream_status(
                "Replicate",
                status.as_u16(),
                "status query failed",
            ));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to parse prediction status: {}", e)))
    }
}
