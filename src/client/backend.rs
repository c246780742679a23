//! How the orchestrator reaches the service.
//!
//! `GenerationBackend` is the seam between presentation state and the
//! network; `ProxyClient` implements it against the `/enhance-prompt` and
//! `/generate-image` endpoints exposed by the proxy binary.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;

use crate::api::types::{
    EnhanceRequest, EnhanceResponse, ErrorBody, GenerateRequest, GenerateResponse,
};
use crate::error::{AppError, AppResult};

// Image generation polls for up to ~30s server-side.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn enhance_prompt(&self, description: &str) -> AppResult<String>;
    async fn generate_image(&self, prompt: &str) -> AppResult<String>;
    async fn fetch_image(&self, url: &str) -> AppResult<Vec<u8>>;
}

#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
    api_url: String,
}

impl ProxyClient {
    pub fn new(api_url: String) -> Self {
        let base = api_url.trim_end_matches('/').to_string();
        ProxyClient { client: Client::new(), api_url: base }
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> AppResult<Response> {
        let url = format!("{}{}", self.api_url, path);
        tracing::debug!("POST {}", url);
        self.client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(AppError::HttpClient)
    }
}

/// Turn a non-success API response into an error carrying the server's
/// message, or `fallback` when the body has none.
async fn api_error(response: Response, fallback: &str) -> AppError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    AppError::Upstream { status: Some(status), message }
}

#[async_trait]
impl GenerationBackend for ProxyClient {
    async fn enhance_prompt(&self, description: &str) -> AppResult<String> {
        let body = EnhanceRequest { description: Some(description.to_string()) };
        let response = self.post_json("/enhance-prompt", &body).await?;
        if !response.status().is_success() {
            return Err(api_error(response, "Failed to enhance prompt").await);
        }
        let parsed: EnhanceResponse = response.json().await.map_err(AppError::HttpClient)?;
        Ok(parsed.enhanced_prompt)
    }

    async fn generate_image(&self, prompt: &str) -> AppResult<String> {
        let body = GenerateRequest { prompt: Some(prompt.to_string()) };
        let response = self.post_json("/generate-image", &body).await?;
        if !response.status().is_success() {
            return Err(api_error(response, "Failed to generate image").await);
        }
        let parsed: GenerateResponse = response.json().await.map_err(AppError::HttpClient)?;
        Ok(parsed.image_url)
    }

    async fn fetch_image(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(AppError::HttpClient)?;
        if !response.status().is_success() {
            return Err(AppError::Download(format!("Failed to get image: {}", response.status())));
        }
        response.bytes().await.map(|b| b.to_vec()).map_err(AppError::HttpClient)
    }
}
