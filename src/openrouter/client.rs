//! Prompt enhancement through the OpenRouter chat-completion endpoint.
//!
//! One request per call, no retries. The first choice's content is returned
//! as-is; a response without usable content is an upstream error.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::prompt::constructor::{ChatMessage, PromptConstructor};
use crate::utils::redact::{mask_secret, sanitize_body};

pub const MODEL: &str = "google/gemini-2.5-flash-image-preview";
pub const MAX_TOKENS: u32 = 200;
pub const TEMPERATURE: f32 = 0.7;
const TITLE: &str = "Comic Image Generator";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct PromptEnhancer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    site_url: String,
    prompts: PromptConstructor,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl PromptEnhancer {
    pub fn new(endpoint: String, api_key: Option<String>, site_url: String) -> Self {
        PromptEnhancer {
            client: Client::new(),
            endpoint,
            api_key,
            site_url,
            prompts: PromptConstructor::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openrouter_url.clone(),
            config.openrouter_api_key.clone(),
            config.site_url.clone(),
        )
    }

    /// Turn a raw description into a detailed comic-style image prompt.
    pub async fn enhance(&self, description: &str) -> AppResult<String> {
        if description.trim().is_empty() {
            return Err(AppError::InvalidInput("Description is required".to_string()));
        }
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("OpenRouter API key not configured".to_string())
        })?;

        let body = ChatRequest {
            model: MODEL,
            messages: self.prompts.enhancement_messages(description)?,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        tracing::info!(
            endpoint = %self.endpoint,
            model = MODEL,
            api_key = %mask_secret(api_key),
            "Requesting prompt enhancement"
        );
        tracing::debug!(description_chars = description.chars().count(), "Enhancement input");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", TITLE)
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
            let error_body = sanitize_body(&error_body, api_key);
            tracing::error!("OpenRouter API error: {} - {}", status, error_body);
            return Err(AppError::upstream_status("OpenRouter", status.as_u16(), &error_body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            AppError::upstream(format!("Failed to parse OpenRouter response: {}", e))
        })?;

        match first_content(&parsed) {
            Some(content) => {
                tracing::info!(enhanced_chars = content.len(), "Prompt enhanced");
                Ok(content.to_string())
            }
            None => {
                tracing::error!(choices = parsed.choices.len(), "OpenRouter returned no content");
                Err(AppError::upstream("no content produced"))
            }
        }
    }
}

fn first_content(response: &ChatResponse) -> Option<&str> {
    response
        .choices
        .first()
        .and_then(|c| c.message.as_ref())
        .and_then(|m| m.content.as_deref())
        .filter(|content| !content.trim().is_empty())
}
