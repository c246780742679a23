use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A finished enhance + generate cycle. Immutable once built; `url`,
/// `prompt` and `enhanced_prompt` are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGeneratedImage")]
pub struct GeneratedImage {
    url: String,
    prompt: String,
    enhanced_prompt: String,
    timestamp: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGeneratedImage {
    url: String,
    prompt: String,
    enhanced_prompt: String,
    timestamp: i64,
}

impl GeneratedImage {
    /// Stamp a new entry with the current time in epoch milliseconds.
    pub fn new(
        url: impl Into<String>,
        prompt: impl Into<String>,
        enhanced_prompt: impl Into<String>,
    ) -> AppResult<Self> {
        Self::with_timestamp(url, prompt, enhanced_prompt, Utc::now().timestamp_millis())
    }

    pub fn with_timestamp(
        url: impl Into<String>,
        prompt: impl Into<String>,
        enhanced_prompt: impl Into<String>,
        timestamp: i64,
    ) -> AppResult<Self> {
        let image = GeneratedImage {
            url: url.into(),
            prompt: prompt.into(),
            enhanced_prompt: enhanced_prompt.into(),
            timestamp,
        };
        for (field, value) in [
            ("url", &image.url),
            ("prompt", &image.prompt),
            ("enhancedPrompt", &image.enhanced_prompt),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "GeneratedImage.{} must not be empty",
                    field
                )));
            }
        }
        Ok(image)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn enhanced_prompt(&self) -> &str {
        &self.enhanced_prompt
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Download name used by the client, without extension.
    pub fn download_name(&self) -> String {
        format!("comic-{}", self.timestamp)
    }
}

impl TryFrom<RawGeneratedImage> for GeneratedImage {
    type Error = AppError;

    fn try_from(raw: RawGeneratedImage) -> Result<Self, Self::Error> {
        GeneratedImage::with_timestamp(raw.url, raw.prompt, raw.enhanced_prompt, raw.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_empty_fields() {
        assert!(GeneratedImage::new("", "p", "e").is_err());
        assert!(GeneratedImage::new("u", " ", "e").is_err());
        assert!(GeneratedImage::new("u", "p", "").is_err());
        assert!(GeneratedImage::new("u", "p", "e").is_ok());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let image =
            GeneratedImage::with_timestamp("https://i/1.png", "cat", "a comic cat", 42).unwrap();
        let value = serde_json::to_value(&image).unwrap();
        assert_eq!(
            value,
            json!({
                "url": "https://i/1.png",
                "prompt": "cat",
                "enhancedPrompt": "a comic cat",
                "timestamp": 42
            })
        );
        assert_eq!(image.download_name(), "comic-42");
    }

    #[test]
    fn deserializing_enforces_invariant() {
        let bad = json!({"url": "", "prompt": "cat", "enhancedPrompt": "x", "timestamp": 1});
        assert!(serde_json::from_value::<GeneratedImage>(bad).is_err());
    }
}
