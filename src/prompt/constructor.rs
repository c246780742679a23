//! Prompt templating with simple `{{placeholder}}` substitution.
//!
//! Builds the two prompts this service sends upstream: the chat messages that
//! ask the LLM to enhance a raw description, and the decorated text prompt
//! submitted to the image model. Templates are plain strings; every
//! `{{ key }}` is replaced with `inputs[key]`.
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};

pub const SYSTEM_INSTRUCTION: &str = concat!(
    "You are an expert at creating detailed, vivid prompts for comic-style image generation. ",
    "Transform user descriptions into rich, detailed prompts that will produce ",
    "high-quality comic book style artwork. ",
    "Include specific details about art style, colors, composition, and visual elements ",
    "that make for compelling comic book imagery."
);

pub const ENHANCE_TEMPLATE: &str = concat!(
    "Transform this description into a detailed comic-style image generation prompt: ",
    "\"{{description}}\""
);

pub const IMAGE_TEMPLATE: &str =
    "{{prompt}}, comic book style, vibrant colors, bold lines, dynamic composition";

pub const NEGATIVE_PROMPT: &str = "blurry, low quality, distorted, ugly, bad anatomy";

/// One chat-completion message in the OpenAI-compatible shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PromptConstructor;

impl PromptConstructor {
    pub fn new() -> Self {
        PromptConstructor
    }

    /// System + user messages asking the LLM to enhance `description`.
    pub fn enhancement_messages(&self, description: &str) -> AppResult<Vec<ChatMessage>> {
        let user = self.render(ENHANCE_TEMPLATE, &json!({ "description": description }))?;
        Ok(vec![
            ChatMessage { role: "system", content: SYSTEM_INSTRUCTION.to_string() },
            ChatMessage { role: "user", content: user },
        ])
    }

    /// The enhanced prompt decorated with the fixed comic style qualifiers.
    pub fn styled_image_prompt(&self, prompt: &str) -> AppResult<String> {
        self.render(IMAGE_TEMPLATE, &json!({ "prompt": prompt }))
    }

    /// Replace every `{{key}}` in `template` with the string form of
    /// `inputs[key]`. Substituted text is never re-scanned, so user input
    /// containing braces is inserted verbatim.
    pub fn render(&self, template: &str, inputs: &Value) -> AppResult<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| {
                AppError::PromptConstruction("Unclosed placeholder in template".to_string())
            })?;
            let key = after[..end].trim();
            let replacement = inputs.get(key).ok_or_else(|| {
                AppError::PromptConstruction(format!("Missing input for placeholder: {}", key))
            })?;
            match replacement {
                Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }
}
