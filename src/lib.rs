//! Comic Image Proxy library
//!
//! Modules:
//! - `api`: Axum HTTP handlers and router setup used by the binary.
//! - `openrouter`: Prompt enhancement through a chat-completion endpoint.
//! - `replicate`: Image job submission and bounded status polling.
//! - `prompt`: Prompt construction helpers with `{{placeholder}}` replacement.
//! - `history`: The `GeneratedImage` record, the bounded history and its
//!   on-disk snapshot.
//! - `client`: Presentation state and the orchestrator driving the API.
//! - `utils`: Credential masking for logs and error bodies.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `PromptEnhancer`,
//! `ImageJobRunner`, `PromptConstructor` and `Orchestrator`.
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod openrouter;
pub mod prompt;
pub mod replicate;
pub mod utils;

pub use client::backend::{GenerationBackend, ProxyClient};
pub use client::orchestrator::{GenerateOutcome, Orchestrator};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use history::{GeneratedImage, History, HistoryStore};
pub use openrouter::client::PromptEnhancer;
pub use prompt::constructor::PromptConstructor;
pub use replicate::client::ImageJobRunner;
