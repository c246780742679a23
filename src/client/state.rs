//! Presentation state of the client and its transitions.
//!
//! Every mutation goes through one of the methods below; none of them touch
//! the network, so the orchestrator can apply them under a short lock.
use crate::history::{GeneratedImage, History};

pub const DOWNLOAD_ERROR: &str = "Failed to download image";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    input: String,
    loading: bool,
    error: Option<String>,
    current: Option<GeneratedImage>,
    history: History,
}

impl UiState {
    pub fn with_history(history: History) -> Self {
        UiState { history, ..UiState::default() }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current(&self) -> Option<&GeneratedImage> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Start a generate cycle. Returns the trimmed description, or `None` when
    /// the input is blank or a cycle is already running.
    pub fn begin(&mut self, description: &str) -> Option<String> {
        let trimmed = description.trim();
        if trimmed.is_empty() || self.loading {
            return None;
        }
        self.input = description.to_string();
        self.loading = true;
        self.error = None;
        Some(trimmed.to_string())
    }

    pub fn complete(&mut self, image: GeneratedImage) {
        self.history.push(image.clone());
        self.current = Some(image);
        self.loading = false;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.loading = false;
    }

    /// A cycle ended without a result or an error to show.
    pub fn abandon(&mut self) {
        self.loading = false;
    }

    pub fn download_failed(&mut self) {
        self.error = Some(DOWNLOAD_ERROR.to_string());
    }

    /// Show a history entry as the current result.
    pub fn select(&mut self, index: usize) -> Option<GeneratedImage> {
        let picked = self.history.get(index).cloned()?;
        self.current = Some(picked.clone());
        Some(picked)
    }

    pub fn replace_history(&mut self, history: History) {
        self.history = history;
    }
}
