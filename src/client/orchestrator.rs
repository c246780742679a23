//! Sequences enhance -> generate for one user and owns the presentation
//! state.
//!
//! Only one generate cycle runs at a time. A call made while another is in
//! flight returns `GenerateOutcome::Ignored`; nothing is queued. The state
//! lock is never held across a network call, and a cycle whose future is
//! dropped before it settles still clears the loading flag.
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::backend::GenerationBackend;
use crate::client::state::UiState;
use crate::error::{AppError, AppResult};
use crate::history::{GeneratedImage, HistoryStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Blank input, or a cycle was already running.
    Ignored,
    Completed(GeneratedImage),
    Failed(String),
}

pub struct Orchestrator<B> {
    backend: B,
    store: HistoryStore,
    download_dir: PathBuf,
    state: Arc<RwLock<UiState>>,
}

/// Clears the loading flag if a generate cycle is dropped before it settles.
struct LoadingGuard {
    state: Arc<RwLock<UiState>>,
    armed: bool,
}

impl LoadingGuard {
    fn new(state: &Arc<RwLock<UiState>>) -> Self {
        LoadingGuard { state: Arc::clone(state), armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!("Generate cycle dropped before it settled");
        if let Ok(mut state) = self.state.try_write() {
            state.abandon();
            return;
        }
        // A reader holds the lock right now; finish on the runtime.
        let state = Arc::clone(&self.state);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                state.write().await.abandon();
            });
        }
    }
}

impl<B: GenerationBackend> Orchestrator<B> {
    /// Build the orchestrator and load the persisted history once.
    pub async fn new(backend: B, store: HistoryStore, download_dir: impl Into<PathBuf>) -> Self {
        let history = store.load().await;
        tracing::debug!(entries = history.len(), "Loaded history");
        Orchestrator {
            backend,
            store,
            download_dir: download_dir.into(),
            state: Arc::new(RwLock::new(UiState::with_history(history))),
        }
    }

    pub async fn state(&self) -> UiState {
        self.state.read().await.clone()
    }

    pub async fn set_input(&self, input: &str) {
        self.state.write().await.set_input(input);
    }

    pub async fn generate(&self, description: &str) -> GenerateOutcome {
        let accepted = self.state.write().await.begin(description);
        let Some(description) = accepted else {
            tracing::debug!("Generate ignored: blank input or already loading");
            return GenerateOutcome::Ignored;
        };
        let guard = LoadingGuard::new(&self.state);

        match self.run_cycle(&description).await {
            Ok(image) => {
                let history = {
                    let mut state = self.state.write().await;
                    state.complete(image.clone());
                    state.history().clone()
                };
                guard.disarm();
                if let Err(e) = self.store.save(&history).await {
                    tracing::warn!("Failed to persist history: {}", e);
                }
                tracing::info!(url = %image.url(), "Generated image");
                GenerateOutcome::Completed(image)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!("Generate failed: {}", message);
                self.state.write().await.fail(message.clone());
                guard.disarm();
                GenerateOutcome::Failed(message)
            }
        }
    }

    async fn run_cycle(&self, description: &str) -> AppResult<GeneratedImage> {
        let enhanced = self.backend.enhance_prompt(description).await?;
        let url = self.backend.generate_image(&enhanced).await?;
        GeneratedImage::new(url, description, enhanced)
    }

    /// Fetch `url` and save it as `<download_dir>/<filename>.png`.
    pub async fn download(&self, url: &str, filename: &str) -> AppResult<PathBuf> {
        match self.save_download(url, filename).await {
            Ok(path) => {
                tracing::info!("Saved {}", path.display());
                Ok(path)
            }
            Err(e) => {
                tracing::error!("Download failed: {}", e);
                self.state.write().await.download_failed();
                Err(AppError::Download(e.to_string()))
            }
        }
    }

    async fn save_download(&self, url: &str, filename: &str) -> AppResult<PathBuf> {
        let separator = |c: char| c == '/' || c == '\\';
        if filename.is_empty() || filename.contains(separator) || filename.contains("..") {
            return Err(AppError::InvalidInput(format!("Invalid filename: {}", filename)));
        }
        let bytes = self.backend.fetch_image(url).await?;
        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = self.download_dir.join(format!("{}.png", filename));
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }

    pub async fn select(&self, index: usize) -> Option<GeneratedImage> {
        self.state.write().await.select(index)
    }

    pub async fn clear_history(&self) -> AppResult<()> {
        self.store.clear().await?;
        self.state.write().await.replace_history(Default::default());
        Ok(())
    }
}
