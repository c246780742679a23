//! On-disk snapshot of the client history.
//!
//! The whole list is written as one JSON array under a fixed storage key.
//! Loading never fails: a missing file is an empty history, and an unreadable
//! or unparseable snapshot is logged and treated the same way.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use super::image::GeneratedImage;
use super::list::History;
use crate::error::AppResult;

pub const STORAGE_KEY: &str = "comic-generator-history";

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryStore { path: path.into() }
    }

    /// Store named after `STORAGE_KEY` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", STORAGE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> History {
        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return History::new(),
            Err(e) => {
                tracing::error!("Failed to load history from {}: {}", self.path.display(), e);
                return History::new();
            }
        };
        match serde_json::from_str::<Vec<GeneratedImage>>(&data) {
            Ok(entries) => History::from_entries(entries),
            Err(e) => {
                tracing::error!("Failed to load history: {}", e);
                History::new()
            }
        }
    }

    pub async fn save(&self, history: &History) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_string(history)?;
        fs::write(&self.path, data).await?;
        tracing::debug!(entries = history.len(), path = %self.path.display(), "History saved");
        Ok(())
    }

    pub async fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
