use serde::Serialize;

use super::image::GeneratedImage;

pub const HISTORY_LIMIT: usize = 5;

/// Most-recent-first list of generations, never longer than `HISTORY_LIMIT`.
///
/// Serializes as a plain array. There is no `Deserialize`; snapshots come
/// back through `from_entries` so the limit holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<GeneratedImage>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    /// Keep the first `HISTORY_LIMIT` entries of an already newest-first list.
    pub fn from_entries(mut entries: Vec<GeneratedImage>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        History { entries }
    }

    /// Prepend `image`, evicting the oldest entry past the limit.
    pub fn push(&mut self, image: GeneratedImage) {
        self.entries.insert(0, image);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn get(&self, index: usize) -> Option<&GeneratedImage> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedImage> {
        self.entries.iter()
    }
}
