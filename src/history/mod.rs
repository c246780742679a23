pub mod image;
pub mod list;
pub mod store;

pub use image::GeneratedImage;
pub use list::{History, HISTORY_LIMIT};
pub use store::HistoryStore;
