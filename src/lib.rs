//! mediagrab library

pub mod app;
pub mod downloader;
pub mod extractor;
pub mod history;
pub mod imaging;
pub mod selector;
pub mod server;
pub mod utils;

// Re-export main types for easier use
pub use app::AppState;
pub use downloader::{DownloadOutcome, MediaDownloader};
pub use extractor::{Extractor, StreamDescriptor, VideoInfo, VideoMetadata, YtDlpExtractor};
pub use history::{History, HistoryRecord};
pub use selector::{select, Quality, Selection, SelectionRequest};
pub use utils::{AppSettings, MediagrabError};
