use crate::extractor::models::{PlaylistInfo, VideoInfo};
use crate::utils::error::{MediagrabError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Everything the extractor needs to fetch one chosen stream to disk
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub format_id: String,
    pub output_dir: PathBuf,
    /// File name without extension; the extractor appends the container
    pub file_stem: String,
}

/// Core trait for media extractors
///
/// This trait isolates the application from the specific extraction method
/// (yt-dlp today, a fake in tests). Every call receives the client
/// identification string for the current attempt so the retry layer can
/// rotate it.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g., "ytdlp")
    fn id(&self) -> &'static str;

    /// Extracts video information including the format catalog
    async fn extract_info(&self, url: &str, user_agent: &str) -> Result<VideoInfo>;

    /// Extracts a flat playlist listing (optional)
    async fn extract_playlist(&self, url: &str, user_agent: &str) -> Result<PlaylistInfo> {
        let _ = (url, user_agent);
        Err(MediagrabError::ExtractionError(format!(
            "Playlist extraction not supported by {}",
            self.id()
        )))
    }

    /// Downloads one format to disk and returns the final path
    async fn download(&self, request: &DownloadRequest, user_agent: &str) -> Result<PathBuf>;
}
