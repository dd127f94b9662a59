//! Request orchestration
//!
//! Each user request runs metadata extraction, format selection and the
//! download itself in sequence. Extractor calls go through [`retry`] so
//! transient blocks are retried with a rotated user agent.

pub mod batch;

pub use batch::{download_images, BatchFailure, BatchReport, SavedFile};

use crate::extractor::models::{PlaylistInfo, VideoInfo, VideoMetadata};
use crate::extractor::retry::{retry, RetryPolicy, UserAgentPool};
use crate::extractor::traits::{DownloadRequest, Extractor};
use crate::imaging::parse_http_url;
use crate::selector::{select, MediaKind, Quality, Selection, SelectionRequest};
use crate::utils::error::{MediagrabError, Result};
use crate::utils::format::sanitize_filename;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Container used for audio in batch and playlist downloads
pub const BATCH_AUDIO_CONTAINER: &str = "mp4";

/// Number of entry titles shown in a playlist preview
pub const PLAYLIST_PREVIEW_LEN: usize = 5;

#[derive(Debug, Clone)]
pub struct VideoDownloadRequest {
    pub url: String,
    pub container: String,
    pub quality: Quality,
    pub progressive: bool,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AudioDownloadRequest {
    pub url: String,
    pub container: String,
    pub output_dir: PathBuf,
}

/// A finished single-item download
#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutcome {
    pub title: String,
    pub file_name: String,
    pub path: PathBuf,
    pub selection: Selection,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistPreview {
    pub title: String,
    pub total: usize,
    pub first_titles: Vec<String>,
}

/// Runs metadata, selection and download for user requests
pub struct MediaDownloader {
    extractor: Arc<dyn Extractor>,
    policy: RetryPolicy,
    agents: UserAgentPool,
    default_container: String,
}

impl MediaDownloader {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        policy: RetryPolicy,
        default_container: impl Into<String>,
    ) -> Self {
        Self {
            extractor,
            policy,
            agents: UserAgentPool::default(),
            default_container: default_container.into(),
        }
    }

    pub fn with_agents(mut self, agents: UserAgentPool) -> Self {
        self.agents = agents;
        self
    }

    pub fn extractor_id(&self) -> &'static str {
        self.extractor.id()
    }

    pub fn default_container(&self) -> &str {
        &self.default_container
    }

    async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        let url = validate_url(url)?;
        retry(&self.policy, &self.agents, "Extraction", |_, user_agent| {
            let extractor = Arc::clone(&self.extractor);
            let url = url.clone();
            async move { extractor.extract_info(&url, &user_agent).await }
        })
        .await
    }

    /// Extract and adapt metadata for one media item
    pub async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        let info = self.fetch_info(url).await?;
        VideoMetadata::from_info(&info)
    }

    pub async fn download_video(&self, request: &VideoDownloadRequest) -> Result<DownloadOutcome> {
        let selection = SelectionRequest::video(
            request.container.as_str(),
            request.quality,
            request.progressive,
        );
        self.download_with(&request.url, &selection, &request.output_dir)
            .await
    }

    pub async fn download_audio(&self, request: &AudioDownloadRequest) -> Result<DownloadOutcome> {
        let selection = SelectionRequest::audio(request.container.as_str());
        self.download_with(&request.url, &selection, &request.output_dir)
            .await
    }

    /// Selection used for every item of a batch or playlist
    pub fn batch_selection(&self, kind: MediaKind) -> SelectionRequest {
        match kind {
            MediaKind::Video => {
                SelectionRequest::video(self.default_container.as_str(), Quality::Best, true)
            }
            MediaKind::Audio => SelectionRequest::audio(BATCH_AUDIO_CONTAINER),
        }
    }

    async fn download_with(
        &self,
        url: &str,
        request: &SelectionRequest,
        output_dir: &Path,
    ) -> Result<DownloadOutcome> {
        let metadata = self.fetch_metadata(url).await?;
        let selection = select(&metadata.streams, request)?;
        let warnings = selection.warnings();
        for warning in &warnings {
            warn!(url = %url, "{}", warning);
        }

        let download = DownloadRequest {
            url: metadata
                .webpage_url
                .clone()
                .unwrap_or_else(|| url.trim().to_string()),
            format_id: selection.descriptor.format_id.clone(),
            output_dir: output_dir.to_path_buf(),
            file_stem: sanitize_filename(&metadata.title),
        };

        let path = retry(&self.policy, &self.agents, "Download", |_, user_agent| {
            let extractor = Arc::clone(&self.extractor);
            let download = download.clone();
            async move { extractor.download(&download, &user_agent).await }
        })
        .await?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| download.file_stem.clone());
        info!(
            title = %metadata.title,
            format_id = %selection.descriptor.format_id,
            "Downloaded {}",
            file_name
        );

        Ok(DownloadOutcome {
            title: metadata.title,
            file_name,
            path,
            selection,
            warnings,
        })
    }

    /// Download each URL in order; one failure does not stop the rest.
    pub async fn download_batch(
        &self,
        urls: &[String],
        kind: MediaKind,
        output_dir: &Path,
    ) -> BatchReport {
        let request = self.batch_selection(kind);
        let mut report = BatchReport::default();

        let urls: Vec<&str> = urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()).collect();
        for (index, url) in urls.iter().enumerate() {
            info!("Batch item {}/{}: {}", index + 1, urls.len(), url);
            match self.download_with(url, &request, output_dir).await {
                Ok(outcome) => report.record_success(SavedFile {
                    title: outcome.title,
                    file_name: outcome.file_name,
                    path: outcome.path,
                }),
                Err(e) => {
                    warn!("Batch item {} failed: {}", url, e);
                    report.record_failure(url, &e);
                }
            }
        }

        report
    }

    async fn fetch_playlist(&self, url: &str) -> Result<PlaylistInfo> {
        let url = validate_url(url)?;
        retry(&self.policy, &self.agents, "Playlist extraction", |_, user_agent| {
            let extractor = Arc::clone(&self.extractor);
            let url = url.clone();
            async move { extractor.extract_playlist(&url, &user_agent).await }
        })
        .await
    }

    pub async fn playlist_preview(&self, url: &str) -> Result<PlaylistPreview> {
        let playlist = self.fetch_playlist(url).await?;
        Ok(PlaylistPreview {
            title: playlist
                .title
                .clone()
                .unwrap_or_else(|| "Untitled playlist".to_string()),
            total: playlist.entries.len(),
            first_titles: playlist
                .entries
                .iter()
                .take(PLAYLIST_PREVIEW_LEN)
                .map(|e| e.title.clone().unwrap_or_else(|| e.id.clone()))
                .collect(),
        })
    }

    /// Download every playlist entry with the batch policy for `kind`
    pub async fn download_playlist(
        &self,
        url: &str,
        kind: MediaKind,
        output_dir: &Path,
    ) -> Result<BatchReport> {
        let playlist = self.fetch_playlist(url).await?;
        if playlist.entries.is_empty() {
            return Err(MediagrabError::ExtractionError(
                "playlist has no entries".to_string(),
            ));
        }

        let urls: Vec<String> = playlist
            .entries
            .iter()
            .filter_map(|entry| entry.watch_url())
            .collect();
        info!(
            "Downloading {} of {} playlist entries",
            urls.len(),
            playlist.entries.len()
        );
        Ok(self.download_batch(&urls, kind, output_dir).await)
    }
}

fn validate_url(url: &str) -> Result<String> {
    if url.trim().is_empty() {
        return Err(MediagrabError::InvalidUrl("Please enter a URL".to_string()));
    }
    parse_http_url(url).map(|u| u.to_string())
}
