//! Video, audio, batch and playlist endpoints

use axum::{extract::State, Json};
use std::sync::Arc;

use super::types::{
    AudioDownloadBody, BatchBody, DownloadDto, PlaylistDownloadBody, UrlBody, VideoDownloadBody,
};
use super::{ApiError, ApiResponse};
use crate::app::AppState;
use crate::downloader::{
    AudioDownloadRequest, BatchReport, PlaylistPreview, VideoDownloadRequest,
};
use crate::extractor::models::VideoMetadata;
use crate::history::HistoryKind;
use crate::selector::{parse_stream_type, MediaKind, Quality};
use crate::utils::paths::resolve_output_dir;

fn history_kind(kind: MediaKind) -> HistoryKind {
    match kind {
        MediaKind::Video => HistoryKind::Video,
        MediaKind::Audio => HistoryKind::Audio,
    }
}

fn parse_kind(kind: Option<&str>) -> Result<MediaKind, ApiError> {
    Ok(kind.unwrap_or_default().parse::<MediaKind>()?)
}

/// `POST /api/video/info`
pub async fn video_info(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UrlBody>,
) -> Result<Json<ApiResponse<VideoMetadata>>, ApiError> {
    let metadata = state.downloader.fetch_metadata(&body.url).await?;
    Ok(Json(ApiResponse::success(metadata)))
}

/// `POST /api/video/download`
///
/// Selects a stream for the requested container, quality and stream type,
/// downloads it and records it in the history. Substitutions and missing
/// audio are reported in `warnings`.
pub async fn download_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VideoDownloadBody>,
) -> Result<Json<ApiResponse<DownloadDto>>, ApiError> {
    let quality: Quality = body.quality.as_deref().unwrap_or_default().parse()?;
    let progressive = parse_stream_type(body.stream_type.as_deref().unwrap_or_default())?;
    let container = body
        .container
        .unwrap_or_else(|| state.downloader.default_container().to_string());
    let output_dir = resolve_output_dir(body.output_dir.as_deref(), &state.settings).await?;

    let outcome = state
        .downloader
        .download_video(&VideoDownloadRequest {
            url: body.url,
            container,
            quality,
            progressive,
            output_dir,
        })
        .await?;

    state
        .record(HistoryKind::Video, &outcome.title, &outcome.file_name)
        .await;
    Ok(Json(ApiResponse::success(outcome.into())))
}

/// `POST /api/audio/download`
pub async fn download_audio(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AudioDownloadBody>,
) -> Result<Json<ApiResponse<DownloadDto>>, ApiError> {
    let container = body
        .container
        .unwrap_or_else(|| state.downloader.default_container().to_string());
    let output_dir = resolve_output_dir(body.output_dir.as_deref(), &state.settings).await?;

    let outcome = state
        .downloader
        .download_audio(&AudioDownloadRequest {
            url: body.url,
            container,
            output_dir,
        })
        .await?;

    state
        .record(HistoryKind::Audio, &outcome.title, &outcome.file_name)
        .await;
    Ok(Json(ApiResponse::success(outcome.into())))
}

/// `POST /api/batch/download`
pub async fn download_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchBody>,
) -> Result<Json<ApiResponse<BatchReport>>, ApiError> {
    let urls = body.urls.into_vec();
    if urls.is_empty() {
        return Err(ApiError::validation("Please enter at least one URL"));
    }
    let kind = parse_kind(body.kind.as_deref())?;
    let output_dir = resolve_output_dir(body.output_dir.as_deref(), &state.settings).await?;

    let report = state.downloader.download_batch(&urls, kind, &output_dir).await;
    record_report(&state, history_kind(kind), &report).await;
    Ok(Json(ApiResponse::success(report)))
}

/// `POST /api/playlist/info`
pub async fn playlist_info(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UrlBody>,
) -> Result<Json<ApiResponse<PlaylistPreview>>, ApiError> {
    let preview = state.downloader.playlist_preview(&body.url).await?;
    Ok(Json(ApiResponse::success(preview)))
}

/// `POST /api/playlist/download`
pub async fn download_playlist(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PlaylistDownloadBody>,
) -> Result<Json<ApiResponse<BatchReport>>, ApiError> {
    let kind = parse_kind(body.kind.as_deref())?;
    let output_dir = resolve_output_dir(body.output_dir.as_deref(), &state.settings).await?;

    let report = state
        .downloader
        .download_playlist(&body.url, kind, &output_dir)
        .await?;
    record_report(&state, history_kind(kind), &report).await;
    Ok(Json(ApiResponse::success(report)))
}

pub(super) async fn record_report(state: &AppState, kind: HistoryKind, report: &BatchReport) {
    for file in &report.files {
        state.record(kind, &file.title, &file.file_name).await;
    }
}
