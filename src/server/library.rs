//! History, statistics, downloaded files and UI preferences

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Local};
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use super::images::attachment;
use super::types::{file_link, DirQuery, FileEntry, HealthDto, ThemeDto};
use super::{ApiError, ApiResponse};
use crate::app::AppState;
use crate::history::{HistoryRecord, HistoryStats};
use crate::utils::error::MediagrabError;
use crate::utils::format::format_file_size;
use crate::utils::paths::{is_safe_file_name, pick_output_dir};

/// `GET /api/history`, newest first
pub async fn get_history(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<HistoryRecord>>> {
    let records: Vec<HistoryRecord> = state.history.read().await.records().cloned().collect();
    Json(ApiResponse::success(records))
}

/// `DELETE /api/history`
pub async fn clear_history(State(state): State<Arc<AppState>>) -> Json<ApiResponse<()>> {
    state.history.write().await.clear();
    tracing::info!("Download history cleared");
    Json(ApiResponse::success(()))
}

/// `GET /api/stats`
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HistoryStats>> {
    Json(ApiResponse::success(state.history.read().await.stats()))
}

fn is_listable(name: &str) -> bool {
    !name.starts_with('.') && !name.ends_with(".part") && !name.ends_with(".ytdl")
}

/// `GET /api/files?dir=`
///
/// Files in the download directory, most recently modified first. A missing
/// directory lists as empty.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DirQuery>,
) -> Result<Json<ApiResponse<Vec<FileEntry>>>, ApiError> {
    let dir = pick_output_dir(query.dir.as_deref(), &state.settings);
    let mut read_dir = match tokio::fs::read_dir(&dir).await {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(Json(ApiResponse::success(Vec::new())));
        }
        Err(e) => return Err(MediagrabError::from(e).into()),
    };

    let mut files: Vec<(String, u64, Option<DateTime<Local>>)> = Vec::new();
    while let Some(entry) = read_dir.next_entry().await.map_err(MediagrabError::from)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_listable(&name) {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => continue,
        };
        let modified = metadata.modified().ok().map(DateTime::<Local>::from);
        files.push((name, metadata.len(), modified));
    }
    files.sort_by(|a, b| b.2.cmp(&a.2));

    let dir_label = dir.to_string_lossy();
    let entries = files
        .into_iter()
        .map(|(name, size, modified)| FileEntry {
            download_url: file_link(&dir_label, &name),
            size_label: format_file_size(size),
            modified: modified
                .map(|m| m.format("%m/%d %H:%M").to_string())
                .unwrap_or_default(),
            name,
            size,
        })
        .collect();

    Ok(Json(ApiResponse::success(entries)))
}

/// `GET /files/{name}?dir=` streams a downloaded file as an attachment
pub async fn serve_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<DirQuery>,
) -> Result<Response, ApiError> {
    if !is_safe_file_name(&name) {
        return Err(ApiError::validation("Invalid file name"));
    }

    let path = pick_output_dir(query.dir.as_deref(), &state.settings).join(&name);
    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(ApiError::file_not_found(&name)),
        Err(e) => return Err(MediagrabError::from(e).into()),
    };
    let metadata = file.metadata().await.map_err(MediagrabError::from)?;
    if !metadata.is_file() {
        return Err(ApiError::file_not_found(&name));
    }

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, attachment(&name)),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
        ],
        body,
    )
        .into_response())
}

/// `GET /api/theme`
pub async fn get_theme(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ThemeDto>> {
    Json(ApiResponse::success(ThemeDto {
        dark: state.is_dark_theme(),
    }))
}

/// `POST /api/theme/toggle`
pub async fn toggle_theme(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ThemeDto>> {
    Json(ApiResponse::success(ThemeDto {
        dark: state.toggle_theme(),
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthDto>> {
    Json(ApiResponse::success(HealthDto {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        extractor: state.downloader.extractor_id(),
    }))
}
