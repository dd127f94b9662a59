//! Image and thumbnail endpoints

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::types::{ImageBatchBody, ImageDownloadBody, ThumbnailBody};
use super::video::record_report;
use super::{ApiError, ApiResponse};
use crate::app::AppState;
use crate::downloader::{download_images, BatchReport};
use crate::history::HistoryKind;
use crate::imaging::{file_name_from_url, process, ImageTarget, Resize, ThumbnailQuality};
use crate::utils::paths::resolve_output_dir;

/// Fallback name for URLs without a usable last path segment
const DEFAULT_IMAGE_NAME: &str = "downloaded_image";

/// `Content-Disposition` value with a header-safe file name
pub(super) fn attachment(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{}\"", ascii)
}

fn size_label((width, height): (u32, u32)) -> String {
    format!("{}x{}", width, height)
}

/// `POST /api/image/download`
///
/// Returns the processed image itself. Original and final dimensions are
/// reported in the `x-original-size` and `x-final-size` headers.
pub async fn download_image(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ImageDownloadBody>,
) -> Result<Response, ApiError> {
    let target: ImageTarget = body.format.as_deref().unwrap_or_default().parse()?;
    let resize = Resize::from_choice(
        body.resize.as_deref().unwrap_or_default(),
        body.width,
        body.height,
    )?;

    let bytes = state.fetcher.get_bytes(&body.url).await?;
    let source_name = file_name_from_url(&body.url, DEFAULT_IMAGE_NAME);
    let processed =
        tokio::task::spawn_blocking(move || process(bytes, &source_name, target, resize)).await??;

    state
        .record(HistoryKind::Image, &processed.file_name, &processed.file_name)
        .await;

    Ok((
        [
            (header::CONTENT_TYPE, processed.mime.clone()),
            (header::CONTENT_DISPOSITION, attachment(&processed.file_name)),
            (
                header::HeaderName::from_static("x-original-size"),
                size_label(processed.original_size),
            ),
            (
                header::HeaderName::from_static("x-final-size"),
                size_label(processed.final_size),
            ),
        ],
        processed.bytes,
    )
        .into_response())
}

/// `POST /api/image/thumbnail`
pub async fn download_thumbnail(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ThumbnailBody>,
) -> Result<Response, ApiError> {
    let quality: ThumbnailQuality = body.quality.as_deref().unwrap_or_default().parse()?;
    let metadata = state.downloader.fetch_metadata(&body.url).await?;

    let bytes = state.fetcher.get_bytes(&quality.url(&metadata.id)).await?;
    let file_name = quality.file_name(&metadata.title);

    state
        .record(HistoryKind::Thumbnail, &metadata.title, &file_name)
        .await;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&file_name)),
        ],
        bytes,
    )
        .into_response())
}

/// `POST /api/image/batch`
pub async fn download_image_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ImageBatchBody>,
) -> Result<Json<ApiResponse<BatchReport>>, ApiError> {
    let urls = body.urls.into_vec();
    if urls.is_empty() {
        return Err(ApiError::validation("Please enter at least one image URL"));
    }
    let target: ImageTarget = body.format.as_deref().unwrap_or_default().parse()?;
    let output_dir = resolve_output_dir(body.output_dir.as_deref(), &state.settings).await?;

    let report = download_images(&state.fetcher, &urls, target, &output_dir).await;
    record_report(&state, HistoryKind::Image, &report).await;
    Ok(Json(ApiResponse::success(report)))
}
