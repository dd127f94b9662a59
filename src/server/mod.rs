//! Web interface: the HTML page and the JSON API behind it

use axum::{
    response::Html,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::app::AppState;

mod error;
mod images;
mod library;
mod types;
mod video;

pub use error::{status_for, ApiError};
pub use types::*;

const INDEX_HTML: &str = include_str!("../../static/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/video/info", post(video::video_info))
        .route("/video/download", post(video::download_video))
        .route("/audio/download", post(video::download_audio))
        .route("/batch/download", post(video::download_batch))
        .route("/playlist/info", post(video::playlist_info))
        .route("/playlist/download", post(video::download_playlist))
        .route("/image/download", post(images::download_image))
        .route("/image/thumbnail", post(images::download_thumbnail))
        .route("/image/batch", post(images::download_image_batch))
        .route(
            "/history",
            get(library::get_history).delete(library::clear_history),
        )
        .route("/stats", get(library::get_stats))
        .route("/files", get(library::list_files))
        .route("/theme", get(library::get_theme))
        .route("/theme/toggle", post(library::toggle_theme))
        .route("/health", get(library::health));

    Router::new()
        .route("/", get(index))
        .route("/files/{name}", get(library::serve_file))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
