//! Application state and server startup

use crate::downloader::MediaDownloader;
use crate::extractor::retry::RetryPolicy;
use crate::extractor::traits::Extractor;
use crate::extractor::ytdlp::YtDlpExtractor;
use crate::history::{History, HistoryKind, HistoryRecord};
use crate::imaging::HttpFetcher;
use crate::server;
use crate::utils::config::AppSettings;
use crate::utils::error::Result;
use anyhow::Context;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Everything a request handler can reach
pub struct AppState {
    pub settings: AppSettings,
    pub downloader: MediaDownloader,
    pub fetcher: HttpFetcher,
    pub history: RwLock<History>,
    pub dark_theme: AtomicBool,
}

impl AppState {
    pub fn new(settings: AppSettings, extractor: Arc<dyn Extractor>) -> Result<Self> {
        let fetcher = HttpFetcher::new(&settings)?;
        let downloader = MediaDownloader::new(
            extractor,
            RetryPolicy::from_settings(&settings),
            settings.default_container.clone(),
        );

        Ok(Self {
            settings,
            downloader,
            fetcher,
            history: RwLock::new(History::new()),
            dark_theme: AtomicBool::new(false),
        })
    }

    /// Add a completed download to the front of the history
    pub async fn record(&self, kind: HistoryKind, title: &str, file_name: &str) {
        self.history
            .write()
            .await
            .push(HistoryRecord::new(kind, title, file_name));
    }

    pub fn is_dark_theme(&self) -> bool {
        self.dark_theme.load(Ordering::Relaxed)
    }

    /// Flip the theme and return the new value
    pub fn toggle_theme(&self) -> bool {
        !self.dark_theme.fetch_xor(true, Ordering::Relaxed)
    }
}

/// Build the state around yt-dlp and serve until Ctrl+C
pub async fn run(settings: AppSettings) -> anyhow::Result<()> {
    let extractor = YtDlpExtractor::new(settings.ytdlp_path.as_deref())
        .context("yt-dlp is required to download videos")?;
    let state = AppState::new(settings, Arc::new(extractor))
        .context("Failed to initialize application state")?;
    serve(Arc::new(state)).await
}

pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.settings.bind_address.clone();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Web UI running at http://{}", listener.local_addr()?);

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::models::VideoInfo;
    use crate::extractor::traits::DownloadRequest;
    use crate::utils::error::MediagrabError;
    use async_trait::async_trait;
    use std::path::PathBuf;

    struct NoopExtractor;

    #[async_trait]
    impl Extractor for NoopExtractor {
        fn id(&self) -> &'static str {
            "noop"
        }

        async fn extract_info(&self, _url: &str, _user_agent: &str) -> Result<VideoInfo> {
            Err(MediagrabError::ExtractionError("noop".into()))
        }

        async fn download(&self, _request: &DownloadRequest, _user_agent: &str) -> Result<PathBuf> {
            Err(MediagrabError::DownloadError("noop".into()))
        }
    }

    #[tokio::test]
    async fn test_theme_toggle_and_history() {
        let state = AppState::new(AppSettings::default(), Arc::new(NoopExtractor)).unwrap();
        assert!(!state.is_dark_theme());
        assert!(state.toggle_theme());
        assert!(state.is_dark_theme());
        assert!(!state.toggle_theme());

        state.record(HistoryKind::Image, "cat", "cat.png").await;
        assert_eq!(state.history.read().await.len(), 1);
    }
}
