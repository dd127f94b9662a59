//! Image fetch and conversion against a local HTTP server.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use mediagrab::downloader::download_images;
use mediagrab::extractor::{RetryPolicy, UserAgentPool};
use mediagrab::imaging::{process, HttpFetcher, ImageTarget, Resize};
use mediagrab::utils::error::MediagrabError;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct Served {
    flaky_calls: AtomicUsize,
    user_agents: Mutex<Vec<String>>,
}

fn png_bytes() -> Vec<u8> {
    let img = RgbaImage::from_pixel(12, 8, Rgba([0, 128, 255, 255]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

async fn cat(State(served): State<Arc<Served>>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(ua) = headers.get(header::USER_AGENT) {
        served
            .user_agents
            .lock()
            .unwrap()
            .push(ua.to_str().unwrap_or_default().to_string());
    }
    ([(header::CONTENT_TYPE, "image/png")], png_bytes())
}

async fn flaky(State(served): State<Arc<Served>>) -> impl IntoResponse {
    if served.flaky_calls.fetch_add(1, Ordering::SeqCst) == 0 {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    } else {
        ([(header::CONTENT_TYPE, "image/png")], png_bytes()).into_response()
    }
}

async fn not_an_image() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html")], "<html></html>")
}

async fn spawn_server() -> (SocketAddr, Arc<Served>) {
    let served = Arc::new(Served::default());
    let app = Router::new()
        .route("/images/cat.png", get(cat))
        .route("/flaky.png", get(flaky))
        .route("/page.html", get(not_an_image))
        .with_state(served.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, served)
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::with_client(
        reqwest::Client::new(),
        RetryPolicy::immediate(3),
        UserAgentPool::new(vec!["ua-one".to_string(), "ua-two".to_string()]),
    )
}

#[tokio::test]
async fn test_fetch_sends_user_agent_and_converts() {
    let (addr, served) = spawn_server().await;

    let bytes = fetcher()
        .get_bytes(&format!("http://{}/images/cat.png", addr))
        .await
        .unwrap();
    assert_eq!(served.user_agents.lock().unwrap().as_slice(), ["ua-one"]);

    let processed = process(
        bytes,
        "cat.png",
        ImageTarget::Jpeg,
        Resize::Exact { width: 6, height: 4 },
    )
    .unwrap();
    assert_eq!(processed.file_name, "cat.jpg");
    assert_eq!(processed.original_size, (12, 8));
    assert_eq!(processed.final_size, (6, 4));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let (addr, served) = spawn_server().await;

    let bytes = fetcher()
        .get_bytes(&format!("http://{}/flaky.png", addr))
        .await
        .unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(served.flaky_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let (addr, _) = spawn_server().await;

    let err = fetcher()
        .get_bytes(&format!("http://{}/missing.png", addr))
        .await
        .unwrap_err();
    assert!(matches!(err, MediagrabError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_batch_saves_images_and_reports_failures() {
    let (addr, _) = spawn_server().await;
    let dir = TempDir::new().unwrap();

    let urls = vec![
        format!("http://{}/images/cat.png", addr),
        format!("http://{}/page.html", addr),
        format!("http://{}/images/cat.png", addr),
    ];
    let report = download_images(&fetcher(), &urls, ImageTarget::WebP, dir.path()).await;

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].url.ends_with("/page.html"));
    assert!(dir.path().join("cat.webp").exists());
    assert!(dir.path().join("cat_1.webp").exists());
}
