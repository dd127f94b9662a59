//! Sequential multi-item downloads

use crate::imaging::{file_name_from_url, process, HttpFetcher, ImageTarget, Resize};
use crate::utils::error::{MediagrabError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct SavedFile {
    pub title: String,
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub url: String,
    pub error: String,
}

/// Per-item results of a batch, in input order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: Vec<BatchFailure>,
    pub files: Vec<SavedFile>,
}

impl BatchReport {
    pub fn record_success(&mut self, file: SavedFile) {
        self.succeeded += 1;
        self.files.push(file);
    }

    pub fn record_failure(&mut self, url: &str, error: &MediagrabError) {
        self.failed.push(BatchFailure {
            url: url.to_string(),
            error: error.user_message(),
        });
    }

    pub fn summary(&self) -> String {
        format!(
            "Downloaded {} of {} items",
            self.succeeded,
            self.succeeded + self.failed.len()
        )
    }
}

/// Fetch, convert and save each image URL into `output_dir`
pub async fn download_images(
    fetcher: &HttpFetcher,
    urls: &[String],
    target: ImageTarget,
    output_dir: &Path,
) -> BatchReport {
    let mut report = BatchReport::default();

    let urls: Vec<&str> = urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()).collect();
    for (index, url) in urls.iter().enumerate() {
        let fallback = format!("image_{}.jpg", index + 1);
        match save_image(fetcher, url, &fallback, target, output_dir).await {
            Ok(file) => {
                info!("Saved image {}/{}: {}", index + 1, urls.len(), file.file_name);
                report.record_success(file);
            }
            Err(e) => {
                warn!("Image {} failed: {}", url, e);
                report.record_failure(url, &e);
            }
        }
    }

    report
}

async fn save_image(
    fetcher: &HttpFetcher,
    url: &str,
    fallback: &str,
    target: ImageTarget,
    output_dir: &Path,
) -> Result<SavedFile> {
    let bytes = fetcher.get_bytes(url).await?;
    let source_name = file_name_from_url(url, fallback);
    let processed = process(bytes, &source_name, target, Resize::Original)?;

    let path = unique_path(output_dir, &processed.file_name).await;
    tokio::fs::write(&path, &processed.bytes).await?;

    Ok(SavedFile {
        title: source_name,
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(processed.file_name),
        path,
    })
}

/// `dir/name`, or `dir/stem_N.ext` if that already exists
async fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
        return candidate;
    }

    let path = Path::new(file_name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    let extension = path.extension().and_then(|s| s.to_str());

    let mut n = 1;
    loop {
        let name = match extension {
            Some(ext) => format!("{}_{}.{}", stem, n, ext),
            None => format!("{}_{}", stem, n),
        };
        let candidate = dir.join(name);
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}
