//! yt-dlp wrapper for extraction and download
//!
//! Metadata comes from `yt-dlp --dump-json`, playlists from
//! `yt-dlp -J --flat-playlist`, and downloads run yt-dlp with an explicit
//! format id chosen by the selector. Non-zero exits are classified from
//! stderr into the error taxonomy.

use crate::extractor::models::{PlaylistInfo, VideoInfo};
use crate::extractor::traits::{DownloadRequest, Extractor};
use crate::utils::error::{MediagrabError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

/// Video extractor backed by the yt-dlp executable
pub struct YtDlpExtractor {
    ytdlp_path: PathBuf,
}

impl YtDlpExtractor {
    /// Locate yt-dlp, preferring an explicitly configured binary.
    pub fn new(configured: Option<&Path>) -> Result<Self> {
        let ytdlp_path = match configured {
            Some(path) if is_executable(path) => path.to_path_buf(),
            Some(path) => {
                warn!("Configured yt-dlp is not executable: {}", path.display());
                find_ytdlp().ok_or(MediagrabError::YtDlpNotFound)?
            }
            None => find_ytdlp().ok_or(MediagrabError::YtDlpNotFound)?,
        };

        info!("Using yt-dlp at: {}", ytdlp_path.display());
        Ok(Self { ytdlp_path })
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }

    fn command(&self, user_agent: &str) -> AsyncCommand {
        let mut cmd = AsyncCommand::new(&self.ytdlp_path);
        cmd.arg("--no-warnings").arg("--user-agent").arg(user_agent);
        cmd.kill_on_drop(true);
        cmd
    }
}

/// Turn a failed yt-dlp run into a classified error
fn check_output(output: &Output, context: &str) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr
        .lines()
        .rev()
        .find(|line| line.contains("ERROR"))
        .unwrap_or_else(|| stderr.trim());
    error!("yt-dlp {} failed: {}", context, message);

    let message = if message.is_empty() {
        format!("yt-dlp exited with {}", output.status)
    } else {
        message.to_string()
    };
    Err(MediagrabError::classify(&message))
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn id(&self) -> &'static str {
        "ytdlp"
    }

    async fn extract_info(&self, url: &str, user_agent: &str) -> Result<VideoInfo> {
        debug!("Extracting video info for URL: {}", url);

        let output = self
            .command(user_agent)
            .arg("--dump-json")
            .arg("--no-download")
            .arg("--no-playlist")
            .arg(url)
            .output()
            .await?;
        check_output(&output, "extraction")?;

        let video_info: VideoInfo = serde_json::from_slice(&output.stdout)?;
        debug!(
            id = %video_info.id,
            formats = video_info.formats.len(),
            "Extracted video info"
        );
        Ok(video_info)
    }

    async fn extract_playlist(&self, url: &str, user_agent: &str) -> Result<PlaylistInfo> {
        debug!("Extracting playlist info for URL: {}", url);

        let output = self
            .command(user_agent)
            .arg("--dump-single-json")
            .arg("--flat-playlist")
            .arg(url)
            .output()
            .await?;
        check_output(&output, "playlist extraction")?;

        let playlist: PlaylistInfo = serde_json::from_slice(&output.stdout)?;
        Ok(playlist)
    }

    async fn download(&self, request: &DownloadRequest, user_agent: &str) -> Result<PathBuf> {
        let template = request
            .output_dir
            .join(format!("{}.%(ext)s", request.file_stem));
        debug!(
            format_id = %request.format_id,
            template = %template.display(),
            "Starting yt-dlp download"
        );

        let output = self
            .command(user_agent)
            .arg("-f")
            .arg(&request.format_id)
            .arg("--no-playlist")
            .arg("--no-progress")
            .arg("-o")
            .arg(&template)
            .arg("--print")
            .arg("after_move:filepath")
            .arg(&request.url)
            .output()
            .await?;
        check_output(&output, "download")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let printed = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from);

        match printed {
            Some(path) if path.exists() => Ok(path),
            _ => {
                // Older yt-dlp builds print nothing for after_move; look for the file ourselves
                find_downloaded_file(&request.output_dir, &request.file_stem)
                    .await?
                    .ok_or_else(|| {
                        MediagrabError::DownloadError(
                            "yt-dlp finished but the output file was not found".to_string(),
                        )
                    })
            }
        }
    }
}

async fn find_downloaded_file(dir: &Path, stem: &str) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches_stem = path.file_stem().and_then(|s| s.to_str()) == Some(stem);
        let partial = path.extension().and_then(|e| e.to_str()) == Some("part");
        if matches_stem && !partial {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. System PATH
/// 2. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Ok(path) = which::which("yt-dlp") {
        debug!("Using system yt-dlp: {:?}", path);
        return Some(path);
    }

    if let Some(common) = find_in_common_paths() {
        debug!("Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("yt-dlp not found anywhere!");
    None
}

/// Find yt-dlp in common installation paths
fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // macOS Homebrew (Intel)
        "/usr/local/bin/yt-dlp",
        // System
        "/usr/bin/yt-dlp",
        // pip --user
        "~/.local/bin/yt-dlp",
    ];

    for path_str in common_paths {
        let expanded = match path_str.strip_prefix("~/") {
            Some(rest) => match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            },
            None => PathBuf::from(path_str),
        };

        if is_executable(&expanded) {
            return Some(expanded);
        }
    }

    None
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ytdlp_returns_executable() {
        if let Some(path) = find_ytdlp() {
            assert!(is_executable(&path), "{} is not executable", path.display());
        }
    }

    #[test]
    fn test_is_executable() {
        let path = PathBuf::from("/bin/sh");
        if path.exists() {
            assert!(is_executable(&path));
        }
        assert!(!is_executable(Path::new("/definitely/not/here/yt-dlp")));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_output_classifies_stderr() {
        use std::os::unix::process::ExitStatusExt;

        let output = Output {
            status: std::process::ExitStatus::from_raw(1 << 8),
            stdout: Vec::new(),
            stderr: b"[youtube] abc: Downloading webpage\nERROR: [youtube] abc: Private video\n".to_vec(),
        };
        let err = check_output(&output, "extraction").unwrap_err();
        assert!(matches!(err, MediagrabError::VideoUnavailable(_)));
    }

    #[tokio::test]
    async fn test_find_downloaded_file_skips_partials() {
        let temp = tempfile::tempdir().expect("temp dir");
        tokio::fs::write(temp.path().join("clip.mp4.part"), b"x").await.unwrap();
        tokio::fs::write(temp.path().join("clip.webm"), b"x").await.unwrap();

        let found = find_downloaded_file(temp.path(), "clip").await.unwrap();
        assert_eq!(found, Some(temp.path().join("clip.webm")));
    }
}
