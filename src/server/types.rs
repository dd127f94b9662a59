use serde::{Deserialize, Serialize};
use url::Url;

use crate::downloader::DownloadOutcome;
use crate::selector::Selection;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UrlBody {
    pub url: String,
}

/// A list of URLs, sent either as an array or as newline separated text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UrlList {
    List(Vec<String>),
    Text(String),
}

impl UrlList {
    pub fn into_vec(self) -> Vec<String> {
        let raw = match self {
            UrlList::List(urls) => urls,
            UrlList::Text(text) => text.lines().map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct VideoDownloadBody {
    pub url: String,
    pub container: Option<String>,
    pub quality: Option<String>,
    pub stream_type: Option<String>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AudioDownloadBody {
    pub url: String,
    pub container: Option<String>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
    pub urls: UrlList,
    pub kind: Option<String>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistDownloadBody {
    pub url: String,
    pub kind: Option<String>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageDownloadBody {
    pub url: String,
    pub format: Option<String>,
    pub resize: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailBody {
    pub url: String,
    pub quality: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageBatchBody {
    pub urls: UrlList,
    pub format: Option<String>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DirQuery {
    pub dir: Option<String>,
}

/// Result of a single video or audio download
#[derive(Debug, Serialize)]
pub struct DownloadDto {
    pub title: String,
    pub file_name: String,
    pub path: String,
    pub selection: Selection,
    pub warnings: Vec<String>,
    pub download_url: Option<String>,
}

impl From<DownloadOutcome> for DownloadDto {
    fn from(outcome: DownloadOutcome) -> Self {
        let dir = outcome
            .path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            download_url: file_link(&dir, &outcome.file_name),
            title: outcome.title,
            file_name: outcome.file_name,
            path: outcome.path.to_string_lossy().into_owned(),
            selection: outcome.selection,
            warnings: outcome.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub size_label: String,
    pub modified: String,
    pub download_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ThemeDto {
    pub dark: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub version: &'static str,
    pub extractor: &'static str,
}

/// Relative link to `GET /files/{name}?dir=...`
pub fn file_link(dir: &str, file_name: &str) -> Option<String> {
    let mut link = Url::parse("http://localhost/files/").ok()?;
    link.path_segments_mut().ok()?.pop_if_empty().push(file_name);
    if !dir.is_empty() {
        link.query_pairs_mut().append_pair("dir", dir);
    }
    Some(link[url::Position::BeforePath..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_list_accepts_text_and_arrays() {
        let text: UrlList = serde_json::from_str("\"https://a\\n\\n  https://b  \\n\"").unwrap();
        assert_eq!(text.into_vec(), vec!["https://a", "https://b"]);

        let list: UrlList = serde_json::from_str(r#"["https://a", " "]"#).unwrap();
        assert_eq!(list.into_vec(), vec!["https://a"]);
    }

    #[test]
    fn test_file_link_encodes_name_and_dir() {
        assert_eq!(
            file_link("/tmp/my dir", "a b.mp4").unwrap(),
            "/files/a%20b.mp4?dir=%2Ftmp%2Fmy+dir"
        );
        assert_eq!(file_link("", "x.mp4").unwrap(), "/files/x.mp4");
    }
}
