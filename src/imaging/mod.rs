//! Image download and conversion

pub mod fetch;
pub mod transform;

pub use fetch::{parse_http_url, HttpFetcher};
pub use transform::{file_name_from_url, process, ImageTarget, ProcessedImage, Resize, RESIZE_PRESETS};

use crate::utils::error::MediagrabError;
use crate::utils::format::sanitize_filename;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Thumbnail sizes published for every YouTube video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThumbnailQuality {
    #[default]
    #[serde(rename = "maxresdefault")]
    MaxRes,
    #[serde(rename = "hqdefault")]
    Hq,
    #[serde(rename = "mqdefault")]
    Mq,
    #[serde(rename = "sddefault")]
    Sd,
}

impl ThumbnailQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            ThumbnailQuality::MaxRes => "maxresdefault",
            ThumbnailQuality::Hq => "hqdefault",
            ThumbnailQuality::Mq => "mqdefault",
            ThumbnailQuality::Sd => "sddefault",
        }
    }

    pub fn url(self, video_id: &str) -> String {
        format!("https://img.youtube.com/vi/{}/{}.jpg", video_id, self.as_str())
    }

    pub fn file_name(self, title: &str) -> String {
        sanitize_filename(&format!("{}_{}.jpg", title, self.as_str()))
    }
}

impl fmt::Display for ThumbnailQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThumbnailQuality {
    type Err = MediagrabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "maxres" | "maxresdefault" => Ok(ThumbnailQuality::MaxRes),
            "hq" | "hqdefault" => Ok(ThumbnailQuality::Hq),
            "mq" | "mqdefault" => Ok(ThumbnailQuality::Mq),
            "sd" | "sddefault" => Ok(ThumbnailQuality::Sd),
            other => Err(MediagrabError::InvalidRequest(format!(
                "unknown thumbnail quality '{}'",
                other
            ))),
        }
    }
}
