//! Request vocabulary for the format selector

use crate::utils::error::MediagrabError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality tiers offered to the user, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "240p")]
    P240,
}

impl Quality {
    pub const ALL: [Quality; 6] = [
        Quality::Best,
        Quality::P1080,
        Quality::P720,
        Quality::P480,
        Quality::P360,
        Quality::P240,
    ];

    /// Pixel height of the tier; `None` for `Best`
    pub fn height(self) -> Option<u32> {
        match self {
            Quality::Best => None,
            Quality::P1080 => Some(1080),
            Quality::P720 => Some(720),
            Quality::P480 => Some(480),
            Quality::P360 => Some(360),
            Quality::P240 => Some(240),
        }
    }

    pub fn from_height(height: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.height() == Some(height))
    }

    /// Label shown in the quality dropdown
    pub fn label(self) -> &'static str {
        match self {
            Quality::Best => "Best Available (HD)",
            Quality::P1080 => "1080p (Full HD)",
            Quality::P720 => "720p (HD)",
            Quality::P480 => "480p (SD)",
            Quality::P360 => "360p (Low)",
            Quality::P240 => "240p (Mobile)",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Best => "best",
            Quality::P1080 => "1080p",
            Quality::P720 => "720p",
            Quality::P480 => "480p",
            Quality::P360 => "360p",
            Quality::P240 => "240p",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = MediagrabError;

    /// Accepts `best`, `1080`, `1080p` and the dropdown labels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower.is_empty() || lower.starts_with("best") {
            return Ok(Quality::Best);
        }

        let digits: String = lower.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits
            .parse()
            .ok()
            .and_then(Quality::from_height)
            .ok_or_else(|| MediagrabError::InvalidRequest(format!("unknown quality '{}'", s)))
    }
}

/// What the user wants out of the media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl FromStr for MediaKind {
    type Err = MediagrabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "video" => Ok(MediaKind::Video),
            "audio" | "audio only" | "audio_only" => Ok(MediaKind::Audio),
            other => Err(MediagrabError::InvalidRequest(format!(
                "unknown media kind '{}'",
                other
            ))),
        }
    }
}

/// Parse the stream type dropdown into "prefer progressive"
pub fn parse_stream_type(s: &str) -> Result<bool, MediagrabError> {
    let lower = s.trim().to_lowercase();
    if lower.is_empty() || lower.starts_with("progressive") {
        Ok(true)
    } else if lower.starts_with("adaptive") {
        Ok(false)
    } else {
        Err(MediagrabError::InvalidRequest(format!(
            "unknown stream type '{}'",
            s
        )))
    }
}

/// One user-initiated selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequest {
    pub media_kind: MediaKind,
    /// Container extension such as `mp4`; empty or `any` matches everything
    pub container_preference: String,
    pub quality_preference: Quality,
    /// Video and audio in one file rather than video-only adaptive streams
    pub progressive_preference: bool,
}

impl SelectionRequest {
    pub fn video(container: impl Into<String>, quality: Quality, progressive: bool) -> Self {
        Self {
            media_kind: MediaKind::Video,
            container_preference: container.into(),
            quality_preference: quality,
            progressive_preference: progressive,
        }
    }

    pub fn audio(container: impl Into<String>) -> Self {
        Self {
            media_kind: MediaKind::Audio,
            container_preference: container.into(),
            quality_preference: Quality::Best,
            progressive_preference: false,
        }
    }
}
