//! Error handling for mediagrab

use thiserror::Error;

/// Main error type for mediagrab
#[derive(Debug, Error)]
pub enum MediagrabError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("403 Forbidden: the video platform blocked the request ({0})")]
    NetworkBlocked(String),

    #[error("Video unavailable: {0}")]
    VideoUnavailable(String),

    #[error("Age restricted: {0}")]
    AgeRestricted(String),

    #[error("No suitable stream found for the selected format and quality")]
    NoMatchingStream,

    #[error("Failed to extract video info: {0}")]
    ExtractionError(String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("Request to {url} failed with HTTP status {status}")]
    HttpStatus { status: u16, url: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cannot process this image: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, MediagrabError>;

const AGE_GATE_MARKERS: [&str; 4] = [
    "age-restricted",
    "age restricted",
    "confirm your age",
    "age verification",
];

impl MediagrabError {
    /// Classify a yt-dlp diagnostic into the error taxonomy.
    ///
    /// Order matters: a 403 that also mentions "unavailable" is still a block.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let detail = message.trim().to_string();

        if lower.contains("403") || lower.contains("forbidden") {
            Self::NetworkBlocked(detail)
        } else if lower.contains("private") || lower.contains("unavailable") {
            Self::VideoUnavailable(detail)
        } else if AGE_GATE_MARKERS.iter().any(|m| lower.contains(m)) {
            Self::AgeRestricted(detail)
        } else {
            Self::ExtractionError(detail)
        }
    }

    /// Whether a retry with a fresh client identity could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkBlocked(_)
            | Self::ExtractionError(_)
            | Self::DownloadError(_)
            | Self::NetworkError(_) => true,
            Self::HttpStatus { status, .. } => {
                matches!(status, 403 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Whether the platform itself refused us, which earns a longer pause.
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            Self::NetworkBlocked(_) | Self::HttpStatus { status: 403, .. }
        )
    }

    /// Readable text shown to the user in place of the raw error.
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkBlocked(_) => "403 Forbidden: this video may be restricted, private, or the \
                 platform is blocking requests. Try:\n\
                 1. Wait a few minutes and try again\n\
                 2. Check that the video is public and available\n\
                 3. Try a different video\n\
                 4. Use a VPN if you are in a restricted region"
                .to_string(),
            Self::VideoUnavailable(_) => {
                "Video unavailable: this video is private, deleted, or restricted in your region."
                    .to_string()
            }
            Self::AgeRestricted(_) => {
                "Age restricted: this video requires age verification and cannot be downloaded."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_forbidden() {
        let err = MediagrabError::classify("ERROR: unable to download video data: HTTP Error 403: Forbidden");
        assert!(matches!(err, MediagrabError::NetworkBlocked(_)));
        assert!(err.is_retryable());
        assert!(err.is_blocked());
    }

    #[test]
    fn test_classify_terminal_errors() {
        let private = MediagrabError::classify("ERROR: [youtube] abc: Private video");
        assert!(matches!(private, MediagrabError::VideoUnavailable(_)));
        assert!(!private.is_retryable());

        let gone = MediagrabError::classify("ERROR: [youtube] abc: Video unavailable");
        assert!(matches!(gone, MediagrabError::VideoUnavailable(_)));

        let age = MediagrabError::classify(
            "ERROR: [youtube] abc: Sign in to confirm your age. This video may be inappropriate",
        );
        assert!(matches!(age, MediagrabError::AgeRestricted(_)));
        assert!(!age.is_retryable());
    }

    #[test]
    fn test_classify_generic_is_retryable() {
        let err = MediagrabError::classify("ERROR: Unable to extract initial player response");
        assert!(matches!(err, MediagrabError::ExtractionError(_)));
        assert!(err.is_retryable());
        assert!(!err.is_blocked());
    }

    #[test]
    fn test_page_mentions_do_not_trigger_age_gate() {
        let err = MediagrabError::classify("ERROR: Unable to download webpage: timed out");
        assert!(matches!(err, MediagrabError::ExtractionError(_)));
    }

    #[test]
    fn test_http_status_retry_policy() {
        let throttled = MediagrabError::HttpStatus {
            status: 429,
            url: "https://example.com".into(),
        };
        assert!(throttled.is_retryable());

        let missing = MediagrabError::HttpStatus {
            status: 404,
            url: "https://example.com".into(),
        };
        assert!(!missing.is_retryable());
    }

    #[test]
    fn test_no_matching_stream_message() {
        assert_eq!(
            MediagrabError::NoMatchingStream.user_message(),
            "No suitable stream found for the selected format and quality"
        );
    }
}
