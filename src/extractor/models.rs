//! Data structures for video information
//!
//! `VideoInfo` and `Format` mirror the JSON yt-dlp prints and stay loosely
//! typed. Everything downstream works on `VideoMetadata` and
//! `StreamDescriptor`, which the adapter functions below build and validate.

use crate::utils::error::{MediagrabError, Result};
use crate::utils::format::{format_count, format_duration, format_file_size};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Video information as reported by yt-dlp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub upload_date: Option<String>,
    #[serde(default)]
    pub formats: Vec<Format>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub extractor: Option<String>,
}

/// Video format information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Format {
    #[serde(default)]
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    pub resolution: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<u64>,
    pub fps: Option<f32>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub format_note: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub tbr: Option<f32>, // Total bitrate
    pub abr: Option<f32>, // Audio bitrate
}

/// Flat playlist listing (`yt-dlp -J --flat-playlist`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistInfo {
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Vec<PlaylistEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub id: String,
    pub url: Option<String>,
    pub title: Option<String>,
}

impl PlaylistEntry {
    /// URL to hand back to the extractor for this entry
    pub fn watch_url(&self) -> Option<String> {
        match &self.url {
            Some(url) if url.starts_with("http") => Some(url.clone()),
            _ if !self.id.is_empty() => {
                Some(format!("https://www.youtube.com/watch?v={}", self.id))
            }
            _ => None,
        }
    }
}

/// One downloadable variant of a media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub format_id: String,
    pub container: String,
    pub height: Option<u32>,
    pub frame_rate: Option<u32>,
    pub has_video: bool,
    pub has_audio: bool,
    pub file_size_bytes: Option<u64>,
    /// Audio bitrate in kbps
    pub bitrate: Option<u32>,
}

impl StreamDescriptor {
    /// Adapt a raw yt-dlp format.
    ///
    /// Returns `None` when the format lacks an id or extension, or carries
    /// neither video nor audio (storyboards, manifests).
    pub fn from_format(format: &Format) -> Option<Self> {
        let format_id = format.format_id.trim();
        let container = format.ext.trim().to_lowercase();
        if format_id.is_empty() || container.is_empty() {
            return None;
        }

        let height = format
            .height
            .or_else(|| format.resolution.as_deref().and_then(parse_height_label))
            .or_else(|| format.format_note.as_deref().and_then(parse_height_label));

        let has_video = match format.vcodec.as_deref() {
            Some("none") => false,
            Some(_) => true,
            None => height.is_some(),
        };
        let has_audio = matches!(format.acodec.as_deref(), Some(codec) if codec != "none");

        if !has_video && !has_audio {
            return None;
        }

        let bitrate = format
            .abr
            .or(if has_video { None } else { format.tbr })
            .filter(|b| *b > 0.0)
            .map(|b| b.round() as u32);

        Some(Self {
            format_id: format_id.to_string(),
            container,
            height: if has_video { height } else { None },
            frame_rate: format.fps.filter(|f| *f > 0.0).map(|f| f.round() as u32),
            has_video,
            has_audio,
            file_size_bytes: format.filesize.or(format.filesize_approx),
            bitrate,
        })
    }

    /// Video and audio in a single file
    pub fn is_progressive(&self) -> bool {
        self.has_video && self.has_audio
    }

    /// Video without audio
    pub fn is_adaptive_video(&self) -> bool {
        self.has_video && !self.has_audio
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    /// `"720p"` style label
    pub fn resolution_label(&self) -> Option<String> {
        self.height.map(|h| format!("{}p", h))
    }

    /// One-line summary, e.g. `"720p (30fps) - 12.0 MB"` or `"128kbps (webm) - 3.1 MB"`
    pub fn summary(&self) -> String {
        let size = self
            .file_size_bytes
            .map(format_file_size)
            .unwrap_or_else(|| "Unknown size".to_string());

        if self.has_video {
            let resolution = self
                .resolution_label()
                .unwrap_or_else(|| "Default".to_string());
            match self.frame_rate {
                Some(fps) => format!("{} ({}fps) - {}", resolution, fps, size),
                None => format!("{} - {}", resolution, size),
            }
        } else {
            let bitrate = self
                .bitrate
                .map(|b| format!("{}kbps", b))
                .unwrap_or_else(|| "Default".to_string());
            format!("{} ({}) - {}", bitrate, self.container, size)
        }
    }
}

/// Parse `"720p"`, `"720p60"` or `"1280x720"` into a pixel height
fn parse_height_label(label: &str) -> Option<u32> {
    let label = label.trim();
    if let Some((_, h)) = label.split_once('x') {
        return h.trim().parse().ok();
    }

    let digits: String = label.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || !label[digits.len()..].starts_with('p') {
        return None;
    }
    digits.parse().ok()
}

/// Strongly typed view of a resolved media item
#[derive(Debug, Clone, Serialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub author: String,
    pub webpage_url: Option<String>,
    pub duration_seconds: u64,
    pub duration_label: String,
    pub view_count: Option<u64>,
    pub views_label: String,
    pub like_count: Option<u64>,
    pub upload_date: Option<String>,
    pub thumbnail_url: Option<String>,
    pub streams: Vec<StreamDescriptor>,
    pub available_qualities: Vec<String>,
}

impl VideoMetadata {
    pub fn from_info(info: &VideoInfo) -> Result<Self> {
        if info.id.trim().is_empty() {
            return Err(MediagrabError::ExtractionError(
                "extractor returned no video id".to_string(),
            ));
        }

        let title = match info.title.trim() {
            "" => info.id.clone(),
            title => title.to_string(),
        };
        let author = info
            .uploader
            .clone()
            .or_else(|| info.channel.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let duration_seconds = info.duration.map(|d| d.max(0.0).round() as u64).unwrap_or(0);

        let streams: Vec<StreamDescriptor> = info
            .formats
            .iter()
            .filter_map(StreamDescriptor::from_format)
            .collect();

        let mut video_streams: Vec<&StreamDescriptor> =
            streams.iter().filter(|s| s.has_video && s.height.is_some()).collect();
        video_streams.sort_by(|a, b| b.height.cmp(&a.height));
        let available_qualities = video_streams.iter().map(|s| s.summary()).collect();

        Ok(Self {
            id: info.id.clone(),
            title,
            author,
            webpage_url: info.webpage_url.clone(),
            duration_seconds,
            duration_label: format_duration(duration_seconds),
            view_count: info.view_count,
            views_label: info
                .view_count
                .map(format_count)
                .unwrap_or_else(|| "N/A".to_string()),
            like_count: info.like_count,
            upload_date: info.upload_date.as_deref().and_then(format_upload_date),
            thumbnail_url: info.thumbnail.clone(),
            streams,
            available_qualities,
        })
    }
}

/// yt-dlp reports `YYYYMMDD`
fn format_upload_date(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(id: &str, ext: &str, height: Option<u32>, vcodec: &str, acodec: &str) -> Format {
        Format {
            format_id: id.to_string(),
            ext: ext.to_string(),
            height,
            vcodec: Some(vcodec.to_string()),
            acodec: Some(acodec.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_descriptor_from_progressive_format() {
        let mut raw = format("18", "mp4", Some(360), "avc1.42001E", "mp4a.40.2");
        raw.fps = Some(29.97);
        raw.filesize_approx = Some(5_000_000);

        let d = StreamDescriptor::from_format(&raw).expect("descriptor");
        assert!(d.is_progressive());
        assert_eq!(d.height, Some(360));
        assert_eq!(d.frame_rate, Some(30));
        assert_eq!(d.file_size_bytes, Some(5_000_000));
        assert_eq!(d.bitrate, None);
    }

    #[test]
    fn test_descriptor_from_audio_only_format() {
        let mut raw = format("251", "webm", None, "none", "opus");
        raw.abr = Some(129.5);
        raw.resolution = Some("audio only".to_string());

        let d = StreamDescriptor::from_format(&raw).expect("descriptor");
        assert!(d.is_audio_only());
        assert_eq!(d.height, None);
        assert_eq!(d.bitrate, Some(130));
    }

    #[test]
    fn test_storyboards_and_missing_ids_are_dropped() {
        let storyboard = format("sb0", "mhtml", None, "none", "none");
        assert!(StreamDescriptor::from_format(&storyboard).is_none());

        let anonymous = format("", "mp4", Some(720), "avc1", "none");
        assert!(StreamDescriptor::from_format(&anonymous).is_none());
    }

    #[test]
    fn test_height_falls_back_to_labels() {
        let mut raw = format("136", "MP4", None, "avc1", "none");
        raw.resolution = Some("1280x720".to_string());
        let d = StreamDescriptor::from_format(&raw).expect("descriptor");
        assert_eq!(d.height, Some(720));
        assert_eq!(d.container, "mp4");

        let mut noted = format("298", "mp4", None, "avc1", "none");
        noted.format_note = Some("720p60".to_string());
        assert_eq!(StreamDescriptor::from_format(&noted).unwrap().height, Some(720));
    }

    #[test]
    fn test_parse_height_label() {
        assert_eq!(parse_height_label("1080p"), Some(1080));
        assert_eq!(parse_height_label("1920x1080"), Some(1080));
        assert_eq!(parse_height_label("audio only"), None);
        assert_eq!(parse_height_label("medium"), None);
    }

    #[test]
    fn test_summary_labels() {
        let mut raw = format("22", "mp4", Some(720), "avc1", "mp4a");
        raw.fps = Some(30.0);
        raw.filesize = Some(12 * 1024 * 1024);
        let d = StreamDescriptor::from_format(&raw).unwrap();
        assert_eq!(d.summary(), "720p (30fps) - 12.0 MB");

        let mut audio = format("140", "m4a", None, "none", "mp4a");
        audio.abr = Some(128.0);
        let d = StreamDescriptor::from_format(&audio).unwrap();
        assert_eq!(d.summary(), "128kbps (m4a) - Unknown size");
    }

    #[test]
    fn test_metadata_from_info() {
        let info = VideoInfo {
            id: "abc123".to_string(),
            title: "Sample".to_string(),
            duration: Some(213.0),
            uploader: None,
            channel: Some("Channel".to_string()),
            upload_date: Some("20240131".to_string()),
            view_count: Some(1_234_567),
            formats: vec![
                format("18", "mp4", Some(360), "avc1", "mp4a"),
                format("137", "mp4", Some(1080), "avc1", "none"),
                format("sb0", "mhtml", None, "none", "none"),
            ],
            ..Default::default()
        };

        let meta = VideoMetadata::from_info(&info).expect("metadata");
        assert_eq!(meta.author, "Channel");
        assert_eq!(meta.duration_label, "03:33");
        assert_eq!(meta.views_label, "1,234,567");
        assert_eq!(meta.upload_date.as_deref(), Some("2024-01-31"));
        assert_eq!(meta.streams.len(), 2);
        assert!(meta.available_qualities[0].starts_with("1080p"));
    }

    #[test]
    fn test_metadata_requires_id() {
        let info = VideoInfo::default();
        assert!(VideoMetadata::from_info(&info).is_err());
    }

    #[test]
    fn test_playlist_entry_watch_url() {
        let entry = PlaylistEntry {
            id: "xyz".to_string(),
            url: Some("xyz".to_string()),
            title: None,
        };
        assert_eq!(
            entry.watch_url().as_deref(),
            Some("https://www.youtube.com/watch?v=xyz")
        );

        let absolute = PlaylistEntry {
            id: String::new(),
            url: Some("https://www.youtube.com/watch?v=q".to_string()),
            title: None,
        };
        assert_eq!(absolute.watch_url().as_deref(), Some("https://www.youtube.com/watch?v=q"));
    }
}
