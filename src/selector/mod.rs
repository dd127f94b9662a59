//! Format selection
//!
//! Picks exactly one stream descriptor out of an extracted catalog for a
//! user request, or reports that nothing suitable exists. Selection is pure:
//! it only reads metadata that has already been fetched.
//!
//! Video requests filter by container, then either take the tallest stream
//! (`Best`) or look for the exact tier and walk [`FALLBACK_LADDER`]. Audio
//! requests take the highest bitrate audio-only stream, preferring the
//! requested container (`mp4` also covers yt-dlp's `m4a` audio).

mod quality;

pub use quality::{parse_stream_type, MediaKind, Quality, SelectionRequest};

use crate::extractor::models::StreamDescriptor;
use crate::utils::error::{MediagrabError, Result};
use serde::Serialize;

/// Tiers tried in this order when the requested one is missing.
///
/// The order is deliberately not "nearest first"; it is kept as is.
pub const FALLBACK_LADDER: [u32; 5] = [720, 480, 360, 1080, 240];

/// Why the selection differs from what was asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionNotice {
    /// The requested tier was missing and a ladder tier was used
    TierSubstituted { requested: Quality, used: Quality },
    /// Nothing matched the preference; the tallest stream was used
    HighestAvailable { requested: Quality },
    /// No audio stream in the requested container
    AnyContainer { requested: String, used: String },
}

impl SelectionNotice {
    pub fn message(&self) -> String {
        match self {
            SelectionNotice::TierSubstituted { requested, used } => {
                format!("{} not available. Using {} instead.", requested, used)
            }
            SelectionNotice::HighestAvailable { .. } => {
                "Requested quality not available. Using highest available quality.".to_string()
            }
            SelectionNotice::AnyContainer { requested, used } => {
                format!("No {} audio stream available. Using {} instead.", requested, used)
            }
        }
    }
}

/// The chosen stream plus what the caller must tell the user about it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub descriptor: StreamDescriptor,
    /// False for video-only streams; the download will be silent
    pub has_audio: bool,
    pub progressive: bool,
    pub notice: Option<SelectionNotice>,
}

impl Selection {
    fn new(descriptor: &StreamDescriptor, notice: Option<SelectionNotice>) -> Self {
        Self {
            has_audio: descriptor.has_audio,
            progressive: descriptor.is_progressive(),
            descriptor: descriptor.clone(),
            notice,
        }
    }

    /// Warnings to surface before the user commits to the file
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(notice) = &self.notice {
            warnings.push(notice.message());
        }
        if self.descriptor.has_video && !self.has_audio {
            warnings.push(
                "Adaptive streams contain video only. Audio will need to be downloaded \
                 separately if needed."
                    .to_string(),
            );
        }
        warnings
    }
}

/// Select one descriptor for `request`, or `NoMatchingStream`.
pub fn select(catalog: &[StreamDescriptor], request: &SelectionRequest) -> Result<Selection> {
    let selection = match request.media_kind {
        MediaKind::Video => select_video(catalog, request),
        MediaKind::Audio => select_audio(catalog, request),
    };
    selection.ok_or(MediagrabError::NoMatchingStream)
}

fn container_matches(descriptor: &StreamDescriptor, preference: &str) -> bool {
    let preference = preference.trim();
    preference.is_empty()
        || preference.eq_ignore_ascii_case("any")
        || descriptor.container.eq_ignore_ascii_case(preference)
}

/// yt-dlp labels AAC audio-only streams `m4a`; an `mp4` request means those.
fn audio_container_matches(descriptor: &StreamDescriptor, preference: &str) -> bool {
    container_matches(descriptor, preference)
        || (preference.trim().eq_ignore_ascii_case("mp4")
            && descriptor.container.eq_ignore_ascii_case("m4a"))
}

/// Tallest descriptor, then highest frame rate; the earliest wins ties
fn highest<'a, I>(candidates: I) -> Option<&'a StreamDescriptor>
where
    I: IntoIterator<Item = &'a StreamDescriptor>,
{
    let key = |d: &StreamDescriptor| (d.height.unwrap_or(0), d.frame_rate.unwrap_or(0));
    candidates
        .into_iter()
        .reduce(|best, d| if key(d) > key(best) { d } else { best })
}

/// Best-quality procedure: progressive if preferred, then adaptive, then anything.
///
/// The flag is true when the last resort was used.
fn best_video<'a>(
    candidates: &[&'a StreamDescriptor],
    prefer_progressive: bool,
) -> Option<(&'a StreamDescriptor, bool)> {
    if prefer_progressive {
        if let Some(d) = highest(candidates.iter().copied().filter(|d| d.is_progressive())) {
            return Some((d, false));
        }
    }

    if let Some(d) = highest(candidates.iter().copied().filter(|d| d.is_adaptive_video())) {
        return Some((d, false));
    }

    highest(candidates.iter().copied()).map(|d| (d, true))
}

fn first_at_height<'a>(
    candidates: &[&'a StreamDescriptor],
    height: u32,
    progressive: bool,
) -> Option<&'a StreamDescriptor> {
    candidates.iter().copied().find(|d| {
        d.height == Some(height)
            && if progressive {
                d.is_progressive()
            } else {
                d.is_adaptive_video()
            }
    })
}

fn select_video(catalog: &[StreamDescriptor], request: &SelectionRequest) -> Option<Selection> {
    let candidates: Vec<&StreamDescriptor> = catalog
        .iter()
        .filter(|d| d.has_video && container_matches(d, &request.container_preference))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let prefer_progressive = request.progressive_preference;
    let requested = request.quality_preference;

    let Some(target) = requested.height() else {
        return best_video(&candidates, prefer_progressive).map(|(d, last_resort)| {
            let notice = last_resort.then_some(SelectionNotice::HighestAvailable { requested });
            Selection::new(d, notice)
        });
    };

    let exact = prefer_progressive
        .then(|| first_at_height(&candidates, target, true))
        .flatten()
        .or_else(|| first_at_height(&candidates, target, false));
    if let Some(d) = exact {
        return Some(Selection::new(d, None));
    }

    for tier in FALLBACK_LADDER.into_iter().filter(|tier| *tier != target) {
        if let Some(d) = first_at_height(&candidates, tier, prefer_progressive) {
            let used = Quality::from_height(tier).unwrap_or(Quality::Best);
            return Some(Selection::new(
                d,
                Some(SelectionNotice::TierSubstituted { requested, used }),
            ));
        }
    }

    best_video(&candidates, prefer_progressive)
        .map(|(d, _)| Selection::new(d, Some(SelectionNotice::HighestAvailable { requested })))
}

/// Highest bitrate; the earliest wins ties and unknown bitrates sort last
fn highest_bitrate<'a, I>(candidates: I) -> Option<&'a StreamDescriptor>
where
    I: IntoIterator<Item = &'a StreamDescriptor>,
{
    candidates
        .into_iter()
        .reduce(|best, d| if d.bitrate > best.bitrate { d } else { best })
}

fn select_audio(catalog: &[StreamDescriptor], request: &SelectionRequest) -> Option<Selection> {
    let audio: Vec<&StreamDescriptor> = catalog.iter().filter(|d| d.is_audio_only()).collect();

    if let Some(d) = highest_bitrate(
        audio
            .iter()
            .copied()
            .filter(|d| audio_container_matches(d, &request.container_preference)),
    ) {
        return Some(Selection::new(d, None));
    }

    highest_bitrate(audio.iter().copied()).map(|d| {
        Selection::new(
            d,
            Some(SelectionNotice::AnyContainer {
                requested: request.container_preference.trim().to_string(),
                used: d.container.clone(),
            }),
        )
    })
}
