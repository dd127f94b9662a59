//! Decode, resize and re-encode images

use crate::utils::error::{MediagrabError, Result};
use crate::utils::format::sanitize_filename;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;
use url::Url;

/// Resize choices offered in the form, besides custom dimensions
pub const RESIZE_PRESETS: [(u32, u32); 3] = [(1920, 1080), (1280, 720), (800, 600)];

/// Output encoding for a downloaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    Original,
    Jpeg,
    Png,
    WebP,
}

impl ImageTarget {
    fn format(self) -> Option<ImageFormat> {
        match self {
            ImageTarget::Original => None,
            ImageTarget::Jpeg => Some(ImageFormat::Jpeg),
            ImageTarget::Png => Some(ImageFormat::Png),
            ImageTarget::WebP => Some(ImageFormat::WebP),
        }
    }
}

impl FromStr for ImageTarget {
    type Err = MediagrabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "original" | "keep original" => Ok(ImageTarget::Original),
            "jpeg" | "jpg" => Ok(ImageTarget::Jpeg),
            "png" => Ok(ImageTarget::Png),
            "webp" => Ok(ImageTarget::WebP),
            other => Err(MediagrabError::InvalidRequest(format!(
                "unsupported image format '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    Original,
    Exact { width: u32, height: u32 },
}

impl Resize {
    /// Parse the resize dropdown: `Original Size`, `1280x720`, or `Custom`
    /// with explicit dimensions.
    pub fn from_choice(choice: &str, width: Option<u32>, height: Option<u32>) -> Result<Self> {
        let lower = choice.trim().to_lowercase();
        let invalid = || MediagrabError::InvalidRequest(format!("invalid resize option '{}'", choice));

        let (width, height) = match lower.as_str() {
            "" | "original" | "original size" => return Ok(Resize::Original),
            "custom" => (width.ok_or_else(invalid)?, height.ok_or_else(invalid)?),
            dims => {
                let (w, h) = dims.split_once('x').ok_or_else(invalid)?;
                (
                    w.trim().parse().map_err(|_| invalid())?,
                    h.trim().parse().map_err(|_| invalid())?,
                )
            }
        };

        if width == 0 || height == 0 {
            return Err(MediagrabError::InvalidRequest(
                "image dimensions must be at least 1x1".to_string(),
            ));
        }
        Ok(Resize::Exact { width, height })
    }
}

/// Result of processing one image
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
    pub original_size: (u32, u32),
    pub final_size: (u32, u32),
}

/// Decode `bytes`, optionally resize, and re-encode.
///
/// With `ImageTarget::Original` and no resize the input bytes are passed
/// through untouched. A resized image with `Original` target is re-encoded in
/// its source format. JPEG output drops the alpha channel.
pub fn process(
    bytes: Vec<u8>,
    source_name: &str,
    target: ImageTarget,
    resize: Resize,
) -> Result<ProcessedImage> {
    let source_format = image::guess_format(&bytes)?;
    let decoded = image::load_from_memory_with_format(&bytes, source_format)?;
    let original_size = (decoded.width(), decoded.height());

    let resized = match resize {
        Resize::Original => None,
        Resize::Exact { width, height } => {
            Some(decoded.resize_exact(width, height, FilterType::Lanczos3))
        }
    };

    let output_format = match (target.format(), &resized) {
        (Some(format), _) => format,
        (None, Some(_)) => source_format,
        (None, None) => {
            return Ok(ProcessedImage {
                bytes,
                file_name: source_name.to_string(),
                mime: source_format.to_mime_type().to_string(),
                original_size,
                final_size: original_size,
            });
        }
    };

    let image = resized.unwrap_or(decoded);
    let final_size = (image.width(), image.height());
    let encoded = encode(image, output_format)?;

    Ok(ProcessedImage {
        bytes: encoded,
        file_name: replace_extension(source_name, output_format),
        mime: output_format.to_mime_type().to_string(),
        original_size,
        final_size,
    })
}

fn encode(image: DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        ImageFormat::WebP => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => image,
    };

    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format)?;
    Ok(buffer.into_inner())
}

fn replace_extension(file_name: &str, format: ImageFormat) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let extension = format.extensions_str().first().copied().unwrap_or("img");
    format!("{}.{}", stem, extension)
}

/// Local file name for an image URL: its last path segment, or `fallback`
pub fn file_name_from_url(url: &str, fallback: &str) -> String {
    let segment = Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .filter(|s| !s.is_empty())
    });

    match segment {
        Some(name) => sanitize_filename(&name),
        None => fallback.to_string(),
    }
}
