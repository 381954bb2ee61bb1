//! Output format selection and encoding.
//!
//! The format/quality pair is passthrough configuration: a lookup table
//! of extensions and per-format quality defaults wrapped around the
//! `image` crate encoders.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;
use std::str::FromStr;

use crate::error::{TaskError, TaskResult};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    WebP,
    Png,
}

impl OutputFormat {
    /// File extension used for destination paths.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::WebP => "webp",
            OutputFormat::Png => "png",
        }
    }

    /// Default quality when the caller does not specify one.
    ///
    /// jpeg → 85, webp → 80, png → lossless (no quality knob).
    pub fn default_quality(&self) -> Option<u8> {
        match self {
            OutputFormat::Jpeg => Some(85),
            OutputFormat::WebP => Some(80),
            OutputFormat::Png => None,
        }
    }

    /// Resolve the requested quality against the per-format default.
    pub fn effective_quality(&self, requested: Option<u8>) -> Option<u8> {
        requested.or_else(|| self.default_quality())
    }
}

impl FromStr for OutputFormat {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::WebP),
            "png" => Ok(OutputFormat::Png),
            other => Err(TaskError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Encode `image` in the requested format and write it to `dest`.
pub fn encode(
    image: &DynamicImage,
    dest: &Path,
    format: OutputFormat,
    quality: Option<u8>,
) -> TaskResult<()> {
    let bytes = encode_to_vec(image, dest, format, quality)?;
    std::fs::write(dest, bytes).map_err(|e| TaskError::Encode {
        path: dest.to_path_buf(),
        message: e.to_string(),
    })
}

/// Encode `image` in the requested format, returning the raw bytes.
///
/// `dest` is used only for error context. JPEG and WebP honor the
/// quality setting where the encoder supports it; PNG is lossless with
/// the strongest compression preset.
pub fn encode_to_vec(
    image: &DynamicImage,
    dest: &Path,
    format: OutputFormat,
    quality: Option<u8>,
) -> TaskResult<Vec<u8>> {
    let mut buf = Vec::new();
    let result = match format {
        OutputFormat::Jpeg => {
            let quality = format.effective_quality(quality).unwrap_or(85).clamp(1, 100);
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            jpeg_compatible(image).write_with_encoder(encoder)
        }
        OutputFormat::WebP => {
            // The image crate only ships a lossless WebP encoder; the
            // quality setting is recorded in the report but not applied.
            let encoder = WebPEncoder::new_lossless(&mut buf);
            webp_compatible(image).write_with_encoder(encoder)
        }
        OutputFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
            png_compatible(image).write_with_encoder(encoder)
        }
    };

    result.map_err(|e| TaskError::Encode {
        path: dest.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(buf)
}

/// JPEG supports L8 and RGB8; everything else is converted down.
fn jpeg_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => {
            Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8()))
        }
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

/// The lossless WebP encoder accepts RGB8 and RGBA8 only.
fn webp_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Cow::Borrowed(image),
        _ if image.color().has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

/// PNG handles every 8/16-bit layout; float images are converted.
fn png_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageRgb32F(_) => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
        DynamicImage::ImageRgba32F(_) => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
        _ => Cow::Borrowed(image),
    }
}
