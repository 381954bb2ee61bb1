//! The four single-image operations, dispatched by enum match.

use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;

use crate::error::{TaskError, TaskResult};
use crate::format::{self, OutputFormat};
use crate::orientation;
use crate::types::Job;

/// Default resize target, matching the historical 128x128 thumbnail size.
pub const DEFAULT_RESIZE: (u32, u32) = (128, 128);

/// Default gaussian blur sigma.
pub const DEFAULT_BLUR_SIGMA: f32 = 2.0;

/// One of the supported image operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Scale to an exact pixel size, ignoring aspect ratio
    Resize { width: u32, height: u32 },
    /// Convert to single-channel luma
    Grayscale,
    /// Gaussian blur
    Blur { sigma: f32 },
    /// Rotate upright according to the EXIF orientation tag
    Rotate,
}

impl Transform {
    /// Task name as shown in reports and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Resize { .. } => "resize",
            Transform::Grayscale => "grayscale",
            Transform::Blur { .. } => "blur",
            Transform::Rotate => "rotate",
        }
    }
}

/// Execute one job: decode, transform, encode, write.
///
/// Every failure maps to a `TaskError`; nothing here panics on bad
/// input, so a corrupt file costs exactly one `Failure` outcome.
pub fn apply(job: &Job) -> TaskResult<()> {
    let image = decode(&job.source)?;

    match job.transform {
        Transform::Resize { width, height } => {
            let resized = image.resize_exact(width, height, FilterType::Triangle);
            format::encode(&resized, &job.destination, job.format, job.quality)
        }
        Transform::Grayscale => {
            format::encode(&image.grayscale(), &job.destination, job.format, job.quality)
        }
        Transform::Blur { sigma } => {
            format::encode(&image.blur(sigma), &job.destination, job.format, job.quality)
        }
        Transform::Rotate => rotate(job, image),
    }
}

/// Decode a source image, guessing the format from content.
fn decode(path: &Path) -> TaskResult<DynamicImage> {
    let corrupted = |message: String| TaskError::CorruptedFile {
        path: path.to_path_buf(),
        message,
    };
    image::ImageReader::open(path)
        .map_err(|e| corrupted(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| corrupted(e.to_string()))?
        .decode()
        .map_err(|e| corrupted(e.to_string()))
}

/// EXIF-aware rotation: upright the pixels, then normalize the tag.
///
/// JPEG outputs carry a fresh EXIF segment with orientation 1; other
/// formats are written without EXIF (the pixels are already upright).
fn rotate(job: &Job, image: DynamicImage) -> TaskResult<()> {
    let tag = orientation::read_orientation(&job.source);
    let rotation = orientation::rotation_for(tag);
    tracing::debug!(
        "{:?}: orientation {} -> rotating {} degrees",
        job.source,
        tag,
        rotation.degrees()
    );
    let upright = rotation.apply(image);

    if job.format == OutputFormat::Jpeg {
        let jpeg = format::encode_to_vec(&upright, &job.destination, job.format, job.quality)?;
        let encode_err = |message: String| TaskError::Encode {
            path: job.destination.clone(),
            message,
        };
        let tiff = orientation::orientation_exif(1).map_err(|e| encode_err(e.to_string()))?;
        let bytes = orientation::embed_exif_jpeg(&jpeg, &tiff).map_err(encode_err)?;
        std::fs::write(&job.destination, bytes).map_err(|e| encode_err(e.to_string()))
    } else {
        format::encode(&upright, &job.destination, job.format, job.quality)
    }
}
