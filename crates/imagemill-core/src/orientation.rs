//! EXIF orientation handling for the rotate transform.
//!
//! Covers the unmirrored orientation values {1, 3, 6, 8}; mirrored
//! values (2, 4, 5, 7) are treated as 1 / no-op. Rotated JPEG outputs
//! get a fresh EXIF segment with the tag normalized to 1 so the pixels
//! are never rotated twice by a downstream viewer.

use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};
use image::DynamicImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Pixel rotation derived from an orientation tag, in the camera-to-
/// upright direction (orientation 6 means "rotate 90° clockwise to
/// display upright", equal to 270° counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Degrees of clockwise rotation applied.
    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// Apply this rotation to a decoded image.
    pub fn apply(&self, image: DynamicImage) -> DynamicImage {
        match self {
            Rotation::None => image,
            Rotation::Cw90 => image.rotate90(),
            Rotation::Cw180 => image.rotate180(),
            Rotation::Cw270 => image.rotate270(),
        }
    }
}

/// Map an orientation tag value to the rotation that uprights it.
pub fn rotation_for(orientation: u32) -> Rotation {
    match orientation {
        3 => Rotation::Cw180,
        6 => Rotation::Cw90,
        8 => Rotation::Cw270,
        _ => Rotation::None,
    }
}

/// Read the EXIF orientation tag from an image file.
///
/// Returns 1 (upright) when the file has no EXIF data, the tag is
/// absent, or the container cannot be parsed. Lenient by design: a
/// missing tag is not an error.
pub fn read_orientation(path: &Path) -> u32 {
    let Ok(file) = File::open(path) else {
        return 1;
    };
    let mut reader = BufReader::new(file);
    let Ok(exif) = Reader::new().read_from_container(&mut reader) else {
        return 1;
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Short(v) => v.first().map(|&x| x as u32),
            Value::Long(v) => v.first().copied(),
            _ => None,
        })
        .unwrap_or(1)
}

/// Build a minimal EXIF TIFF payload containing a single orientation
/// field. Used to normalize rotated outputs (value 1) and to fabricate
/// oriented fixtures in tests.
pub fn orientation_exif(orientation: u16) -> Result<Vec<u8>, exif::Error> {
    let field = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![orientation]),
    };
    let mut writer = Writer::new();
    writer.push_field(&field);
    let mut cursor = std::io::Cursor::new(Vec::new());
    writer.write(&mut cursor, false)?;
    Ok(cursor.into_inner())
}

/// Splice an EXIF TIFF payload into encoded JPEG bytes as an APP1
/// segment directly after SOI.
pub fn embed_exif_jpeg(jpeg: &[u8], tiff: &[u8]) -> Result<Vec<u8>, String> {
    if jpeg.len() < 2 || jpeg[0] != 0xFF || jpeg[1] != 0xD8 {
        return Err("not a JPEG stream (missing SOI marker)".to_string());
    }
    // Segment length counts itself plus the Exif header and payload
    let segment_len = tiff.len() + 8;
    if segment_len > u16::MAX as usize {
        return Err(format!("EXIF payload too large: {} bytes", tiff.len()));
    }

    let mut out = Vec::with_capacity(jpeg.len() + segment_len + 2);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&(segment_len as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{encode_to_vec, OutputFormat};

    #[test]
    fn test_rotation_table() {
        assert_eq!(rotation_for(1), Rotation::None);
        assert_eq!(rotation_for(3), Rotation::Cw180);
        assert_eq!(rotation_for(6), Rotation::Cw90);
        assert_eq!(rotation_for(8), Rotation::Cw270);
    }

    #[test]
    fn test_mirrored_orientations_are_noop() {
        for orientation in [2, 4, 5, 7] {
            assert_eq!(rotation_for(orientation), Rotation::None);
        }
    }

    #[test]
    fn test_unknown_orientation_is_noop() {
        assert_eq!(rotation_for(0), Rotation::None);
        assert_eq!(rotation_for(9), Rotation::None);
        assert_eq!(rotation_for(42), Rotation::None);
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let image = DynamicImage::new_rgb8(200, 100);
        let rotated = Rotation::Cw90.apply(image);
        assert_eq!((rotated.width(), rotated.height()), (100, 200));
    }

    #[test]
    fn test_orientation_exif_roundtrip() {
        let tiff = orientation_exif(6).unwrap();
        let exif = Reader::new().read_raw(tiff).unwrap();
        let field = exif.get_field(Tag::Orientation, In::PRIMARY).unwrap();
        match &field.value {
            Value::Short(v) => assert_eq!(v[0], 6),
            other => panic!("Expected Short, got {other:?}"),
        }
    }

    #[test]
    fn test_embed_exif_produces_readable_jpeg() {
        let image = DynamicImage::new_rgb8(32, 32);
        let jpeg = encode_to_vec(&image, Path::new("x.jpeg"), OutputFormat::Jpeg, None).unwrap();
        let tiff = orientation_exif(8).unwrap();
        let with_exif = embed_exif_jpeg(&jpeg, &tiff).unwrap();

        // Still decodes as an image
        let decoded = image::load_from_memory(&with_exif).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));

        // And the tag is readable through the normal container path
        let mut cursor = std::io::Cursor::new(&with_exif);
        let exif = Reader::new().read_from_container(&mut cursor).unwrap();
        let field = exif.get_field(Tag::Orientation, In::PRIMARY).unwrap();
        assert!(matches!(&field.value, Value::Short(v) if v[0] == 8));
    }

    #[test]
    fn test_embed_exif_rejects_non_jpeg() {
        let tiff = orientation_exif(1).unwrap();
        assert!(embed_exif_jpeg(b"\x89PNG", &tiff).is_err());
        assert!(embed_exif_jpeg(b"", &tiff).is_err());
    }

    #[test]
    fn test_read_orientation_missing_file() {
        assert_eq!(read_orientation(Path::new("/nonexistent/file.jpg")), 1);
    }

    #[test]
    fn test_read_orientation_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oriented.jpg");

        let image = DynamicImage::new_rgb8(16, 16);
        let jpeg = encode_to_vec(&image, &path, OutputFormat::Jpeg, None).unwrap();
        let tiff = orientation_exif(6).unwrap();
        std::fs::write(&path, embed_exif_jpeg(&jpeg, &tiff).unwrap()).unwrap();

        assert_eq!(read_orientation(&path), 6);
    }

    #[test]
    fn test_read_orientation_plain_jpeg_defaults_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        let image = DynamicImage::new_rgb8(16, 16);
        crate::format::encode(&image, &path, OutputFormat::Jpeg, None).unwrap();
        assert_eq!(read_orientation(&path), 1);
    }
}
