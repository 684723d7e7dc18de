//! Before/after photo rules and image compression.

use std::fmt;

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Maximum photos of one kind in a single session.
pub const MAX_PHOTOS_PER_KIND: usize = 5;

/// Compressed photos are scaled down to at most this width.
pub const COMPRESS_MAX_WIDTH: u32 = 1200;

/// JPEG quality used for stored photos.
pub const COMPRESS_JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoKind {
    Before,
    After,
}

impl PhotoKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim() {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            other => Err(CoreError::Validation(format!(
                "Invalid photo kind '{other}'. Must be one of: before, after"
            ))),
        }
    }
}

impl fmt::Display for PhotoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject a new photo once the session already holds the maximum for `kind`.
pub fn validate_photo_slot(kind: PhotoKind, existing: usize) -> Result<(), CoreError> {
    if existing >= MAX_PHOTOS_PER_KIND {
        return Err(CoreError::Invariant(format!(
            "Maximum {MAX_PHOTOS_PER_KIND} '{kind}' photos per session"
        )));
    }
    Ok(())
}

/// Stored filename for the `seq`-th photo of an upload made at `now`.
///
/// Names are unique even across concurrent uploads in the same millisecond.
pub fn photo_filename(now: DateTime<Utc>, seq: usize) -> String {
    format!(
        "photo-{}-{seq}-{}.jpg",
        now.timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// Decode any supported image, scale it to at most `max_width` keeping the
/// aspect ratio, and re-encode as JPEG.
pub fn compress_image(bytes: &[u8], max_width: u32, quality: u8) -> Result<Vec<u8>, CoreError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CoreError::Validation(format!("Unsupported or corrupt image: {e}")))?;

    let img = if img.width() > max_width {
        let height = scaled_height(img.width(), img.height(), max_width);
        img.resize_exact(max_width, height, FilterType::Triangle)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| CoreError::Internal(format!("JPEG encoding failed: {e}")))?;
    Ok(out)
}

fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = u64::from(height) * u64::from(target_width) / u64::from(width);
    (scaled as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn kind_names() {
        assert_eq!(PhotoKind::from_name("before").unwrap(), PhotoKind::Before);
        assert_eq!(PhotoKind::from_name("after").unwrap(), PhotoKind::After);
        assert_matches!(PhotoKind::from_name("prima"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn sixth_photo_of_a_kind_is_rejected() {
        assert!(validate_photo_slot(PhotoKind::Before, 4).is_ok());
        assert_matches!(
            validate_photo_slot(PhotoKind::Before, 5),
            Err(CoreError::Invariant(_))
        );
    }

    #[test]
    fn filename_is_jpeg() {
        let now = Utc::now();
        let name = photo_filename(now, 2);
        assert!(name.starts_with(&format!("photo-{}-2-", now.timestamp_millis())));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn filenames_from_the_same_instant_differ() {
        let now = Utc::now();
        assert_ne!(photo_filename(now, 0), photo_filename(now, 0));
    }

    #[test]
    fn wide_images_are_scaled_down() {
        let out = compress_image(&png(2400, 1200), COMPRESS_MAX_WIDTH, COMPRESS_JPEG_QUALITY).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.width(), 1200);
        assert_eq!(decoded.height(), 600);
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn narrow_images_keep_their_size() {
        let out = compress_image(&png(300, 200), COMPRESS_MAX_WIDTH, COMPRESS_JPEG_QUALITY).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 200));
    }

    #[test]
    fn garbage_is_a_validation_error() {
        assert_matches!(
            compress_image(b"not an image", COMPRESS_MAX_WIDTH, COMPRESS_JPEG_QUALITY),
            Err(CoreError::Validation(_))
        );
    }
}
