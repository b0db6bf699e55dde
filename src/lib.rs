// lib.rs
//
// image-scale: decode JPEG/PNG/GIF/BMP images and resize them with the
// GD area-averaging or GM convolution resamplers.
//
// Design goals:
// - Float and fixed-point variants of each resampler with identical geometry
// - Fixed-point overflow recovered by a floating-point rerun, never an error
// - Letterbox padding and EXIF orientation applied during the resize
// - Every large buffer charged to an optional memory budget

pub mod engine;
pub mod error;
pub mod ops;

use engine::{check_dimensions, detect_exif_orientation, detect_kind, read_header_dimensions};
use std::path::Path;

pub use engine::{
    resize, resize_batch, resize_with_budget, ImageKind, ImageScale, MemoryBudget, Orientation,
    Pixel, PixelBuffer, ResizeOptions,
};
pub use error::{ErrorCategory, Result, ScaleError};
pub use ops::{FilterKind, ResizeAlgorithm, ResizeRequest};

/// Header information, read without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectMetadata {
    pub width: u32,
    pub height: u32,
    pub format: ImageKind,
    /// EXIF orientation, if the file carries a valid one.
    pub orientation: Option<Orientation>,
}

impl InspectMetadata {
    /// Dimensions after orientation correction.
    pub fn display_dimensions(&self) -> (u32, u32) {
        self.orientation
            .unwrap_or_default()
            .display_dimensions(self.width, self.height)
    }
}

/// Inspect image metadata WITHOUT decoding pixels.
///
/// Use this to check dimensions before processing, or to reject images that
/// are too large without spending CPU on decoding.
pub fn inspect_header_from_bytes(data: &[u8]) -> Result<InspectMetadata> {
    let format = detect_kind(data).ok_or_else(|| ScaleError::unsupported_format("unknown"))?;
    let (width, height) = read_header_dimensions(data, format)?;
    check_dimensions(width, height)?;
    Ok(InspectMetadata {
        width,
        height,
        format,
        orientation: detect_exif_orientation(data).and_then(Orientation::from_exif),
    })
}

pub fn inspect_header_from_path(path: impl AsRef<Path>) -> Result<InspectMetadata> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ScaleError::file_not_found(path.display().to_string())
        } else {
            ScaleError::file_read_failed(path.display().to_string(), e)
        }
    })?;
    inspect_header_from_bytes(&data)
}

/// Get library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get supported input formats
pub fn supported_input_formats() -> &'static [&'static str] {
    &["jpeg", "jpg", "png", "gif", "bmp"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn inspect_reads_header_only() {
        let meta = inspect_header_from_bytes(&png(12, 7)).unwrap();
        assert_eq!((meta.width, meta.height), (12, 7));
        assert_eq!(meta.format, ImageKind::Png);
        assert_eq!(meta.orientation, None);
        assert_eq!(meta.display_dimensions(), (12, 7));
    }

    #[test]
    fn inspect_rejects_unknown_data() {
        let err = inspect_header_from_bytes(b"plain text").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::CodecError);
        let err = inspect_header_from_path("/no/such/file.png").unwrap_err();
        assert!(matches!(err, ScaleError::FileNotFound { .. }));
    }

    #[test]
    fn version_and_formats() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
        assert!(supported_input_formats().contains(&"gif"));
    }
}
