// src/engine/decoder.rs
//
// Decoding collaborator: magic-byte sniffing, header-first limit checks,
// container decoding through the image crate and EXIF orientation.

use crate::engine::common::run_with_panic_policy;
use crate::engine::geometry::Orientation;
use crate::engine::memory::MemoryBudget;
use crate::engine::pixel::{pixel_bytes, PixelBuffer};
use crate::engine::{MAX_DIMENSION, MAX_PIXELS};
use crate::error::ScaleError;
use image::{ImageFormat, ImageReader};
use std::fmt;
use std::io::Cursor;
use tracing::debug;

// Type alias for Result - always use ScaleError to preserve error taxonomy
type DecoderResult<T> = std::result::Result<T, ScaleError>;

/// Container formats accepted as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Gif => ImageFormat::Gif,
            Self::Bmp => ImageFormat::Bmp,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Detect the container from its leading bytes. Returns None if unknown.
pub fn detect_kind(bytes: &[u8]) -> Option<ImageKind> {
    match bytes {
        [0xff, 0xd8, 0xff, ..] => Some(ImageKind::Jpeg),
        _ if bytes.starts_with(&PNG_SIGNATURE) => Some(ImageKind::Png),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(ImageKind::Gif),
        [b'B', b'M', ..] => Some(ImageKind::Bmp),
        _ => None,
    }
}

/// Check if image dimensions are within safe limits.
/// Returns an error if the image is too large (potential decompression bomb).
pub fn check_dimensions(width: u32, height: u32) -> DecoderResult<()> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ScaleError::dimension_exceeds_limit(
            width.max(height),
            MAX_DIMENSION,
        ));
    }
    let pixels = width as u64 * height as u64;
    if pixels > MAX_PIXELS {
        return Err(ScaleError::pixel_count_exceeds_limit(pixels, MAX_PIXELS));
    }
    Ok(())
}

/// Read the dimensions from the header without decoding pixel data.
pub fn read_header_dimensions(bytes: &[u8], kind: ImageKind) -> DecoderResult<(u32, u32)> {
    run_with_panic_policy("decode:header", || {
        ImageReader::with_format(Cursor::new(bytes), kind.image_format())
            .into_dimensions()
            .map_err(|e| ScaleError::decode_failed(format!("{kind}: failed to read header: {e}")))
    })
}

/// Extract EXIF Orientation tag (1-8). Returns None if missing or invalid.
pub fn detect_exif_orientation(bytes: &[u8]) -> Option<u16> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    // exif crate can represent as Short/Long; use get_uint for safety
    let value = field.value.get_uint(0)?;
    u16::try_from(value)
        .ok()
        .filter(|o| (1..=8).contains(o))
}

/// A decoded source image.
#[derive(Debug)]
pub struct DecodedImage {
    pub pixels: PixelBuffer,
    pub kind: ImageKind,
    pub exif_orientation: Option<Orientation>,
    /// Bytes left charged to the budget for `pixels`.
    pub charged_bytes: u64,
}

/// Decode `bytes` into packed pixels.
///
/// The header is checked against the dimension limits and the pixel
/// storage is reserved from `budget` before any pixel data is decoded. On
/// success the reservation stays charged (see `charged_bytes`).
pub fn decode_image(bytes: &[u8], budget: &MemoryBudget) -> DecoderResult<DecodedImage> {
    let kind = detect_kind(bytes).ok_or_else(|| ScaleError::unsupported_format("unknown"))?;

    let (width, height) = read_header_dimensions(bytes, kind)?;
    check_dimensions(width, height)?;
    if width == 0 || height == 0 {
        return Err(ScaleError::decode_failed(format!(
            "{kind}: empty image {width}x{height}"
        )));
    }
    let reservation = budget.reserve(pixel_bytes(width, height), "source image")?;
    debug!(%kind, width, height, "decoding");

    let decoded = run_with_panic_policy("decode:image", || {
        image::load_from_memory_with_format(bytes, kind.image_format())
            .map_err(|e| ScaleError::decode_failed(format!("{kind}: {e}")))
    })?;

    let has_alpha = decoded.color().has_alpha();
    let rgba = decoded.into_rgba8();
    if rgba.dimensions() != (width, height) {
        return Err(ScaleError::decode_failed(format!(
            "{kind}: header says {width}x{height}, decoded {}x{}",
            rgba.width(),
            rgba.height()
        )));
    }
    let pixels = PixelBuffer::from_rgba_image(&rgba, has_alpha);

    let exif_orientation = detect_exif_orientation(bytes).and_then(Orientation::from_exif);

    Ok(DecodedImage {
        pixels,
        kind,
        exif_orientation,
        charged_bytes: reservation.persist(),
    })
}
