// src/engine/api.rs
//
// ImageScale: a decoded image that can be resized repeatedly.
// This is the main public API of the crate.

use crate::engine::decoder::{decode_image, ImageKind};
use crate::engine::geometry::Orientation;
use crate::engine::memory::MemoryBudget;
use crate::engine::pixel::PixelBuffer;
use crate::engine::resize::{resize_with_budget, ResizeOptions};
use crate::error::ScaleError;
use crate::ops::{ResizeAlgorithm, ResizeRequest};
use image::RgbaImage;
use std::path::Path;
use tracing::debug;

type ApiResult<T> = std::result::Result<T, ScaleError>;

/// A decoded source image plus the output of its most recent resize.
///
/// Usage:
/// ```no_run
/// use image_scale::{ImageScale, ResizeRequest};
///
/// let mut img = ImageScale::open("photo.jpg")?;
/// let thumb = img.resize(&ResizeRequest::new(Some(320), None))?;
/// println!("{}x{}", thumb.width, thumb.height);
/// # Ok::<(), image_scale::ScaleError>(())
/// ```
///
/// The object is reused sequentially: each resize releases the previous
/// output before producing a new one.
#[derive(Debug)]
pub struct ImageScale {
    source: PixelBuffer,
    kind: ImageKind,
    exif_orientation: Option<Orientation>,
    budget: MemoryBudget,
    output: Option<PixelBuffer>,
    /// Bytes charged to `budget` for `output`.
    output_bytes: u64,
    used: u32,
}

impl ImageScale {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Decode an in-memory JPEG, PNG, GIF or BMP.
    pub fn from_bytes(bytes: &[u8]) -> ApiResult<Self> {
        Self::decode(bytes, MemoryBudget::unlimited())
    }

    /// Like [`ImageScale::from_bytes`], with every pixel buffer charged
    /// against `limit` bytes.
    pub fn from_bytes_with_limit(bytes: &[u8], limit: u64) -> ApiResult<Self> {
        Self::decode(bytes, MemoryBudget::with_limit(limit))
    }

    /// Read and decode a file.
    pub fn open(path: impl AsRef<Path>) -> ApiResult<Self> {
        let bytes = read_file(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    pub fn open_with_limit(path: impl AsRef<Path>, limit: u64) -> ApiResult<Self> {
        let bytes = read_file(path.as_ref())?;
        Self::from_bytes_with_limit(&bytes, limit)
    }

    fn decode(bytes: &[u8], budget: MemoryBudget) -> ApiResult<Self> {
        let decoded = decode_image(bytes, &budget)?;
        debug!(
            kind = %decoded.kind,
            width = decoded.pixels.width,
            height = decoded.pixels.height,
            has_alpha = decoded.pixels.has_alpha,
            orientation = ?decoded.exif_orientation,
            "image decoded"
        );
        Ok(Self {
            source: decoded.pixels,
            kind: decoded.kind,
            exif_orientation: decoded.exif_orientation,
            budget,
            output: None,
            output_bytes: 0,
            used: 0,
        })
    }

    // =========================================================================
    // SOURCE PROPERTIES
    // =========================================================================

    /// Stored width, before orientation correction.
    pub fn width(&self) -> u32 {
        self.source.width
    }

    pub fn height(&self) -> u32 {
        self.source.height
    }

    /// Width and height as displayed once the EXIF orientation is applied.
    pub fn display_dimensions(&self) -> (u32, u32) {
        self.orientation()
            .display_dimensions(self.source.width, self.source.height)
    }

    pub fn has_alpha(&self) -> bool {
        self.source.has_alpha
    }

    /// EXIF orientation, or identity when the file has none.
    pub fn orientation(&self) -> Orientation {
        self.exif_orientation.unwrap_or_default()
    }

    pub fn format(&self) -> ImageKind {
        self.kind
    }

    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    // =========================================================================
    // RESIZE
    // =========================================================================

    /// Resize to display-space dimensions.
    ///
    /// A missing width or height is derived from the display aspect ratio.
    /// The previous output is released first, so on error no output remains.
    pub fn resize(&mut self, request: &ResizeRequest) -> ApiResult<&PixelBuffer> {
        self.release_output();

        let orientation = if request.ignore_exif {
            Orientation::Identity
        } else {
            self.orientation()
        };
        let (display_w, display_h) =
            orientation.display_dimensions(self.source.width, self.source.height);
        let (width, height) =
            calc_target_dimensions(display_w, display_h, request.width, request.height)?;

        // the orchestrator works in pre-swap space
        let (target_w, target_h) = if orientation.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        };

        let mut options = ResizeOptions::new(target_w, target_h)
            .algorithm(request.algorithm)
            .keep_aspect(request.keep_aspect)
            .background(request.background)
            .orientation(orientation);
        options.filter = request.filter;

        let output = resize_with_budget(&self.source, &options, &self.budget)?;
        let reservation = self.budget.reserve(output.byte_len(), "output")?;
        self.output_bytes = reservation.persist();
        self.used += 1;
        debug!(
            width = output.width,
            height = output.height,
            algorithm = %request.algorithm,
            used = self.used,
            "resize complete"
        );
        Ok(self.output.insert(output))
    }

    pub fn resize_gd(&mut self, width: Option<u32>, height: Option<u32>) -> ApiResult<&PixelBuffer> {
        self.resize_with(ResizeAlgorithm::Gd, width, height)
    }

    pub fn resize_gd_fixed(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
    ) -> ApiResult<&PixelBuffer> {
        self.resize_with(ResizeAlgorithm::GdFixed, width, height)
    }

    pub fn resize_gm(&mut self, width: Option<u32>, height: Option<u32>) -> ApiResult<&PixelBuffer> {
        self.resize_with(ResizeAlgorithm::Gm, width, height)
    }

    pub fn resize_gm_fixed(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
    ) -> ApiResult<&PixelBuffer> {
        self.resize_with(ResizeAlgorithm::GmFixed, width, height)
    }

    fn resize_with(
        &mut self,
        algorithm: ResizeAlgorithm,
        width: Option<u32>,
        height: Option<u32>,
    ) -> ApiResult<&PixelBuffer> {
        self.resize(&ResizeRequest::new(width, height).algorithm(algorithm))
    }

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// Output of the last successful resize.
    pub fn output(&self) -> Option<&PixelBuffer> {
        self.output.as_ref()
    }

    /// Move the output out, returning its bytes to the budget.
    pub fn take_output(&mut self) -> Option<PixelBuffer> {
        let output = self.output.take();
        self.budget.release(std::mem::take(&mut self.output_bytes));
        output
    }

    /// The output as an `image::RgbaImage`, ready for an encoder.
    pub fn to_rgba_image(&self) -> ApiResult<RgbaImage> {
        self.output
            .as_ref()
            .ok_or_else(|| {
                ScaleError::invalid_argument("output", "none", "call resize before to_rgba_image")
            })?
            .to_rgba_image()
    }

    /// Number of successful resizes.
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Bytes currently charged: decoded source plus the current output.
    pub fn memory_used(&self) -> u64 {
        self.budget.used()
    }

    fn release_output(&mut self) {
        if self.output.take().is_some() {
            debug!(bytes = self.output_bytes, "releasing previous output");
        }
        self.budget.release(std::mem::take(&mut self.output_bytes));
    }
}

fn read_file(path: &Path) -> ApiResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        let display = path.display().to_string();
        if e.kind() == std::io::ErrorKind::NotFound {
            ScaleError::file_not_found(display)
        } else {
            ScaleError::file_read_failed(display, e)
        }
    })
}

/// Resolve the requested display-space size.
///
/// A missing dimension follows the source aspect ratio, rounded and at
/// least 1. Both missing, or either zero, is an error.
pub fn calc_target_dimensions(
    orig_w: u32,
    orig_h: u32,
    target_w: Option<u32>,
    target_h: Option<u32>,
) -> ApiResult<(u32, u32)> {
    let derived = |len: u32, ratio: f64| ((len as f64 * ratio).round() as u32).max(1);
    let (w, h) = match (target_w, target_h) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) if w > 0 => (w, derived(orig_h, w as f64 / orig_w as f64)),
        (None, Some(h)) if h > 0 => (derived(orig_w, h as f64 / orig_h as f64), h),
        _ => return Err(ScaleError::invalid_resize_dimensions(target_w, target_h)),
    };
    if w == 0 || h == 0 {
        return Err(ScaleError::invalid_resize_dimensions(target_w, target_h));
    }
    Ok((w, h))
}
