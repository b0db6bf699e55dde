// src/engine.rs
//
// The core of image-scale. A resize engine that:
// 1. Decodes a JPEG/PNG/GIF/BMP source into packed RGBA pixels
// 2. Resamples it with the GD area-averaging or GM convolution resampler
// 3. Applies letterbox padding and EXIF orientation on the way out
//
// This file is a facade over the modules in engine/

// =============================================================================
// SECURITY LIMITS
// =============================================================================

/// Maximum allowed image dimension (width or height).
/// Images larger than 32768x32768 are rejected to prevent decompression bombs.
/// This is the same limit used by libvips/sharp.
pub const MAX_DIMENSION: u32 = 32768;

/// Maximum allowed total pixels (width * height).
/// 100 megapixels = 400MB uncompressed RGBA. Beyond this is likely malicious.
pub const MAX_PIXELS: u64 = 100_000_000;

// =============================================================================
// MODULE DECOMPOSITION
// =============================================================================

mod api;
mod batch;
mod common;
mod decoder;
mod filters;
mod fixed;
mod gd;
mod geometry;
mod gm;
mod memory;
mod pixel;
mod resize;
mod sample;

pub use api::{calc_target_dimensions, ImageScale};
pub use batch::{
    resize_batch, resize_batch_with_budget, resize_batch_with_concurrency, MAX_CONCURRENCY,
};
pub use decoder::{check_dimensions, decode_image, detect_exif_orientation, detect_kind};
pub use decoder::{read_header_dimensions, DecodedImage, ImageKind};
pub use filters::{FixedFilter, Kernel};
pub use fixed::Fixed;
pub use geometry::{
    compute_aspect_padding, remap_orientation, ActiveRegion, AspectPadding, Orientation,
    OutputPlacement,
};
pub use gm::{contributions, horizontal_first, select_filter, Contribution, PassGeometry};
pub use memory::{MemoryBudget, Reservation};
pub use pixel::{alpha, blue, green, red, rgba, Pixel, PixelBuffer, TRANSPARENT};
pub use resize::{resize, resize_with_budget, ResizeOptions};
pub use sample::{ResampleError, Sample};

/// Low-level resamplers, for callers that manage their own destination
/// buffers. Most code should go through [`resize`].
pub mod resample {
    pub use super::gd::resample as gd;
    pub use super::gm::resample as gm;
}
