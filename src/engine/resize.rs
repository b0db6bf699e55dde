// src/engine/resize.rs
//
// Resize orchestration: validation, destination allocation under the memory
// budget, letterbox padding, dispatch to a resampler, fixed-point fallback
// and the final dimension swap for rotated orientations.

use crate::engine::decoder::check_dimensions;
use crate::engine::filters::FixedFilter;
use crate::engine::fixed::Fixed;
use crate::engine::geometry::{compute_aspect_padding, ActiveRegion, Orientation, OutputPlacement};
use crate::engine::memory::MemoryBudget;
use crate::engine::pixel::{pixel_bytes, Pixel, PixelBuffer, TRANSPARENT};
use crate::engine::sample::ResampleError;
use crate::engine::{gd, gm};
use crate::error::ScaleError;
use crate::ops::{FilterKind, ResizeAlgorithm};
use tracing::{debug, warn};

type ResizeResult<T> = std::result::Result<T, ScaleError>;

/// Everything the orchestrator needs besides the source pixels.
///
/// `width` and `height` are in pre-swap space: for orientations 5-8 the
/// returned buffer is `height x width`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResizeOptions {
    pub width: u32,
    pub height: u32,
    pub algorithm: ResizeAlgorithm,
    pub keep_aspect: bool,
    pub background: Pixel,
    pub orientation: Orientation,
    pub filter: Option<FilterKind>,
}

impl ResizeOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            algorithm: ResizeAlgorithm::default(),
            keep_aspect: false,
            background: TRANSPARENT,
            orientation: Orientation::Identity,
            filter: None,
        }
    }

    pub fn algorithm(mut self, algorithm: ResizeAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn keep_aspect(mut self, keep_aspect: bool) -> Self {
        self.keep_aspect = keep_aspect;
        self
    }

    pub fn background(mut self, background: Pixel) -> Self {
        self.background = background;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn filter(mut self, filter: FilterKind) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Resize `src` without a memory limit.
pub fn resize(src: &PixelBuffer, opts: &ResizeOptions) -> ResizeResult<PixelBuffer> {
    resize_with_budget(src, opts, &MemoryBudget::unlimited())
}

/// Resize `src`, charging the destination and any scratch buffer to
/// `budget`. All reservations are returned before this function returns.
pub fn resize_with_budget(
    src: &PixelBuffer,
    opts: &ResizeOptions,
    budget: &MemoryBudget,
) -> ResizeResult<PixelBuffer> {
    let (target_w, target_h) = (opts.width, opts.height);
    if target_w == 0 || target_h == 0 {
        return Err(ScaleError::invalid_resize_dimensions(
            Some(target_w),
            Some(target_h),
        ));
    }
    check_dimensions(target_w, target_h)?;
    if src.width == 0 || src.height == 0 {
        return Err(ScaleError::invalid_argument(
            "source",
            format!("{}x{}", src.width, src.height),
            "source image must not be empty",
        ));
    }
    check_dimensions(src.width, src.height)?;
    src.check_len()?;

    let _dst_reservation =
        budget.reserve(pixel_bytes(target_w, target_h), "destination buffer")?;

    if src.width == target_w && src.height == target_h && opts.orientation.is_identity() {
        debug!(width = target_w, height = target_h, "same size, copying source");
        return Ok(src.clone());
    }

    let mut dst = vec![opts.background; target_w as usize * target_h as usize];
    let region = if opts.keep_aspect {
        let padding = compute_aspect_padding(src.width, src.height, target_w, target_h);
        debug!(?padding, "letterbox padding");
        ActiveRegion::from_padding(target_w, target_h, &padding)
    } else {
        ActiveRegion::full(target_w, target_h)
    };
    let placement = OutputPlacement::new(target_w, target_h, opts.orientation);

    dispatch(src, &mut dst, region, &placement, opts, budget)?;

    let (width, height) = opts.orientation.display_dimensions(target_w, target_h);
    Ok(PixelBuffer {
        width,
        height,
        pixels: dst,
        has_alpha: src.has_alpha,
    })
}

fn dispatch(
    src: &PixelBuffer,
    dst: &mut [Pixel],
    region: ActiveRegion,
    placement: &OutputPlacement,
    opts: &ResizeOptions,
    budget: &MemoryBudget,
) -> ResizeResult<()> {
    match opts.algorithm {
        ResizeAlgorithm::Gd => float_result(gd::resample::<f32>(src, dst, region, placement)),
        ResizeAlgorithm::GdFixed => match gd::resample::<Fixed>(src, dst, region, placement) {
            Err(ResampleError::Overflow) => {
                warn!(
                    width = src.width,
                    height = src.height,
                    "fixed-point overflow in gd, falling back to floating point"
                );
                dst.fill(opts.background);
                float_result(gd::resample::<f32>(src, dst, region, placement))
            }
            other => float_result(other),
        },
        ResizeAlgorithm::Gm => {
            let filter = gm::select_filter(
                opts.filter,
                src.has_alpha,
                src.width,
                src.height,
                region.width,
                region.height,
            );
            debug!(%filter, "gm filter");
            float_result(gm::resample::<f32, _>(
                src,
                dst,
                region,
                placement,
                &filter,
                opts.background,
                budget,
            ))
        }
        ResizeAlgorithm::GmFixed => {
            let fixed = match opts.filter {
                Some(filter) => FixedFilter::try_from(filter)?,
                None => FixedFilter::Triangle,
            };
            debug!(filter = %FilterKind::from(fixed), "gm fixed filter");
            let outcome = gm::resample::<Fixed, _>(
                src,
                dst,
                region,
                placement,
                &fixed,
                opts.background,
                budget,
            );
            match outcome {
                Err(ResampleError::Overflow) => {
                    warn!(
                        width = src.width,
                        height = src.height,
                        "fixed-point overflow in gm, falling back to floating point"
                    );
                    dst.fill(opts.background);
                    float_result(gm::resample::<f32, _>(
                        src,
                        dst,
                        region,
                        placement,
                        &FilterKind::from(fixed),
                        opts.background,
                        budget,
                    ))
                }
                other => float_result(other),
            }
        }
    }
}

// The floating-point resamplers never overflow; if one claims to, that is a bug.
fn float_result(outcome: std::result::Result<(), ResampleError>) -> ResizeResult<()> {
    outcome.map_err(|e| match e {
        ResampleError::Overflow => {
            ScaleError::internal_panic("floating-point resampler reported overflow")
        }
        ResampleError::Scale(e) => e,
    })
}
