// src/engine/gm.rs
//
// Two-pass separable convolution resampler (GraphicsMagick ResizeImage).
//
// The image is filtered along one axis into a scratch buffer, then along
// the other axis into the destination. Each destination coordinate gets a
// window of weighted source samples ("contributions") computed from the
// filter kernel. Generic over `Sample` like the GD resampler.

use crate::engine::filters::Kernel;
use crate::engine::geometry::{ActiveRegion, OutputPlacement};
use crate::engine::memory::MemoryBudget;
use crate::engine::pixel::{alpha, blue, green, pixel_bytes, red, rgba, Pixel, PixelBuffer};
use crate::engine::sample::{ResampleError, Sample};
use crate::ops::FilterKind;
use std::cmp::Ordering;
use tracing::debug;

type GmResult<T> = std::result::Result<T, ResampleError>;

/// One source sample of a filter window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution<S> {
    pub pixel: usize,
    pub weight: S,
}

/// Kernel scale and support for one pass.
#[derive(Debug, Clone, Copy)]
pub struct PassGeometry<S> {
    factor: S,
    scale: S,
    support: S,
    /// Support collapsed to half a pixel: each output takes its nearest source.
    point: bool,
}

impl<S: Sample> PassGeometry<S> {
    /// `factor` is destination extent over source extent along the pass axis.
    pub fn new<K: Kernel<S>>(kernel: &K, factor: S) -> Self {
        let mut scale = S::ONE.div(factor).max_of(S::ONE);
        let mut support = scale.mul(kernel.support());
        let point = support <= S::HALF;
        if point {
            support = S::HALF + S::EPSILON;
            scale = S::ONE;
        }
        Self {
            factor,
            scale: S::ONE.div(scale),
            support,
            point,
        }
    }

    pub fn support(&self) -> S {
        self.support
    }
}

/// Fill `out` with the window for destination offset `offset` (relative to
/// the start of the active region) over a source axis `src_len` long.
///
/// Weights are normalized to sum to one unless their raw sum is zero; the
/// rounding residual of the normalization is added to the largest weight.
pub fn contributions<S: Sample, K: Kernel<S>>(
    kernel: &K,
    geometry: &PassGeometry<S>,
    offset: u32,
    src_len: u32,
    out: &mut Vec<Contribution<S>>,
) {
    out.clear();

    let center = (S::from_int(offset as i32) + S::HALF).div(geometry.factor);
    if geometry.point {
        // The half-pixel window holds the one source whose kernel argument
        // falls in [-0.5, 0.5): the pixel just below `center`. Selected
        // directly since the epsilon widening is lost in f32.
        let floor = center.floor();
        let nearest = if floor == center { floor - S::ONE } else { floor };
        let pixel = nearest.max_of(S::ZERO).to_index().min(src_len as usize - 1);
        out.push(Contribution {
            pixel,
            weight: S::ONE,
        });
        return;
    }
    let start = (center - geometry.support + S::HALF)
        .max_of(S::ZERO)
        .to_index();
    let stop = (center + geometry.support + S::HALF)
        .min_of(S::from_int(src_len as i32))
        .to_index();

    let mut density = S::ZERO;
    for pixel in start..stop {
        let x = geometry.scale.mul(S::from_int(pixel as i32) - center + S::HALF);
        let weight = kernel.weight(x);
        density += weight;
        out.push(Contribution { pixel, weight });
    }

    if density == S::ZERO || density == S::ONE {
        return;
    }

    let mut sum = S::ZERO;
    for c in out.iter_mut() {
        c.weight = c.weight.div(density);
        sum += c.weight;
    }
    if let Some(largest) = out
        .iter_mut()
        .max_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap_or(Ordering::Equal))
    {
        largest.weight += S::ONE - sum;
    }
}

/// Filter chosen when the caller does not name one.
pub fn select_filter(
    requested: Option<FilterKind>,
    has_alpha: bool,
    src_w: u32,
    src_h: u32,
    target_w: u32,
    target_h: u32,
) -> FilterKind {
    requested.unwrap_or_else(|| {
        if has_alpha || target_w > src_w || target_h > src_h {
            FilterKind::Mitchell
        } else {
            FilterKind::Lanczos
        }
    })
}

/// True when filtering columns first touches fewer intermediate pixels.
pub fn horizontal_first(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> bool {
    let (src_w, src_h) = (src_w as u64, src_h as u64);
    let (cols, rows) = (target_w as u64, target_h as u64);
    cols * (src_h + rows) > rows * (src_w + cols)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

struct Plane<'a> {
    pixels: &'a [Pixel],
    width: u32,
    height: u32,
}

struct Pass<'a, S, K> {
    axis: Axis,
    kernel: &'a K,
    factor: S,
    region_start: u32,
    region_len: u32,
    has_alpha: bool,
    /// Set on the terminal pass only.
    placement: Option<&'a OutputPlacement>,
}

#[inline]
fn convolve<S: Sample>(
    pixels: &[Pixel],
    window: &[Contribution<S>],
    stride: usize,
    base: usize,
    has_alpha: bool,
) -> GmResult<Pixel> {
    let mut r = S::ZERO;
    let mut g = S::ZERO;
    let mut b = S::ZERO;
    let mut a = S::ZERO;
    let mut normalize = S::ZERO;

    for c in window {
        let p = pixels[c.pixel * stride + base];
        r += c.weight.mul(S::from_channel(red(p)));
        g += c.weight.mul(S::from_channel(green(p)));
        b += c.weight.mul(S::from_channel(blue(p)));
        if has_alpha {
            a += c.weight.mul(S::from_channel(alpha(p)));
            normalize += c.weight;
        }
    }

    if r.wrapped() || g.wrapped() || b.wrapped() || a.wrapped() {
        return Err(ResampleError::Overflow);
    }

    if !has_alpha {
        return Ok(rgba(r.to_channel(), g.to_channel(), b.to_channel(), 255));
    }

    if normalize.abs() <= S::EPSILON {
        normalize = S::ONE;
    }
    Ok(rgba(
        r.div(normalize).to_channel(),
        g.div(normalize).to_channel(),
        b.div(normalize).to_channel(),
        a.to_channel(),
    ))
}

fn filter_pass<S: Sample, K: Kernel<S>>(
    pass: &Pass<'_, S, K>,
    src: &Plane<'_>,
    dst: &mut [Pixel],
    dst_w: u32,
    dst_h: u32,
    scratch: &mut Vec<Contribution<S>>,
) -> GmResult<()> {
    let geometry = PassGeometry::new(pass.kernel, pass.factor);
    let src_w = src.width as usize;
    let index = |x: u32, y: u32| match pass.placement {
        Some(placement) => placement.index(x, y),
        None => y as usize * dst_w as usize + x as usize,
    };

    let region = pass.region_start..pass.region_start + pass.region_len;
    match pass.axis {
        Axis::Horizontal => {
            for x in region {
                contributions(pass.kernel, &geometry, x - pass.region_start, src.width, scratch);
                for y in 0..dst_h {
                    let p = convolve(src.pixels, scratch, 1, y as usize * src_w, pass.has_alpha)?;
                    dst[index(x, y)] = p;
                }
            }
        }
        Axis::Vertical => {
            for y in region {
                contributions(pass.kernel, &geometry, y - pass.region_start, src.height, scratch);
                for x in 0..dst_w {
                    let p = convolve(src.pixels, scratch, src_w, x as usize, pass.has_alpha)?;
                    dst[index(x, y)] = p;
                }
            }
        }
    }
    Ok(())
}

/// Resample `src` into the `region` of `dst` with `kernel`.
///
/// The scratch buffer is charged to `budget` and filled with `background`
/// so the padded part of the first pass carries the background colour into
/// the second. Returns [`ResampleError::Overflow`] when a fixed-point
/// accumulator wraps.
pub fn resample<S: Sample, K: Kernel<S>>(
    src: &PixelBuffer,
    dst: &mut [Pixel],
    region: ActiveRegion,
    placement: &OutputPlacement,
    kernel: &K,
    background: Pixel,
    budget: &MemoryBudget,
) -> GmResult<()> {
    let target_w = placement.target_width;
    let target_h = placement.target_height;

    let x_factor = S::from_f32(region.width as f32 / src.width as f32);
    let y_factor = S::from_f32(region.height as f32 / src.height as f32);
    if x_factor <= S::ZERO || y_factor <= S::ZERO {
        // reduction too strong for the number format
        return Err(ResampleError::Overflow);
    }

    let horizontal = horizontal_first(src.width, src.height, target_w, target_h);
    let (tmp_w, tmp_h) = if horizontal {
        (target_w, src.height)
    } else {
        (src.width, target_h)
    };
    debug!(
        horizontal_first = horizontal,
        x_factor = x_factor.to_f32(),
        y_factor = y_factor.to_f32(),
        tmp_w,
        tmp_h,
        "gm resample"
    );

    let _tmp_reservation = budget.reserve(pixel_bytes(tmp_w, tmp_h), "temporary buffer")?;
    let mut tmp = vec![background; tmp_w as usize * tmp_h as usize];
    let mut scratch: Vec<Contribution<S>> = Vec::new();

    let source = Plane {
        pixels: &src.pixels,
        width: src.width,
        height: src.height,
    };

    let horizontal_pass = Pass {
        axis: Axis::Horizontal,
        kernel,
        factor: x_factor,
        region_start: region.x,
        region_len: region.width,
        has_alpha: src.has_alpha,
        placement: None,
    };
    let vertical_pass = Pass {
        axis: Axis::Vertical,
        kernel,
        factor: y_factor,
        region_start: region.y,
        region_len: region.height,
        has_alpha: src.has_alpha,
        placement: None,
    };
    let (first, mut second) = if horizontal {
        (horizontal_pass, vertical_pass)
    } else {
        (vertical_pass, horizontal_pass)
    };
    second.placement = Some(placement);

    filter_pass(&first, &source, &mut tmp, tmp_w, tmp_h, &mut scratch)?;
    let intermediate = Plane {
        pixels: &tmp,
        width: tmp_w,
        height: tmp_h,
    };
    filter_pass(&second, &intermediate, dst, target_w, target_h, &mut scratch)
}
