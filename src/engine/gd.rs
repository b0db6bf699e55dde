// src/engine/gd.rs
//
// GD area-averaging resampler (the algorithm of gdImageCopyResampled).
//
// Each destination pixel averages the source rectangle it covers, weighting
// partially covered edge rows and columns by their overlap. One generic
// implementation serves the float and fixed-point variants.

use crate::engine::geometry::{ActiveRegion, OutputPlacement};
use crate::engine::pixel::{alpha, blue, green, red, rgba, Pixel, PixelBuffer};
use crate::engine::sample::{ResampleError, Sample};

type GdResult<T> = std::result::Result<T, ResampleError>;

/// Overlap of the unit cell starting at `*pos` with `[start, end)`.
///
/// On the first (partial) cell `*pos` is snapped down to the cell origin so
/// the caller's `+= 1` lands on the next whole cell.
#[inline]
fn portion<S: Sample>(pos: &mut S, start: S, end: S) -> S {
    if pos.floor() == start.floor() {
        let mut p = S::ONE - (*pos - pos.floor());
        if p > end - start {
            p = end - start;
        }
        *pos = pos.floor();
        p
    } else if *pos == end.floor() {
        end - end.floor()
    } else {
        S::ONE
    }
}

/// Resample `src` into the `region` of `dst`.
///
/// `dst` is the full destination frame described by `placement`; pixels
/// outside `region` are left untouched. Returns
/// [`ResampleError::Overflow`] as soon as a fixed-point accumulator wraps,
/// in which case `dst` may be partially written.
pub fn resample<S: Sample>(
    src: &PixelBuffer,
    dst: &mut [Pixel],
    region: ActiveRegion,
    placement: &OutputPlacement,
) -> GdResult<()> {
    let width_scale = S::from_int(src.width as i32).div(S::from_int(region.width as i32));
    let height_scale = S::from_int(src.height as i32).div(S::from_int(region.height as i32));
    if width_scale <= S::ZERO || height_scale <= S::ZERO {
        // enlargement beyond what the number format can step through
        return Err(ResampleError::Overflow);
    }

    let src_w = src.width as usize;
    let max_x = src_w - 1;
    let max_y = src.height as usize - 1;
    let has_alpha = src.has_alpha;

    for y in region.y..region.y + region.height {
        let sy1 = S::from_int((y - region.y) as i32).mul(height_scale);
        let sy2 = S::from_int((y + 1 - region.y) as i32).mul(height_scale);

        for x in region.x..region.x + region.width {
            let sx1 = S::from_int((x - region.x) as i32).mul(width_scale);
            let sx2 = S::from_int((x + 1 - region.x) as i32).mul(width_scale);

            let mut r = S::ZERO;
            let mut g = S::ZERO;
            let mut b = S::ZERO;
            let mut a = S::ZERO;
            let mut spixels = S::ZERO;

            let mut sy = sy1;
            loop {
                let yportion = portion(&mut sy, sy1, sy2);
                let row = sy.to_index().min(max_y) * src_w;

                let mut sx = sx1;
                loop {
                    let xportion = portion(&mut sx, sx1, sx2);
                    let contribution = xportion.mul(yportion);
                    let p = src.pixels[row + sx.to_index().min(max_x)];

                    r += S::from_channel(red(p)).mul(contribution);
                    g += S::from_channel(green(p)).mul(contribution);
                    b += S::from_channel(blue(p)).mul(contribution);
                    if has_alpha {
                        a += S::from_channel(alpha(p)).mul(contribution);
                    }
                    spixels += contribution;
                    // one step adds at most 255, so the first wrap is always negative
                    if r.wrapped() || g.wrapped() || b.wrapped() || a.wrapped() || spixels.wrapped()
                    {
                        return Err(ResampleError::Overflow);
                    }

                    sx += S::ONE;
                    if sx >= sx2 {
                        break;
                    }
                }

                sy += S::ONE;
                if sy >= sy2 {
                    break;
                }
            }

            if spixels != S::ZERO {
                r = r.div(spixels);
                g = g.div(spixels);
                b = b.div(spixels);
                if has_alpha {
                    a = a.div(spixels);
                }
            }

            let out_alpha = if has_alpha { a.to_channel() } else { 255 };
            dst[placement.index(x, y)] =
                rgba(r.to_channel(), g.to_channel(), b.to_channel(), out_alpha);
        }
    }

    Ok(())
}
