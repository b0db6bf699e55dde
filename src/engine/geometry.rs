// src/engine/geometry.rs
//
// Destination geometry: aspect-ratio padding, the active region the
// resamplers write, and EXIF orientation remapping of output coordinates.

use tracing::warn;

/// EXIF orientation (tag 0x0112). Discriminants are the EXIF codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum Orientation {
    #[default]
    Identity = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    Transpose = 5,
    Rotate90 = 6,
    Transverse = 7,
    Rotate270 = 8,
}

impl Orientation {
    /// Strict conversion; `None` for anything outside 1..=8.
    pub fn from_exif(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Identity),
            2 => Some(Self::FlipHorizontal),
            3 => Some(Self::Rotate180),
            4 => Some(Self::FlipVertical),
            5 => Some(Self::Transpose),
            6 => Some(Self::Rotate90),
            7 => Some(Self::Transverse),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }

    /// Lenient conversion for raw codes from untrusted metadata.
    /// Unknown codes are logged and treated as identity.
    pub fn from_code(code: u32) -> Self {
        match u16::try_from(code).ok().and_then(Self::from_exif) {
            Some(orientation) => orientation,
            None => {
                warn!(code, "unknown orientation code, using identity");
                Self::Identity
            }
        }
    }

    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Codes 5-8 rotate by 90 or 270 degrees, so the output is transposed.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        self.code() >= 5
    }

    #[inline]
    pub fn is_identity(self) -> bool {
        self == Self::Identity
    }

    /// Final dimensions of an output resampled at `width x height`.
    pub fn display_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Map `(x, y)` in a `target_w x target_h` frame to its corrected position.
///
/// For codes 5-8 the returned coordinates address a frame that is
/// `target_h` pixels wide.
pub fn remap_orientation(
    x: u32,
    y: u32,
    target_w: u32,
    target_h: u32,
    orientation: Orientation,
) -> (u32, u32) {
    match orientation {
        Orientation::Identity => (x, y),
        Orientation::FlipHorizontal => (target_w - 1 - x, y),
        Orientation::Rotate180 => (target_w - 1 - x, target_h - 1 - y),
        Orientation::FlipVertical => (x, target_h - 1 - y),
        Orientation::Transpose => (y, x),
        Orientation::Rotate90 => (target_h - 1 - y, x),
        Orientation::Transverse => (target_h - 1 - y, target_w - 1 - x),
        Orientation::Rotate270 => (y, target_w - 1 - x),
    }
}

/// Letterbox / pillarbox layout for keep-aspect resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AspectPadding {
    pub width_padding: u32,
    pub width_inner: u32,
    pub height_padding: u32,
    pub height_inner: u32,
}

/// Fit `src_w x src_h` inside `dst_w x dst_h`, centring it on the padded axis.
pub fn compute_aspect_padding(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> AspectPadding {
    let source_ar = src_w as f64 / src_h as f64;
    let dest_ar = dst_w as f64 / dst_h as f64;

    if source_ar >= dest_ar {
        let height_inner = ((dst_w as f64 / source_ar).floor() as u32).clamp(1, dst_h);
        AspectPadding {
            width_padding: 0,
            width_inner: dst_w,
            height_padding: (dst_h - height_inner) / 2,
            height_inner,
        }
    } else {
        let width_inner = ((dst_h as f64 * source_ar).floor() as u32).clamp(1, dst_w);
        AspectPadding {
            width_padding: (dst_w - width_inner) / 2,
            width_inner,
            height_padding: 0,
            height_inner: dst_h,
        }
    }
}

/// Rectangle of the destination frame that receives resampled pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ActiveRegion {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// An axis with zero padding spans the full target extent, so an odd
    /// one-pixel remainder is absorbed rather than left as a one-sided border.
    pub fn from_padding(target_w: u32, target_h: u32, padding: &AspectPadding) -> Self {
        let (x, width) = if padding.width_padding != 0 {
            (padding.width_padding, padding.width_inner)
        } else {
            (0, target_w)
        };
        let (y, height) = if padding.height_padding != 0 {
            (padding.height_padding, padding.height_inner)
        } else {
            (0, target_h)
        };
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Where a resampled pixel lands in the (pre-swap) destination buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPlacement {
    pub target_width: u32,
    pub target_height: u32,
    pub orientation: Orientation,
}

impl OutputPlacement {
    pub fn new(target_width: u32, target_height: u32, orientation: Orientation) -> Self {
        Self {
            target_width,
            target_height,
            orientation,
        }
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        if self.orientation.is_identity() {
            return y as usize * self.target_width as usize + x as usize;
        }
        let (ox, oy) = remap_orientation(
            x,
            y,
            self.target_width,
            self.target_height,
            self.orientation,
        );
        let stride = if self.orientation.swaps_dimensions() {
            self.target_height
        } else {
            self.target_width
        };
        oy as usize * stride as usize + ox as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Orientation; 8] = [
        Orientation::Identity,
        Orientation::FlipHorizontal,
        Orientation::Rotate180,
        Orientation::FlipVertical,
        Orientation::Transpose,
        Orientation::Rotate90,
        Orientation::Transverse,
        Orientation::Rotate270,
    ];

    fn apply(o: Orientation, w: u32, h: u32, x: u32, y: u32) -> (u32, u32, u32, u32) {
        let (ox, oy) = remap_orientation(x, y, w, h, o);
        let (nw, nh) = o.display_dimensions(w, h);
        (ox, oy, nw, nh)
    }

    #[test]
    fn exif_codes_round_trip() {
        for o in ALL {
            assert_eq!(Orientation::from_exif(o.code()), Some(o));
        }
        assert_eq!(Orientation::from_exif(0), None);
        assert_eq!(Orientation::from_exif(9), None);
    }

    #[test]
    fn unknown_codes_fall_back_to_identity() {
        assert_eq!(Orientation::from_code(0), Orientation::Identity);
        assert_eq!(Orientation::from_code(42), Orientation::Identity);
        assert_eq!(Orientation::from_code(70_000), Orientation::Identity);
        assert_eq!(Orientation::from_code(6), Orientation::Rotate90);
    }

    #[test]
    fn only_rotations_swap_dimensions() {
        let swapping: Vec<u16> = ALL
            .iter()
            .filter(|o| o.swaps_dimensions())
            .map(|o| o.code())
            .collect();
        assert_eq!(swapping, vec![5, 6, 7, 8]);
    }

    #[test]
    fn remap_matches_exif_table() {
        let (w, h) = (4, 3);
        assert_eq!(remap_orientation(0, 0, w, h, Orientation::FlipHorizontal), (3, 0));
        assert_eq!(remap_orientation(0, 0, w, h, Orientation::Rotate180), (3, 2));
        assert_eq!(remap_orientation(1, 0, w, h, Orientation::FlipVertical), (1, 2));
        assert_eq!(remap_orientation(1, 2, w, h, Orientation::Transpose), (2, 1));
        assert_eq!(remap_orientation(1, 2, w, h, Orientation::Rotate90), (0, 1));
        assert_eq!(remap_orientation(1, 2, w, h, Orientation::Transverse), (0, 2));
        assert_eq!(remap_orientation(1, 2, w, h, Orientation::Rotate270), (2, 2));
    }

    #[test]
    fn rotate_180_twice_is_identity() {
        let (w, h) = (5, 3);
        for y in 0..h {
            for x in 0..w {
                let (x1, y1, w1, h1) = apply(Orientation::Rotate180, w, h, x, y);
                let (x2, y2, _, _) = apply(Orientation::Rotate180, w1, h1, x1, y1);
                assert_eq!((x2, y2), (x, y));
            }
        }
    }

    #[test]
    fn rotate_90_then_270_is_identity() {
        let (w, h) = (5, 3);
        for y in 0..h {
            for x in 0..w {
                let (x1, y1, w1, h1) = apply(Orientation::Rotate90, w, h, x, y);
                let (x2, y2, _, _) = apply(Orientation::Rotate270, w1, h1, x1, y1);
                assert_eq!((x2, y2), (x, y));
            }
        }
    }

    #[test]
    fn rotate_90_twice_equals_rotate_180() {
        let (w, h) = (5, 3);
        for y in 0..h {
            for x in 0..w {
                let (x1, y1, w1, h1) = apply(Orientation::Rotate90, w, h, x, y);
                let (x2, y2, _, _) = apply(Orientation::Rotate90, w1, h1, x1, y1);
                assert_eq!((x2, y2), remap_orientation(x, y, w, h, Orientation::Rotate180));
            }
        }
    }

    #[test]
    fn placement_is_a_permutation_for_every_orientation() {
        let (w, h) = (4, 3);
        for o in ALL {
            let placement = OutputPlacement::new(w, h, o);
            let mut seen = vec![false; (w * h) as usize];
            for y in 0..h {
                for x in 0..w {
                    let idx = placement.index(x, y);
                    assert!(!seen[idx], "{o:?} writes index {idx} twice");
                    seen[idx] = true;
                }
            }
            assert!(seen.iter().all(|&s| s));
        }
    }

    #[test]
    fn letterbox_wide_source_into_square() {
        let p = compute_aspect_padding(4, 2, 4, 4);
        assert_eq!(
            p,
            AspectPadding {
                width_padding: 0,
                width_inner: 4,
                height_padding: 1,
                height_inner: 2,
            }
        );
    }

    #[test]
    fn pillarbox_tall_source_into_square() {
        let p = compute_aspect_padding(100, 200, 50, 50);
        assert_eq!(p.width_inner, 25);
        assert_eq!(p.width_padding, 12);
        assert_eq!(p.height_padding, 0);
        assert_eq!(p.height_inner, 50);
    }

    #[test]
    fn inner_extent_is_at_least_one_pixel() {
        let p = compute_aspect_padding(1000, 1, 10, 10);
        assert_eq!(p.height_inner, 1);
        assert_eq!(p.height_padding, 4);
    }

    #[test]
    fn active_region_uses_full_extent_when_padding_rounds_to_zero() {
        // 3 pixels wide inside 4: padding floors to 0, so the whole width is used
        let p = compute_aspect_padding(3, 4, 4, 4);
        assert_eq!(p.width_inner, 3);
        assert_eq!(p.width_padding, 0);
        let region = ActiveRegion::from_padding(4, 4, &p);
        assert_eq!(region, ActiveRegion::full(4, 4));

        let p = compute_aspect_padding(4, 2, 4, 4);
        let region = ActiveRegion::from_padding(4, 4, &p);
        assert_eq!(
            region,
            ActiveRegion {
                x: 0,
                y: 1,
                width: 4,
                height: 2,
            }
        );
    }
}
