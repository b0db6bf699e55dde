// src/engine/pixel.rs
//
// Packed RGBA pixels and row-major pixel buffers.

use crate::error::ScaleError;
use image::RgbaImage;

type PixelResult<T> = std::result::Result<T, ScaleError>;

/// One pixel packed as `(r << 24) | (g << 16) | (b << 8) | a`.
pub type Pixel = u32;

/// Fully transparent black, the default background.
pub const TRANSPARENT: Pixel = 0;

#[inline]
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Pixel {
    ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32
}

#[inline]
pub const fn red(p: Pixel) -> u8 {
    (p >> 24) as u8
}

#[inline]
pub const fn green(p: Pixel) -> u8 {
    (p >> 16) as u8
}

#[inline]
pub const fn blue(p: Pixel) -> u8 {
    (p >> 8) as u8
}

#[inline]
pub const fn alpha(p: Pixel) -> u8 {
    p as u8
}

/// Decoded or resampled image.
///
/// `pixels` is row-major and always `width * height` long. `has_alpha`
/// decides whether the resamplers carry the alpha channel or force it to
/// opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Pixel>,
    pub has_alpha: bool,
}

impl PixelBuffer {
    /// Wrap existing pixels, checking the length against the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<Pixel>, has_alpha: bool) -> PixelResult<Self> {
        let buffer = Self {
            width,
            height,
            pixels,
            has_alpha,
        };
        buffer.check_len()?;
        Ok(buffer)
    }

    /// A buffer where every pixel is `color`.
    pub fn filled(width: u32, height: u32, color: Pixel, has_alpha: bool) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
            has_alpha,
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, has_alpha: bool, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Pixel,
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
            has_alpha,
        }
    }

    pub fn from_rgba_image(img: &RgbaImage, has_alpha: bool) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| rgba(p.0[0], p.0[1], p.0[2], p.0[3]))
            .collect();
        Self {
            width,
            height,
            pixels,
            has_alpha,
        }
    }

    /// Unpack into an `image::RgbaImage` for hand-off to an encoder.
    pub fn to_rgba_image(&self) -> PixelResult<RgbaImage> {
        self.check_len()?;
        let raw: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|&p| [red(p), green(p), blue(p), alpha(p)])
            .collect();
        RgbaImage::from_raw(self.width, self.height, raw)
            .ok_or_else(|| ScaleError::buffer_size_mismatch(self.width, self.height, self.pixels.len()))
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Pixel {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Size of the pixel storage in bytes.
    pub fn byte_len(&self) -> u64 {
        pixel_bytes(self.width, self.height)
    }

    pub(crate) fn check_len(&self) -> PixelResult<()> {
        let expected = self.width as u64 * self.height as u64;
        if self.pixels.len() as u64 != expected {
            return Err(ScaleError::buffer_size_mismatch(
                self.width,
                self.height,
                self.pixels.len(),
            ));
        }
        Ok(())
    }
}

/// Bytes needed to hold `width * height` packed pixels.
pub fn pixel_bytes(width: u32, height: u32) -> u64 {
    (width as u64 * height as u64).saturating_mul(std::mem::size_of::<Pixel>() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_round_trips_each_channel() {
        let p = rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(p, 0x1234_5678);
        assert_eq!(
            (red(p), green(p), blue(p), alpha(p)),
            (0x12, 0x34, 0x56, 0x78)
        );
    }

    #[test]
    fn new_rejects_wrong_length() {
        let err = PixelBuffer::new(3, 3, vec![0; 8], false).unwrap_err();
        assert!(matches!(err, ScaleError::BufferSizeMismatch { .. }));
        assert!(PixelBuffer::new(3, 3, vec![0; 9], false).is_ok());
    }

    #[test]
    fn from_fn_is_row_major() {
        let buf = PixelBuffer::from_fn(3, 2, false, |x, y| y * 10 + x);
        assert_eq!(buf.pixels, vec![0, 1, 2, 10, 11, 12]);
        assert_eq!(buf.get(2, 1), 12);
    }

    #[test]
    fn rgba_image_conversion_keeps_channel_order() {
        let img = RgbaImage::from_fn(2, 1, |x, _| image::Rgba([x as u8, 20, 30, 40]));
        let buf = PixelBuffer::from_rgba_image(&img, true);
        assert_eq!(buf.pixels, vec![rgba(0, 20, 30, 40), rgba(1, 20, 30, 40)]);
        assert_eq!(buf.to_rgba_image().unwrap(), img);
    }

    #[test]
    fn byte_len_counts_four_bytes_per_pixel() {
        assert_eq!(PixelBuffer::filled(10, 5, TRANSPARENT, false).byte_len(), 200);
    }
}
