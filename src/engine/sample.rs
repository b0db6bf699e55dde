// src/engine/sample.rs
//
// Numeric abstraction shared by the resamplers.
// The GD and GM loops are written once against `Sample` and instantiated
// for `f32` (float paths) and `Fixed` (fixed-point paths).

use crate::engine::fixed::Fixed;
use crate::error::ScaleError;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Sub};
use thiserror::Error;

/// Arithmetic needed by the resampling loops.
///
/// `mul` and `div` are named methods rather than operator impls so that the
/// fixed-point rounding rules stay visible at the call site.
pub trait Sample:
    Copy + Debug + PartialEq + PartialOrd + Add<Output = Self> + Sub<Output = Self> + AddAssign
{
    const ZERO: Self;
    const ONE: Self;
    const HALF: Self;
    const EPSILON: Self;
    const CHANNEL_MAX: Self;

    fn from_int(x: i32) -> Self;
    fn from_f32(x: f32) -> Self;
    fn to_f32(self) -> f32;

    #[inline]
    fn from_channel(c: u8) -> Self {
        Self::from_int(c as i32)
    }

    fn mul(self, rhs: Self) -> Self;
    fn div(self, rhs: Self) -> Self;
    fn floor(self) -> Self;
    fn abs(self) -> Self;

    /// Source coordinate truncated to an index; negative values map to 0.
    fn to_index(self) -> usize;

    /// Final channel value: round half up, clamp to `[0, 255]`.
    fn to_channel(self) -> u8;

    /// True when an accumulator wrapped around. Only fixed-point values can.
    fn wrapped(self) -> bool;

    #[inline]
    fn max_of(self, rhs: Self) -> Self {
        if self >= rhs {
            self
        } else {
            rhs
        }
    }

    #[inline]
    fn min_of(self, rhs: Self) -> Self {
        if self <= rhs {
            self
        } else {
            rhs
        }
    }
}

impl Sample for f32 {
    const ZERO: f32 = 0.0;
    const ONE: f32 = 1.0;
    const HALF: f32 = 0.5;
    const EPSILON: f32 = 1.0e-12;
    const CHANNEL_MAX: f32 = 255.0;

    #[inline]
    fn from_int(x: i32) -> f32 {
        x as f32
    }

    #[inline]
    fn from_f32(x: f32) -> f32 {
        x
    }

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn mul(self, rhs: f32) -> f32 {
        self * rhs
    }

    #[inline]
    fn div(self, rhs: f32) -> f32 {
        self / rhs
    }

    #[inline]
    fn floor(self) -> f32 {
        f32::floor(self)
    }

    #[inline]
    fn abs(self) -> f32 {
        f32::abs(self)
    }

    #[inline]
    fn to_index(self) -> usize {
        // `as` saturates: negatives and NaN become 0
        self as usize
    }

    #[inline]
    fn to_channel(self) -> u8 {
        f32::round(self).clamp(0.0, 255.0) as u8
    }

    #[inline]
    fn wrapped(self) -> bool {
        false
    }
}

impl Sample for Fixed {
    const ZERO: Fixed = Fixed::ZERO;
    const ONE: Fixed = Fixed::ONE;
    const HALF: Fixed = Fixed::HALF;
    const EPSILON: Fixed = Fixed::EPSILON;
    const CHANNEL_MAX: Fixed = Fixed::CHANNEL_MAX;

    #[inline]
    fn from_int(x: i32) -> Fixed {
        Fixed::from_int(x)
    }

    #[inline]
    fn from_f32(x: f32) -> Fixed {
        Fixed::from_f32(x)
    }

    #[inline]
    fn to_f32(self) -> f32 {
        Fixed::to_f32(self)
    }

    #[inline]
    fn mul(self, rhs: Fixed) -> Fixed {
        Fixed::mul(self, rhs)
    }

    #[inline]
    fn div(self, rhs: Fixed) -> Fixed {
        Fixed::div(self, rhs)
    }

    #[inline]
    fn floor(self) -> Fixed {
        Fixed::floor(self)
    }

    #[inline]
    fn abs(self) -> Fixed {
        Fixed::abs(self)
    }

    #[inline]
    fn to_index(self) -> usize {
        self.to_int().max(0) as usize
    }

    #[inline]
    fn to_channel(self) -> u8 {
        self.round_to_channel()
    }

    #[inline]
    fn wrapped(self) -> bool {
        self.is_negative()
    }
}

/// Why a resampler gave up on an image.
#[derive(Debug, Error)]
pub enum ResampleError {
    /// A fixed-point accumulator wrapped. The caller reruns the image in
    /// floating point.
    #[error("fixed-point accumulator overflowed")]
    Overflow,

    #[error(transparent)]
    Scale(#[from] ScaleError),
}
