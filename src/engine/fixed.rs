// src/engine/fixed.rs
//
// Signed 19.12 fixed-point numbers.
// Largest positive value:  524287.999755859375
// Smallest positive value: 0.000244140625

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of fractional bits.
pub const FRAC_BITS: u32 = 12;

const FRAC_MASK: i32 = (1 << FRAC_BITS) - 1;

/// Q19.12 fixed-point value.
///
/// Addition and subtraction wrap on overflow exactly like the underlying
/// `i32`; the resamplers rely on that to detect overflowed accumulators
/// (a channel sum that went negative).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << FRAC_BITS);
    pub const HALF: Fixed = Fixed(1 << (FRAC_BITS - 1));
    pub const EPSILON: Fixed = Fixed(1);
    /// 255.0, the largest channel value.
    pub const CHANNEL_MAX: Fixed = Fixed(255 << FRAC_BITS);

    #[inline]
    pub const fn from_bits(bits: i32) -> Self {
        Fixed(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn from_int(x: i32) -> Self {
        Fixed(x.wrapping_shl(FRAC_BITS))
    }

    /// Converts with round-half-up, saturating at the `i32` range.
    #[inline]
    pub fn from_f32(x: f32) -> Self {
        Fixed((x * (1 << FRAC_BITS) as f32 + 0.5) as i32)
    }

    /// Integer part, rounding toward negative infinity.
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1 << FRAC_BITS) as f32
    }

    /// `(x * y) >> 12` computed in 64 bits with an arithmetic shift, then
    /// truncated back to 32 bits.
    #[inline]
    pub const fn mul(self, rhs: Fixed) -> Fixed {
        Fixed(((self.0 as i64 * rhs.0 as i64) >> FRAC_BITS) as i32)
    }

    /// `(x << 12) / y` computed in 64 bits.
    ///
    /// # Panics
    ///
    /// Panics when `rhs` is zero. Callers guarantee a non-zero divisor; use
    /// [`Fixed::checked_div`] when that is not known.
    #[inline]
    pub const fn div(self, rhs: Fixed) -> Fixed {
        Fixed((((self.0 as i64) << FRAC_BITS) / rhs.0 as i64) as i32)
    }

    #[inline]
    pub const fn checked_div(self, rhs: Fixed) -> Option<Fixed> {
        if rhs.0 == 0 {
            None
        } else {
            Some(self.div(rhs))
        }
    }

    /// Largest integral value not greater than `self`.
    #[inline]
    pub const fn floor(self) -> Fixed {
        Fixed(self.0 & !FRAC_MASK)
    }

    #[inline]
    pub const fn abs(self) -> Fixed {
        Fixed(self.0.wrapping_abs())
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Round an accumulated channel value to an 8-bit channel: clamp to
    /// `[0, 255.0]`, add one half and truncate.
    #[inline]
    pub const fn round_to_channel(self) -> u8 {
        if self.0 < 0 {
            0
        } else if self.0 > Self::CHANNEL_MAX.0 {
            255
        } else {
            ((self.0 + Self::HALF.0) >> FRAC_BITS) as u8
        }
    }
}

impl Add for Fixed {
    type Output = Fixed;

    #[inline]
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Fixed) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    #[inline]
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Fixed) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    #[inline]
    fn neg(self) -> Fixed {
        Fixed(self.0.wrapping_neg())
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({})", self.to_f32())
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f32(), f)
    }
}
