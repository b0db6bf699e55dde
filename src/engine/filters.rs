// src/engine/filters.rs
//
// Convolution kernels for the GM resamplers.
// Float kernels are evaluated in f64 and narrowed to f32 weights; the
// fixed-point path has box and triangle only.

use crate::engine::fixed::Fixed;
use crate::engine::sample::Sample;
use crate::error::ScaleError;
use crate::ops::FilterKind;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// A separable filter usable by the convolution passes.
pub trait Kernel<S: Sample> {
    /// Radius outside of which the kernel is zero.
    fn support(&self) -> S;
    fn weight(&self, x: S) -> S;
}

impl FilterKind {
    /// Support radius in source pixels at scale 1.
    pub fn support(&self) -> f32 {
        match self {
            Self::Point => 0.0,
            Self::Box => 0.5,
            Self::Triangle
            | Self::Hermite
            | Self::Hanning
            | Self::Hamming
            | Self::Blackman => 1.0,
            Self::Gaussian => 1.25,
            Self::Quadratic => 1.5,
            Self::Cubic | Self::Catrom | Self::Mitchell => 2.0,
            Self::Lanczos => 3.0,
            Self::Bessel => 3.2383,
            Self::Sinc => 4.0,
        }
    }

    /// Kernel value at `x`.
    pub fn evaluate(&self, x: f32) -> f32 {
        let x = x as f64;
        let support = self.support() as f64;
        let w = match self {
            Self::Point | Self::Box => box_filter(x),
            Self::Triangle => triangle(x),
            Self::Hermite => hermite(x),
            Self::Hanning => 0.5 + 0.5 * (PI * x).cos(),
            Self::Hamming => 0.54 + 0.46 * (PI * x).cos(),
            Self::Blackman => blackman(x),
            Self::Gaussian => (-2.0 * x * x).exp() * (2.0 / PI).sqrt(),
            Self::Quadratic => quadratic(x),
            Self::Cubic => cubic(x),
            Self::Catrom => catrom(x),
            Self::Mitchell => mitchell(x),
            Self::Lanczos => lanczos(x),
            Self::Bessel => blackman(x / support) * bessel(x),
            Self::Sinc => blackman(x / support) * sinc(x),
        };
        w as f32
    }
}

impl Kernel<f32> for FilterKind {
    #[inline]
    fn support(&self) -> f32 {
        FilterKind::support(self)
    }

    #[inline]
    fn weight(&self, x: f32) -> f32 {
        self.evaluate(x)
    }
}

fn box_filter(x: f64) -> f64 {
    if (-0.5..0.5).contains(&x) {
        1.0
    } else {
        0.0
    }
}

fn triangle(x: f64) -> f64 {
    if x < -1.0 {
        0.0
    } else if x < 0.0 {
        1.0 + x
    } else if x < 1.0 {
        1.0 - x
    } else {
        0.0
    }
}

fn hermite(x: f64) -> f64 {
    if !(-1.0..1.0).contains(&x) {
        return 0.0;
    }
    let t = x.abs();
    (2.0 * t - 3.0) * t * t + 1.0
}

fn blackman(x: f64) -> f64 {
    0.42 + 0.5 * (PI * x).cos() + 0.08 * (2.0 * PI * x).cos()
}

fn quadratic(x: f64) -> f64 {
    if x < -1.5 {
        0.0
    } else if x < -0.5 {
        0.5 * (x + 1.5) * (x + 1.5)
    } else if x < 0.5 {
        0.75 - x * x
    } else if x < 1.5 {
        0.5 * (x - 1.5) * (x - 1.5)
    } else {
        0.0
    }
}

fn cubic(x: f64) -> f64 {
    if x < -2.0 {
        0.0
    } else if x < -1.0 {
        (2.0 + x) * (2.0 + x) * (2.0 + x) / 6.0
    } else if x < 0.0 {
        (4.0 + x * x * (-6.0 - 3.0 * x)) / 6.0
    } else if x < 1.0 {
        (4.0 + x * x * (-6.0 + 3.0 * x)) / 6.0
    } else if x < 2.0 {
        (2.0 - x) * (2.0 - x) * (2.0 - x) / 6.0
    } else {
        0.0
    }
}

fn catrom(x: f64) -> f64 {
    if x < -2.0 {
        0.0
    } else if x < -1.0 {
        0.5 * (4.0 + x * (8.0 + x * (5.0 + x)))
    } else if x < 0.0 {
        0.5 * (2.0 + x * x * (-5.0 - 3.0 * x))
    } else if x < 1.0 {
        0.5 * (2.0 + x * x * (-5.0 + 3.0 * x))
    } else if x < 2.0 {
        0.5 * (4.0 + x * (-8.0 + x * (5.0 - x)))
    } else {
        0.0
    }
}

/// Mitchell-Netravali cubic with B = C = 1/3.
fn mitchell(x: f64) -> f64 {
    const B: f64 = 1.0 / 3.0;
    const C: f64 = 1.0 / 3.0;
    const P0: f64 = (6.0 - 2.0 * B) / 6.0;
    const P2: f64 = (-18.0 + 12.0 * B + 6.0 * C) / 6.0;
    const P3: f64 = (12.0 - 9.0 * B - 6.0 * C) / 6.0;
    const Q0: f64 = (8.0 * B + 24.0 * C) / 6.0;
    const Q1: f64 = (-12.0 * B - 48.0 * C) / 6.0;
    const Q2: f64 = (6.0 * B + 30.0 * C) / 6.0;
    const Q3: f64 = (-B - 6.0 * C) / 6.0;

    if x < -2.0 {
        0.0
    } else if x < -1.0 {
        Q0 - x * (Q1 - x * (Q2 - x * Q3))
    } else if x < 0.0 {
        P0 + x * x * (P2 - x * P3)
    } else if x < 1.0 {
        P0 + x * x * (P2 + x * P3)
    } else if x < 2.0 {
        Q0 + x * (Q1 + x * (Q2 + x * Q3))
    } else {
        0.0
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn lanczos(x: f64) -> f64 {
    if !(-3.0..3.0).contains(&x) {
        return 0.0;
    }
    let t = x.abs();
    sinc(t) * sinc(t / 3.0)
}

fn bessel(x: f64) -> f64 {
    if x == 0.0 {
        PI / 4.0
    } else {
        bessel_order_one(PI * x) / (2.0 * x)
    }
}

/// Evaluate `sum(coeffs[i] * z^i)` by Horner's rule.
fn horner(coeffs: &[f64], z: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * z + c)
}

/// Rational approximation of J1(x)/x for |x| < 8.
fn j1(x: f64) -> f64 {
    const P: [f64; 9] = [
        0.581199354001606143928050809e+21,
        -0.6672106568924916298020941484e+20,
        0.2316433580634002297931815435e+19,
        -0.3588817569910106050743641413e+17,
        0.2908795263834775409737601689e+15,
        -0.1322983480332126453125473247e+13,
        0.3413234182301700539091292655e+10,
        -0.4695753530642995859767162166e+7,
        0.270112271089232341485679099e+4,
    ];
    const Q: [f64; 9] = [
        0.11623987080032122878585294e+22,
        0.1185770712190320999837113348e+20,
        0.6092061398917521746105196863e+17,
        0.2081661221307607351240184229e+15,
        0.5243710262167649715406728642e+12,
        0.1013863514358673989967045588e+10,
        0.1501793594998585505921097578e+7,
        0.1606931573481487801970916749e+4,
        0.1e+1,
    ];
    let z = x * x;
    horner(&P, z) / horner(&Q, z)
}

fn p1(x: f64) -> f64 {
    const P: [f64; 6] = [
        0.352246649133679798341724373e+5,
        0.62758845247161281269005675e+5,
        0.313539631109159574238669888e+5,
        0.49854832060594338434500455e+4,
        0.2111529182853962382105718e+3,
        0.12571716929145341558495e+1,
    ];
    const Q: [f64; 6] = [
        0.352246649133679798068390431e+5,
        0.626943469593560511888833731e+5,
        0.312404063819041039923015703e+5,
        0.4930396490181088979386097e+4,
        0.2030775189134759322293574e+3,
        0.1e+1,
    ];
    let z = (8.0 / x) * (8.0 / x);
    horner(&P, z) / horner(&Q, z)
}

fn q1(x: f64) -> f64 {
    const P: [f64; 6] = [
        0.3511751914303552822533318e+3,
        0.7210391804904475039280863e+3,
        0.4259873011654442389886993e+3,
        0.831898957673850827325226e+2,
        0.45681716295512267064405e+1,
        0.3532840052740123642735e-1,
    ];
    const Q: [f64; 6] = [
        0.74917374171809127714519505e+4,
        0.154141773392650970499848051e+5,
        0.91522317015169922705904727e+4,
        0.18111867005523513506724158e+4,
        0.1038187585462133728776636e+3,
        0.1e+1,
    ];
    let z = (8.0 / x) * (8.0 / x);
    horner(&P, z) / horner(&Q, z)
}

/// Bessel function of the first kind, order one.
fn bessel_order_one(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    let t = x.abs();
    if t < 8.0 {
        return x * j1(t);
    }
    let (sin, cos) = t.sin_cos();
    let q = (2.0 / (PI * t)).sqrt()
        * (p1(t) * (FRAC_1_SQRT_2 * (sin - cos))
            - 8.0 / t * q1(t) * (-FRAC_1_SQRT_2 * (sin + cos)));
    if x < 0.0 {
        -q
    } else {
        q
    }
}

/// Kernels with a fixed-point port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixedFilter {
    Box,
    Triangle,
}

impl Kernel<Fixed> for FixedFilter {
    fn support(&self) -> Fixed {
        match self {
            Self::Box => Fixed::HALF,
            Self::Triangle => Fixed::ONE,
        }
    }

    fn weight(&self, x: Fixed) -> Fixed {
        match self {
            Self::Box => {
                if x < -Fixed::HALF || x >= Fixed::HALF {
                    Fixed::ZERO
                } else {
                    Fixed::ONE
                }
            }
            Self::Triangle => {
                if x < -Fixed::ONE || x >= Fixed::ONE {
                    Fixed::ZERO
                } else if x.is_negative() {
                    Fixed::ONE + x
                } else {
                    Fixed::ONE - x
                }
            }
        }
    }
}

impl From<FixedFilter> for FilterKind {
    fn from(filter: FixedFilter) -> Self {
        match filter {
            FixedFilter::Box => FilterKind::Box,
            FixedFilter::Triangle => FilterKind::Triangle,
        }
    }
}

impl TryFrom<FilterKind> for FixedFilter {
    type Error = ScaleError;

    fn try_from(kind: FilterKind) -> Result<Self, Self::Error> {
        match kind {
            FilterKind::Box => Ok(Self::Box),
            FilterKind::Triangle => Ok(Self::Triangle),
            other => Err(ScaleError::unsupported_fixed_filter(other.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn supports_match_filter_table() {
        let expected = [
            (FilterKind::Point, 0.0),
            (FilterKind::Box, 0.5),
            (FilterKind::Triangle, 1.0),
            (FilterKind::Gaussian, 1.25),
            (FilterKind::Quadratic, 1.5),
            (FilterKind::Mitchell, 2.0),
            (FilterKind::Lanczos, 3.0),
            (FilterKind::Bessel, 3.2383),
            (FilterKind::Sinc, 4.0),
        ];
        for (kind, support) in expected {
            assert_eq!(kind.support(), support, "{kind}");
        }
    }

    #[test]
    fn kernel_values_at_origin() {
        let expected = [
            (FilterKind::Box, 1.0),
            (FilterKind::Triangle, 1.0),
            (FilterKind::Hermite, 1.0),
            (FilterKind::Hanning, 1.0),
            (FilterKind::Hamming, 1.0),
            (FilterKind::Blackman, 1.0),
            (FilterKind::Gaussian, 0.797_884_6),
            (FilterKind::Quadratic, 0.75),
            (FilterKind::Cubic, 2.0 / 3.0),
            (FilterKind::Catrom, 1.0),
            (FilterKind::Mitchell, 8.0 / 9.0),
            (FilterKind::Lanczos, 1.0),
            (FilterKind::Bessel, std::f32::consts::FRAC_PI_4),
            (FilterKind::Sinc, 1.0),
        ];
        for (kind, value) in expected {
            assert!(
                close(kind.evaluate(0.0), value, 1e-5),
                "{kind}: {} != {value}",
                kind.evaluate(0.0)
            );
        }
    }

    #[test]
    fn compact_kernels_vanish_at_their_support() {
        for kind in [
            FilterKind::Box,
            FilterKind::Triangle,
            FilterKind::Hermite,
            FilterKind::Quadratic,
            FilterKind::Cubic,
            FilterKind::Catrom,
            FilterKind::Mitchell,
            FilterKind::Lanczos,
        ] {
            let s = kind.support();
            assert!(close(kind.evaluate(s), 0.0, 1e-6), "{kind} at {s}");
            assert!(close(kind.evaluate(-s - 0.01), 0.0, 1e-6), "{kind} at -{s}");
        }
    }

    #[test]
    fn symmetric_kernels_are_even() {
        for kind in FilterKind::ALL {
            if matches!(kind, FilterKind::Point | FilterKind::Box) {
                continue;
            }
            for x in [0.1f32, 0.4, 0.75, 1.3, 1.9] {
                assert!(
                    close(kind.evaluate(x), kind.evaluate(-x), 1e-6),
                    "{kind} at {x}"
                );
            }
        }
    }

    #[test]
    fn interpolating_kernels_are_zero_at_integers() {
        for kind in [FilterKind::Triangle, FilterKind::Catrom, FilterKind::Lanczos] {
            assert!(close(kind.evaluate(1.0), 0.0, 1e-6), "{kind}");
            assert!(close(kind.evaluate(2.0), 0.0, 1e-6), "{kind}");
        }
    }

    #[test]
    fn bessel_order_one_is_continuous_across_branches() {
        let below = bessel_order_one(7.9999);
        let at = bessel_order_one(8.0);
        let above = bessel_order_one(8.0001);
        assert!((at - 0.234_636_3).abs() < 1e-6);
        assert!((below - at).abs() < 1e-4);
        assert!((above - at).abs() < 1e-4);
        assert!((bessel_order_one(1.0) - 0.440_050_6).abs() < 1e-6);
        assert!((bessel_order_one(10.0) - 0.043_472_7).abs() < 1e-6);
        assert!((bessel_order_one(-1.0) + 0.440_050_6).abs() < 1e-6);
    }

    #[test]
    fn fixed_kernels_track_float_kernels() {
        for filter in [FixedFilter::Box, FixedFilter::Triangle] {
            let kind = FilterKind::from(filter);
            for x in [-1.25f32, -0.75, -0.5, -0.25, 0.0, 0.25, 0.5, 0.75, 1.0] {
                let fixed = filter.weight(Fixed::from_f32(x)).to_f32();
                assert!(close(fixed, kind.evaluate(x), 1.0 / 4096.0), "{kind} at {x}");
            }
            assert_eq!(Kernel::<Fixed>::support(&filter).to_f32(), kind.support());
        }
    }

    #[test]
    fn only_box_and_triangle_have_fixed_ports() {
        assert_eq!(FixedFilter::try_from(FilterKind::Box).unwrap(), FixedFilter::Box);
        assert_eq!(
            FixedFilter::try_from(FilterKind::Triangle).unwrap(),
            FixedFilter::Triangle
        );
        let err = FixedFilter::try_from(FilterKind::Lanczos).unwrap_err();
        assert!(matches!(err, ScaleError::UnsupportedFixedFilter { .. }));
    }
}
