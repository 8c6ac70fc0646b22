//! Constants shared by several evaluators.

#![allow(clippy::excessive_precision)]
#![allow(clippy::approx_constant)]

use num_complex::Complex64;

pub(crate) const PI: f64 = 3.14159265358979324e+00;

pub(crate) const HALF_PI: f64 = 1.57079632679489662e+00;

pub(crate) const TWO_THIRDS: f64 = 6.66666666666666667e-01;

/// √(π/2).
pub(crate) const SQRT_HALF_PI: f64 = 1.25331413731550025e+00;

/// 1/√(2π).
pub(crate) const INV_SQRT_TWO_PI: f64 = 3.98942280401432678e-01;

/// ln(2√π), the log-magnitude offset of the leading Airy term used by the
/// large-order overflow tests.
pub(crate) const AIRY_LOG_OFFSET: f64 = 1.26551212348464539e+00;

/// `i^k` for k = 0..4.
pub(crate) const I_POWERS: [Complex64; 4] = [
    Complex64::new(1.0, 0.0),
    Complex64::new(0.0, 1.0),
    Complex64::new(-1.0, 0.0),
    Complex64::new(0.0, -1.0),
];
