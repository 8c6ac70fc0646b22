//! Airy functions Ai(z), Bi(z) and their derivatives.
//!
//! For |z| ≤ 1 both come from the power series in z³. Outside the unit disc,
//! with `ζ = (2/3) z^{3/2}`,
//!
//! ```text
//! Ai(z)  =  √z K(1/3, ζ) / (π√3)        Ai'(z) = -z K(2/3, ζ) / (π√3)
//! Bi(z)  =  √(z/3) (I(-1/3, ζ) + I(1/3, ζ))
//! Bi'(z) =  (z/√3) (I(-2/3, ζ) + I(2/3, ζ))
//! ```
//!
//! where the negative orders come from one recurrence step down. Left of the
//! imaginary axis K is continued across the cut and the I orders pick up the
//! phases `e^{±iπν}`.

#![allow(clippy::excessive_precision)]

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;
use tracing::warn;

use crate::algo::constants::{PI, TWO_THIRDS};
use crate::algo::continuation::k_left_half_small_order;
use crate::algo::dispatch::i_right_half;
use crate::algo::kfunc::k_right_half;
use crate::algo::EvalContext;
use crate::complex::{cis, modulus, quotient, CONE, CZERO};
use crate::error::Error;
use crate::machine::WorkingPrecision;
use crate::types::{Accuracy, AiryKind, AiryOutput, Scaling};

/// Ai(0) and -Ai'(0).
const AI_C1: f64 = 3.55028053887817240e-01;
const AI_C2: f64 = 2.58819403792806799e-01;
/// 1/(π√3).
const AI_COEF: f64 = 1.83776298473930683e-01;

/// Bi(0) and Bi'(0).
const BI_C1: f64 = 6.14926627446000736e-01;
const BI_C2: f64 = 4.48288357353826359e-01;
/// 1/√3.
const BI_COEF: f64 = 5.77350269189625765e-01;

/// Terms of the z³ series before it is cut off regardless of convergence.
const SERIES_TERMS: usize = 25;

/// Evaluates one Airy function.
///
/// With [`Scaling::Exponential`] the result is `e^{ζ} Ai(z)` (also for Ai')
/// or `e^{-|Re ζ|} Bi(z)` (also for Bi'), where `ζ = (2/3) z^{3/2}`.
///
/// `underflow_count` is 1 when unscaled Ai or Ai' decays below the smallest
/// representable magnitude; the value is then exactly zero.
///
/// # Errors
/// - `Overflow` when the unscaled value is too large to represent.
/// - `TotalPrecisionLoss` when |z| exceeds `range^(2/3)`.
/// - `NoConvergence` when an internal Bessel evaluation fails.
///
/// # Example
/// ```
/// use num_complex::Complex64;
/// use zbessel::{airy, AiryKind, Scaling};
///
/// let out = airy(AiryKind::Ai, Complex64::new(0.0, 0.0), Scaling::Unscaled).unwrap();
/// assert!((out.value.re - 0.355028053887817239).abs() < 1e-15);
/// ```
pub fn airy(kind: AiryKind, z: Complex64, scaling: Scaling) -> Result<AiryOutput, Error> {
    let ctx = EvalContext::new(scaling);
    let out = match kind {
        AiryKind::Ai | AiryKind::AiPrime => ai_kernel(&ctx, z, kind.is_derivative())?,
        AiryKind::Bi | AiryKind::BiPrime => bi_kernel(&ctx, z, kind.is_derivative())?,
    };
    if out.accuracy == Accuracy::Reduced {
        warn!(?kind, re = z.re, im = z.im, "Airy argument large, half of the digits may be lost");
    }
    Ok(out)
}

/// Ai(z).
pub fn ai(z: Complex64) -> Result<Complex64, Error> {
    airy(AiryKind::Ai, z, Scaling::Unscaled).map(|o| o.value)
}

/// `e^{ζ} Ai(z)`, `ζ = (2/3) z^{3/2}`.
pub fn ai_scaled(z: Complex64) -> Result<Complex64, Error> {
    airy(AiryKind::Ai, z, Scaling::Exponential).map(|o| o.value)
}

/// Ai'(z).
pub fn ai_prime(z: Complex64) -> Result<Complex64, Error> {
    airy(AiryKind::AiPrime, z, Scaling::Unscaled).map(|o| o.value)
}

/// `e^{ζ} Ai'(z)`.
pub fn ai_prime_scaled(z: Complex64) -> Result<Complex64, Error> {
    airy(AiryKind::AiPrime, z, Scaling::Exponential).map(|o| o.value)
}

/// Bi(z).
pub fn bi(z: Complex64) -> Result<Complex64, Error> {
    airy(AiryKind::Bi, z, Scaling::Unscaled).map(|o| o.value)
}

/// `e^{-|Re ζ|} Bi(z)`.
pub fn bi_scaled(z: Complex64) -> Result<Complex64, Error> {
    airy(AiryKind::Bi, z, Scaling::Exponential).map(|o| o.value)
}

/// Bi'(z).
pub fn bi_prime(z: Complex64) -> Result<Complex64, Error> {
    airy(AiryKind::BiPrime, z, Scaling::Unscaled).map(|o| o.value)
}

/// `e^{-|Re ζ|} Bi'(z)`.
pub fn bi_prime_scaled(z: Complex64) -> Result<Complex64, Error> {
    airy(AiryKind::BiPrime, z, Scaling::Exponential).map(|o| o.value)
}

/// Scaled `(Ai, Ai')` at `arg`, the kernel of the turning-point expansions.
///
/// A value that cannot be formed is returned as zero; the expansions
/// carry their own magnitude tests.
pub(crate) fn scaled_ai_pair(arg: Complex64) -> (Complex64, Complex64) {
    let ctx = EvalContext::new(Scaling::Exponential);
    let ai = ai_kernel(&ctx, arg, false).map_or(CZERO, |o| o.value);
    let dai = ai_kernel(&ctx, arg, true).map_or(CZERO, |o| o.value);
    (ai, dai)
}

/// Partial sums of the two z³ series,
/// `f = Σ z^{3k} / ∏(3j-1)(3j)` and `g = Σ z^{3k} / ∏(3j)(3j+1)`,
/// with the factors shifted by one for the derivatives.
fn power_series(z: Complex64, az: f64, fid: f64, tol: f64) -> (Complex64, Complex64) {
    let mut s1 = CONE;
    let mut s2 = CONE;
    let aa = az * az;
    if aa < tol / az {
        return (s1, s2);
    }
    let z3 = z * z * z;
    let az3 = az * aa;
    let mut trm1 = CONE;
    let mut trm2 = CONE;
    let mut atrm = 1.0;

    let mut d1 = (2.0 + fid) * (3.0 + fid + fid);
    let mut d2 = (3.0 - fid - fid) * (4.0 - fid);
    let mut ad = d1.min(d2);
    let mut ak = 24.0 + 9.0 * fid;
    let mut bk = 30.0 - 9.0 * fid;
    for _ in 0..SERIES_TERMS {
        trm1 = trm1 * z3 / d1;
        s1 += trm1;
        trm2 = trm2 * z3 / d2;
        s2 += trm2;
        atrm = atrm * az3 / ad;
        d1 += ak;
        d2 += bk;
        ad = d1.min(d2);
        if atrm < tol * ad {
            break;
        }
        ak += 18.0;
        bk += 18.0;
    }
    (s1, s2)
}

/// `(√z, ζ)` with `ζ = (2/3) z^{3/2}` kept on the principal branch:
/// Re ζ ≤ 0 left of the imaginary axis and ζ purely imaginary on the
/// negative real axis.
fn zeta_of(z: Complex64) -> (Complex64, Complex64) {
    let csq = z.sqrt();
    let mut zta = z * csq * TWO_THIRDS;
    if z.re < 0.0 {
        zta.re = -zta.re.abs();
    }
    if z.im == 0.0 && z.re <= 0.0 {
        zta.re = 0.0;
    }
    (csq, zta)
}

/// |z| limits for |z| > 1; the Bessel arguments grow like |z|^{3/2}.
fn check_range(wp: &WorkingPrecision, az: f64) -> Result<Accuracy, Error> {
    let limit = wp.range.powf(TWO_THIRDS);
    if az > limit {
        return Err(Error::TotalPrecisionLoss);
    }
    Ok(if az > limit.sqrt() {
        Accuracy::Reduced
    } else {
        Accuracy::Normal
    })
}

fn ai_kernel(ctx: &EvalContext, z: Complex64, derivative: bool) -> Result<AiryOutput, Error> {
    let wp = &ctx.wp;
    let az = modulus(z);
    let fid = if derivative { 1.0 } else { 0.0 };

    if az <= 1.0 {
        let value = if az < wp.tol {
            ai_at_tiny(wp, z, az, derivative)
        } else {
            let (s1, s2) = power_series(z, az, fid, wp.tol);
            let mut v = if derivative {
                let mut d = -(s2 * AI_C2);
                if az > wp.tol {
                    d += z * s1 * z * (AI_C1 / (1.0 + fid));
                }
                d
            } else {
                s1 * AI_C1 - z * s2 * AI_C2
            };
            if ctx.scaled() {
                v *= (z * z.sqrt() * TWO_THIRDS).exp();
            }
            v
        };
        return Ok(normal(value));
    }

    let accuracy = check_range(wp, az)?;
    let fnu = (1.0 + fid) / 3.0;
    let (csq, zta) = zeta_of(z);
    let alaz = az.ln();
    // Holds the product on scale while √z or z is applied.
    let mut sfac = 1.0;

    let (k, underflow) = if zta.re >= 0.0 && z.re > 0.0 {
        if !ctx.scaled() && zta.re >= wp.alim {
            if -zta.re - 0.25 * alaz < -wp.elim {
                return Ok(AiryOutput {
                    value: CZERO,
                    underflow_count: 1,
                    accuracy,
                });
            }
            sfac = 1.0 / wp.tol;
        }
        let mut y = [CZERO];
        let nz = k_right_half(ctx, zta, fnu, &mut y)?;
        (y[0], nz)
    } else {
        if !ctx.scaled() && zta.re <= -wp.alim {
            if -zta.re + 0.25 * alaz > wp.elim {
                return Err(Error::Overflow);
            }
            sfac = wp.tol;
        }
        let mr = if z.im < 0.0 { -1 } else { 1 };
        let (v, underflow) = k_left_half_small_order(ctx, zta, fnu, mr)?;
        (v, usize::from(underflow))
    };

    let s1 = k * AI_COEF * sfac;
    let value = (if derivative { -(s1 * z) } else { s1 * csq }) / sfac;
    Ok(AiryOutput {
        value,
        underflow_count: underflow,
        accuracy,
    })
}

/// Two-term Taylor forms for |z| below the unit roundoff. Terms that would
/// underflow are dropped.
fn ai_at_tiny(wp: &WorkingPrecision, z: Complex64, az: f64, derivative: bool) -> Complex64 {
    if derivative {
        let mut v = Complex64::new(-AI_C2, 0.0);
        if az > wp.ufl.sqrt() {
            v += z * z * (0.5 * AI_C1);
        }
        v
    } else {
        let mut v = Complex64::new(AI_C1, 0.0);
        if az > wp.ufl {
            v -= z * AI_C2;
        }
        v
    }
}

fn bi_kernel(ctx: &EvalContext, z: Complex64, derivative: bool) -> Result<AiryOutput, Error> {
    let wp = &ctx.wp;
    let az = modulus(z);
    let fid = if derivative { 1.0 } else { 0.0 };

    if az <= 1.0 {
        if az < wp.tol {
            return Ok(normal(Complex64::new(BI_C1 * (1.0 - fid) + fid * BI_C2, 0.0)));
        }
        let (s1, s2) = power_series(z, az, fid, wp.tol);
        let mut v = if derivative {
            let mut d = s2 * BI_C2;
            if az > wp.tol {
                d += z * s1 * z * (BI_C1 / (1.0 + fid));
            }
            d
        } else {
            s1 * BI_C1 + z * s2 * BI_C2
        };
        if ctx.scaled() {
            let zta = z * z.sqrt() * TWO_THIRDS;
            v *= (-zta.re.abs()).exp();
        }
        return Ok(normal(v));
    }

    let accuracy = check_range(wp, az)?;
    let (csq, mut zta) = zeta_of(z);
    let mut sfac = 1.0;
    if !ctx.scaled() {
        let bb = zta.re.abs();
        if bb >= wp.alim {
            if bb + 0.25 * az.ln() > wp.elim {
                return Err(Error::Overflow);
            }
            sfac = wp.tol;
        }
    }

    // Left of the imaginary axis evaluate at -ζ and rotate the orders back.
    let mut fmr = 0.0;
    if !(zta.re >= 0.0 && z.re > 0.0) {
        fmr = if z.im < 0.0 { -PI } else { PI };
        zta = -zta;
    }

    let fnu = (1.0 + fid) / 3.0;
    let mut lower = [CZERO];
    i_right_half(ctx, zta, fnu, &mut lower)?;
    let s1 = cis(fmr * fnu) * lower[0] * sfac;

    let fnu2 = (2.0 - fid) / 3.0;
    let mut upper = [CZERO; 2];
    i_right_half(ctx, zta, fnu2, &mut upper)?;
    // I(fnu2 - 1) = 2 fnu2 I(fnu2)/ζ + I(fnu2 + 1)
    let s2 = quotient(upper[0] * sfac, zta) * (fnu2 + fnu2) + upper[1] * sfac;

    let s1 = (s1 + cis(fmr * (fnu2 - 1.0)) * s2) * BI_COEF;
    let value = (if derivative { z * s1 } else { csq * s1 }) / sfac;
    Ok(AiryOutput {
        value,
        underflow_count: 0,
        accuracy,
    })
}

#[inline]
fn normal(value: Complex64) -> AiryOutput {
    AiryOutput {
        value,
        underflow_count: 0,
        accuracy: Accuracy::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn close(a: Complex64, b: Complex64, rel: f64) -> bool {
        (a - b).norm() <= rel * b.norm()
    }

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn values_at_origin() {
        let o = airy(AiryKind::Ai, CZERO, Scaling::Unscaled).unwrap();
        assert_eq!(o.underflow_count, 0);
        assert_abs_diff_eq!(o.value.re, AI_C1, epsilon = 1e-15);
        assert_abs_diff_eq!(ai_prime(CZERO).unwrap().re, -AI_C2, epsilon = 1e-15);
        assert_abs_diff_eq!(bi(CZERO).unwrap().re, BI_C1, epsilon = 1e-15);
        assert_abs_diff_eq!(bi_prime(CZERO).unwrap().re, BI_C2, epsilon = 1e-15);
    }

    #[test]
    fn series_inside_unit_disc() {
        let v = ai(c(0.5, 0.0)).unwrap();
        assert_abs_diff_eq!(v.re, 0.23169360648083349, epsilon = 1e-15);
        assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-15);
        let v = bi(c(0.5, 0.0)).unwrap();
        assert_abs_diff_eq!(v.re, 0.85427704310315549, epsilon = 1e-14);
        let v = ai(c(-1.0, 0.0)).unwrap();
        assert_abs_diff_eq!(v.re, 0.53556088329235212, epsilon = 1e-14);
        assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn k_function_path_right_half_plane() {
        assert!(close(ai(c(5.0, 0.0)).unwrap(), c(1.0834442813607442e-4, 0.0), 1e-14));
        assert!(close(
            ai(c(1.0, 1.0)).unwrap(),
            c(0.060458308371838149, -0.15188956587718140),
            1e-14
        ));
        assert!(close(bi(c(5.0, 0.0)).unwrap(), c(657.79204417117118, 0.0), 1e-14));
    }

    #[test]
    fn continuation_path_left_half_plane() {
        assert!(close(ai(c(-5.0, 0.0)).unwrap(), c(0.35076100902411432, 0.0), 1e-13));
        assert!(close(bi(c(-5.0, 0.0)).unwrap(), c(-0.13836913490160058, 0.0), 1e-13));
        assert!(close(ai_prime(c(-5.0, 0.0)).unwrap(), c(0.32719281855444314, 0.0), 1e-13));
        assert!(close(bi_prime(c(-5.0, 0.0)).unwrap(), c(0.77841177300189925, 0.0), 1e-13));
        assert!(close(
            ai(c(-2.0, 3.0)).unwrap(),
            c(19.473753244266918, -1.9820117350656749),
            1e-13
        ));
        assert!(close(
            bi(c(-2.0, 3.0)).unwrap(),
            c(1.9844101512117996, 19.470187176247996),
            1e-13
        ));
    }

    #[test]
    fn wronskian_is_one_over_pi() {
        for z in [c(0.5, 0.3), c(3.0, 4.0), c(-2.0, -3.0), c(-6.0, 0.5)] {
            let w = ai(z).unwrap() * bi_prime(z).unwrap() - ai_prime(z).unwrap() * bi(z).unwrap();
            assert!(close(w, c(1.0 / PI, 0.0), 1e-11), "z = {z}: {w}");
        }
    }

    #[test]
    fn scaled_forms_carry_the_documented_factors() {
        let z = c(3.0, 4.0);
        let zta = z * z.sqrt() * TWO_THIRDS;
        assert!(close(ai_scaled(z).unwrap(), ai(z).unwrap() * zta.exp(), 1e-13));
        assert!(close(ai_prime_scaled(z).unwrap(), ai_prime(z).unwrap() * zta.exp(), 1e-13));
        let f = (-zta.re.abs()).exp();
        assert!(close(bi_scaled(z).unwrap(), bi(z).unwrap() * f, 1e-13));
        assert!(close(bi_prime_scaled(z).unwrap(), bi_prime(z).unwrap() * f, 1e-13));
        assert!(close(
            ai_scaled(z).unwrap(),
            c(0.18357553003565632, -0.041617648739380279),
            1e-13
        ));
    }

    #[test]
    fn unscaled_decay_underflows_to_zero() {
        let o = airy(AiryKind::Ai, c(200.0, 0.0), Scaling::Unscaled).unwrap();
        assert_eq!(o.underflow_count, 1);
        assert_eq!(o.value, CZERO);
        let s = airy(AiryKind::Ai, c(200.0, 0.0), Scaling::Exponential).unwrap();
        assert_eq!(s.underflow_count, 0);
        assert!(close(s.value, c(0.075010416843816159, 0.0), 1e-13));
    }

    #[test]
    fn unscaled_growth_overflows() {
        assert_eq!(ai(c(-200.0, 50.0)), Err(Error::Overflow));
        assert_eq!(bi(c(200.0, 0.0)), Err(Error::Overflow));
        assert!(bi_scaled(c(200.0, 0.0)).is_ok());
    }

    #[test]
    fn range_limits() {
        let big = airy(AiryKind::Ai, c(2000.0, 0.0), Scaling::Exponential).unwrap();
        assert_eq!(big.accuracy, Accuracy::Reduced);
        assert!(close(big.value, c(0.042182961180108570, 0.0), 1e-12));
        assert_eq!(ai_scaled(c(0.0, 1.0e7)), Err(Error::TotalPrecisionLoss));
    }

    #[test]
    fn turning_point_kernel_pair() {
        let (a, d) = scaled_ai_pair(c(3.0, 4.0));
        assert!(close(a, c(0.18357553003565632, -0.041617648739380279), 1e-13));
        assert!(close(d, c(-0.41299090580142256, -0.092083707743126340), 1e-13));
    }
}
