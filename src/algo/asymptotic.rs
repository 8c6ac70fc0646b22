//! Large-argument expansion of I(ν, z) for |z| ≥ `rl`.
//!
//! Uses the Hankel expansion in powers of `1/(8z)`:
//!
//! `I(ν,z) ≈ e^z/√(2πz) Σ (-1)^k a_k(ν)/(8z)^k
//!          + e^{±iπ(ν+1/2)} e^{-z}/√(2πz) Σ a_k(ν)/(8z)^k`
//!
//! for the two highest orders, then recurs backward.

#![allow(clippy::excessive_precision)]

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use super::constants::PI;
use super::EvalContext;
use crate::complex::{modulus, quotient, two_over, CONE, CZERO};
use crate::error::Fault;

/// 1/(2π).
const INV_TWO_PI: f64 = 0.159154943091895336;

/// Fills `y` with `I(fnu + k, z)` from the large-|z| expansion.
///
/// Fails with `Overflow` if `e^{Re z}` is beyond range and with
/// `NoConvergence` if the series does not reach `tol` within its term limit,
/// which means |z| is too small for this expansion.
pub(crate) fn i_large_argument(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    y: &mut [Complex64],
) -> Result<(), Fault> {
    let wp = &ctx.wp;
    let n = y.len();
    let az = modulus(z);
    let arm = 1.0e3 * wp.tiny;
    let direct = n.min(2);
    let dfnu = fnu + (n - direct) as f64;

    // 1/√(2πz) (times e^z when unscaled and safe).
    let raz = 1.0 / az;
    let mut prefactor = (Complex64::new(z.re * raz, -z.im * raz) * (INV_TWO_PI * raz)).sqrt();
    let growth = if ctx.scaled() {
        Complex64::new(0.0, z.im)
    } else {
        z
    };
    if growth.re.abs() > wp.elim {
        return Err(Fault::Overflow);
    }
    let deferred_exp = growth.re.abs() > wp.alim && n > 2;
    if !deferred_exp {
        prefactor *= growth.exp();
    }

    let dnu2 = dfnu + dfnu;
    let mut four_nu2 = if dnu2 > arm.sqrt() { dnu2 * dnu2 } else { 0.0 };
    let ez = 8.0 * z;
    let aez = 8.0 * az;
    let s = wp.tol / aez;
    let max_terms = (wp.rl + wp.rl) as usize + 2;

    // e^{iπ(ν+1/2)} for the decaying term, signed by the half-plane of z.
    let mut p1 = CZERO;
    if z.im != 0.0 {
        let inu = fnu.trunc();
        let arg = (fnu - inu) * PI;
        let mut bk = arg.cos();
        if z.im < 0.0 {
            bk = -bk;
        }
        p1 = Complex64::new(-arg.sin(), bk);
        if (inu as i64 + (n - direct) as i64) % 2 != 0 {
            p1 = -p1;
        }
    }

    for k in 0..direct {
        let mut sqk = four_nu2 - 1.0;
        let atol = s * sqk.abs();
        let mut sgn = 1.0;
        let mut alternating = CONE;
        let mut plain = CONE;
        let mut term = CONE;
        let mut ak = 0.0;
        let mut aa = 1.0;
        let mut bb = aez;
        let mut dk = ez;
        let mut converged = false;
        for _ in 0..max_terms {
            term = quotient(term, dk) * sqk;
            plain += term;
            sgn = -sgn;
            alternating += term * sgn;
            dk += ez;
            aa *= sqk.abs() / bb;
            bb += aez;
            ak += 8.0;
            sqk -= ak;
            if aa <= atol {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(Fault::NoConvergence);
        }

        let mut sum = alternating;
        if z.re + z.re < wp.elim {
            sum += (-(z + z)).exp() * p1 * plain;
        }
        four_nu2 += 8.0 * dfnu + 4.0;
        p1 = -p1;
        y[n - direct + k] = sum * prefactor;
    }

    if n <= 2 {
        return Ok(());
    }

    let rz = two_over(z);
    let mut k = n - 2;
    let mut ak = (n - 2) as f64;
    while k > 0 {
        k -= 1;
        y[k] = (ak + fnu) * (rz * y[k + 1]) + y[k + 2];
        ak -= 1.0;
    }
    if deferred_exp {
        let ck = growth.exp();
        for v in y.iter_mut() {
            *v *= ck;
        }
    }
    Ok(())
}
