//! Bessel functions of the first and second kind, J(ν, z) and Y(ν, z).
//!
//! Both are rotations of the modified functions onto the right half plane:
//!
//! ```text
//! J(ν, z) = e^{iπν/2} I(ν, -iz)                                Im z ≥ 0
//! Y(ν, z) = e^{iπ(ν+1)/2} I(ν, zn) - (2/π) e^{-iπν/2} K(ν, zn)  zn = -iz
//! ```
//!
//! with the conjugate forms below the real axis.

#[cfg(feature = "alloc")]
use alloc::vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use crate::algo::constants::HALF_PI;
use crate::algo::dispatch::i_right_half;
use crate::algo::scale::rotate_guarded;
use crate::algo::EvalContext;
use crate::complex::{cis, modulus, sin_cos_pi, times_i, times_neg_i, CONE, CZERO};
use crate::error::Error;
use crate::modified::{fill_i, fill_k, validate_order, validate_request};
#[cfg(feature = "alloc")]
use crate::types::BesselSequence;
use crate::types::{Accuracy, BesselOutput, Scaling};

/// K orders evaluated per pass when forming Y, so no heap buffer is needed.
const K_CHUNK: usize = 16;

/// `a·x + b·y`, skipping a term whose coefficient is exactly zero so an
/// infinite value at z = 0 does not turn the sum into NaN.
fn reflect(a: f64, x: Complex64, b: f64, y: Complex64) -> Complex64 {
    let mut v = CZERO;
    if a != 0.0 {
        v += x * a;
    }
    if b != 0.0 {
        v += y * b;
    }
    v
}

/// `J(order + k, z)` into `out`, returning the count of trailing zeros.
pub(crate) fn fill_j(
    ctx: &EvalContext,
    order: f64,
    z: Complex64,
    out: &mut [Complex64],
) -> Result<(usize, Accuracy), Error> {
    validate_request(order, out.len())?;
    let wp = &ctx.wp;
    let n = out.len();
    let accuracy = ctx.check_range(modulus(z), order + (n - 1) as f64)?;

    if z == CZERO {
        out.fill(CZERO);
        if order == 0.0 {
            out[0] = CONE;
        }
        return Ok((0, accuracy));
    }

    // e^{iπν/2}, exact for integer ν.
    let (s, c) = sin_cos_pi(0.5 * order);
    let mut csgn = Complex64::new(c, s);
    let mut zn = Complex64::new(z.im, -z.re);
    let upper = z.im >= 0.0;
    if !upper {
        zn = -zn;
        csgn = csgn.conj();
    }

    let nz = i_right_half(ctx, zn, order, out)?;
    for v in out.iter_mut().take(n - nz) {
        *v = rotate_guarded(*v, csgn, wp.ascle, wp.tol);
        csgn = if upper { times_i(csgn) } else { times_neg_i(csgn) };
    }
    Ok((nz, accuracy))
}

/// `Y(order + k, z)` into `out`.
///
/// Unscaled, the count is the smaller of the I and K underflow counts;
/// scaled, it counts entries that are exactly zero because `e^{-2|Im z|}`
/// underflows.
pub(crate) fn fill_y(
    ctx: &EvalContext,
    order: f64,
    z: Complex64,
    out: &mut [Complex64],
) -> Result<(usize, Accuracy), Error> {
    validate_request(order, out.len())?;
    let wp = &ctx.wp;

    if z == CZERO {
        out.fill(Complex64::new(f64::NEG_INFINITY, 0.0));
        return Ok((0, Accuracy::Normal));
    }

    // I values are written to `out` and combined in place with K.
    let zn = Complex64::new(z.im.abs(), -z.re);
    let (nz_i, mut accuracy) = fill_i(ctx, order, zn, out)?;

    let (s, c) = sin_cos_pi(0.5 * order);
    let mut cspn = Complex64::new(c, -s) * (1.0 / HALF_PI);
    let mut csgn = times_i(Complex64::new(c, s));

    // e^{zn} on the scaled K becomes e^{-|Im z|}.
    let mut ey = 0.0;
    if ctx.scaled() {
        let tay = (z.im + z.im).abs();
        if tay < wp.elim {
            ey = (-tay).exp();
        }
        cspn = cis(z.re) * cspn * ey;
    }

    let mut nz_k = 0usize;
    let mut nz_scaled = 0usize;
    let mut kbuf = [CZERO; K_CHUNK];
    for (j, chunk) in out.chunks_mut(K_CHUNK).enumerate() {
        let kv = &mut kbuf[..chunk.len()];
        let (nz, k_accuracy) = fill_k(ctx, order + (j * K_CHUNK) as f64, zn, kv)?;
        nz_k += nz;
        accuracy = accuracy.worst(k_accuracy);

        for (v, k) in chunk.iter_mut().zip(kv.iter()) {
            let cy = if ctx.scaled() {
                let cy = rotate_guarded(*v, csgn, wp.ascle, wp.tol)
                    - rotate_guarded(*k, cspn, wp.ascle, wp.tol);
                if cy == CZERO && ey == 0.0 {
                    nz_scaled += 1;
                }
                cy
            } else {
                csgn * *v - cspn * *k
            };
            *v = if z.im < 0.0 { cy.conj() } else { cy };
            csgn = times_i(csgn);
            cspn = times_neg_i(cspn);
        }
    }

    let nz = if ctx.scaled() { nz_scaled } else { nz_i.min(nz_k) };
    Ok((nz, accuracy))
}

/// Bessel function of the first kind, `J(ν, z)`, for any real ν.
///
/// Negative orders use `J(-ν) = cos(πν) J(ν) - sin(πν) Y(ν)`, which reduces to
/// `(-1)^ν J(ν)` for integer ν. With [`Scaling::Exponential`] the result is
/// `e^{-|Im z|} J(ν, z)`.
///
/// # Errors
/// `Overflow` when the unscaled value is out of range, `TotalPrecisionLoss`
/// when |z| or ν exceeds the argument-reduction range, `NoConvergence` if
/// every applicable algorithm fails.
///
/// # Example
/// ```
/// use num_complex::Complex64;
/// use zbessel::{bessel_j, Scaling};
///
/// let j0 = bessel_j(0.0, Complex64::new(1.0, 0.0), Scaling::Unscaled).unwrap();
/// assert!((j0.value.re - 0.7651976865579666).abs() < 1e-15);
/// ```
pub fn bessel_j(order: f64, z: Complex64, scaling: Scaling) -> Result<BesselOutput, Error> {
    validate_order(order)?;
    let ctx = EvalContext::new(scaling);
    let nu = order.abs();
    let mut j = [CZERO];
    let (mut nz, mut accuracy) = fill_j(&ctx, nu, z, &mut j)?;
    let mut value = j[0];

    if order < 0.0 {
        let (s, c) = sin_cos_pi(nu);
        let mut y = [CZERO];
        if s != 0.0 {
            let (_, y_accuracy) = fill_y(&ctx, nu, z, &mut y)?;
            accuracy = accuracy.worst(y_accuracy);
        }
        value = reflect(c, value, -s, y[0]);
        nz = usize::from(value == CZERO && nz > 0);
    }

    Ok(BesselOutput {
        value,
        underflow_count: nz,
        accuracy: accuracy.report("bessel_j", order, z),
    })
}

/// Bessel function of the second kind, `Y(ν, z)`, for any real ν.
///
/// Negative orders use `Y(-ν) = sin(πν) J(ν) + cos(πν) Y(ν)`. With
/// [`Scaling::Exponential`] the result is `e^{-|Im z|} Y(ν, z)`. At z = 0 the
/// value is `-∞`.
///
/// # Errors
/// As [`bessel_j`].
pub fn bessel_y(order: f64, z: Complex64, scaling: Scaling) -> Result<BesselOutput, Error> {
    validate_order(order)?;
    let ctx = EvalContext::new(scaling);
    let nu = order.abs();
    let mut y = [CZERO];
    let (mut nz, mut accuracy) = fill_y(&ctx, nu, z, &mut y)?;
    let mut value = y[0];

    if order < 0.0 {
        let (s, c) = sin_cos_pi(nu);
        let mut j = [CZERO];
        if s != 0.0 {
            let (_, j_accuracy) = fill_j(&ctx, nu, z, &mut j)?;
            accuracy = accuracy.worst(j_accuracy);
        }
        value = reflect(s, j[0], c, value);
        nz = usize::from(value == CZERO && nz > 0);
    }

    Ok(BesselOutput {
        value,
        underflow_count: nz,
        accuracy: accuracy.report("bessel_y", order, z),
    })
}

/// `J(ν + k, z)` for `k = 0..out.len()`, ν ≥ 0.
///
/// Returns the number of trailing entries set to zero by underflow and the
/// accuracy status.
pub fn bessel_j_into(
    order: f64,
    z: Complex64,
    scaling: Scaling,
    out: &mut [Complex64],
) -> Result<(usize, Accuracy), Error> {
    let (nz, accuracy) = fill_j(&EvalContext::new(scaling), order, z, out)?;
    Ok((nz, accuracy.report("bessel_j", order, z)))
}

/// `Y(ν + k, z)` for `k = 0..out.len()`, ν ≥ 0.
pub fn bessel_y_into(
    order: f64,
    z: Complex64,
    scaling: Scaling,
    out: &mut [Complex64],
) -> Result<(usize, Accuracy), Error> {
    let (nz, accuracy) = fill_y(&EvalContext::new(scaling), order, z, out)?;
    Ok((nz, accuracy.report("bessel_y", order, z)))
}

/// `J(ν + k, z)` for `k = 0..n`, ν ≥ 0.
#[cfg(feature = "alloc")]
pub fn bessel_j_seq(
    order: f64,
    z: Complex64,
    n: usize,
    scaling: Scaling,
) -> Result<BesselSequence, Error> {
    validate_request(order, n)?;
    let mut values = vec![CZERO; n];
    let (underflow_count, accuracy) = bessel_j_into(order, z, scaling, &mut values)?;
    Ok(BesselSequence {
        values,
        underflow_count,
        accuracy,
    })
}

/// `Y(ν + k, z)` for `k = 0..n`, ν ≥ 0.
#[cfg(feature = "alloc")]
pub fn bessel_y_seq(
    order: f64,
    z: Complex64,
    n: usize,
    scaling: Scaling,
) -> Result<BesselSequence, Error> {
    validate_request(order, n)?;
    let mut values = vec![CZERO; n];
    let (underflow_count, accuracy) = bessel_y_into(order, z, scaling, &mut values)?;
    Ok(BesselSequence {
        values,
        underflow_count,
        accuracy,
    })
}
