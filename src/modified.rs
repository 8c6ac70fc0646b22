//! Modified Bessel functions I(ν, z) and K(ν, z).
//!
//! I is evaluated in the right half plane and carried to the left one by
//! `I(ν, -z) = e^{±iπν} I(ν, z)`. K uses the right-half-plane evaluator, the
//! analytic continuation for Re z < 0, and the uniform expansions once the
//! starting order exceeds `fnul`.

#[cfg(feature = "alloc")]
use alloc::vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use crate::algo::constants::PI;
use crate::algo::continuation::k_left_half;
use crate::algo::debye::Family;
use crate::algo::dispatch::i_right_half;
use crate::algo::kfunc::k_right_half;
use crate::algo::large_order_k::k_large_order;
use crate::algo::overflow::screen_sequence;
use crate::algo::scale::rotate_guarded;
use crate::algo::EvalContext;
use crate::complex::{modulus, sin_cos_pi, sin_pi, CONE, CZERO};
use crate::error::Error;
#[cfg(feature = "alloc")]
use crate::types::BesselSequence;
use crate::types::{Accuracy, BesselOutput, Scaling};

/// Checks the order and length shared by every sequence request.
pub(crate) fn validate_request(order: f64, len: usize) -> Result<(), Error> {
    if order.is_nan() || order < 0.0 {
        return Err(Error::InvalidInput("order must be non-negative"));
    }
    if order.is_infinite() {
        return Err(Error::InvalidInput("order must be finite"));
    }
    if len == 0 {
        return Err(Error::InvalidInput("at least one order must be requested"));
    }
    Ok(())
}

/// Rejects a NaN or infinite order for the single-order entry points.
pub(crate) fn validate_order(order: f64) -> Result<(), Error> {
    if order.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidInput("order must be finite"))
    }
}

/// `exp(-z - |Re z|)`, converting a K value from its scaling to the I one.
#[inline]
pub(crate) fn k_to_i_scaling(z: Complex64) -> Complex64 {
    Complex64::from_polar((-z.re - z.re.abs()).exp(), -z.im)
}

/// `I(order + k, z)` into `out`, returning the count of trailing zeros.
pub(crate) fn fill_i(
    ctx: &EvalContext,
    order: f64,
    z: Complex64,
    out: &mut [Complex64],
) -> Result<(usize, Accuracy), Error> {
    validate_request(order, out.len())?;
    let n = out.len();
    let accuracy = ctx.check_range(modulus(z), order + (n - 1) as f64)?;

    if z == CZERO {
        out.fill(CZERO);
        if order == 0.0 {
            out[0] = CONE;
        }
        return Ok((0, accuracy));
    }

    if z.re >= 0.0 {
        let nz = i_right_half(ctx, z, order, out)?;
        return Ok((nz, accuracy));
    }

    let nz = i_right_half(ctx, -z, order, out)?;
    // e^{iπν} on and above the real axis, e^{-iπν} below it.
    let (s, c) = sin_cos_pi(order);
    let mut csgn = Complex64::new(c, if z.im < 0.0 { -s } else { s });
    let wp = &ctx.wp;
    for v in out.iter_mut().take(n - nz) {
        *v = rotate_guarded(*v, csgn, wp.ascle, wp.tol);
        csgn = -csgn;
    }
    Ok((nz, accuracy))
}

/// `K(order + k, z)` into `out`, returning the count of leading zeros.
pub(crate) fn fill_k(
    ctx: &EvalContext,
    order: f64,
    z: Complex64,
    out: &mut [Complex64],
) -> Result<(usize, Accuracy), Error> {
    validate_request(order, out.len())?;
    let wp = &ctx.wp;
    let n = out.len();
    let az = modulus(z);
    let top = order + (n - 1) as f64;

    if z == CZERO {
        out.fill(Complex64::new(f64::INFINITY, 0.0));
        return Ok((0, Accuracy::Normal));
    }
    let accuracy = ctx.check_range(az, top)?;
    if az < wp.ufl {
        return Err(Error::Overflow);
    }

    let mr = if z.re >= 0.0 {
        0
    } else if z.im < 0.0 {
        -1
    } else {
        1
    };

    if order > wp.fnul {
        let nz = k_large_order(ctx, z, order, mr, out)?;
        return Ok((nz, accuracy));
    }

    if top > 2.0 {
        let nuf = screen_sequence(ctx, z, order, Family::K, out)?;
        if nuf == n {
            // K(-z) underflowing means the I term of the continuation overflows.
            return if mr != 0 {
                Err(Error::Overflow)
            } else {
                Ok((n, accuracy))
            };
        }
    } else if top > 1.0 && az <= wp.tol && -top * (0.5 * az).ln() > wp.elim {
        return Err(Error::Overflow);
    }

    let nz = if mr == 0 {
        k_right_half(ctx, z, order, out)?
    } else {
        k_left_half(ctx, z, order, mr, out)?
    };
    Ok((nz, accuracy))
}

/// Modified Bessel function of the first kind, `I(ν, z)`, for any real ν.
///
/// Negative orders use `I(-ν, z) = I(ν, z) + (2/π) sin(πν) K(ν, z)`; the K
/// term vanishes exactly for integer ν. At z = 0 a negative non-integer
/// order gives an infinite real value.
///
/// With [`Scaling::Exponential`] the result is `e^{-|Re z|} I(ν, z)`.
///
/// # Errors
/// `Overflow` for an unscaled value out of range; `TotalPrecisionLoss` when |z| or ν exceeds
/// the argument-reduction range; `NoConvergence` if every applicable
/// algorithm fails.
///
/// # Example
/// ```
/// use num_complex::Complex64;
/// use zbessel::{bessel_i, Scaling};
///
/// let out = bessel_i(0.0, Complex64::new(0.4, 0.1), Scaling::Unscaled).unwrap();
/// assert!((out.value.re - 1.0377517751879539).abs() < 1e-15);
/// ```
pub fn bessel_i(order: f64, z: Complex64, scaling: Scaling) -> Result<BesselOutput, Error> {
    validate_order(order)?;
    let ctx = EvalContext::new(scaling);
    let nu = order.abs();
    let mut y = [CZERO];
    let (mut nz, mut accuracy) = fill_i(&ctx, nu, z, &mut y)?;
    let mut value = y[0];

    let s = sin_pi(nu);
    if order < 0.0 && s != 0.0 {
        let mut k = [CZERO];
        let (_, k_accuracy) = fill_k(&ctx, nu, z, &mut k)?;
        accuracy = accuracy.worst(k_accuracy);
        let mut term = k[0] * (2.0 / PI * s);
        if ctx.scaled() && z != CZERO {
            term *= k_to_i_scaling(z);
        }
        value += term;
        if value != CZERO {
            nz = 0;
        }
    }

    Ok(BesselOutput {
        value,
        underflow_count: nz,
        accuracy: accuracy.report("bessel_i", order, z),
    })
}

/// Modified Bessel function of the second kind, `K(ν, z)`, for any real ν
/// (`K(-ν, z) = K(ν, z)`).
///
/// With [`Scaling::Exponential`] the result is `e^{z} K(ν, z)`. At z = 0 the
/// value is `+∞`.
///
/// # Errors
/// `Overflow` when |z| is too small for the order or the unscaled value is
/// out of range; otherwise as [`bessel_i`].
pub fn bessel_k(order: f64, z: Complex64, scaling: Scaling) -> Result<BesselOutput, Error> {
    validate_order(order)?;
    let ctx = EvalContext::new(scaling);
    let mut y = [CZERO];
    let (nz, accuracy) = fill_k(&ctx, order.abs(), z, &mut y)?;
    Ok(BesselOutput {
        value: y[0],
        underflow_count: nz,
        accuracy: accuracy.report("bessel_k", order, z),
    })
}

/// `I(ν + k, z)` for `k = 0..out.len()`, ν ≥ 0.
///
/// Returns the number of trailing entries set to zero by underflow and the
/// accuracy status.
pub fn bessel_i_into(
    order: f64,
    z: Complex64,
    scaling: Scaling,
    out: &mut [Complex64],
) -> Result<(usize, Accuracy), Error> {
    let (nz, accuracy) = fill_i(&EvalContext::new(scaling), order, z, out)?;
    Ok((nz, accuracy.report("bessel_i", order, z)))
}

/// `K(ν + k, z)` for `k = 0..out.len()`, ν ≥ 0.
///
/// Returns the number of leading entries set to zero by underflow and the
/// accuracy status.
pub fn bessel_k_into(
    order: f64,
    z: Complex64,
    scaling: Scaling,
    out: &mut [Complex64],
) -> Result<(usize, Accuracy), Error> {
    let (nz, accuracy) = fill_k(&EvalContext::new(scaling), order, z, out)?;
    Ok((nz, accuracy.report("bessel_k", order, z)))
}

/// `I(ν + k, z)` for `k = 0..n`, ν ≥ 0.
#[cfg(feature = "alloc")]
pub fn bessel_i_seq(
    order: f64,
    z: Complex64,
    n: usize,
    scaling: Scaling,
) -> Result<BesselSequence, Error> {
    validate_request(order, n)?;
    let mut values = vec![CZERO; n];
    let (underflow_count, accuracy) = bessel_i_into(order, z, scaling, &mut values)?;
    Ok(BesselSequence {
        values,
        underflow_count,
        accuracy,
    })
}

/// `K(ν + k, z)` for `k = 0..n`, ν ≥ 0.
#[cfg(feature = "alloc")]
pub fn bessel_k_seq(
    order: f64,
    z: Complex64,
    n: usize,
    scaling: Scaling,
) -> Result<BesselSequence, Error> {
    validate_request(order, n)?;
    let mut values = vec![CZERO; n];
    let (underflow_count, accuracy) = bessel_k_into(order, z, scaling, &mut values)?;
    Ok(BesselSequence {
        values,
        underflow_count,
        accuracy,
    })
}
