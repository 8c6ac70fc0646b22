//! Hankel functions H⁽¹⁾(ν, z) and H⁽²⁾(ν, z).
//!
//! With `m = ±1` for the first and second kind,
//!
//! ```text
//! H(ν, z) = (2/(iπm)) e^{-iπmν/2} K(ν, zn),   zn = -imz
//! ```
//!
//! so every evaluation is a K evaluation at the rotated argument, continued to
//! the left half plane when `zn` lands there.

#[cfg(feature = "alloc")]
use alloc::vec;

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use crate::algo::constants::HALF_PI;
use crate::algo::continuation::k_left_half;
use crate::algo::debye::Family;
use crate::algo::kfunc::k_right_half;
use crate::algo::large_order_k::k_large_order;
use crate::algo::overflow::screen_sequence;
use crate::algo::scale::rotate_guarded;
use crate::algo::EvalContext;
use crate::complex::{modulus, sin_cos_pi, times_i, times_neg_i, CZERO};
use crate::error::Error;
use crate::modified::{validate_order, validate_request};
#[cfg(feature = "alloc")]
use crate::types::BesselSequence;
use crate::types::{Accuracy, BesselOutput, HankelKind, Scaling};

/// `H(order + k, z)` into `out`, returning the count of leading zeros.
fn fill_h(
    ctx: &EvalContext,
    kind: HankelKind,
    order: f64,
    z: Complex64,
    out: &mut [Complex64],
) -> Result<(usize, Accuracy), Error> {
    validate_request(order, out.len())?;
    let wp = &ctx.wp;
    let n = out.len();

    if z == CZERO {
        out.fill(Complex64::new(f64::INFINITY, f64::INFINITY));
        return Ok((0, Accuracy::Normal));
    }

    let fmm = kind.sign();
    let second = kind == HankelKind::Second;
    let mut zn = Complex64::new(fmm * z.im, -fmm * z.re);
    let az = modulus(z);
    let top = order + (n - 1) as f64;
    let accuracy = ctx.check_range(az, top)?;
    if az < wp.ufl {
        return Err(Error::Overflow);
    }

    // The negative imaginary axis belongs to the continuation for H⁽²⁾.
    let across_cut = zn.re < 0.0 || (zn.re == 0.0 && zn.im < 0.0 && second);
    let mr = if across_cut { -(fmm as i32) } else { 0 };

    let nz = if order > wp.fnul {
        if across_cut && zn.re == 0.0 {
            zn = -zn;
        }
        k_large_order(ctx, zn, order, mr, out)?
    } else {
        if top > 2.0 {
            let nuf = screen_sequence(ctx, zn, order, Family::K, out)?;
            if nuf == n {
                return if zn.re < 0.0 {
                    Err(Error::Overflow)
                } else {
                    Ok((n, accuracy))
                };
            }
        } else if top > 1.0 && az <= wp.tol && -top * (0.5 * az).ln() > wp.elim {
            return Err(Error::Overflow);
        }
        if across_cut {
            k_left_half(ctx, zn, order, mr, out)?
        } else {
            k_right_half(ctx, zn, order, out)?
        }
    };

    // (2/(iπm)) e^{-iπmν/2}, exact for integer ν, then one factor of -im
    // per order.
    let sgn = -fmm * HALF_PI;
    let (s, c) = sin_cos_pi(0.5 * order);
    let mut csgn = times_i(Complex64::new(c, -fmm * s)) * (1.0 / sgn);
    for v in out.iter_mut() {
        *v = rotate_guarded(*v, csgn, wp.ascle, wp.tol);
        csgn = if second { times_i(csgn) } else { times_neg_i(csgn) };
    }
    Ok((nz, accuracy))
}

/// Hankel function of either kind for any real ν.
///
/// Negative orders use `H⁽¹⁾(-ν) = e^{iπν} H⁽¹⁾(ν)` and
/// `H⁽²⁾(-ν) = e^{-iπν} H⁽²⁾(ν)`. With [`Scaling::Exponential`] the result is
/// `e^{-iz} H⁽¹⁾(ν, z)` or `e^{iz} H⁽²⁾(ν, z)`. At z = 0 the value is the
/// complex infinity `(+∞, +∞)`.
///
/// # Errors
/// `Overflow` when |z| is too small for the order or the unscaled value is
/// out of range, `TotalPrecisionLoss` when |z| or ν exceeds the
/// argument-reduction range, `NoConvergence` if every applicable algorithm
/// fails.
pub fn hankel(
    kind: HankelKind,
    order: f64,
    z: Complex64,
    scaling: Scaling,
) -> Result<BesselOutput, Error> {
    validate_order(order)?;
    let ctx = EvalContext::new(scaling);
    let nu = order.abs();
    let mut h = [CZERO];
    let (nz, accuracy) = fill_h(&ctx, kind, nu, z, &mut h)?;
    let mut value = h[0];
    if order < 0.0 && z != CZERO {
        let (s, c) = sin_cos_pi(nu);
        value *= Complex64::new(c, kind.sign() * s);
    }
    Ok(BesselOutput {
        value,
        underflow_count: nz,
        accuracy: accuracy.report("hankel", order, z),
    })
}

/// H⁽¹⁾(ν, z) = J(ν, z) + i Y(ν, z).
///
/// # Example
/// ```
/// use num_complex::Complex64;
/// use zbessel::{hankel1, Scaling};
///
/// let h = hankel1(0.0, Complex64::new(1.0, 0.0), Scaling::Unscaled).unwrap();
/// assert!((h.value.re - 0.7651976865579666).abs() < 1e-15);
/// assert!((h.value.im - 0.0882569642156770).abs() < 1e-15);
/// ```
pub fn hankel1(order: f64, z: Complex64, scaling: Scaling) -> Result<BesselOutput, Error> {
    hankel(HankelKind::First, order, z, scaling)
}

/// H⁽²⁾(ν, z) = J(ν, z) - i Y(ν, z).
pub fn hankel2(order: f64, z: Complex64, scaling: Scaling) -> Result<BesselOutput, Error> {
    hankel(HankelKind::Second, order, z, scaling)
}

/// `H(ν + k, z)` for `k = 0..out.len()`, ν ≥ 0.
///
/// Returns the number of leading entries set to zero by underflow and the
/// accuracy status.
pub fn hankel_into(
    kind: HankelKind,
    order: f64,
    z: Complex64,
    scaling: Scaling,
    out: &mut [Complex64],
) -> Result<(usize, Accuracy), Error> {
    let (nz, accuracy) = fill_h(&EvalContext::new(scaling), kind, order, z, out)?;
    Ok((nz, accuracy.report("hankel", order, z)))
}

/// `H(ν + k, z)` for `k = 0..n`, ν ≥ 0.
#[cfg(feature = "alloc")]
pub fn hankel_seq(
    kind: HankelKind,
    order: f64,
    z: Complex64,
    n: usize,
    scaling: Scaling,
) -> Result<BesselSequence, Error> {
    validate_request(order, n)?;
    let mut values = vec![CZERO; n];
    let (underflow_count, accuracy) = hankel_into(kind, order, z, scaling, &mut values)?;
    Ok(BesselSequence {
        values,
        underflow_count,
        accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex64, b: Complex64, rel: f64) -> bool {
        (a - b).norm() <= rel * b.norm()
    }

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn h1(order: f64, z: Complex64) -> Complex64 {
        hankel1(order, z, Scaling::Unscaled).unwrap().value
    }

    fn h2(order: f64, z: Complex64) -> Complex64 {
        hankel2(order, z, Scaling::Unscaled).unwrap().value
    }

    #[test]
    fn first_and_second_kind() {
        let z = c(1.0, 2.0);
        assert!(close(h1(0.0, c(1.0, 0.0)), c(0.76519768655796655, 0.088256964215676958), 1e-15));
        assert!(close(h1(0.0, z), c(0.064752873256923465, -0.024183735515538053), 1e-14));
        assert!(close(h2(0.0, z), c(3.1077660271478191, -2.7590211691391338), 1e-14));
        assert!(close(h1(0.5, z), c(0.031177059380826259, -0.065134823683394068), 1e-14));
        assert!(close(h2(0.5, z), c(3.9420498867030174, 0.067896569354257061), 1e-14));
        assert!(close(h1(2.3, z), c(-0.15245073414985793, 0.077423700018321979), 1e-14));
        assert!(close(h2(2.3, z), c(-0.61792670969876982, 0.85981144160265428), 1e-14));
    }

    #[test]
    fn negative_orders_pick_up_a_phase() {
        let z = c(1.0, 2.0);
        assert!(close(h1(-2.3, z), c(-0.15224538231665744, -0.077826725683485991), 1e-14));
        assert!(close(h2(-2.3, z), c(0.33239386125602021, 1.0052976945508708), 1e-14));
        assert!(close(h1(-3.0, z), c(0.068920896366510131, -0.30732835624293601), 1e-14));
        assert!(close(h2(-3.0, z), c(0.49315843732502568, 0.27297823223615554), 1e-14));
    }

    #[test]
    fn continuation_across_the_cut() {
        assert!(close(h1(0.3, c(-2.0, -3.0)), c(-4.7644252253212013, -7.1398768671256361), 1e-13));
        assert!(close(
            h2(0.3, c(-2.0, -3.0)),
            c(-0.0077504594254961646, -0.019046039233285480),
            1e-12
        ));
        assert!(close(
            h1(0.3, c(-2.0, 3.0)),
            c(-0.0077504594254961646, 0.019046039233285480),
            1e-12
        ));
        assert!(close(h2(0.3, c(-2.0, 3.0)), c(-4.7644252253212013, 7.1398768671256361), 1e-13));
    }

    #[test]
    fn continuation_with_negative_sine() {
        assert!(close(h1(1.5, c(-1.0, -2.0)), c(-2.3788092458926618, 0.74767203572804923), 1e-13));
        assert!(close(h2(1.3, c(-1.0, 2.0)), c(-2.7716192758038568, 0.19074717653480893), 1e-13));
    }

    #[test]
    fn tiny_arguments() {
        assert!(close(h1(0.0, c(1.0e-19, 0.0)), c(1.0, -27.925357052526941), 1e-14));
        assert!(close(h1(1.0, c(1.0e-19, 0.0)), c(5.0e-20, -6.3661977236758134e18), 1e-14));
        assert!(close(
            h1(0.5, c(0.0, 1.0e-19)),
            c(-1784124116.1527711, -1784124116.1527711),
            1e-14
        ));
    }

    #[test]
    fn scaled_forms() {
        let z = c(3.0, -1.0);
        let s1 = hankel1(1.0, z, Scaling::Exponential).unwrap().value;
        let s2 = hankel2(1.0, z, Scaling::Exponential).unwrap().value;
        assert!(close(s1, c(-0.21289152210092580, -0.38498796117068231), 1e-14));
        assert!(close(s2, c(-0.35266044106753118, 0.31209320370997208), 1e-14));
        assert!(close(s1, h1(1.0, z) * (-Complex64::i() * z).exp(), 1e-14));
    }

    #[test]
    fn large_orders() {
        let mut out = [CZERO; 2];
        hankel_into(HankelKind::First, 100.0, c(30.0, 20.0), Scaling::Unscaled, &mut out).unwrap();
        assert!(close(out[0], c(1.870136150422927e30, -1.7567351677969420e30), 1e-12));
        assert!(close(out[1], c(2.757630627839462e30, -1.3799093842888691e31), 1e-12));
        hankel_into(HankelKind::Second, 90.0, c(50.0, -3.0), Scaling::Unscaled, &mut out).unwrap();
        assert!(close(out[0], c(9893277163601.6775, -2442921660960.5756), 1e-12));
        assert!(close(out[1], c(33026977403790.856, -5661118572491.5746), 1e-12));
    }

    #[test]
    fn origin_is_complex_infinity() {
        let inf = c(f64::INFINITY, f64::INFINITY);
        assert_eq!(h1(0.0, CZERO), inf);
        assert_eq!(h2(-1.5, CZERO), inf);
        assert_eq!(hankel1(0.0, c(1.0e-310, 0.0), Scaling::Unscaled), Err(Error::Overflow));
    }
}
