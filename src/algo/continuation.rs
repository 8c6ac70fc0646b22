//! K(ν, z) in the left half plane by analytic continuation:
//!
//! `K(ν, zn e^{iπm}) = e^{-iπmν} K(ν, zn) - iπm I(ν, zn)`, m = ±1,
//!
//! with `zn = -z` in the right half plane. With exponential scaling the K
//! term carries `e^{zn}` and the I term `e^{-Re zn}`; the K term is brought
//! to the I scaling before the two are added.

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;
use tracing::debug;

use super::asymptotic::i_large_argument;
use super::constants::PI;
use super::dispatch::{i_right_half, series_applies};
use super::kfunc::k_right_half;
use super::miller::i_miller;
use super::scale::{align_continuation_terms, ScaledPair};
use super::series::i_power_series;
use super::EvalContext;
use crate::complex::{cis, modulus, sin_cos_pi, two_over, CZERO};
use crate::error::Fault;

/// Run of converted K terms after which the recurrence is carried in the I
/// scaling directly.
const CONVERTED_RUN: u32 = 3;

/// `e^{-iπmν}` and `-iπm`, the latter times `e^{-i Im zn}` when scaled.
fn phases(ctx: &EvalContext, zn: Complex64, fnu: f64, mr: i32) -> (Complex64, Complex64) {
    let sgn = -PI.copysign(f64::from(mr));
    let mut csgn = Complex64::new(0.0, sgn);
    if ctx.scaled() {
        csgn *= cis(-zn.im);
    }
    let (s, c) = sin_cos_pi(fnu);
    let cspn = Complex64::new(c, -s * f64::from(mr));
    (cspn, csgn)
}

/// Fills `y` with `K(fnu + k, z)` for Re z < 0, continuing across the cut
/// in the direction `mr` (+1 for Im z ≥ 0, -1 below).
///
/// Returns the number of entries whose scaled terms underflowed.
pub(crate) fn k_left_half(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    mr: i32,
    y: &mut [Complex64],
) -> Result<usize, Fault> {
    let wp = &ctx.wp;
    let ladder = &ctx.ladder;
    let n = y.len();
    let zn = -z;

    i_right_half(ctx, zn, fnu, y)?;
    let nn = n.min(2);
    let mut kb = [CZERO; 2];
    if k_right_half(ctx, zn, fnu, &mut kb[..nn])? != 0 {
        return Err(Fault::Overflow);
    }

    let (mut cspn, csgn) = phases(ctx, zn, fnu, mr);
    let ascle = ladder.ascle();
    let mut nz = 0usize;
    let mut rescaled = 0u32;
    // K terms of the last two orders in the I scaling.
    let mut aligned = [CZERO; 2];

    for i in 0..nn {
        let (mut c1, mut c2) = (kb[i], y[i]);
        if ctx.scaled() {
            let t = align_continuation_terms(zn, c1, c2, ascle, wp.alim, &mut rescaled);
            nz += usize::from(t.underflow);
            c1 = t.k_term;
            c2 = t.i_term;
            aligned = [aligned[1], c1];
        }
        y[i] = cspn * c1 + csgn * c2;
        cspn = -cspn;
    }
    if n <= 2 {
        return Ok(nz);
    }

    let rz = two_over(zn);
    let mut ck = rz * (fnu + 1.0);
    let level = ladder.level_for(modulus(kb[1]));
    let mut pair = ScaledPair::new(kb[0] * ladder.apply(level), kb[1] * ladder.apply(level), level);
    let mut converted = false;

    for slot in y.iter_mut().skip(2) {
        let mut c1 = pair.advance(ladder, ck);
        let mut c2 = *slot;
        if ctx.scaled() && !converted {
            let t = align_continuation_terms(zn, c1, c2, ascle, wp.alim, &mut rescaled);
            nz += usize::from(t.underflow);
            c1 = t.k_term;
            c2 = t.i_term;
            aligned = [aligned[1], c1];
            if rescaled == CONVERTED_RUN {
                converted = true;
                let f = ladder.apply(pair.level);
                pair.s1 = aligned[0] * f;
                pair.s2 = aligned[1] * f;
            }
        }
        *slot = cspn * c1 + csgn * c2;
        ck += rz;
        cspn = -cspn;
    }
    Ok(nz)
}

/// K(fnu, z) for Re z < 0 and a small order, as needed by the Airy
/// functions. The I term is evaluated without the large-order machinery.
///
/// Returns the value and whether its scaled terms underflowed.
pub(crate) fn k_left_half_small_order(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    mr: i32,
) -> Result<(Complex64, bool), Fault> {
    let wp = &ctx.wp;
    let zn = -z;
    let az = modulus(z);

    let mut ib = [CZERO];
    if series_applies(az, fnu) {
        i_power_series(ctx, zn, fnu, &mut ib);
    } else if az >= wp.rl {
        match i_large_argument(ctx, zn, fnu, &mut ib) {
            Err(Fault::NoConvergence) => {
                debug!(az, fnu, "large-argument expansion did not converge, using Miller");
                i_miller(ctx, zn, fnu, &mut ib)?;
            }
            other => other?,
        }
    } else {
        i_miller(ctx, zn, fnu, &mut ib)?;
    }

    let mut kb = [CZERO];
    if k_right_half(ctx, zn, fnu, &mut kb)? != 0 {
        return Err(Fault::Overflow);
    }

    let (cspn, csgn) = phases(ctx, zn, fnu, mr);
    let (mut c1, mut c2) = (kb[0], ib[0]);
    let mut underflow = false;
    if ctx.scaled() {
        let mut rescaled = 0;
        let t = align_continuation_terms(zn, c1, c2, ctx.ladder.ascle(), wp.alim, &mut rescaled);
        c1 = t.k_term;
        c2 = t.i_term;
        underflow = t.underflow;
    }
    Ok((cspn * c1 + csgn * c2, underflow))
}
