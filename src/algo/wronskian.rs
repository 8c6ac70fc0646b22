//! I(ν, z) normalised by the Wronskian `I(ν)K(ν+1) + I(ν+1)K(ν) = 1/z`.
//!
//! The ratios `I(ν+k+1)/I(ν+k)` come from backward recurrence, which is
//! stable for them, and K(ν), K(ν+1) from [`super::kfunc`]. Used for Re z ≥ 0
//! when |z| exceeds `rl` but the order is too large for the large-argument
//! expansion.

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use super::kfunc::k_right_half;
use super::EvalContext;
use crate::complex::{modulus, quotient, two_over, CONE, CZERO};
use crate::error::Fault;

/// Ceiling on the start-index search, far above what any |z| routed here
/// needs.
const MAX_SEARCH: usize = 100_000;

/// Fills `r` with the ratios `I(fnu + k + 1, z) / I(fnu + k, z)`.
pub(crate) fn i_ratios(z: Complex64, fnu: f64, r: &mut [Complex64], tol: f64) -> Result<(), Fault> {
    let n = r.len();
    let az = modulus(z);
    let inu = fnu as usize;
    let idnu = inu + n - 1;
    let magz = az as usize;
    let fnup = ((magz + 1) as f64).max(idnu as f64);
    // Extra backward steps when the top order sits below |z|.
    let id = (magz + 1).saturating_sub(idnu);
    let rz = two_over(z);

    // Forward recurrence until the error bound is met, with a second,
    // refined bound once the growth rate is known.
    let mut t1 = rz * fnup;
    let mut p2 = -t1;
    let mut p1 = CONE;
    t1 += rz;
    let mut ap2 = modulus(p2);
    let ap1 = modulus(p1);
    let test1 = ((ap2 + ap2) / (ap1 * tol)).sqrt();
    let mut test = test1;
    let rap1 = 1.0 / ap1;
    p1 *= rap1;
    p2 *= rap1;
    ap2 *= rap1;

    let mut k = 1usize;
    let mut refined = false;
    loop {
        if k > MAX_SEARCH {
            return Err(Fault::NoConvergence);
        }
        k += 1;
        let ap1 = ap2;
        let pt = p2;
        p2 = p1 - t1 * pt;
        p1 = pt;
        t1 += rz;
        ap2 = modulus(p2);
        if ap1 <= test {
            continue;
        }
        if refined {
            break;
        }
        let ak = modulus(t1) * 0.5;
        let flam = ak + (ak * ak - 1.0).sqrt();
        let rho = (ap2 / ap1).min(flam);
        test = test1 * (rho / (rho * rho - 1.0)).sqrt();
        refined = true;
    }

    // Backward recurrence from the start index down to the top order.
    let kk = k + 1 + id;
    let dfnu = fnu + (n - 1) as f64;
    let mut p1 = Complex64::new(1.0 / ap2, 0.0);
    let mut p2 = CZERO;
    let mut step = kk as f64;
    for _ in 0..kk {
        let pt = p1;
        p1 = pt * (rz * (dfnu + step)) + p2;
        p2 = pt;
        step -= 1.0;
    }
    if p1 == CZERO {
        p1 = Complex64::new(tol, tol);
    }
    r[n - 1] = quotient(p2, p1);

    let cdfnu = rz * fnu;
    for k in (0..n - 1).rev() {
        let mut pt = cdfnu + rz * (k + 1) as f64 + r[k + 1];
        if pt == CZERO {
            pt = Complex64::new(tol, tol);
        }
        r[k] = quotient(CONE, pt);
    }
    Ok(())
}

/// Fills `y` with `I(fnu + k, z)` for Re z ≥ 0.
///
/// The caller has checked that K(fnu) and K(fnu+1) are on scale.
pub(crate) fn i_wronskian(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    y: &mut [Complex64],
) -> Result<(), Fault> {
    let wp = &ctx.wp;
    let ladder = &ctx.ladder;
    let mut kw = [CZERO; 2];
    if k_right_half(ctx, z, fnu, &mut kw)? != 0 {
        return Err(Fault::Overflow);
    }
    i_ratios(z, fnu, y, wp.tol)?;

    let mut cinu = if ctx.scaled() {
        Complex64::new(z.im.cos(), z.im.sin())
    } else {
        CONE
    };

    // K values near either end of the range are carried scaled.
    let level = ladder.level_for(modulus(kw[1]));
    let scale = ladder.apply(level);
    let c1 = kw[0] * scale;
    let c2 = kw[1] * scale;

    // 1/(z (r K(ν) + K(ν+1))) via conj/|.|² so |ct|² is never formed.
    let mut ratio = y[0];
    let ct = z * (ratio * c1 + c2);
    let ract = 1.0 / modulus(ct);
    cinu = (cinu * ract) * (ct.conj() * ract);
    y[0] = cinu * scale;
    for slot in y.iter_mut().skip(1) {
        cinu *= ratio;
        ratio = *slot;
        *slot = cinu * scale;
    }
    Ok(())
}
