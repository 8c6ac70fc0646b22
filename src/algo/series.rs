//! Power series for I(ν, z) at small |z| relative to the order.
//!
//! `I(ν,z) = (z/2)^ν Σ (z²/4)^k / (k! Γ(ν+k+1))`, summed directly for the two
//! highest orders of the request and carried down by the backward recurrence
//! `I(ν-1) = (2ν/z) I(ν) + I(ν+1)`.

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use super::gamma::ln_gamma;
use super::scale::underflows_on_unscale;
use super::EvalContext;
use crate::complex::{modulus, quotient, two_over, CONE, CZERO};

/// How far the series got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SeriesOutcome {
    /// Every entry was filled; the count is the number of trailing zeros.
    Done(usize),
    /// The top `n` entries underflowed while |z²/4| exceeds the order of the
    /// next one, so the series is no longer the right tool for the rest; the
    /// caller evaluates `y[..len - n]` some other way.
    Unfinished(usize),
}

/// Fills `y` with `I(fnu + k, z)`, exponentially scaled by `exp(-|Re z|)`
/// when the context asks for it.
pub(crate) fn i_power_series(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    y: &mut [Complex64],
) -> SeriesOutcome {
    let wp = &ctx.wp;
    let n = y.len();
    let az = modulus(z);
    let arm = 1.0e3 * wp.tiny;

    if az < arm {
        // At the origin only I(0, 0) = 1 survives.
        y.fill(CZERO);
        if fnu == 0.0 {
            y[0] = CONE;
            return SeriesOutcome::Done(n - 1);
        }
        return SeriesOutcome::Done(n);
    }

    let hz = 0.5 * z;
    let cz = if az > arm.sqrt() { hz * hz } else { CZERO };
    let acz = modulus(cz);
    let ln_hz = hz.ln();

    let mut zeroed = 0usize;
    let mut nn = n;
    let mut guarded = false;
    let mut unscale = 1.0;
    let mut ascle = 0.0;

    'restart: loop {
        let top = fnu + (nn - 1) as f64;
        // ln of the leading term (z/2)^ν / Γ(ν+1) of the highest order.
        let mut lead = ln_hz * top;
        lead.re -= ln_gamma(top + 1.0);
        if ctx.scaled() {
            lead.re -= z.re;
        }

        if lead.re <= -wp.elim {
            zeroed += 1;
            y[nn - 1] = CZERO;
            if acz > top {
                return SeriesOutcome::Unfinished(zeroed);
            }
            nn -= 1;
            if nn == 0 {
                return SeriesOutcome::Done(zeroed);
            }
            continue 'restart;
        }

        if lead.re <= -wp.alim {
            guarded = true;
            unscale = wp.tol;
            ascle = arm / wp.tol;
        }
        let boost = if guarded { 1.0 / wp.tol } else { 1.0 };

        let mut coef = lead.exp() * boost;
        let atol = wp.tol * acz / (top + 1.0);

        // The two highest orders, summed directly.
        let mut w = [CZERO; 2];
        let direct = nn.min(2);
        for (i, slot) in w.iter_mut().enumerate().take(direct) {
            let dfnu = fnu + (nn - 1 - i) as f64;
            let fnup = dfnu + 1.0;
            let mut sum = CONE;
            if acz >= wp.tol * fnup {
                let mut term = CONE;
                let mut denom = fnup;
                let mut step = fnup + 2.0;
                let mut bound = 2.0;
                loop {
                    let rs = 1.0 / denom;
                    term = term * cz * rs;
                    sum += term;
                    denom += step;
                    step += 2.0;
                    bound *= acz * rs;
                    if bound <= atol {
                        break;
                    }
                }
            }
            let value = sum * coef;
            *slot = value;
            if guarded && underflows_on_unscale(value, ascle, wp.tol) {
                zeroed += 1;
                y[nn - 1] = CZERO;
                if acz > dfnu {
                    return SeriesOutcome::Unfinished(zeroed);
                }
                nn -= 1;
                if nn == 0 {
                    return SeriesOutcome::Done(zeroed);
                }
                continue 'restart;
            }
            y[nn - 1 - i] = value * unscale;
            if i + 1 < direct {
                coef = quotient(coef, hz) * dfnu;
            }
        }

        if nn <= 2 {
            return SeriesOutcome::Done(zeroed);
        }

        let rz = two_over(z);
        let mut k = nn - 2;
        let mut ak = (nn - 2) as f64;
        if guarded {
            // Recur on the scaled values until they are back above the
            // underflow threshold, then continue unscaled.
            let mut s1 = w[0];
            let mut s2 = w[1];
            loop {
                let ck = s2;
                s2 = s1 + (ak + fnu) * (rz * ck);
                s1 = ck;
                let value = s2 * unscale;
                k -= 1;
                y[k] = value;
                ak -= 1.0;
                if k == 0 {
                    return SeriesOutcome::Done(zeroed);
                }
                if modulus(value) > ascle {
                    break;
                }
            }
        }
        while k > 0 {
            k -= 1;
            y[k] = (ak + fnu) * (rz * y[k + 1]) + y[k + 2];
            ak -= 1.0;
        }
        return SeriesOutcome::Done(zeroed);
    }
}
