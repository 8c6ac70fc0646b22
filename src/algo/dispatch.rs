//! Region selection for I(ν, z) with Re z ≥ 0.
//!
//! ```text
//!  |z| ≤ 2 or |z|²/4 ≤ ν+1        power series
//!  |z| ≥ rl, ν ≤ 1 or 2|z| ≥ ν²   large-argument expansion
//!  |z| < rl, ν ≤ 1                Miller
//!  otherwise                      magnitude screen, then
//!     ν > fnul or |z| > fnul      large-order expansion (lifted if needed)
//!     |z| > rl                    Wronskian normalisation
//!     else                        Miller
//! ```
//!
//! Evaluators that cannot finish hand over to the next applicable one; only
//! a fault from the last candidate is returned.

use num_complex::Complex64;
use tracing::debug;

use super::asymptotic::i_large_argument;
use super::bridge::i_lifted_order;
use super::debye::Family;
use super::miller::i_miller;
use super::overflow::screen_sequence;
use super::series::{i_power_series, SeriesOutcome};
use super::wronskian::i_wronskian;
use super::EvalContext;
use crate::complex::{modulus, CZERO};
use crate::error::Fault;

/// Whether the power series is the method of choice for top order `dfnu`.
#[inline]
pub(crate) fn series_applies(az: f64, dfnu: f64) -> bool {
    az <= 2.0 || az * az * 0.25 <= dfnu + 1.0
}

/// Fills `y` with `I(fnu + k, z)` for Re z ≥ 0 and returns the number of
/// trailing entries set to zero by underflow.
pub(crate) fn i_right_half(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    y: &mut [Complex64],
) -> Result<usize, Fault> {
    let wp = &ctx.wp;
    let n = y.len();
    y.fill(CZERO);
    let az = modulus(z);
    let mut nz = 0usize;
    let mut nn = n;

    if series_applies(az, fnu + (n - 1) as f64) {
        match i_power_series(ctx, z, fnu, y) {
            SeriesOutcome::Done(zeros) => return Ok(zeros),
            SeriesOutcome::Unfinished(zeros) => {
                nz += zeros;
                nn -= zeros;
                if nn == 0 {
                    return Ok(nz);
                }
                debug!(
                    fnu,
                    remaining = nn,
                    "power series underflowed at the top, re-routing the rest"
                );
            }
        }
    }

    let dfnu = fnu + (nn - 1) as f64;
    if az >= wp.rl {
        if dfnu <= 1.0 || az + az >= dfnu * dfnu {
            match i_large_argument(ctx, z, fnu, &mut y[..nn]) {
                Ok(()) => return Ok(nz),
                Err(Fault::NoConvergence) => {
                    debug!(
                        az,
                        fnu,
                        "large-argument expansion did not converge, falling back to recurrence"
                    );
                    recur_and_normalise(ctx, z, fnu, &mut y[..nn])?;
                    return Ok(nz);
                }
                Err(fault) => return Err(fault),
            }
        }
    } else if dfnu <= 1.0 {
        recur_and_normalise(ctx, z, fnu, &mut y[..nn])?;
        return Ok(nz);
    }

    let nuf = screen_sequence(ctx, z, fnu, Family::I, &mut y[..nn])?;
    nz += nuf;
    nn -= nuf;
    if nn == 0 {
        return Ok(nz);
    }

    let dfnu = fnu + (nn - 1) as f64;
    if dfnu > wp.fnul || az > wp.fnul {
        let lift = ((wp.fnul - dfnu) as i64 + 1).max(0) as usize;
        let out = i_lifted_order(ctx, z, fnu, lift, &mut y[..nn])?;
        nz += out.underflow;
        if out.unfinished == 0 {
            return Ok(nz);
        }
        nn = out.unfinished;
    }

    if az > wp.rl {
        // Normalising by K needs K(fnu) and K(fnu+1) on scale.
        let mut scratch = [CZERO; 2];
        match screen_sequence(ctx, z, fnu, Family::K, &mut scratch) {
            Err(Fault::Overflow) => {
                y[..nn].fill(CZERO);
                return Ok(nz + nn);
            }
            Err(fault) => return Err(fault),
            Ok(0) => {}
            Ok(_) => return Err(Fault::Overflow),
        }
        match i_wronskian(ctx, z, fnu, &mut y[..nn]) {
            Ok(()) => return Ok(nz),
            Err(Fault::NoConvergence) => {
                debug!(az, fnu, "ratio recurrence did not converge, trying Miller");
            }
            Err(fault) => return Err(fault),
        }
        i_miller(ctx, z, fnu, &mut y[..nn])?;
        return Ok(nz);
    }

    recur_and_normalise(ctx, z, fnu, &mut y[..nn])?;
    Ok(nz)
}

/// Miller's method, falling back to the Wronskian normalisation when its
/// start-index search runs out.
fn recur_and_normalise(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    y: &mut [Complex64],
) -> Result<(), Fault> {
    match i_miller(ctx, z, fnu, y) {
        Err(Fault::NoConvergence) => {
            debug!(fnu, "Miller recurrence did not converge, normalising by the Wronskian");
            i_wronskian(ctx, z, fnu, y)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scaling;

    fn close(a: Complex64, b: Complex64, rel: f64) -> bool {
        (a - b).norm() <= rel * b.norm()
    }

    fn eval(z: Complex64, fnu: f64, n: usize, scaling: Scaling) -> (usize, Vec<Complex64>) {
        let mut y = vec![CZERO; n];
        let nz = i_right_half(&EvalContext::new(scaling), z, fnu, &mut y).unwrap();
        (nz, y)
    }

    #[test]
    fn series_region() {
        let (nz, y) = eval(Complex64::new(0.4, 0.1), 0.0, 1, Scaling::Unscaled);
        assert_eq!(nz, 0);
        assert!(close(y[0], Complex64::new(1.0377517751879539, 0.020377126774808105), 1e-15));
        let (_, y) = eval(Complex64::new(1.0, 1.0), 100.5, 1, Scaling::Unscaled);
        assert!(close(
            y[0],
            Complex64::new(-7.350873036709917e-175, -3.08734244966349e-175),
            1e-13
        ));
    }

    #[test]
    fn miller_region() {
        let (_, y) = eval(Complex64::new(5.0, 0.0), 0.0, 1, Scaling::Unscaled);
        assert!(close(y[0], Complex64::new(27.239871823604447, 0.0), 1e-14));
        let (_, y) = eval(Complex64::new(10.0, 3.0), 10.0, 2, Scaling::Unscaled);
        assert!(close(y[0], Complex64::new(-17.141365813846217, -24.073342332547008), 1e-13));
        assert!(close(y[1], Complex64::new(-4.7498232489901111, -11.102489998344108), 1e-13));
    }

    #[test]
    fn large_argument_region_scaled() {
        let (_, y) = eval(Complex64::new(333.0, -876.0), 0.0, 1, Scaling::Exponential);
        assert!(close(y[0], Complex64::new(-0.0058155414800049568, -0.011662881061601967), 1e-13));
    }

    #[test]
    fn wronskian_region() {
        let (_, y) = eval(Complex64::new(25.0, 5.0), 30.0, 1, Scaling::Unscaled);
        assert!(close(y[0], Complex64::new(82.529633772359130, 522.44522935867359), 1e-13));
    }

    #[test]
    fn lifted_large_order_region() {
        let (_, y) = eval(Complex64::new(90.0, 10.0), 50.0, 1, Scaling::Unscaled);
        assert!(close(y[0], Complex64::new(2.7044377392292486e31, -6.6472930495482291e31), 1e-12));
    }

    #[test]
    fn orders_far_above_the_argument_underflow() {
        let (nz, y) = eval(Complex64::new(3.0, 0.0), 300.0, 3, Scaling::Unscaled);
        assert_eq!(nz, 3);
        assert!(y.iter().all(|v| *v == CZERO));
    }
}
