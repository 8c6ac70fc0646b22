//! Magnitude screening for the I and K sequences before evaluation.
//!
//! The leading exponential of the uniform expansions, `ζ₂ - ζ₁` for I and
//! its negative for K, estimates `ln |I(ν, z)|` to within a few units. That
//! is enough to tell an overflowing request apart from one that will
//! underflow, and to trim the high orders of an I sequence that underflow.

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use super::constants::AIRY_LOG_OFFSET;
use super::debye::{DebyeExpansion, Family};
use super::turning::TurningPointExpansion;
use super::EvalContext;
use crate::complex::{modulus, CZERO};
use crate::error::Fault;

/// Above this `|Im z| / |Re z|` the turning-point form is the accurate one.
pub(crate) const TURNING_SLOPE: f64 = 1.7321;

/// Leading exponent of one uniform expansion.
struct Exponent {
    cz: Complex64,
    phi: Complex64,
    /// Airy argument, present for the turning-point form.
    arg: Option<Complex64>,
}

impl Exponent {
    /// `ln |value|` including the amplitude factors.
    fn log_magnitude(&self) -> f64 {
        let mut rcz = self.cz.re + modulus(self.phi).ln();
        if let Some(arg) = self.arg {
            rcz -= 0.25 * modulus(arg).ln() + AIRY_LOG_OFFSET;
        }
        rcz
    }

    /// Whether a value of log-magnitude `rcz` near the underflow limit loses
    /// its phase once rescaled.
    fn underflows(&self, ctx: &EvalContext, rcz: f64) -> bool {
        let mut phase = self.cz.im + self.phi.arg();
        if let Some(arg) = self.arg {
            phase -= 0.25 * arg.arg();
        }
        let v = Complex64::from_polar(rcz.exp() / ctx.wp.tol, phase);
        ctx.ladder.underflows(v)
    }
}

/// Chooses between the Debye and turning-point forms for `z`.
struct Screen {
    zr: Complex64,
    /// Argument rotated into the turning-point region, when that form is used.
    zn: Option<Complex64>,
}

impl Screen {
    fn new(z: Complex64) -> Self {
        let zr = if z.re >= 0.0 { z } else { -z };
        let zn = (z.im.abs() > z.re.abs() * TURNING_SLOPE).then(|| {
            let re = if z.im > 0.0 { zr.im } else { -zr.im };
            Complex64::new(re, -zr.re)
        });
        Screen { zr, zn }
    }

    fn exponent(&self, ctx: &EvalContext, gnu: f64, family: Family) -> Exponent {
        let wp = &ctx.wp;
        let mut e = match self.zn {
            None => {
                let d = DebyeExpansion::leading(self.zr, gnu, wp.tiny);
                Exponent {
                    cz: d.zeta2 - d.zeta1,
                    phi: d.phi(family),
                    arg: None,
                }
            }
            Some(zn) => {
                let t = TurningPointExpansion::leading(zn, gnu, wp.tiny, wp.tol);
                Exponent {
                    cz: t.zeta2 - t.zeta1,
                    phi: t.phi,
                    arg: Some(t.arg),
                }
            }
        };
        if ctx.scaled() {
            e.cz -= self.zr;
        }
        if family == Family::K {
            e.cz = -e.cz;
        }
        e
    }
}

/// Screens `I(fnu + k, z)` or `K(fnu + k, z)`, k < `y.len()`, for
/// exponent-range trouble.
///
/// Returns `Err(Overflow)` when the first order overflows. Otherwise returns
/// the number of entries known to underflow: all of them when the first
/// member underflows, else (for I only) the run of highest orders that do,
/// which are set to zero at the end of `y`.
pub(crate) fn screen_sequence(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    family: Family,
    y: &mut [Complex64],
) -> Result<usize, Fault> {
    let wp = &ctx.wp;
    let n = y.len();
    let screen = Screen::new(z);

    let gnu = match family {
        Family::I => fnu.max(1.0),
        Family::K => (fnu + n as f64 - 1.0).max(n as f64),
    };
    let e = screen.exponent(ctx, gnu, family);
    let rcz = e.cz.re;
    if rcz > wp.elim {
        return Err(Fault::Overflow);
    }
    if rcz >= wp.alim {
        if e.log_magnitude() > wp.elim {
            return Err(Fault::Overflow);
        }
    } else if rcz < -wp.elim {
        y.fill(CZERO);
        return Ok(n);
    } else if rcz <= -wp.alim {
        let rcz = e.log_magnitude();
        if rcz <= -wp.elim || e.underflows(ctx, rcz) {
            y.fill(CZERO);
            return Ok(n);
        }
    }

    if family == Family::K || n == 1 {
        return Ok(0);
    }

    // Trim the top of the I sequence.
    let mut nn = n;
    while nn > 0 {
        let e = screen.exponent(ctx, fnu + (nn - 1) as f64, Family::I);
        let rcz = e.cz.re;
        let gone = if rcz < -wp.elim {
            true
        } else if rcz > -wp.alim {
            false
        } else {
            let rcz = e.log_magnitude();
            rcz <= -wp.elim || e.underflows(ctx, rcz)
        };
        if !gone {
            break;
        }
        y[nn - 1] = CZERO;
        nn -= 1;
    }
    Ok(n - nn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scaling;

    fn ctx() -> EvalContext {
        EvalContext::new(Scaling::Unscaled)
    }

    #[test]
    fn modest_arguments_pass_untouched() {
        let mut y = [Complex64::new(1.0, 0.0); 3];
        let z = Complex64::new(3.0, 1.0);
        let nuf = screen_sequence(&ctx(), z, 2.0, Family::I, &mut y).unwrap();
        assert_eq!(nuf, 0);
        assert_eq!(y[2], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn huge_real_argument_overflows_i() {
        let mut y = [CZERO];
        assert_eq!(
            screen_sequence(&ctx(), Complex64::new(750.0, 0.0), 1.0, Family::I, &mut y),
            Err(Fault::Overflow)
        );
    }

    #[test]
    fn small_argument_overflows_k_of_high_order() {
        // K(200, 0.5) ~ Γ(200)/2 (4)^200 is far beyond the double range.
        let mut y = [CZERO];
        assert_eq!(
            screen_sequence(&ctx(), Complex64::new(0.5, 0.0), 200.0, Family::K, &mut y),
            Err(Fault::Overflow)
        );
    }

    #[test]
    fn high_orders_of_i_are_trimmed() {
        // I(ν, 1) drops below 1e-308 once ν is around 145.
        let mut y = [Complex64::new(1.0, 0.0); 60];
        let z = Complex64::new(1.0, 0.0);
        let nuf = screen_sequence(&ctx(), z, 100.0, Family::I, &mut y).unwrap();
        assert!(nuf > 0 && nuf < 60);
        assert!(y[60 - nuf..].iter().all(|v| *v == CZERO));
        assert_eq!(y[0], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn whole_i_sequence_underflows() {
        let mut y = [Complex64::new(1.0, 0.0); 2];
        let z = Complex64::new(1e-3, 1e-3);
        let nuf = screen_sequence(&ctx(), z, 150.0, Family::I, &mut y).unwrap();
        assert_eq!(nuf, 2);
        assert_eq!(y, [CZERO, CZERO]);
    }
}
