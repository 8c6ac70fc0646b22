//! I(ν, z) for orders at or above `fnul` from the uniform expansions.
//!
//! For |arg z| ≤ π/3 the Debye expansion is used directly. Closer to the
//! imaginary axis, `I(ν, z) = e^{±iνπ/2} J(ν, ∓iz)` and J comes from the
//! turning-point expansion. The two highest orders are evaluated and the rest
//! follow by backward recurrence.

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use super::constants::{AIRY_LOG_OFFSET, HALF_PI, I_POWERS};
use super::debye::{DebyeExpansion, Family};
use super::overflow::{screen_sequence, TURNING_SLOPE};
use super::scale::{ScaleLevel, ScaledPair};
use super::turning::TurningPointExpansion;
use super::EvalContext;
use crate::airy::scaled_ai_pair;
use crate::complex::{modulus, two_over, CZERO};
use crate::error::Fault;

/// Result of a large-order evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LargeOrder {
    /// Entries at the top of the sequence set to zero.
    pub underflow: usize,
    /// When nonzero, the first `unfinished` entries fell below `fnul` after
    /// trimming and still have to be computed another way.
    pub unfinished: usize,
}

impl LargeOrder {
    fn finished(underflow: usize) -> Self {
        LargeOrder {
            underflow,
            unfinished: 0,
        }
    }
}

/// Which expansion covers `z`, with the data the rotated form needs.
#[derive(Debug, Clone, Copy)]
enum Sector {
    Debye,
    Rotated {
        /// `∓iz`, in the right half plane.
        zn: Complex64,
        /// `z` reflected into the upper half plane.
        zb: Complex64,
        /// e^{iπ(ν - ⌊ν⌋)/2}, the fractional part of the rotation phase.
        frac_phase: Complex64,
        /// `i` (lower half plane) or `-i` (upper): one step down in order.
        step: Complex64,
        upper: bool,
    },
}

impl Sector {
    fn new(z: Complex64, fnu: f64) -> Self {
        if z.im.abs() <= z.re.abs() * TURNING_SLOPE {
            return Sector::Debye;
        }
        let upper = z.im > 0.0;
        let inu = fnu.trunc();
        let ang = HALF_PI * (fnu - inu);
        let frac_phase = Complex64::new(ang.cos(), ang.sin());
        if upper {
            Sector::Rotated {
                zn: Complex64::new(z.im, -z.re),
                zb: z,
                frac_phase,
                step: Complex64::new(0.0, -1.0),
                upper,
            }
        } else {
            Sector::Rotated {
                zn: Complex64::new(-z.im, -z.re),
                zb: z.conj(),
                frac_phase,
                step: Complex64::new(0.0, 1.0),
                upper,
            }
        }
    }

    /// Rotation phase for the top order `fnu + nd - 1`.
    fn top_phase(&self, fnu: f64, nd: usize) -> Complex64 {
        match *self {
            Sector::Debye => Complex64::new(1.0, 0.0),
            Sector::Rotated {
                frac_phase, upper, ..
            } => {
                let k = (fnu.trunc() as usize + nd - 1) % 4;
                let c = frac_phase * I_POWERS[k];
                if upper {
                    c
                } else {
                    c.conj()
                }
            }
        }
    }
}

/// Exponent and amplitude of one order from the uniform expansion.
struct Term {
    exponent: Complex64,
    /// log of the amplitude factors outside `exponent`, for the refined
    /// magnitude test.
    log_amplitude: f64,
    amplitude: Complex64,
}

fn exponent_of(
    ctx: &EvalContext,
    zb: Complex64,
    zeta1: Complex64,
    zeta2: Complex64,
    gnu: f64,
) -> Complex64 {
    if !ctx.scaled() {
        return zeta2 - zeta1;
    }
    // ζ₂ - z = ν²/(z + ζ₂), formed without cancellation.
    let st = zb + zeta2;
    let rast = gnu / modulus(st);
    st.conj() * (rast * rast) - zeta1 + Complex64::new(0.0, zb.im)
}

fn term(ctx: &EvalContext, z: Complex64, sector: &Sector, gnu: f64, full: bool) -> Term {
    let wp = &ctx.wp;
    match *sector {
        Sector::Debye => {
            let d = if full {
                DebyeExpansion::new(z, gnu, wp.tiny, wp.tol)
            } else {
                DebyeExpansion::leading(z, gnu, wp.tiny)
            };
            let phi = d.phi(Family::I);
            Term {
                exponent: exponent_of(ctx, z, d.zeta1, d.zeta2, gnu),
                log_amplitude: modulus(phi).ln(),
                amplitude: phi * d.sum(Family::I),
            }
        }
        Sector::Rotated { zn, zb, .. } => {
            let t = if full {
                TurningPointExpansion::new(zn, gnu, wp.tiny, wp.tol)
            } else {
                TurningPointExpansion::leading(zn, gnu, wp.tiny, wp.tol)
            };
            let amplitude = if full {
                let (ai, dai) = scaled_ai_pair(t.arg);
                t.phi * (ai * t.asum + dai * t.bsum)
            } else {
                CZERO
            };
            Term {
                exponent: exponent_of(ctx, zb, t.zeta1, t.zeta2, gnu),
                log_amplitude: modulus(t.phi).ln() - 0.25 * modulus(t.arg).ln() - AIRY_LOG_OFFSET,
                amplitude,
            }
        }
    }
}

enum Next {
    Retry,
    Finish(LargeOrder),
}

/// Zeroes the current top order after it underflowed, trims further with the
/// magnitude screen and decides whether another pass is needed.
fn drop_top(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    rs1: f64,
    y: &mut [Complex64],
    nd: &mut usize,
    nz: &mut usize,
) -> Result<Next, Fault> {
    if rs1 > 0.0 {
        return Err(Fault::Overflow);
    }
    y[*nd - 1] = CZERO;
    *nz += 1;
    *nd -= 1;
    if *nd == 0 {
        return Ok(Next::Finish(LargeOrder::finished(*nz)));
    }
    let nuf = screen_sequence(ctx, z, fnu, Family::I, &mut y[..*nd])?;
    *nd -= nuf;
    *nz += nuf;
    if *nd == 0 {
        return Ok(Next::Finish(LargeOrder::finished(*nz)));
    }
    if fnu + (*nd - 1) as f64 >= ctx.wp.fnul {
        return Ok(Next::Retry);
    }
    Ok(Next::Finish(LargeOrder {
        underflow: *nz,
        unfinished: *nd,
    }))
}

/// Fills `y` with `I(fnu + k, z)`; `fnu + y.len() - 1` should be at least
/// `fnul`.
pub(crate) fn i_large_order(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    y: &mut [Complex64],
) -> Result<LargeOrder, Fault> {
    let wp = &ctx.wp;
    let ladder = &ctx.ladder;
    let n = y.len();
    y.fill(CZERO);
    let sector = Sector::new(z, fnu);

    // Screen on the lowest order first.
    let first = term(ctx, z, &sector, fnu.max(1.0), false);
    let rs1 = first.exponent.re;
    if rs1.abs() > wp.elim {
        if rs1 > 0.0 {
            return Err(Fault::Overflow);
        }
        return Ok(LargeOrder::finished(n));
    }

    let mut nz = 0usize;
    let mut nd = n;
    'pass: loop {
        let nn = nd.min(2);
        let mut level = ScaleLevel::Unit;
        let mut head = [CZERO; 2];
        let mut phase = sector.top_phase(fnu, nd);

        for (i, slot) in head.iter_mut().enumerate().take(nn) {
            let gnu = fnu + (nd - 1 - i) as f64;
            let t = term(ctx, z, &sector, gnu, true);
            let mut rs1 = t.exponent.re;
            let mut out_of_range = rs1.abs() > wp.elim;
            if !out_of_range {
                if i == 0 {
                    level = ScaleLevel::Unit;
                }
                if rs1.abs() >= wp.alim {
                    rs1 += t.log_amplitude;
                    out_of_range = rs1.abs() > wp.elim;
                    if !out_of_range && i == 0 {
                        level = if rs1 < 0.0 {
                            ScaleLevel::UnderflowGuard
                        } else {
                            ScaleLevel::OverflowGuard
                        };
                    }
                }
            }

            let mut value = CZERO;
            if !out_of_range {
                let magnitude = t.exponent.re.exp() * ladder.apply(level);
                let growth = Complex64::from_polar(magnitude, t.exponent.im);
                value = t.amplitude * growth;
                out_of_range = level == ScaleLevel::UnderflowGuard && ladder.underflows(value);
            }
            if out_of_range {
                match drop_top(ctx, z, fnu, rs1, y, &mut nd, &mut nz)? {
                    Next::Retry => continue 'pass,
                    Next::Finish(outcome) => return Ok(outcome),
                }
            }

            if let Sector::Rotated { upper, step, .. } = sector {
                if !upper {
                    value = value.conj();
                }
                value *= phase;
                phase *= step;
            }
            *slot = value;
            y[nd - 1 - i] = value * ladder.remove(level);
        }

        if nd > 2 {
            let rz = two_over(z);
            let mut pair = ScaledPair::new(head[0], head[1], level);
            let mut order = (nd - 2) as f64;
            for k in (0..nd - 2).rev() {
                y[k] = pair.advance(ladder, (fnu + order) * rz);
                order -= 1.0;
            }
        }
        return Ok(LargeOrder::finished(nz));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scaling;

    fn close(a: Complex64, b: Complex64, rel: f64) -> bool {
        (a - b).norm() <= rel * b.norm()
    }

    fn run(z: Complex64, fnu: f64, n: usize, scaling: Scaling) -> (LargeOrder, Vec<Complex64>) {
        let mut y = vec![CZERO; n];
        let out = i_large_order(&EvalContext::new(scaling), z, fnu, &mut y).unwrap();
        (out, y)
    }

    #[test]
    fn debye_sector_sequence() {
        let z = Complex64::new(30.0, 20.0);
        let (out, y) = run(z, 98.0, 3, Scaling::Unscaled);
        assert_eq!(out, LargeOrder::finished(0));
        assert!(close(
            y[2],
            Complex64::new(6.8342752408177624e-33, -1.3361984688061626e-32),
            1e-13
        ));
        assert!(close(
            y[0],
            Complex64::new(-2.8256556884591616e-31, -3.7518671028727658e-31),
            1e-13
        ));
    }

    #[test]
    fn rotated_sector_matches_reference() {
        let z = Complex64::new(5.0, 60.0);
        let (_, y) = run(z, 90.0, 2, Scaling::Unscaled);
        assert!(close(
            y[0],
            Complex64::new(-1.8800758123767827e-10, -1.5045291641617715e-10),
            1e-12
        ));
        let (_, w) = run(z.conj(), 90.0, 2, Scaling::Unscaled);
        assert!(close(w[1], y[1].conj(), 1e-14));
    }

    #[test]
    fn scaled_drops_exp_abs_re_z() {
        let z = Complex64::new(40.0, 10.0);
        let (_, plain) = run(z, 100.0, 2, Scaling::Unscaled);
        let (_, scaled) = run(z, 100.0, 2, Scaling::Exponential);
        for (p, s) in plain.iter().zip(scaled.iter()) {
            assert!(close(*s, p * (-40.0f64).exp(), 1e-13));
        }
    }

    #[test]
    fn far_underflow_zeroes_everything() {
        let (out, y) = run(Complex64::new(1e-2, 0.0), 200.0, 2, Scaling::Unscaled);
        assert_eq!(out.underflow, 2);
        assert!(y.iter().all(|v| *v == CZERO));
    }
}
