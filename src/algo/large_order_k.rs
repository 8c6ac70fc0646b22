//! K(ν, z) for orders at or above `fnul` from the uniform expansions, with
//! the analytic continuation into the left half plane done in the same pass.
//!
//! For |arg z| ≤ π/3 the Debye expansion gives K directly. Closer to the
//! imaginary axis K is obtained from `H⁽²⁾(ν, -iz)` in the first quadrant,
//! whose turning-point expansion is in terms of `Ai(e^{-2πi/3} ζ)`; fourth
//! quadrant values follow by conjugation. The two lowest orders that stay
//! on scale are evaluated and forward recurrence does the rest.
//!
//! For Re z < 0 the I term of
//! `K(ν, zr e^{iπm}) = e^{-iπmν} K(ν, zr) - iπm I(ν, zr)` comes from the same
//! expansions (reusing those already built for K), evaluated downward from
//! the top order and continued by backward recurrence.

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use super::constants::{AIRY_LOG_OFFSET, HALF_PI, I_POWERS, PI};
use super::debye::{DebyeExpansion, Family};
use super::overflow::TURNING_SLOPE;
use super::scale::{align_continuation_terms, ScaleLevel, ScaledPair};
use super::turning::TurningPointExpansion;
use super::EvalContext;
use crate::airy::scaled_ai_pair;
use crate::complex::{modulus, sin_cos_pi, two_over, CZERO};
use crate::error::Fault;
use crate::machine::WorkingPrecision;

/// `1 + i√3`.
const CR1: Complex64 = Complex64::new(1.0, 1.73205080756887729);
/// `e^{-2πi/3}`.
const CR2: Complex64 = Complex64::new(-0.5, -8.66025403784438647e-01);
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);

#[derive(Debug, Clone, Copy)]
enum Geometry {
    Debye,
    /// `zn = -i zr` folded into the first quadrant and `zb`, `zr` reflected
    /// into the upper half plane.
    Rotated {
        zn: Complex64,
        zb: Complex64,
        upper: bool,
    },
}

impl Geometry {
    fn new(zr: Complex64) -> Self {
        if zr.im.abs() <= zr.re.abs() * TURNING_SLOPE {
            return Geometry::Debye;
        }
        Geometry::Rotated {
            zn: Complex64::new(zr.im.abs(), -zr.re),
            zb: Complex64::new(zr.re, zr.im.abs()),
            upper: zr.im > 0.0,
        }
    }

    /// Takes a value computed in the upper-half-plane frame to `zr`'s.
    fn orient(&self, v: Complex64) -> Complex64 {
        match *self {
            Geometry::Rotated { upper: false, .. } => v.conj(),
            _ => v,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Expansion {
    Debye(DebyeExpansion),
    Turning(TurningPointExpansion),
}

impl Expansion {
    fn new(wp: &WorkingPrecision, geom: &Geometry, zr: Complex64, gnu: f64, full: bool) -> Self {
        match (*geom, full) {
            (Geometry::Debye, true) => {
                Expansion::Debye(DebyeExpansion::new(zr, gnu, wp.tiny, wp.tol))
            }
            (Geometry::Debye, false) => Expansion::Debye(DebyeExpansion::leading(zr, gnu, wp.tiny)),
            (Geometry::Rotated { zn, .. }, true) => {
                Expansion::Turning(TurningPointExpansion::new(zn, gnu, wp.tiny, wp.tol))
            }
            (Geometry::Rotated { zn, .. }, false) => {
                Expansion::Turning(TurningPointExpansion::leading(zn, gnu, wp.tiny, wp.tol))
            }
        }
    }

    /// Exponent of the I form; the K form has the opposite sign. With
    /// scaling it includes `e^{-base}`.
    fn i_exponent(&self, ctx: &EvalContext, base: Complex64, gnu: f64) -> Complex64 {
        let (zeta1, zeta2) = match self {
            Expansion::Debye(d) => (d.zeta1, d.zeta2),
            Expansion::Turning(t) => (t.zeta1, t.zeta2),
        };
        if !ctx.scaled() {
            return zeta2 - zeta1;
        }
        let st = base + zeta2;
        let rast = gnu / modulus(st);
        st.conj() * (rast * rast) - zeta1
    }

    fn log_amplitude(&self, family: Family) -> f64 {
        match self {
            Expansion::Debye(d) => modulus(d.phi(family)).ln(),
            Expansion::Turning(t) => {
                modulus(t.phi).ln() - 0.25 * modulus(t.arg).ln() - AIRY_LOG_OFFSET
            }
        }
    }

    /// K amplitude, before the rotation phase of the turning-point form.
    fn k_amplitude(&self) -> Complex64 {
        match self {
            Expansion::Debye(d) => d.phi(Family::K) * d.sum(Family::K),
            Expansion::Turning(t) => {
                let (ai, dai) = scaled_ai_pair(t.arg * CR2);
                t.phi * (ai * t.asum + CR2 * (dai * t.bsum))
            }
        }
    }

    /// I amplitude, before its phase factor.
    fn i_amplitude(&self) -> Complex64 {
        match self {
            Expansion::Debye(d) => d.phi(Family::I) * d.sum(Family::I),
            Expansion::Turning(t) => {
                let (ai, dai) = scaled_ai_pair(t.arg);
                t.phi * (ai * t.asum + dai * t.bsum)
            }
        }
    }
}

/// Level to carry a term of exponent `rs1` at, keeping `current` when the
/// pair already has one. `Err` holds the (refined) exponent when the term is
/// out of range.
fn carry_level(
    wp: &WorkingPrecision,
    rs1: f64,
    log_amplitude: f64,
    current: Option<ScaleLevel>,
) -> Result<(ScaleLevel, f64), f64> {
    if rs1.abs() > wp.elim {
        return Err(rs1);
    }
    if rs1.abs() < wp.alim {
        return Ok((current.unwrap_or(ScaleLevel::Unit), rs1));
    }
    let rs1 = rs1 + log_amplitude;
    if rs1.abs() > wp.elim {
        return Err(rs1);
    }
    let fresh = if rs1 < 0.0 {
        ScaleLevel::UnderflowGuard
    } else {
        ScaleLevel::OverflowGuard
    };
    Ok((current.unwrap_or(fresh), rs1))
}

/// Expansions built during the K pass, by order index.
struct Cache {
    slots: [Option<(usize, Expansion)>; 3],
}

impl Cache {
    fn get(&self, k: usize) -> Option<Expansion> {
        self.slots
            .iter()
            .flatten()
            .find(|(i, _)| *i == k)
            .map(|(_, e)| *e)
    }
}

/// Fills `y` with `K(fnu + k, z)`.
///
/// `mr` is 0 for Re z ≥ 0; otherwise it is the direction (±1) of the
/// half-turn taking `-z` to `z`. Returns the count of entries zeroed by
/// underflow.
pub(crate) fn k_large_order(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    mr: i32,
    y: &mut [Complex64],
) -> Result<usize, Fault> {
    let wp = &ctx.wp;
    let ladder = &ctx.ladder;
    let n = y.len();
    y.fill(CZERO);

    let zr = if z.re >= 0.0 { z } else { -z };
    let geom = Geometry::new(zr);
    let base = match geom {
        Geometry::Debye => zr,
        Geometry::Rotated { zb, .. } => zb,
    };
    let inu = fnu.trunc();
    let fnf = fnu - inu;
    let inu = inu as usize;

    // -iπ/2 e^{-iπ fnf/2} (-i)^inu (1 + i√3), stepped by -i per order.
    let (s_half, c_half) = (HALF_PI * fnf).sin_cos();
    let mut k_phase =
        CR1 * Complex64::new(-HALF_PI * s_half, -HALF_PI * c_half) * I_POWERS[inu % 4].conj();

    let mut nz = 0usize;
    let mut cache = Cache {
        slots: [None, None, None],
    };
    let mut head = [CZERO; 2];
    let mut level = ScaleLevel::Unit;
    let mut pending: Option<ScaleLevel> = None;
    let mut last = n - 1;

    for i in 0..n {
        let gnu = fnu + i as f64;
        let e = Expansion::new(wp, &geom, zr, gnu, true);
        cache.slots[i % 2] = Some((i, e));
        let ex = -e.i_exponent(ctx, base, gnu);

        let value = match carry_level(wp, ex.re, e.log_amplitude(Family::K), pending) {
            Ok((lv, rs1)) => {
                let mut amp = e.k_amplitude();
                if matches!(geom, Geometry::Rotated { .. }) {
                    amp *= k_phase;
                }
                let v = amp * Complex64::from_polar(ex.re.exp() * ladder.apply(lv), ex.im);
                if lv == ScaleLevel::UnderflowGuard && ladder.underflows(v) {
                    Err(rs1)
                } else {
                    level = lv;
                    Ok(v)
                }
            }
            Err(rs1) => Err(rs1),
        };
        k_phase *= NEG_I;

        match value {
            Err(rs1) => {
                // For Re z < 0 the I term added later would overflow.
                if rs1 > 0.0 || z.re < 0.0 {
                    return Err(Fault::Overflow);
                }
                pending = None;
                y[i] = CZERO;
                nz += 1;
                if i > 0 && y[i - 1] != CZERO {
                    y[i - 1] = CZERO;
                    nz += 1;
                }
            }
            Ok(v) => {
                let v = geom.orient(v);
                let slot = usize::from(pending.is_some());
                head[slot] = v;
                y[i] = v * ladder.remove(level);
                if slot == 1 {
                    last = i;
                    break;
                }
                pending = Some(level);
            }
        }
    }

    if last + 1 < n {
        // Top order decides whether the whole sequence underflows.
        let gnu = fnu + (n - 1) as f64;
        let top = Expansion::new(wp, &geom, zr, gnu, mr != 0);
        let rs1 = -top.i_exponent(ctx, base, gnu).re;
        let out = rs1.abs() > wp.elim
            || (rs1.abs() >= wp.alim && (rs1 + top.log_amplitude(Family::K)).abs() >= wp.elim);
        if out {
            if rs1 > 0.0 || z.re < 0.0 {
                return Err(Fault::Overflow);
            }
            y.fill(CZERO);
            return Ok(n);
        }
        cache.slots[2] = Some((n - 1, top));

        let rz = two_over(zr);
        let mut ck = rz * (fnu + last as f64);
        let mut pair = ScaledPair::new(head[0], head[1], level);
        for slot in y.iter_mut().skip(last + 1) {
            *slot = pair.advance(ladder, ck);
            ck += rz;
        }
    }

    if mr == 0 {
        return Ok(nz);
    }
    continue_left(ctx, zr, fnu, mr, &geom, base, &cache, y)
}

/// `cspn K + term`, with K brought to the I scaling first when scaled.
fn combine(
    ctx: &EvalContext,
    zr: Complex64,
    k_value: Complex64,
    term: Complex64,
    cspn: Complex64,
    rescaled: &mut u32,
    nz: &mut usize,
) -> Complex64 {
    if !ctx.scaled() {
        return cspn * k_value + term;
    }
    let t = align_continuation_terms(zr, k_value, term, ctx.ladder.ascle(), ctx.wp.alim, rescaled);
    *nz += usize::from(t.underflow);
    cspn * t.k_term + t.i_term
}

/// Adds the I term of the continuation to the K values in `y`, from the top
/// order down.
#[allow(clippy::too_many_arguments)]
fn continue_left(
    ctx: &EvalContext,
    zr: Complex64,
    fnu: f64,
    mr: i32,
    geom: &Geometry,
    base: Complex64,
    cache: &Cache,
    y: &mut [Complex64],
) -> Result<usize, Fault> {
    let wp = &ctx.wp;
    let ladder = &ctx.ladder;
    let n = y.len();
    let sgn = -PI.copysign(f64::from(mr));
    let inu = fnu.trunc();
    let fnf = fnu - inu;
    let ifn = inu as usize + n - 1;

    let (s, c) = sin_cos_pi(fnu + (n - 1) as f64);
    let mut cspn = Complex64::new(c, -s * f64::from(mr));

    // Phase of the I term for the top order, stepped by -i per order in the
    // turning-point form.
    let mut i_phase = match *geom {
        Geometry::Debye => Complex64::new(0.0, sgn),
        Geometry::Rotated { upper, .. } => {
            let csgni = if upper { sgn } else { -sgn };
            let (s_half, c_half) = (HALF_PI * fnf).sin_cos();
            Complex64::new(-s_half * csgni, c_half * csgni) * I_POWERS[ifn % 4]
        }
    };
    let rotated = matches!(geom, Geometry::Rotated { .. });

    let mut rescaled = 0u32;
    let mut nz = 0usize;
    let mut head = [CZERO; 2];
    let mut level = ScaleLevel::Unit;
    let mut pending: Option<ScaleLevel> = None;
    let mut remaining = 0usize;

    for kk in (0..n).rev() {
        let gnu = fnu + kk as f64;
        let e = match cache.get(kk) {
            Some(e) => e,
            None => Expansion::new(wp, geom, zr, gnu, true),
        };
        let ex = e.i_exponent(ctx, base, gnu);
        let s2 = match carry_level(wp, ex.re, e.log_amplitude(Family::I), pending) {
            Err(rs1) if rs1 > 0.0 => return Err(Fault::Overflow),
            Err(_) => CZERO,
            Ok((lv, _)) => {
                level = lv;
                let amp = e.i_amplitude() * i_phase;
                let v = amp * Complex64::from_polar(ex.re.exp() * ladder.apply(lv), ex.im);
                if lv == ScaleLevel::UnderflowGuard && ladder.underflows(v) {
                    CZERO
                } else {
                    v
                }
            }
        };
        let s2 = geom.orient(s2);
        let slot = usize::from(pending.is_some());
        head[slot] = s2;
        y[kk] = combine(ctx, zr, y[kk], s2 * ladder.remove(level), cspn, &mut rescaled, &mut nz);
        cspn = -cspn;
        if rotated {
            i_phase *= NEG_I;
        }

        if s2 == CZERO {
            pending = None;
            continue;
        }
        if slot == 1 {
            remaining = kk;
            break;
        }
        pending = Some(level);
    }

    if remaining == 0 {
        return Ok(nz);
    }

    // Backward recurrence for the rest of the I sequence.
    let rz = two_over(zr);
    let mut pair = ScaledPair::new(head[0], head[1], level);
    let mut order = fnu + remaining as f64;
    for kk in (0..remaining).rev() {
        let term = pair.advance(ladder, rz * order);
        order -= 1.0;
        y[kk] = combine(ctx, zr, y[kk], term, cspn, &mut rescaled, &mut nz);
        cspn = -cspn;
    }
    Ok(nz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scaling;

    fn close(a: Complex64, b: Complex64, rel: f64) -> bool {
        (a - b).norm() <= rel * b.norm()
    }

    fn run(z: Complex64, fnu: f64, mr: i32, n: usize, scaling: Scaling) -> Vec<Complex64> {
        let mut y = vec![CZERO; n];
        k_large_order(&EvalContext::new(scaling), z, fnu, mr, &mut y).unwrap();
        y
    }

    #[test]
    fn debye_sector_with_forward_recurrence() {
        let y = run(Complex64::new(30.0, 20.0), 100.0, 0, 3, Scaling::Unscaled);
        assert!(close(y[0], Complex64::new(1.6373702714965866e29, 2.7965775501303968e29), 1e-12));
        assert!(close(y[1], Complex64::new(1.6145278676342462e30, 8.4509135659740551e29), 1e-12));
        assert!(close(y[2], Complex64::new(1.0316204687549115e31, -7.9837221749740050e29), 1e-12));
    }

    #[test]
    fn debye_sector_continued_to_the_left() {
        let y = run(Complex64::new(-30.0, 20.0), 100.0, 1, 3, Scaling::Unscaled);
        assert!(close(y[0], Complex64::new(1.6373702714965866e29, -2.7965775501303968e29), 1e-12));
        assert!(close(y[1], Complex64::new(-1.6145278676342462e30, 8.4509135659740551e29), 1e-12));
        assert!(close(y[2], Complex64::new(1.0316204687549115e31, 7.9837221749740050e29), 1e-12));
    }

    #[test]
    fn rotated_sector_both_half_planes() {
        let up = run(Complex64::new(5.0, 60.0), 90.0, 0, 2, Scaling::Unscaled);
        assert!(close(up[0], Complex64::new(-22680630.236974903, 20746952.691993116), 1e-12));
        assert!(close(up[1], Complex64::new(47162244.687301767, 64868505.038564815), 1e-12));
        let down = run(Complex64::new(5.0, -60.0), 100.0, 0, 1, Scaling::Unscaled);
        assert!(close(down[0], Complex64::new(796807067951.81044, -284049388449.35728), 1e-12));
    }

    #[test]
    fn rotated_sector_continued_to_the_left() {
        let y = run(Complex64::new(-5.0, 60.0), 90.0, 1, 3, Scaling::Unscaled);
        assert!(close(y[0], Complex64::new(-22680630.236974902, -20746952.691993116), 1e-12));
        assert!(close(y[1], Complex64::new(-47162244.687301766, 64868505.038564815), 1e-12));
        assert!(close(y[2], Complex64::new(184569498.78001058, 105041012.10807345), 1e-12));
    }

    #[test]
    fn scaled_rotated_value() {
        let y = run(Complex64::new(5.0, 60.0), 90.0, 0, 1, Scaling::Exponential);
        assert!(close(y[0], Complex64::new(4144469848.3835451, -1906570363.3666158), 1e-12));
    }

    #[test]
    fn far_right_underflows() {
        let mut y = [CZERO; 2];
        let ctx = EvalContext::new(Scaling::Unscaled);
        let nz = k_large_order(&ctx, Complex64::new(900.0, 10.0), 90.0, 0, &mut y).unwrap();
        assert_eq!(nz, 2);
        assert_eq!(y, [CZERO, CZERO]);
    }
}
