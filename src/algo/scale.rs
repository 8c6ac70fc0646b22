//! Underflow guard and the three-level scale ladder shared by every
//! recurrence that can leave the representable range.

use num_complex::Complex64;

use crate::complex::{max_component, modulus, CZERO};
use crate::machine::WorkingPrecision;

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// True when `y`, carried scaled by `1/tol`, would lose its phase to
/// underflow once the scale is removed.
///
/// `y` is accepted while the smaller component is above `ascle`, or while
/// the larger one is at least a full precision above it.
#[inline]
pub(crate) fn underflows_on_unscale(y: Complex64, ascle: f64, tol: f64) -> bool {
    let wr = y.re.abs();
    let wi = y.im.abs();
    let small = wr.min(wi);
    if small > ascle {
        return false;
    }
    wr.max(wi) < small / tol
}

/// `v * phase`, lifting `v` by `1/tol` first when its components are near
/// the underflow limit so the product keeps its low-order bits.
#[inline]
pub(crate) fn rotate_guarded(v: Complex64, phase: Complex64, ascle: f64, tol: f64) -> Complex64 {
    if max_component(v) <= ascle {
        (v * (1.0 / tol)) * phase * tol
    } else {
        v * phase
    }
}

/// Where an in-flight value sits relative to the representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum ScaleLevel {
    /// Values are carried multiplied by `1/tol`.
    UnderflowGuard,
    /// Values are carried as-is.
    Unit,
    /// Values are carried multiplied by `tol`.
    OverflowGuard,
}

impl ScaleLevel {
    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// The next level up; `OverflowGuard` is the ceiling.
    #[inline]
    pub(crate) fn raised(self) -> Self {
        match self {
            ScaleLevel::UnderflowGuard => ScaleLevel::Unit,
            _ => ScaleLevel::OverflowGuard,
        }
    }
}

/// Scale factors and switch-over bounds for the three levels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScaleLadder {
    apply: [f64; 3],
    remove: [f64; 3],
    bound: [f64; 3],
    tol: f64,
}

impl ScaleLadder {
    pub(crate) fn new(wp: &WorkingPrecision) -> Self {
        let up = 1.0 / wp.tol;
        ScaleLadder {
            apply: [up, 1.0, wp.tol],
            remove: [wp.tol, 1.0, up],
            bound: [wp.ascle, 1.0 / wp.ascle, wp.huge],
            tol: wp.tol,
        }
    }

    /// Factor that takes a true value into `level`'s carried form.
    #[inline]
    pub(crate) fn apply(&self, level: ScaleLevel) -> f64 {
        self.apply[level.index()]
    }

    /// Factor that takes a carried value back to its true magnitude.
    #[inline]
    pub(crate) fn remove(&self, level: ScaleLevel) -> f64 {
        self.remove[level.index()]
    }

    /// Largest true magnitude `level` may carry before switching up.
    #[inline]
    pub(crate) fn bound(&self, level: ScaleLevel) -> f64 {
        self.bound[level.index()]
    }

    /// Underflow threshold for values carried at `UnderflowGuard`.
    #[inline]
    pub(crate) fn ascle(&self) -> f64 {
        self.bound[0]
    }

    /// Level whose window contains the true magnitude `magnitude`.
    pub(crate) fn level_for(&self, magnitude: f64) -> ScaleLevel {
        if magnitude <= self.bound[0] {
            ScaleLevel::UnderflowGuard
        } else if magnitude < self.bound[1] {
            ScaleLevel::Unit
        } else {
            ScaleLevel::OverflowGuard
        }
    }

    /// `underflows_on_unscale` against this ladder's threshold.
    #[inline]
    pub(crate) fn underflows(&self, carried: Complex64) -> bool {
        underflows_on_unscale(carried, self.bound[0], self.tol)
    }
}

/// Both terms of a three-term order recurrence together with the level
/// they are carried at.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScaledPair {
    pub s1: Complex64,
    pub s2: Complex64,
    pub level: ScaleLevel,
}

impl ScaledPair {
    /// Starts a pair from carried values at `level`.
    pub(crate) fn new(s1: Complex64, s2: Complex64, level: ScaleLevel) -> Self {
        ScaledPair { s1, s2, level }
    }

    /// Advances `s_{k+1} = ck * s_k + s_{k-1}` and returns the new term at
    /// its true magnitude, moving the pair up a level when that magnitude
    /// leaves the current window.
    pub(crate) fn advance(&mut self, ladder: &ScaleLadder, ck: Complex64) -> Complex64 {
        let next = ck * self.s2 + self.s1;
        self.s1 = self.s2;
        self.s2 = next;
        let value = next * ladder.remove(self.level);
        self.escalate(ladder, value);
        value
    }

    /// Re-expresses the pair one level up when `value` (the true magnitude
    /// of `s2`) exceeds the current bound.
    pub(crate) fn escalate(&mut self, ladder: &ScaleLadder, value: Complex64) -> bool {
        if self.level == ScaleLevel::OverflowGuard
            || max_component(value) <= ladder.bound(self.level)
        {
            return false;
        }
        let old = ladder.remove(self.level);
        self.level = self.level.raised();
        let factor = ladder.apply(self.level);
        self.s1 = self.s1 * old * factor;
        self.s2 = value * factor;
        true
    }
}

/// Outcome of re-scaling the two halves of an analytic continuation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContinuationTerms {
    pub k_term: Complex64,
    pub i_term: Complex64,
    /// Set when both terms were below the underflow threshold and zeroed.
    pub underflow: bool,
}

/// Converts an exponentially scaled K term `s1` to the I scaling of `s2`
/// (a factor `exp(-2 Re z)`), then zeroes both if the combined magnitude
/// would underflow.
///
/// `rescaled` counts K terms that survived conversion; callers use it to
/// detect a run of them.
pub(crate) fn align_continuation_terms(
    z: Complex64,
    s1: Complex64,
    s2: Complex64,
    ascle: f64,
    alim: f64,
    rescaled: &mut u32,
) -> ContinuationTerms {
    let mut k_term = s1;
    let mut as1 = modulus(s1);
    let as2 = modulus(s2);
    if as1 != 0.0 {
        let aln = -z.re - z.re + as1.ln();
        k_term = CZERO;
        as1 = 0.0;
        if aln >= -alim {
            k_term = (s1.ln() - z - z).exp();
            as1 = modulus(k_term);
            *rescaled += 1;
        }
    }
    if as1.max(as2) > ascle {
        return ContinuationTerms {
            k_term,
            i_term: s2,
            underflow: false,
        };
    }
    *rescaled = 0;
    ContinuationTerms {
        k_term: CZERO,
        i_term: CZERO,
        underflow: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder() -> ScaleLadder {
        ScaleLadder::new(&WorkingPrecision::standard())
    }

    #[test]
    fn guarded_rotation_keeps_tiny_values() {
        let wp = WorkingPrecision::standard();
        let tiny = Complex64::new(3.0e-306, 1.0e-307);
        let r = rotate_guarded(tiny, Complex64::new(0.0, 1.0), wp.ascle, wp.tol);
        assert!((r.re + 1.0e-307).abs() < 1.0e-321);
        assert!((r.im - 3.0e-306).abs() < 1.0e-320);
        let one = Complex64::new(1.0, 2.0);
        assert_eq!(
            rotate_guarded(one, Complex64::new(0.0, 1.0), wp.ascle, wp.tol),
            Complex64::new(-2.0, 1.0)
        );
    }

    #[test]
    fn balanced_value_is_not_flagged() {
        assert!(!underflows_on_unscale(Complex64::new(1.0, 1.0), 1e-300, 1e-16));
        assert!(!underflows_on_unscale(Complex64::new(1.0, 1e-10), 1e-300, 1e-16));
    }

    #[test]
    fn tiny_components_of_similar_size_underflow() {
        assert!(underflows_on_unscale(Complex64::new(1e-310, 1e-320), 1e-300, 1e-16));
        assert!(underflows_on_unscale(Complex64::new(1e-285, 1e-300), 1e-300, 1e-16));
    }

    #[test]
    fn levels_partition_the_range() {
        let l = ladder();
        assert_eq!(l.level_for(1e-310), ScaleLevel::UnderflowGuard);
        assert_eq!(l.level_for(1.0), ScaleLevel::Unit);
        assert_eq!(l.level_for(1e300), ScaleLevel::OverflowGuard);
        for level in [
            ScaleLevel::UnderflowGuard,
            ScaleLevel::Unit,
            ScaleLevel::OverflowGuard,
        ] {
            assert_eq!(l.apply(level) * l.remove(level), 1.0);
        }
        assert_eq!(ScaleLevel::OverflowGuard.raised(), ScaleLevel::OverflowGuard);
    }

    #[test]
    fn pair_moves_up_when_terms_grow() {
        let l = ladder();
        let start = ScaleLevel::Unit;
        let mut pair = ScaledPair::new(Complex64::new(1.0, 0.0), Complex64::new(1e240, 0.0), start);
        let ck = Complex64::new(1e60, 0.0);
        let v = pair.advance(&l, ck);
        assert!(v.re > 1e299);
        assert_eq!(pair.level, ScaleLevel::OverflowGuard);
        // The carried term is the true value times tol.
        assert!((pair.s2.re / (v.re * l.apply(ScaleLevel::OverflowGuard)) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn pair_stays_put_inside_window() {
        let l = ladder();
        let mut pair = ScaledPair::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(2.0, 0.0),
            ScaleLevel::Unit,
        );
        let v = pair.advance(&l, Complex64::new(3.0, 0.0));
        assert_eq!(v, Complex64::new(7.0, 0.0));
        assert_eq!(pair.level, ScaleLevel::Unit);
        assert_eq!(pair.s1, Complex64::new(2.0, 0.0));
    }

    #[test]
    fn continuation_terms_both_zero_underflow() {
        let mut count = 0;
        let z = Complex64::new(1.0, 0.5);
        let t = align_continuation_terms(z, CZERO, CZERO, 1e-300, 700.0, &mut count);
        assert!(t.underflow);
        assert_eq!(t.k_term, CZERO);
        assert_eq!(count, 0);
    }

    #[test]
    fn continuation_k_term_picks_up_exp_minus_two_z() {
        let mut count = 0;
        let z = Complex64::new(0.1, 0.0);
        let s1 = Complex64::new(10.0, 5.0);
        let s2 = Complex64::new(20.0, 10.0);
        let t = align_continuation_terms(z, s1, s2, 1e-300, 700.0, &mut count);
        assert!(!t.underflow);
        assert_eq!(count, 1);
        let expect = s1 * (-0.2f64).exp();
        assert!((t.k_term - expect).norm() < 1e-14);
    }
}
