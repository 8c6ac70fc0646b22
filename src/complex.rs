//! Complex arithmetic that stays finite where the naive formulas do not.
//!
//! `Complex64` supplies the ordinary operators; the helpers here cover the
//! cases the evaluators need guarded: moduli and quotients of values near
//! the exponent limits, `2/z`, quarter-turn rotations, and trigonometry of
//! `πx` that is exact at integers and half-integers.

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

pub(crate) const CZERO: Complex64 = Complex64::new(0.0, 0.0);
pub(crate) const CONE: Complex64 = Complex64::new(1.0, 0.0);

/// |z| without squaring the larger component.
#[inline]
pub(crate) fn modulus(z: Complex64) -> f64 {
    let u = z.re.abs();
    let v = z.im.abs();
    let (big, small) = if u > v { (u, v) } else { (v, u) };
    if big == 0.0 {
        return 0.0;
    }
    let q = small / big;
    big * (1.0 + q * q).sqrt()
}

/// max(|Re z|, |Im z|), the cheap magnitude used by every scale test.
#[inline]
pub(crate) fn max_component(z: Complex64) -> f64 {
    z.re.abs().max(z.im.abs())
}

/// `a / b`, normalising `b` by its modulus before forming products.
#[inline]
pub(crate) fn quotient(a: Complex64, b: Complex64) -> Complex64 {
    let bm = 1.0 / modulus(b);
    let cc = b.re * bm;
    let cd = b.im * bm;
    Complex64::new((a.re * cc + a.im * cd) * bm, (a.im * cc - a.re * cd) * bm)
}

/// `2 / z`, the step of the three-term order recurrence.
#[inline]
pub(crate) fn two_over(z: Complex64) -> Complex64 {
    let raz = 1.0 / modulus(z);
    let re = z.re * raz;
    let im = -z.im * raz;
    Complex64::new((re + re) * raz, (im + im) * raz)
}

#[inline]
pub(crate) fn times_i(z: Complex64) -> Complex64 {
    Complex64::new(-z.im, z.re)
}

#[inline]
pub(crate) fn times_neg_i(z: Complex64) -> Complex64 {
    Complex64::new(z.im, -z.re)
}

/// `e^{iθ}`.
#[inline]
pub(crate) fn cis(theta: f64) -> Complex64 {
    Complex64::new(theta.cos(), theta.sin())
}

/// `(sinh z, cosh z)` from real-argument hyperbolics, avoiding a complex
/// `exp` of `-z`.
pub(crate) fn sinh_cosh(z: Complex64) -> (Complex64, Complex64) {
    let sh = z.re.sinh();
    let ch = z.re.cosh();
    let sn = z.im.sin();
    let cn = z.im.cos();
    (
        Complex64::new(sh * cn, ch * sn),
        Complex64::new(ch * cn, sh * sn),
    )
}

/// `(sin πx, cos πx)`, exact whenever `2x` is an integer.
pub(crate) fn sin_cos_pi(x: f64) -> (f64, f64) {
    // r in [-1, 1], then split off the nearest quarter turn.
    let r = x - 2.0 * (0.5 * x).round();
    let quarter = (2.0 * r).round();
    let t = r - 0.5 * quarter;
    let (s, c) = if t == 0.0 {
        (0.0, 1.0)
    } else {
        let a = core::f64::consts::PI * t;
        (a.sin(), a.cos())
    };
    match quarter as i32 {
        0 => (s, c),
        1 => (c, -s),
        -1 => (-c, s),
        _ => (-s, -c),
    }
}

#[inline]
pub(crate) fn sin_pi(x: f64) -> f64 {
    sin_cos_pi(x).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn modulus_survives_extremes() {
        assert_eq!(modulus(CZERO), 0.0);
        assert_eq!(modulus(Complex64::new(3.0, -4.0)), 5.0);
        let big = 1.0e200;
        assert_relative_eq!(
            modulus(Complex64::new(big, big)),
            big * core::f64::consts::SQRT_2,
            max_relative = 1e-15
        );
        let tiny = 1.0e-300;
        assert!(modulus(Complex64::new(tiny, -tiny)) > 0.0);
    }

    #[test]
    fn quotient_matches_exact_division() {
        let q = quotient(Complex64::new(3.0, 4.0), Complex64::new(1.0, 2.0));
        assert_abs_diff_eq!(q.re, 2.2, epsilon = 1e-15);
        assert_abs_diff_eq!(q.im, -0.4, epsilon = 1e-15);

        let q = quotient(Complex64::new(1.0, 1.0), Complex64::new(1.0e200, 1.0e200));
        assert_relative_eq!(q.re, 1.0e-200, max_relative = 1e-14);
    }

    #[test]
    fn two_over_is_reciprocal_doubled() {
        let z = Complex64::new(0.3, -1.7);
        let r = two_over(z) * z;
        assert_abs_diff_eq!(r.re, 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(r.im, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn quarter_turns() {
        let z = Complex64::new(2.0, 5.0);
        assert_eq!(times_i(z), Complex64::new(-5.0, 2.0));
        assert_eq!(times_neg_i(z), Complex64::new(5.0, -2.0));
        assert_eq!(times_i(times_neg_i(z)), z);
    }

    #[test]
    fn sinh_cosh_agree_with_exponentials() {
        let z = Complex64::new(0.7, -1.3);
        let (sh, ch) = sinh_cosh(z);
        let ez = z.exp();
        let emz = (-z).exp();
        assert_abs_diff_eq!(sh.re, 0.5 * (ez - emz).re, epsilon = 1e-15);
        assert_abs_diff_eq!(sh.im, 0.5 * (ez - emz).im, epsilon = 1e-15);
        assert_abs_diff_eq!(ch.re, 0.5 * (ez + emz).re, epsilon = 1e-15);
        assert_abs_diff_eq!(ch.im, 0.5 * (ez + emz).im, epsilon = 1e-15);
    }

    #[test]
    fn trig_of_pi_multiples_is_exact_on_half_integers() {
        for n in -6..=6 {
            let x = f64::from(n);
            assert_eq!(sin_pi(x).abs(), 0.0);
            assert_eq!(sin_cos_pi(x).1, if n % 2 == 0 { 1.0 } else { -1.0 });
            assert_eq!(sin_cos_pi(x + 0.5).1.abs(), 0.0);
        }
        assert_eq!(sin_pi(0.5), 1.0);
        assert_eq!(sin_pi(1.5), -1.0);
        assert_eq!(sin_pi(-0.5), -1.0);
        assert_eq!(sin_pi(2.5), 1.0);
        assert_eq!(sin_pi(1.0e15 + 0.5).abs(), 1.0);
    }

    #[test]
    fn trig_of_pi_multiples_general() {
        assert_abs_diff_eq!(sin_pi(1.0 / 6.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(sin_cos_pi(1.0 / 3.0).1, 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(
            sin_pi(0.25),
            core::f64::consts::FRAC_1_SQRT_2,
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(sin_pi(-2.75), (-2.75 * core::f64::consts::PI).sin(), epsilon = 1e-14);
        assert_abs_diff_eq!(
            sin_cos_pi(0.8).1,
            (0.8 * core::f64::consts::PI).cos(),
            epsilon = 1e-15
        );
    }
}
