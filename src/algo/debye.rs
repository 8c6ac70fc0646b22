//! Debye's uniform expansion for large order away from the turning point.
//!
//! With `t = z/ν`, `s = √(1 + t²)`, `ζ₁ = ν ln((1+s)/t)` and `ζ₂ = ν s`,
//!
//! `I(ν, νt) ≈ e^{ζ₂-ζ₁} / √(2πν s) Σ u_k(1/s) / ν^k`
//! `K(ν, νt) ≈ √(π/(2ν s)) e^{ζ₁-ζ₂} Σ (-1)^k u_k(1/s) / ν^k`
//!
//! The terms `u_k(1/s)/ν^k` are the same for both functions, so one
//! [`DebyeExpansion`] serves an I and a K evaluation at the same point.

#![allow(clippy::excessive_precision)]

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use super::constants::{INV_SQRT_TWO_PI, SQRT_HALF_PI};
use crate::complex::{quotient, CONE, CZERO};

/// Which function an expansion is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    /// Modified Bessel function of the first kind.
    I,
    /// Modified Bessel function of the second kind.
    K,
}

impl Family {
    fn prefactor(self) -> f64 {
        match self {
            Family::I => INV_SQRT_TWO_PI,
            Family::K => SQRT_HALF_PI,
        }
    }
}

/// Most terms kept from the series.
const MAX_TERMS: usize = 15;

/// Coefficients of the Debye polynomials `u_k(p)`, in descending powers of
/// `p²` after the leading `p^k` factor has been split off, concatenated by
/// degree.
#[rustfmt::skip]
pub(crate) const U_COEFFS: [f64; 120] = [
    // u_0
    1.00000000000000000e+00,
    // u_1
    -2.08333333333333333e-01,
    1.25000000000000000e-01,
    // u_2
    3.34201388888888889e-01,
    -4.01041666666666667e-01,
    7.03125000000000000e-02,
    // u_3
    -1.02581259645061728e+00,
    1.84646267361111111e+00,
    -8.91210937500000000e-01,
    7.32421875000000000e-02,
    // u_4
    4.66958442342624743e+00,
    -1.12070026162229938e+01,
    8.78912353515625000e+00,
    -2.36408691406250000e+00,
    1.12152099609375000e-01,
    // u_5
    -2.82120725582002449e+01,
    8.46362176746007346e+01,
    -9.18182415432400174e+01,
    4.25349987453884549e+01,
    -7.36879435947963170e+00,
    2.27108001708984375e-01,
    // u_6
    2.12570130039217123e+02,
    -7.65252468141181642e+02,
    1.05999045252799988e+03,
    -6.99579627376132541e+02,
    2.18190511744211590e+02,
    -2.64914304869515555e+01,
    5.72501420974731445e-01,
    // u_7
    -1.91945766231840700e+03,
    8.06172218173730938e+03,
    -1.35865500064341374e+04,
    1.16553933368645332e+04,
    -5.30564697861340311e+03,
    1.20090291321635246e+03,
    -1.08090919788394656e+02,
    1.72772750258445740e+00,
    // u_8
    2.02042913309661486e+04,
    -9.69805983886375135e+04,
    1.92547001232531532e+05,
    -2.03400177280415534e+05,
    1.22200464983017460e+05,
    -4.11926549688975513e+04,
    7.10951430248936372e+03,
    -4.93915304773088012e+02,
    6.07404200127348304e+00,
    // u_9
    -2.42919187900551333e+05,
    1.31176361466297720e+06,
    -2.99801591853810675e+06,
    3.76327129765640400e+06,
    -2.81356322658653411e+06,
    1.26836527332162478e+06,
    -3.31645172484563578e+05,
    4.52187689813627263e+04,
    -2.49983048181120962e+03,
    2.43805296995560639e+01,
    // u_10
    3.28446985307203782e+06,
    -1.97068191184322269e+07,
    5.09526024926646422e+07,
    -7.41051482115326577e+07,
    6.63445122747290267e+07,
    -3.75671766607633513e+07,
    1.32887671664218183e+07,
    -2.78561812808645469e+06,
    3.08186404612662398e+05,
    -1.38860897537170405e+04,
    1.10017140269246738e+02,
    // u_11
    -4.93292536645099620e+07,
    3.25573074185765749e+08,
    -9.39462359681578403e+08,
    1.55359689957058006e+09,
    -1.62108055210833708e+09,
    1.10684281682301447e+09,
    -4.95889784275030309e+08,
    1.42062907797533095e+08,
    -2.44740627257387285e+07,
    2.24376817792244943e+06,
    -8.40054336030240853e+04,
    5.51335896122020586e+02,
    // u_12
    8.14789096118312115e+08,
    -5.86648149205184723e+09,
    1.86882075092958249e+10,
    -3.46320433881587779e+10,
    4.12801855797539740e+10,
    -3.30265997498007231e+10,
    1.79542137311556001e+10,
    -6.56329379261928433e+09,
    1.55927986487925751e+09,
    -2.25105661889415278e+08,
    1.73951075539781645e+07,
    -5.49842327572288687e+05,
    3.03809051092238427e+03,
    // u_13
    -1.46792612476956167e+10,
    1.14498237732025810e+11,
    -3.99096175224466498e+11,
    8.19218669548577329e+11,
    -1.09837515608122331e+12,
    1.00815810686538209e+12,
    -6.45364869245376503e+11,
    2.87900649906150589e+11,
    -8.78670721780232657e+10,
    1.76347306068349694e+10,
    -2.16716498322379509e+09,
    1.43157876718888981e+08,
    -3.87183344257261262e+06,
    1.82577554742931747e+04,
    // u_14
    2.86464035717679043e+11,
    -2.40629790002850396e+12,
    9.10934118523989896e+12,
    -2.05168994109344374e+13,
    3.05651255199353206e+13,
    -3.16670885847851584e+13,
    2.33483640445818409e+13,
    -1.23204913055982872e+13,
    4.61272578084913197e+12,
    -1.19655288019618160e+12,
    2.05914503232410016e+11,
    -2.18229277575292237e+10,
    1.24700929351271032e+09,
    -2.91883881222208134e+07,
    1.18838426256783253e+05,
];

/// `ζ₁`, `ζ₂`, the prefactor root `√(1/(ν s))` and the series terms of one
/// expansion point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DebyeExpansion {
    pub zeta1: Complex64,
    pub zeta2: Complex64,
    root: Complex64,
    /// |z| was below the smallest meaningful value; the result is the
    /// limiting form with `phi = 1` and no series.
    degenerate: bool,
    terms: [Complex64; MAX_TERMS],
    len: usize,
}

impl DebyeExpansion {
    /// Only `ζ₁`, `ζ₂` and `phi`; enough for the magnitude tests.
    pub(crate) fn leading(z: Complex64, fnu: f64, tiny: f64) -> Self {
        Self::build(z, fnu, tiny, None)
    }

    /// The full expansion, truncated once a term and `ν^{-k}` both fall
    /// below `tol`.
    pub(crate) fn new(z: Complex64, fnu: f64, tiny: f64, tol: f64) -> Self {
        Self::build(z, fnu, tiny, Some(tol))
    }

    fn build(z: Complex64, fnu: f64, tiny: f64, tol: Option<f64>) -> Self {
        let mut terms = [CZERO; MAX_TERMS];
        let rfn = 1.0 / fnu;

        let test = tiny * 1.0e3;
        let ac = fnu * test;
        if z.re.abs() <= ac && z.im.abs() <= ac {
            return DebyeExpansion {
                zeta1: Complex64::new(2.0 * test.ln().abs() + fnu, 0.0),
                zeta2: Complex64::new(fnu, 0.0),
                root: CONE,
                degenerate: true,
                terms,
                len: 0,
            };
        }

        let t = z * rfn;
        let s = CONE + t * t;
        let sr = s.sqrt();
        let zn = quotient(CONE + sr, t);
        let zeta1 = zn.ln() * fnu;
        let zeta2 = sr * fnu;
        let p = quotient(CONE, sr) * rfn;
        let root = p.sqrt();

        let mut len = 0;
        if let Some(tol) = tol {
            let p2 = quotient(CONE, s);
            terms[0] = CONE;
            len = MAX_TERMS;
            let mut power = CONE;
            let mut bound = 1.0;
            let mut l = 1;
            for k in 1..MAX_TERMS {
                let mut poly = CZERO;
                for &c in &U_COEFFS[l..=l + k] {
                    poly = poly * p2 + c;
                }
                l += k + 1;
                power *= p;
                terms[k] = power * poly;
                bound *= rfn;
                if bound < tol && terms[k].re.abs() + terms[k].im.abs() < tol {
                    len = k + 1;
                    break;
                }
            }
        }

        DebyeExpansion {
            zeta1,
            zeta2,
            root,
            degenerate: false,
            terms,
            len,
        }
    }

    /// Amplitude factor `√(1/(2πνs))` for I or `√(π/(2νs))` for K.
    pub(crate) fn phi(&self, family: Family) -> Complex64 {
        if self.degenerate {
            return CONE;
        }
        self.root * family.prefactor()
    }

    /// `Σ u_k/ν^k` for I, with alternating signs for K.
    pub(crate) fn sum(&self, family: Family) -> Complex64 {
        let terms = &self.terms[..self.len];
        match family {
            Family::I => terms.iter().sum(),
            Family::K => terms
                .iter()
                .enumerate()
                .map(|(k, t)| if k % 2 == 0 { *t } else { -*t })
                .sum(),
        }
    }
}
