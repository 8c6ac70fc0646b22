//! Logarithm of the gamma function for positive real arguments.

#![allow(clippy::excessive_precision)]

#[cfg(not(feature = "std"))]
use num_traits::Float;

use crate::machine::{MachineConstants, R1M5};

/// ln Γ(k) for k = 1..=100.
#[rustfmt::skip]
const LN_FACTORIALS: [f64; 100] = [
    0.00000000000000000e+00, 0.00000000000000000e+00, 6.93147180559945309e-01, 1.79175946922805500e+00,
    3.17805383034794562e+00, 4.78749174278204599e+00, 6.57925121201010100e+00, 8.52516136106541430e+00,
    1.06046029027452502e+01, 1.28018274800814696e+01, 1.51044125730755153e+01, 1.75023078458738858e+01,
    1.99872144956618861e+01, 2.25521638531234229e+01, 2.51912211827386815e+01, 2.78992713838408916e+01,
    3.06718601060806728e+01, 3.35050734501368889e+01, 3.63954452080330536e+01, 3.93398841871994940e+01,
    4.23356164607534850e+01, 4.53801388984769080e+01, 4.84711813518352239e+01, 5.16066755677643736e+01,
    5.47847293981123192e+01, 5.80036052229805199e+01, 6.12617017610020020e+01, 6.45575386270063311e+01,
    6.78897431371815350e+01, 7.12570389671680090e+01, 7.46582363488301644e+01, 7.80922235533153106e+01,
    8.15579594561150372e+01, 8.50544670175815174e+01, 8.85808275421976788e+01, 9.21361756036870925e+01,
    9.57196945421432025e+01, 9.93306124547874269e+01, 1.02968198614513813e+02, 1.06631760260643459e+02,
    1.10320639714757395e+02, 1.14034211781461703e+02, 1.17771881399745072e+02, 1.21533081515438634e+02,
    1.25317271149356895e+02, 1.29123933639127215e+02, 1.32952575035616310e+02, 1.36802722637326368e+02,
    1.40673923648234259e+02, 1.44565743946344886e+02, 1.48477766951773032e+02, 1.52409592584497358e+02,
    1.56360836303078785e+02, 1.60331128216630907e+02, 1.64320112263195181e+02, 1.68327445448427652e+02,
    1.72352797139162802e+02, 1.76395848406997352e+02, 1.80456291417543771e+02, 1.84533828861449491e+02,
    1.88628173423671591e+02, 1.92739047287844902e+02, 1.96866181672889994e+02, 2.01009316399281527e+02,
    2.05168199482641199e+02, 2.09342586752536836e+02, 2.13532241494563261e+02, 2.17736934113954227e+02,
    2.21956441819130334e+02, 2.26190548323727593e+02, 2.30439043565776952e+02, 2.34701723442818268e+02,
    2.38978389561834323e+02, 2.43268849002982714e+02, 2.47572914096186884e+02, 2.51890402209723194e+02,
    2.56221135550009525e+02, 2.60564940971863209e+02, 2.64921649798552801e+02, 2.69291097651019823e+02,
    2.73673124285693704e+02, 2.78067573440366143e+02, 2.82474292687630396e+02, 2.86893133295426994e+02,
    2.91323950094270308e+02, 2.95766601350760624e+02, 3.00220948647014132e+02, 3.04686856765668715e+02,
    3.09164193580146922e+02, 3.13652829949879062e+02, 3.18152639620209327e+02, 3.22663499126726177e+02,
    3.27185287703775217e+02, 3.31717887196928473e+02, 3.36261181979198477e+02, 3.40815058870799018e+02,
    3.45379407062266854e+02, 3.49954118040770237e+02, 3.54539085519440809e+02, 3.59134205369575399e+02,
];

/// Stirling-series coefficients B_{2k} / (2k (2k-1)).
#[rustfmt::skip]
const STIRLING: [f64; 22] = [
    8.33333333333333333e-02, -2.77777777777777778e-03,
    7.93650793650793651e-04, -5.95238095238095238e-04,
    8.41750841750841751e-04, -1.91752691752691753e-03,
    6.41025641025641026e-03, -2.95506535947712418e-02,
    1.79644372368830573e-01, -1.39243221690590112e+00,
    1.34028640441683920e+01, -1.56848284626002017e+02,
    2.19310333333333333e+03, -3.61087712537249894e+04,
    6.91472268851313067e+05, -1.52382215394074162e+07,
    3.82900751391414141e+08, -1.08822660357843911e+10,
    3.47320283765002252e+11, -1.23696021422692745e+13,
    4.88788064793079335e+14, -2.13203339609193739e+16,
];

/// ln(2π).
const LN_TWO_PI: f64 = 1.83787706640934548;

/// ln Γ(x) for `x > 0`; NaN otherwise.
///
/// Integers up to 100 come from a table. Everything else uses the Stirling
/// series, after shifting small arguments up to the point where the series
/// reaches full precision and dividing the shift back out.
pub(crate) fn ln_gamma(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    if x <= 101.0 && x == x.floor() {
        let k = x as usize;
        if (1..=100).contains(&k) {
            return LN_FACTORIALS[k - 1];
        }
    }

    let mach = MachineConstants::current();
    let wdtol = (2.0 * mach.epsilon).max(0.5e-18);
    let rln = R1M5 * f64::from(mach.digits);
    let fln = rln.clamp(3.0, 20.0) - 3.0;
    let shift_to = ((1.8 + 0.3875 * fln) as i32 + 1) as f64;

    let shift = if x < shift_to { shift_to - x.floor() } else { 0.0 };
    let xs = x + shift;

    let rx = 1.0 / xs;
    let lead = STIRLING[0] * rx;
    let mut sum = lead;
    if rx >= wdtol {
        let rx2 = rx * rx;
        let cutoff = lead * wdtol;
        let mut p = rx;
        for &c in &STIRLING[1..] {
            p *= rx2;
            let term = c * p;
            if term.abs() < cutoff {
                break;
            }
            sum += term;
        }
    }

    let tlg = xs.ln();
    let stirling = xs * (tlg - 1.0) + 0.5 * (LN_TWO_PI - tlg) + sum;
    if shift == 0.0 {
        return stirling;
    }
    // Γ(x) = Γ(x + m) / (x (x+1) ... (x+m-1))
    let mut product = 1.0;
    for i in 0..shift as i32 {
        product *= x + f64::from(i);
    }
    stirling - product.ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn factorials_come_from_table() {
        assert_eq!(ln_gamma(1.0), 0.0);
        assert_eq!(ln_gamma(2.0), 0.0);
        assert_relative_eq!(ln_gamma(4.0), 6.0f64.ln(), max_relative = 1e-15);
        assert_relative_eq!(ln_gamma(100.0), 359.134205369575399, max_relative = 1e-15);
    }

    #[test]
    fn half_integer_values() {
        let ln_sqrt_pi = 0.5 * core::f64::consts::PI.ln();
        assert_relative_eq!(ln_gamma(0.5), ln_sqrt_pi, max_relative = 1e-14);
        // Γ(3/2) = √π / 2
        assert_relative_eq!(ln_gamma(1.5), ln_sqrt_pi - 2.0f64.ln(), max_relative = 1e-13);
    }

    #[test]
    fn just_past_the_table() {
        assert_relative_eq!(ln_gamma(101.0), 363.73937555556347, max_relative = 1e-14);
        let mut expected = 0.0;
        for k in 1..150 {
            expected += f64::from(k).ln();
        }
        assert_relative_eq!(ln_gamma(150.0), expected, max_relative = 1e-13);
    }

    #[test]
    fn small_fractional_argument() {
        assert_relative_eq!(ln_gamma(0.1), 2.2527126517342055, max_relative = 1e-14);
        assert_relative_eq!(ln_gamma(1.0 / 3.0), 0.98542064692776706, max_relative = 1e-14);
    }

    #[test]
    fn non_positive_is_nan() {
        assert!(ln_gamma(0.0).is_nan());
        assert!(ln_gamma(-2.5).is_nan());
    }
}
