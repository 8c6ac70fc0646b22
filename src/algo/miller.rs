//! Miller's backward recurrence for I(ν, z) in the band between the power
//! series and the large-argument expansion.
//!
//! The recurrence starts from an index chosen by a truncation-error bound,
//! runs down to the fractional order while accumulating the Neumann sum
//! `Σ (ν+k) Γ(k+2ν)/(k! Γ(1+2ν)) I(ν+k) = (z/2)^ν e^z / Γ(1+ν)`,
//! and is normalised against that sum.

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use super::gamma::ln_gamma;
use super::EvalContext;
use crate::complex::{modulus, CONE, CZERO};
use crate::error::Fault;

/// Iteration ceiling for each start-index search.
const MAX_SEARCH: usize = 80;

/// Fills `y` with `I(fnu + k, z)` by normalised backward recurrence.
pub(crate) fn i_miller(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    y: &mut [Complex64],
) -> Result<(), Fault> {
    let wp = &ctx.wp;
    let n = y.len();
    let scle = wp.tiny / wp.tol;
    let az = modulus(z);
    let iaz = az as usize;
    let ifnu = fnu as usize;
    let inu = ifnu + n - 1;
    let raz = 1.0 / az;
    let unit = Complex64::new(z.re * raz, -z.im * raz);
    let rz = (2.0 * raz) * unit;

    // Start index for the normalising series: run the forward recurrence
    // from |z| until it outgrows the error bound.
    let at = iaz as f64 + 1.0;
    let mut ck = unit * (at * raz);
    let mut p1 = CZERO;
    let mut p2 = CONE;
    let ack = (at + 1.0) * raz;
    let rho = ack + (ack * ack - 1.0).sqrt();
    let rho2 = rho * rho;
    let tst = (rho2 + rho2) / ((rho2 - 1.0) * (rho - 1.0)) / wp.tol;
    let mut ak = at;
    let mut series_steps = None;
    for i in 1..=MAX_SEARCH {
        let pt = p2;
        p2 = p1 - ck * pt;
        p1 = pt;
        ck += rz;
        if modulus(p2) > tst * ak * ak {
            series_steps = Some(i + 1);
            break;
        }
        ak += 1.0;
    }
    let series_steps = series_steps.ok_or(Fault::NoConvergence)?;

    // Start index for the ratios themselves when the top order exceeds |z|.
    let mut ratio_steps = 0usize;
    if inu >= iaz {
        let mut p1 = CZERO;
        let mut p2 = CONE;
        let at = inu as f64 + 1.0;
        let mut ck = unit * (at * raz);
        let mut tst = (at * raz / wp.tol).sqrt();
        let mut refined = false;
        let mut found = false;
        for k in 1..=MAX_SEARCH {
            let pt = p2;
            p2 = p1 - ck * pt;
            p1 = pt;
            ck += rz;
            let ap = modulus(p2);
            if ap < tst {
                continue;
            }
            if refined {
                ratio_steps = k;
                found = true;
                break;
            }
            let ack = modulus(ck);
            let flam = ack + (ack * ack - 1.0).sqrt();
            let fkap = ap / modulus(p1);
            let rho = flam.min(fkap);
            tst *= (rho / (rho * rho - 1.0)).sqrt();
            refined = true;
        }
        if !found {
            return Err(Fault::NoConvergence);
        }
    }

    // Backward recurrence with the Neumann sum, scaled by `scle` so the
    // starting values cannot underflow.
    let kk = (series_steps + iaz).max(ratio_steps + 1 + inu);
    let mut fkk = kk as f64;
    let fnf = fnu - ifnu as f64;
    let tfnf = fnf + fnf;
    let mut bk = (ln_gamma(fkk + tfnf + 1.0) - ln_gamma(fkk + 1.0) - ln_gamma(tfnf + 1.0)).exp();
    let mut p1 = CZERO;
    let mut p2 = Complex64::new(scle, 0.0);
    let mut sum = CZERO;

    let mut step = |p1: &mut Complex64, p2: &mut Complex64, sum: &mut Complex64| {
        let pt = *p2;
        *p2 = *p1 + (fkk + fnf) * (rz * pt);
        *p1 = pt;
        let ak = 1.0 - tfnf / (fkk + tfnf);
        let ack = bk * ak;
        *sum += (ack + bk) * *p1;
        bk = ack;
        fkk -= 1.0;
    };

    for _ in 0..kk - inu {
        step(&mut p1, &mut p2, &mut sum);
    }
    y[n - 1] = p2;
    for m in (0..n - 1).rev() {
        step(&mut p1, &mut p2, &mut sum);
        y[m] = p2;
    }
    for _ in 0..ifnu {
        step(&mut p1, &mut p2, &mut sum);
    }

    // Normalise: e^z (z/2)^fnf / Γ(1+fnf) divided by the accumulated sum,
    // with the division arranged so large sums are not squared.
    let growth = if ctx.scaled() {
        Complex64::new(0.0, z.im)
    } else {
        z
    };
    let mut pt = -fnf * rz.ln() + growth;
    pt.re -= ln_gamma(1.0 + fnf);
    let total = p2 + sum;
    let inv = 1.0 / modulus(total);
    let cnorm = (pt.exp() * inv) * (total.conj() * inv);
    for v in y.iter_mut() {
        *v *= cnorm;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scaling;

    fn close(a: Complex64, b: Complex64, rel: f64) -> bool {
        (a - b).norm() <= rel * b.norm()
    }

    #[test]
    fn integer_orders_on_real_axis() {
        let ctx = EvalContext::new(Scaling::Unscaled);
        let mut y = [CZERO; 3];
        i_miller(&ctx, Complex64::new(5.0, 0.0), 0.0, &mut y).unwrap();
        assert!(close(y[0], Complex64::new(27.239871823604447, 0.0), 1e-14));
        assert!(close(y[1], Complex64::new(24.335642142450527, 0.0), 1e-14));
        assert!(close(y[2], Complex64::new(17.505614966624236, 0.0), 1e-14));
    }

    #[test]
    fn fractional_order_complex_argument() {
        let ctx = EvalContext::new(Scaling::Unscaled);
        let mut y = [CZERO];
        let z = Complex64::new(3.0, 4.0);
        i_miller(&ctx, z, 0.25, &mut y).unwrap();
        assert!(close(
            y[0],
            Complex64::new(-3.3694386747484276, -1.343614735687851),
            1e-13
        ));
    }

    #[test]
    fn scaled_drops_exp_re_z() {
        let z = Complex64::new(6.0, -2.0);
        let mut plain = [CZERO; 2];
        let mut scaled = [CZERO; 2];
        i_miller(&EvalContext::new(Scaling::Unscaled), z, 1.5, &mut plain).unwrap();
        i_miller(&EvalContext::new(Scaling::Exponential), z, 1.5, &mut scaled).unwrap();
        for (p, s) in plain.iter().zip(scaled.iter()) {
            assert!(close(*s, p * (-6.0f64).exp(), 1e-14));
        }
    }
}
