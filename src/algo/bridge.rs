//! I(ν, z) for sequences whose top order is short of `fnul` while |z| or the
//! order is too large for the series or Miller's method.
//!
//! The two orders just above `fnul` come from the large-order expansion; the
//! backward recurrence then brings them down across the gap and through the
//! requested range.

use num_complex::Complex64;

use super::large_order::{i_large_order, LargeOrder};
use super::scale::ScaledPair;
use super::EvalContext;
use crate::complex::{modulus, two_over, CZERO};
use crate::error::Fault;

/// Fills `y` with `I(fnu + k, z)` starting `lift` orders above the top of
/// the request.
///
/// With `lift == 0` this is the large-order evaluation itself. The returned
/// `unfinished` count has the same meaning as for [`i_large_order`]; if the
/// lifted evaluation underflows, nothing is filled and the whole request is
/// reported unfinished.
pub(crate) fn i_lifted_order(
    ctx: &EvalContext,
    z: Complex64,
    fnu: f64,
    lift: usize,
    y: &mut [Complex64],
) -> Result<LargeOrder, Fault> {
    let n = y.len();
    if lift == 0 {
        return i_large_order(ctx, z, fnu, y);
    }

    let ladder = &ctx.ladder;
    let dfnu = fnu + (n - 1) as f64;
    let mut head = [CZERO; 2];
    let top = i_large_order(ctx, z, dfnu + lift as f64, &mut head)?;
    if top.underflow != 0 {
        return Ok(LargeOrder {
            underflow: 0,
            unfinished: n,
        });
    }

    // head[0] is the lower of the two lifted orders.
    let level = ladder.level_for(modulus(head[0]));
    let scale = ladder.apply(level);
    let mut pair = ScaledPair::new(head[1] * scale, head[0] * scale, level);
    let rz = two_over(z);

    let mut order = dfnu + lift as f64;
    for _ in 0..lift {
        pair.advance(ladder, order * rz);
        order -= 1.0;
    }
    y[n - 1] = pair.s2 * ladder.remove(pair.level);

    let mut order = (n - 1) as f64;
    for k in (0..n - 1).rev() {
        y[k] = pair.advance(ladder, (fnu + order) * rz);
        order -= 1.0;
    }
    Ok(LargeOrder {
        underflow: 0,
        unfinished: 0,
    })
}
