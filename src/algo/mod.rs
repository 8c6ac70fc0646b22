//! Order-adaptive evaluation engine.
//!
//! Every evaluator here fills a slice `y` with values for the consecutive
//! orders `fnu, fnu + 1, …, fnu + y.len() - 1` and reports how many trailing
//! entries it set to exact zero because they underflow. A `Fault` return means
//! the evaluator could not produce the sequence at all; callers route to the
//! next applicable algorithm or surface the fault.
//!
//! Region selection (|z| against `rl`, order against `fnul`) lives in
//! [`dispatch`] for the I function, in [`crate::modified`] for K and in
//! [`crate::hankel`] for H.

#[cfg(not(feature = "std"))]
use num_traits::Float;

use crate::error::Error;
use crate::machine::WorkingPrecision;
use crate::types::{Accuracy, Scaling};

use self::scale::ScaleLadder;

pub(crate) mod constants;
pub(crate) mod gamma;
pub(crate) mod scale;

pub(crate) mod asymptotic;
pub(crate) mod miller;
pub(crate) mod series;

pub(crate) mod kfunc;

pub(crate) mod debye;
pub(crate) mod turning;

pub(crate) mod bridge;
pub(crate) mod large_order;
pub(crate) mod overflow;

pub(crate) mod wronskian;

pub(crate) mod continuation;
pub(crate) mod large_order_k;

pub(crate) mod dispatch;

/// Read-only inputs shared by every evaluator of one top-level call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EvalContext {
    pub wp: WorkingPrecision,
    pub ladder: ScaleLadder,
    pub scaling: Scaling,
}

impl EvalContext {
    pub(crate) fn new(scaling: Scaling) -> Self {
        let wp = WorkingPrecision::standard();
        EvalContext {
            ladder: ScaleLadder::new(&wp),
            wp,
            scaling,
        }
    }

    #[inline]
    pub(crate) fn scaled(&self) -> bool {
        self.scaling == Scaling::Exponential
    }

    /// Argument-reduction limits on |z| and the highest requested order.
    pub(crate) fn check_range(&self, az: f64, top_order: f64) -> Result<Accuracy, Error> {
        let range = self.wp.range;
        if az > range || top_order > range {
            return Err(Error::TotalPrecisionLoss);
        }
        let half = range.sqrt();
        Ok(if az > half || top_order > half {
            Accuracy::Reduced
        } else {
            Accuracy::Normal
        })
    }
}
