//! Machine constants and the working-precision parameters derived from them.
//!
//! Constants follow the I1MACH/D1MACH conventions: the smallest normal
//! magnitude, the largest finite magnitude, unit roundoff, the binary mantissa
//! width and the binary exponent range.

#![allow(clippy::excessive_precision)]

/// log10(2), the decimal digits carried by one binary digit.
pub(crate) const R1M5: f64 = 0.30102999566398120;

/// Read-only description of the floating-point environment.
///
/// The library only ever evaluates with [`MachineConstants::IEEE_DOUBLE`];
/// the table is public so callers can inspect the limits that drive the
/// overflow and underflow decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineConstants {
    /// Smallest positive normal magnitude (D1MACH(1)).
    pub tiny: f64,
    /// Largest finite magnitude (D1MACH(2)).
    pub huge: f64,
    /// Unit roundoff (D1MACH(4)).
    pub epsilon: f64,
    /// Binary digits in the mantissa (I1MACH(14)).
    pub digits: i32,
    /// Minimum binary exponent (I1MACH(15)).
    pub min_exp: i32,
    /// Maximum binary exponent (I1MACH(16)).
    pub max_exp: i32,
}

impl MachineConstants {
    /// IEEE 754 binary64.
    pub const IEEE_DOUBLE: MachineConstants = MachineConstants {
        tiny: f64::MIN_POSITIVE,
        huge: f64::MAX,
        epsilon: f64::EPSILON,
        digits: f64::MANTISSA_DIGITS as i32,
        min_exp: f64::MIN_EXP,
        max_exp: f64::MAX_EXP,
    };

    /// The table every evaluation in this crate uses.
    #[inline]
    pub const fn current() -> &'static MachineConstants {
        &Self::IEEE_DOUBLE
    }
}

/// Thresholds that steer algorithm selection, derived from a
/// [`MachineConstants`] table at the start of every top-level call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WorkingPrecision {
    /// Unit roundoff, floored at 1e-18.
    pub tol: f64,
    /// Exponent beyond which `exp` over- or underflows.
    pub elim: f64,
    /// `elim` less one precision's worth of digits; scaling starts here.
    pub alim: f64,
    /// Lower |z| bound for the large-argument expansion.
    pub rl: f64,
    /// Lower order bound for the large-order expansions.
    pub fnul: f64,
    /// Values below this magnitude underflow once a `1/tol` scale is removed.
    pub ascle: f64,
    /// Smallest |z| the K-type functions accept before reporting overflow.
    pub ufl: f64,
    /// Smallest normal magnitude.
    pub tiny: f64,
    /// Largest finite magnitude.
    pub huge: f64,
    /// Arguments or orders beyond this lose every significant digit.
    pub range: f64,
    /// Decimal digits carried by the mantissa, less one binary digit.
    pub decimal_digits: f64,
}

impl WorkingPrecision {
    pub(crate) fn new(mach: &MachineConstants) -> Self {
        let tol = mach.epsilon.max(1.0e-18);
        let k = (mach.min_exp.abs()).min(mach.max_exp);
        let elim = 2.303 * (f64::from(k) * R1M5 - 3.0);
        let aa = R1M5 * f64::from(mach.digits - 1);
        let dig = aa.min(18.0);
        let alim = elim + (-2.303 * aa).max(-41.45);
        let ascle = 1.0e3 * mach.tiny / tol;
        WorkingPrecision {
            tol,
            elim,
            alim,
            rl: 1.2 * dig + 3.0,
            fnul: 10.0 + 6.0 * (dig - 3.0),
            ascle,
            ufl: 1.0e3 * mach.tiny,
            tiny: mach.tiny,
            huge: mach.huge,
            range: (0.5 / tol).min(f64::from(i32::MAX) * 0.5),
            decimal_digits: aa,
        }
    }

    /// Parameters for the process-wide machine table.
    #[inline]
    pub(crate) fn standard() -> Self {
        Self::new(MachineConstants::current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ieee_double_thresholds() {
        let wp = WorkingPrecision::standard();
        assert_eq!(wp.tol, 2.220446049250313e-16);
        assert_relative_eq!(wp.elim, 700.9217936944459, max_relative = 1e-14);
        assert_relative_eq!(wp.alim, 664.8716455337102, max_relative = 1e-14);
        assert_relative_eq!(wp.rl, 21.784271729432426, max_relative = 1e-14);
        assert_relative_eq!(wp.fnul, 85.92135864716212, max_relative = 1e-14);
        assert_relative_eq!(wp.decimal_digits, 15.653559774527022, max_relative = 1e-14);
    }

    #[test]
    fn range_limit_is_half_of_int_max() {
        let wp = WorkingPrecision::standard();
        assert_eq!(wp.range, 1073741823.5);
        assert!(wp.range.sqrt() > 32767.0);
    }

    #[test]
    fn coarser_table_moves_thresholds_down() {
        let single = MachineConstants {
            tiny: f32::MIN_POSITIVE as f64,
            huge: f32::MAX as f64,
            epsilon: f32::EPSILON as f64,
            digits: 24,
            min_exp: -125,
            max_exp: 128,
        };
        let wp = WorkingPrecision::new(&single);
        assert_relative_eq!(wp.elim, 79.75001000176859, max_relative = 1e-12);
        assert_relative_eq!(wp.rl, 11.308427880325882, max_relative = 1e-12);
        assert!(wp.fnul < WorkingPrecision::standard().fnul);
    }
}
