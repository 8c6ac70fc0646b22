//! Public value types shared by every entry point.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use num_complex::Complex64;
use tracing::warn;

/// Scaling option for one call.
///
/// `Exponential` returns `factor · f(z)` with
/// - I: `exp(-|Re z|)`
/// - J, Y: `exp(-|Im z|)`
/// - K: `exp(z)`
/// - H⁽¹⁾: `exp(-iz)`, H⁽²⁾: `exp(iz)`
/// - Ai, Ai': `exp(ζ)`, Bi, Bi': `exp(-|Re ζ|)`, where `ζ = (2/3) z^{3/2}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scaling {
    /// The function itself.
    #[default]
    Unscaled,
    /// The function times the compensating exponential above.
    Exponential,
}

/// Whether a completed result kept full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accuracy {
    /// Within the usual error bounds.
    #[default]
    Normal,
    /// |z| or the order is large enough that argument reduction may have
    /// cost more than half of the significant digits.
    Reduced,
}

impl Accuracy {
    /// The worse of two statuses.
    #[inline]
    pub(crate) fn worst(self, other: Accuracy) -> Accuracy {
        if self == Accuracy::Reduced || other == Accuracy::Reduced {
            Accuracy::Reduced
        } else {
            Accuracy::Normal
        }
    }

    /// Logs a reduced-accuracy result of `function` and passes the status on.
    pub(crate) fn report(self, function: &'static str, order: f64, z: Complex64) -> Self {
        if self == Accuracy::Reduced {
            warn!(
                function,
                order,
                re = z.re,
                im = z.im,
                "argument or order large, half of the digits may be lost"
            );
        }
        self
    }
}

/// Kind of Hankel function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HankelKind {
    /// H⁽¹⁾ = J + iY.
    First,
    /// H⁽²⁾ = J - iY.
    Second,
}

impl HankelKind {
    /// `m` in `H⁽ᵐ⁾`, as ±1 for the rotation `∓iz`.
    #[inline]
    pub(crate) fn sign(self) -> f64 {
        match self {
            HankelKind::First => 1.0,
            HankelKind::Second => -1.0,
        }
    }
}

/// Which Airy function to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiryKind {
    Ai,
    AiPrime,
    Bi,
    BiPrime,
}

impl AiryKind {
    #[inline]
    pub(crate) fn is_derivative(self) -> bool {
        matches!(self, AiryKind::AiPrime | AiryKind::BiPrime)
    }
}

/// One Bessel value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BesselOutput {
    pub value: Complex64,
    /// 1 when the value was set to zero because it underflows, else 0.
    pub underflow_count: usize,
    pub accuracy: Accuracy,
}

/// Values for the orders `ν, ν+1, …, ν+n-1`.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq)]
pub struct BesselSequence {
    pub values: Vec<Complex64>,
    /// Number of entries set to zero because they underflow. For I and J
    /// these are the last entries; for K, Y and H the first ones.
    pub underflow_count: usize,
    pub accuracy: Accuracy,
}

/// One Airy value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiryOutput {
    pub value: Complex64,
    /// 1 when the value was set to zero because it underflows, else 0.
    pub underflow_count: usize,
    pub accuracy: Accuracy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduced_accuracy_dominates() {
        assert_eq!(Accuracy::Normal.worst(Accuracy::Normal), Accuracy::Normal);
        assert_eq!(Accuracy::Normal.worst(Accuracy::Reduced), Accuracy::Reduced);
        assert_eq!(Accuracy::Reduced.worst(Accuracy::Normal), Accuracy::Reduced);
    }

    #[test]
    fn defaults() {
        assert_eq!(Scaling::default(), Scaling::Unscaled);
        assert_eq!(Accuracy::default(), Accuracy::Normal);
        assert!(AiryKind::BiPrime.is_derivative());
        assert!(!AiryKind::Ai.is_derivative());
    }
}
