//! Error taxonomy shared by every entry point.

use thiserror::Error;

/// Why an evaluation produced no value.
///
/// A loss of about half the significant digits is not an error; it is
/// reported through [`Accuracy::Reduced`](crate::Accuracy::Reduced) alongside
/// a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Error {
    /// An argument is outside the domain of the requested function.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The result magnitude is not representable for the requested scaling.
    #[error("result overflows; try exponential scaling")]
    Overflow,
    /// |z| or the order is so large that no significant digits remain.
    #[error("argument or order too large, all precision lost")]
    TotalPrecisionLoss,
    /// An iteration bound was exhausted before the expansion converged.
    #[error("algorithm did not converge")]
    NoConvergence,
}

/// Failure of an internal evaluator.
///
/// Dispatchers match on this to pick a fallback algorithm; only the ones that
/// survive every fallback become an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    Overflow,
    NoConvergence,
}

impl From<Fault> for Error {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Overflow => Error::Overflow,
            Fault::NoConvergence => Error::NoConvergence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_map_onto_public_errors() {
        assert_eq!(Error::from(Fault::Overflow), Error::Overflow);
        assert_eq!(Error::from(Fault::NoConvergence), Error::NoConvergence);
    }

    #[cfg(feature = "std")]
    #[test]
    fn messages_name_the_problem() {
        assert_eq!(
            Error::InvalidInput("order must be non-negative").to_string(),
            "invalid input: order must be non-negative"
        );
        assert!(Error::Overflow.to_string().contains("overflow"));
    }
}
