use std::borrow::Cow;

use crate::regression::Degree;

/// Failure classes exposed to the transports.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The caller sent something malformed, always user-correctable.
    InvalidInput,

    /// The data is well-formed but the fit could not be computed.
    ComputationError,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegressionError {
    #[error("{0}")]
    InvalidInput(Cow<'static, str>),

    #[error("Error during {degree} regression: {source}")]
    Computation { degree: Degree, source: NumericError },
}

impl RegressionError {
    pub const NOT_LISTS: Self = Self::invalid("Input arguments 'x' and 'y' must be lists.");
    pub const NOT_NUMBERS: Self = Self::invalid("Input lists 'x' and 'y' must contain numbers.");
    pub const LENGTH_MISMATCH: Self =
        Self::invalid("Input lists 'x' and 'y' must have the same length.");

    pub const fn invalid(message: &'static str) -> Self {
        Self::InvalidInput(Cow::Borrowed(message))
    }

    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::Computation { .. } => FailureKind::ComputationError,
        }
    }
}

/// Numerical failures of the fitter and the scorer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumericError {
    #[error(
        "the normal equations are singular (design matrix rank {rank} < {n_coefficients} over {n_samples} samples)"
    )]
    Singular {
        rank: usize,
        n_coefficients: usize,
        n_samples: usize,
    },

    /// Full rank, but too close to singular to solve accurately.
    #[error("the normal equations are ill-conditioned (design matrix condition number {condition:.3e})")]
    IllConditioned { condition: f64 },

    #[error("the {0} is not finite")]
    NonFinite(&'static str),
}
