//! Least-squares polynomial regression: validates the raw samples,
//! fits a polynomial of degree 1 or 2 and scores it with the RMSE.
//!
//! Every call is independent: it either returns a [`FitResult`],
//! or a [`RegressionError`] of exactly one [`FailureKind`].

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use self::error::{FailureKind, NumericError, RegressionError};
pub use self::fitter::{fit, Fit};
pub use self::scorer::score;
pub use self::validator::{validate, SampleSet};
use crate::prelude::*;

mod error;
mod fitter;
mod scorer;
mod validator;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Degree {
    Linear,
    Quadratic,
}

impl Degree {
    pub const fn n_coefficients(self) -> usize {
        match self {
            Self::Linear => 2,
            Self::Quadratic => 3,
        }
    }

    /// Fewer samples than this yield the all-zero default fit.
    pub const fn min_samples(self) -> usize {
        self.n_coefficients()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
        }
    }
}

impl Display for Degree {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FitResult {
    /// Coefficients, intercept first.
    pub params: Vec<f64>,

    #[serde(rename = "RMSE")]
    pub rmse: f64,
}

pub type Outcome = Result<FitResult, RegressionError>;

pub fn linear(x: Option<&Value>, y: Option<&Value>) -> Outcome {
    run(x, y, Degree::Linear)
}

pub fn quadratic(x: Option<&Value>, y: Option<&Value>) -> Outcome {
    run(x, y, Degree::Quadratic)
}

#[instrument(level = "debug", skip_all, fields(%degree))]
pub fn run(x: Option<&Value>, y: Option<&Value>, degree: Degree) -> Outcome {
    let samples = validate(x, y).map_err(|error| {
        warn!("{}", error);
        error
    })?;
    debug!(n_samples = samples.len());

    let result = fit(&samples, degree).and_then(|fit| {
        let rmse = score(&samples, &fit)?;
        Ok(FitResult {
            params: fit.coefficients(),
            rmse,
        })
    });
    match result {
        Ok(result) => {
            if samples.len() < degree.min_samples() {
                warn!(
                    n_samples = samples.len(),
                    min_samples = degree.min_samples(),
                    "too few samples, returning the default fit",
                );
            } else {
                info!(params = ?result.params, rmse = result.rmse, "regression succeeded");
            }
            Ok(result)
        }
        Err(source) => {
            let error = RegressionError::Computation { degree, source };
            error!("{}", error);
            Err(error)
        }
    }
}
