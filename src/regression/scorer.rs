use itertools::Itertools;

use crate::regression::{Fit, NumericError, SampleSet};

/// Evaluates the polynomial at `x` (Horner's scheme, intercept first).
#[must_use]
#[inline]
pub fn predict(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |value, coefficient| value * x + coefficient)
}

/// Root-mean-square error of the fit over the samples.
///
/// A [`Fit::Default`] is never scored: its RMSE is exactly zero whatever the residuals are.
pub fn score(samples: &SampleSet, fit: &Fit) -> Result<f64, NumericError> {
    let coefficients = match fit {
        Fit::Default(_) => return Ok(0.0),
        Fit::Solved(coefficients) => coefficients,
    };
    let squared_error: f64 = samples
        .x()
        .iter()
        .zip_eq(samples.y())
        .map(|(x, y)| (y - predict(coefficients, *x)).powi(2))
        .sum();
    let rmse = (squared_error / samples.len().max(1) as f64).sqrt();
    if rmse.is_finite() {
        Ok(rmse)
    } else {
        Err(NumericError::NonFinite("RMSE"))
    }
}
