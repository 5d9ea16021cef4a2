//! Least-squares polynomial fitting via the normal equations.

use nalgebra::{DMatrix, DVector};

use crate::regression::{Degree, NumericError, SampleSet};

/// Outcome of a fit before scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum Fit {
    /// Too few samples to fit the degree: all coefficients are zero and the fit is not scored.
    Default(Degree),

    /// Coefficients ordered from the intercept up to the highest power.
    Solved(Vec<f64>),
}

impl Fit {
    #[must_use]
    pub fn coefficients(&self) -> Vec<f64> {
        match self {
            Self::Default(degree) => vec![0.0; degree.n_coefficients()],
            Self::Solved(coefficients) => coefficients.clone(),
        }
    }
}

/// Solves the normal equations `(AᵗA)·b = Aᵗy` in the normalised variable
/// `t = (x − shift) / half_range`, which maps the samples onto `[-1, 1]`,
/// and expands `b` back into the coefficients of `x`.
///
/// Row `i` of `A` is `[1, tᵢ, …, tᵢ^degree]`, its columns are scaled to unit norm.
/// The numerical rank uses the tolerance `max(n, k) · ε · σ_max`.
/// A full-rank design with `σ_min / σ_max < √ε` is rejected as ill-conditioned.
pub fn fit(samples: &SampleSet, degree: Degree) -> Result<Fit, NumericError> {
    let n_samples = samples.len();
    if n_samples < degree.min_samples() {
        return Ok(Fit::Default(degree));
    }
    let n_coefficients = degree.n_coefficients();

    let (shift, half_range) = normalisation(samples.x());
    let mut design = DMatrix::from_fn(n_samples, n_coefficients, |i, k| {
        ((samples.x()[i] - shift) / half_range).powi(k as i32)
    });
    let scales: Vec<f64> = design
        .column_iter()
        .map(|column| column.norm())
        .map(|norm| if norm > 0.0 { norm } else { 1.0 })
        .collect();
    for (mut column, scale) in design.column_iter_mut().zip(&scales) {
        column /= *scale;
    }

    let singular_values = design.clone().svd(false, false).singular_values;
    let (sigma_min, sigma_max) = (singular_values.min(), singular_values.max());
    let tolerance = n_samples.max(n_coefficients) as f64 * f64::EPSILON * sigma_max;
    let rank = singular_values.iter().filter(|sigma| **sigma > tolerance).count();
    if rank < n_coefficients {
        return Err(NumericError::Singular {
            rank,
            n_coefficients,
            n_samples,
        });
    }
    let ill_conditioned = NumericError::IllConditioned {
        condition: sigma_max / sigma_min,
    };
    if sigma_min < f64::EPSILON.sqrt() * sigma_max {
        return Err(ill_conditioned);
    }

    let normal = design.tr_mul(&design);
    let rhs = design.tr_mul(&DVector::from_column_slice(samples.y()));
    if !rhs.iter().all(|value| value.is_finite()) {
        return Err(NumericError::NonFinite("normal equations system"));
    }
    let solution = normal.cholesky().ok_or(ill_conditioned)?.solve(&rhs);
    let normalised: Vec<f64> = solution
        .iter()
        .zip(&scales)
        .map(|(coefficient, scale)| coefficient / scale)
        .collect();
    let coefficients = expand(&normalised, shift, half_range);
    if !coefficients.iter().all(|value| value.is_finite()) {
        return Err(NumericError::NonFinite("solution"));
    }

    Ok(Fit::Solved(coefficients))
}

/// Midpoint and half-width of the sample range, halved first so that neither overflows.
///
/// Identical samples get a unit half-width, their `t` column is then all zeros.
fn normalisation(x: &[f64]) -> (f64, f64) {
    let (min, max) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| (min.min(*x), max.max(*x)));
    let half_range = max / 2.0 - min / 2.0;
    (min / 2.0 + max / 2.0, if half_range > 0.0 { half_range } else { 1.0 })
}

/// Rewrites `Σ bₖ·((x − shift) / half_range)ᵏ` as `Σ cⱼ·xʲ`:
/// `cⱼ = half_range⁻ʲ · Σₖ C(k, j) · bₖ · (−shift / half_range)ᵏ⁻ʲ`.
fn expand(normalised: &[f64], shift: f64, half_range: f64) -> Vec<f64> {
    let ratio = -shift / half_range;
    (0..normalised.len())
        .map(|j| {
            let sum: f64 = (j..normalised.len())
                .map(|k| binomial(k, j) * normalised[k] * ratio.powi((k - j) as i32))
                .sum();
            (0..j).fold(sum, |value, _| value / half_range)
        })
        .collect()
}

fn binomial(n: usize, k: usize) -> f64 {
    (1..=k).fold(1.0, |value, i| value * (n + 1 - i) as f64 / i as f64)
}
