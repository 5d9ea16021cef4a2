use serde_json::Value;

use crate::regression::RegressionError;

/// Validated samples, paired by index.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }
}

/// Checks the raw `x` and `y` values and converts them into a [`SampleSet`].
///
/// The checks run in a fixed order: both values must be arrays, then every element
/// must be a finite number, and only then are the lengths compared.
/// Booleans are rejected even though some languages treat them as 0 and 1.
pub fn validate(x: Option<&Value>, y: Option<&Value>) -> Result<SampleSet, RegressionError> {
    let (x, y) = match (x, y) {
        (Some(Value::Array(x)), Some(Value::Array(y))) => (x, y),
        _ => return Err(RegressionError::NOT_LISTS),
    };
    let x = to_numbers(x)?;
    let y = to_numbers(y)?;
    if x.len() != y.len() {
        return Err(RegressionError::LENGTH_MISMATCH);
    }
    Ok(SampleSet { x, y })
}

fn to_numbers(values: &[Value]) -> Result<Vec<f64>, RegressionError> {
    values
        .iter()
        .map(|value| match value {
            Value::Number(number) => number
                .as_f64()
                .filter(|value| value.is_finite())
                .ok_or(RegressionError::NOT_NUMBERS),
            _ => Err(RegressionError::NOT_NUMBERS),
        })
        .collect()
}
