use std::str::FromStr;

use crate::prelude::*;

pub fn non_zero_u16(value: &str) -> Result<u16> {
    match FromStr::from_str(value)? {
        value if value >= 1 => Ok(value),
        _ => Err(anyhow!("expected a positive number")),
    }
}

pub fn sample_rate(value: &str) -> Result<f32> {
    match f32::from_str(value)? {
        value if (0.0..=1.0).contains(&value) => Ok(value),
        value => Err(anyhow!("{} is not within [0, 1]", value)),
    }
}
