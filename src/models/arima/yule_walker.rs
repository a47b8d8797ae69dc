//! Yule-Walker closed-form autoregressive estimation.

use crate::error::{ForecastError, Result};
use crate::linalg::{Matrix, Vector};
use crate::models::arima::solver::MAX_CONDITION_NUMBER;

/// Fit an AR(p) model to centered, stationary data.
///
/// Builds the symmetric Toeplitz system from biased sample autocovariances
/// (each lag-sum divided by the series length, not length minus lag) and
/// solves it with the condition-bounded SPD kernel. Index 0 of the returned
/// coefficients corresponds to lag 1.
pub fn fit(data: &[f64], p: usize) -> Result<Vec<f64>> {
    let length = data.len();
    if length == 0 || p < 1 {
        return Err(ForecastError::InvalidParameter(format!(
            "invalid Yule-Walker inputs: length={length}, p={p}"
        )));
    }

    let mut r = vec![0.0; p + 1];
    r[0] = data.iter().map(|value| value * value).sum::<f64>() / length as f64;
    for j in 1..=p {
        for i in 0..length.saturating_sub(j) {
            r[j] += data[i] * data[i + j];
        }
        r[j] /= length as f64;
    }

    let mut toeplitz = Matrix::toeplitz(&r[..p])?;
    let rhs = Vector::from_vec(r[1..=p].to_vec())?;
    let solution = toeplitz.solve_spd(&rhs, Some(MAX_CONDITION_NUMBER))?;
    Ok(solution.into_vec())
}
