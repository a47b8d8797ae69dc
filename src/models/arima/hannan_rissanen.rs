//! Hannan-Rissanen iterative least-squares estimation of ARMA parameters.

use tracing::debug;

use crate::error::{ForecastError, Result};
use crate::linalg::{Matrix, Vector};
use crate::models::arima::lag::LagPolynomial;
use crate::models::arima::params::ArmaCoefficients;
use crate::models::arima::solver::{self, MAX_CONDITION_NUMBER};
use crate::models::arima::yule_walker;

/// Number of least-squares refinement iterations.
///
/// There is no convergence check; retaining the best-validating iterate is
/// the only guard against divergence in later steps.
pub const MAX_ITERATIONS: usize = 5;

/// Estimate ARMA parameters on stationary, zero-mean data.
///
/// The trailing `forecast_length` points are held out as a validation tail:
/// each refinement iteration solves the normal equations of a lagged
/// data/error design matrix, installs the candidate parameters, refreshes the
/// residual sequence, and scores the candidate by the RMSE of its forecast
/// over the tail. The best-scoring candidate across all iterations is the one
/// left installed.
pub fn estimate_arma(
    data: &[f64],
    coeffs: &mut ArmaCoefficients,
    forecast_length: usize,
    max_iteration: usize,
) -> Result<()> {
    let total_length = data.len();
    let r = 1 + coeffs.degree_ar().max(coeffs.degree_ma());
    let length = total_length
        .checked_sub(forecast_length)
        .ok_or(ForecastError::InsufficientData {
            needed: forecast_length,
            got: total_length,
        })?;
    if length < 2 * r {
        return Err(ForecastError::InsufficientData {
            needed: 2 * r,
            got: length,
        });
    }
    let size = length - r;

    // Step 1: Yule-Walker AR(r) seed and its residual-error sequence.
    let mut errors = vec![0.0; length];
    apply_yule_walker_and_get_initial_errors(data, r, length, &mut errors)?;

    // Step 2: fixed number of least-squares refinements, keeping the
    // parameter vector with the lowest validation RMSE.
    let mut best_rmse = -1.0_f64;
    let mut best_params: Option<Vec<f64>> = None;
    for iteration in 0..max_iteration {
        let estimated = iteration_step(coeffs, data, &errors, r, size)?;
        coeffs.set_params(&estimated)?;

        // Forecast the held-out validation tail and score it.
        let forecasts = solver::forecast_arma(coeffs, data, length, total_length)?;
        let rmse = solver::compute_rmse(data, &forecasts, length, 0, forecast_length)?;

        // Refresh residual errors from one-step forecasts over the
        // training region.
        let train_forecasts = solver::forecast_arma(coeffs, data, r, total_length)?;
        for j in 0..size {
            errors[j + r] = data[j + r] - train_forecasts[j];
        }

        debug!(iteration, rmse, "Hannan-Rissanen refinement step");
        if best_rmse < 0.0 || rmse < best_rmse {
            best_params = Some(estimated);
            best_rmse = rmse;
        }
    }
    if let Some(best) = best_params {
        debug!(rmse = best_rmse, "installing best-validating parameters");
        coeffs.set_params(&best)?;
    }
    Ok(())
}

/// Fit AR(r) by Yule-Walker and populate the initial residual sequence
/// `Z_t = X_t - φ_1·X_{t-1} - ... - φ_r·X_{t-r}` (first r entries zero).
fn apply_yule_walker_and_get_initial_errors(
    data: &[f64],
    r: usize,
    length: usize,
    errors: &mut [f64],
) -> Result<()> {
    let estimates = yule_walker::fit(data, r)?;

    let mut ar = LagPolynomial::new(r, true);
    ar.init_params(false);
    // The Yule-Walker result indexes lag 1 at position 0.
    for j in 0..r {
        ar.set_param(j + 1, estimates[j])?;
    }

    for m in 0..r {
        errors[m] = 0.0;
    }
    for m in r..length {
        errors[m] = data[m] - ar.evaluate(data, m)?;
    }
    Ok(())
}

/// One least-squares refinement: build the design matrix of lagged data rows
/// (one per active AR lag) stacked above lagged error rows (one per active MA
/// lag), then solve the normal equations `(Z·Zᵗ)·θ = Z·y`.
fn iteration_step(
    coeffs: &ArmaCoefficients,
    data: &[f64],
    errors: &[f64],
    r: usize,
    size: usize,
) -> Result<Vec<f64>> {
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(coeffs.num_params_ar() + coeffs.num_params_ma());
    for &lag in coeffs.offsets_ar() {
        rows.push(data[r - lag..r - lag + size].to_vec());
    }
    for &lag in coeffs.offsets_ma() {
        rows.push(errors[r - lag..r - lag + size].to_vec());
    }

    let z = Matrix::from_rows(rows)?;
    let y = Vector::from_vec(data[r..r + size].to_vec())?;

    let zy = z.times_vector(&y)?;
    let mut zz = z.compute_aat();
    let estimated = zz.solve_spd(&zy, Some(MAX_CONDITION_NUMBER))?;
    Ok(estimated.into_vec())
}
