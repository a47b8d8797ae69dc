//! End-to-end ARIMA pipeline: differencing, centering, estimation,
//! recursive forecasting, RMSE validation, and confidence intervals.

use crate::core::ForecastResult;
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{shift, Differencer};
use crate::models::arima::hannan_rissanen::{self, MAX_ITERATIONS};
use crate::models::arima::model::ArimaModel;
use crate::models::arima::params::{ArimaOrder, ArmaCoefficients};
use crate::utils::{mean, variance};

/// Condition-number bound applied to every SPD solve in the pipeline.
pub const MAX_CONDITION_NUMBER: f64 = 100.0;

/// Fraction of the series held out for validation RMSE.
pub const TEST_SET_PERCENTAGE: f64 = 0.15;

/// Two-sided 95% normal critical value.
pub const CONFIDENCE_CONSTANT_95PCT: f64 = 1.959963984540054;

/// One-step-ahead recursive ARMA forecast over `[start_index, end_index)`.
///
/// Below `start_index` the recursion replays the training data and records
/// residual errors as actual minus predicted; at and beyond `start_index`
/// each prediction becomes the next "actual" value and its residual is
/// defined as zero, so the forecast assumes no future shocks.
pub fn forecast_arma(
    coeffs: &ArmaCoefficients,
    data_stationary: &[f64],
    start_index: usize,
    end_index: usize,
) -> Result<Vec<f64>> {
    if end_index < start_index {
        return Err(ForecastError::InvalidParameter(format!(
            "invalid forecast window: start={start_index}, end={end_index}"
        )));
    }
    if start_index > data_stationary.len() {
        return Err(ForecastError::IndexOutOfBounds {
            index: start_index,
            size: data_stationary.len(),
        });
    }

    let train_len = start_index;
    let total_len = end_index;
    let mut data = vec![0.0; total_len];
    data[..train_len].copy_from_slice(&data_stationary[..train_len]);
    let mut errors = vec![0.0; total_len];
    let mut forecasts = vec![0.0; total_len - train_len];

    let start_idx = coeffs.degree_ar().max(coeffs.degree_ma());
    // Replay the training region to populate residual errors.
    for j in start_idx..train_len {
        let forecast = coeffs.forecast_one_point(&data, &errors, j)?;
        errors[j] = data[j] - forecast;
    }
    // Forecast with zero future shocks.
    for j in train_len..total_len {
        let forecast = coeffs.forecast_one_point(&data, &errors, j)?;
        data[j] = forecast;
        errors[j] = 0.0;
        forecasts[j - train_len] = forecast;
    }
    Ok(forecasts)
}

/// Estimate a seasonal ARIMA model on `data[..forecast_start_index]`.
///
/// Differencing (seasonal rounds before non-seasonal), centering, then
/// Hannan-Rissanen coefficient fitting with the window
/// `[forecast_start_index, forecast_end_index)` as the validation tail.
pub fn estimate_arima(
    order: ArimaOrder,
    data: &[f64],
    forecast_start_index: usize,
    forecast_end_index: usize,
) -> Result<ArimaModel> {
    check_arima_data_length(&order, data, forecast_start_index, forecast_end_index)?;

    let forecast_length = forecast_end_index - forecast_start_index;
    let data_train = &data[..forecast_start_index];

    let mut differencer = Differencer::new(&order);
    let mut data_stationary = differencer.difference(data_train)?;

    let mean_stationary = mean(&data_stationary);
    shift(&mut data_stationary, -mean_stationary);

    let mut coeffs = ArmaCoefficients::new(&order)?;
    hannan_rissanen::estimate_arma(&data_stationary, &mut coeffs, forecast_length, MAX_ITERATIONS)?;

    Ok(ArimaModel::new(
        order,
        coeffs,
        data.to_vec(),
        forecast_start_index,
    ))
}

/// Forecast `[forecast_start_index, forecast_end_index)` of the original
/// series from fitted coefficients.
///
/// Repeats the differencing/centering of the estimation pass, forecasts the
/// stationary series, adds the mean back, integrates through the stored
/// initial conditions, and slices the requested window out of the
/// reconstructed series.
pub fn forecast_arima(
    order: &ArimaOrder,
    coeffs: &ArmaCoefficients,
    data: &[f64],
    forecast_start_index: usize,
    forecast_end_index: usize,
) -> Result<ForecastResult> {
    check_arima_data_length(order, data, forecast_start_index, forecast_end_index)?;

    let forecast_length = forecast_end_index - forecast_start_index;
    let data_train = &data[..forecast_start_index];

    let mut differencer = Differencer::new(order);
    let mut data_stationary = differencer.difference(data_train)?;

    let mean_stationary = mean(&data_stationary);
    shift(&mut data_stationary, -mean_stationary);
    let data_variance = variance(&data_stationary);

    let stationary_len = data_stationary.len();
    let forecast_stationary = forecast_arma(
        coeffs,
        &data_stationary,
        stationary_len,
        stationary_len + forecast_length,
    )?;

    let mut merged = data_stationary;
    merged.extend_from_slice(&forecast_stationary);
    shift(&mut merged, mean_stationary);

    let reconstructed = differencer.integrate(&merged)?;
    let forecast =
        reconstructed[forecast_start_index..forecast_start_index + forecast_length].to_vec();

    Ok(ForecastResult::new(forecast, data_variance))
}

/// RMSE between `left[start + left_index_offset .. end + left_index_offset]`
/// and `right[start..end]`.
pub fn compute_rmse(
    left: &[f64],
    right: &[f64],
    left_index_offset: usize,
    start_index: usize,
    end_index: usize,
) -> Result<f64> {
    if start_index >= end_index {
        return Err(ForecastError::InvalidParameter(format!(
            "invalid RMSE window: start={start_index}, end={end_index}"
        )));
    }
    if right.len() < end_index {
        return Err(ForecastError::DimensionMismatch {
            expected: end_index,
            got: right.len(),
        });
    }
    if left.len() < end_index + left_index_offset {
        return Err(ForecastError::DimensionMismatch {
            expected: end_index + left_index_offset,
            got: left.len(),
        });
    }

    let mut square_sum = 0.0;
    for i in start_index..end_index {
        let error = left[i + left_index_offset] - right[i];
        square_sum += error * error;
    }
    Ok((square_sum / (end_index - start_index) as f64).sqrt())
}

/// Fit-quality metric: hold out the trailing `test_data_percentage` of the
/// series, estimate on the remainder, forecast the held-out span, and return
/// the RMSE between forecast and actuals.
pub fn compute_rmse_validation(
    data: &[f64],
    test_data_percentage: f64,
    order: ArimaOrder,
) -> Result<f64> {
    let test_data_length = (data.len() as f64 * test_data_percentage) as usize;
    let training_data_end_index = data.len() - test_data_length;

    let model = estimate_arima(order, data, training_data_end_index, data.len())?;
    let result = model.forecast(test_data_length)?;
    let forecast = result.forecast();

    compute_rmse(data, forecast, training_data_end_index, 0, forecast.len())
}

/// Invert the AR part of an ARMA model to obtain the leading ψ-weights of
/// its infinite moving-average representation.
///
/// `ψ_0 = 1`; thereafter `ψ_i = ma_i + Σ_{j < min(i+1, p)} ar_j · ψ_{i-j-1}`
/// with `ψ_{-1}` treated as 1.
pub fn arma_to_ma(ar: &[f64], ma: &[f64], lag_max: usize) -> Vec<f64> {
    if lag_max == 0 {
        return Vec::new();
    }
    let p = ar.len();
    let q = ma.len();
    let mut psi = vec![0.0; lag_max];
    for i in 0..lag_max {
        let mut tmp = if i < q { ma[i] } else { 0.0 };
        for j in 0..(i + 1).min(p) {
            tmp += ar[j]
                * if i >= j + 1 {
                    psi[i - j - 1]
                } else {
                    1.0
                };
        }
        psi[i] = tmp;
    }
    let mut include_psi1 = vec![0.0; lag_max];
    include_psi1[0] = 1.0;
    for i in 1..lag_max {
        include_psi1[i] = psi[i - 1];
    }
    include_psi1
}

/// Per-horizon root cumulative sum of squared coefficients:
/// `out[i] = sqrt(Σ_{k ≤ i} coeffs[k]²)`. Monotonically non-decreasing.
pub fn cumulative_sum_of_coeff(coeffs: &[f64]) -> Vec<f64> {
    let mut cumulative = 0.0;
    coeffs
        .iter()
        .map(|value| {
            cumulative += value * value;
            cumulative.sqrt()
        })
        .collect()
}

/// Widen a forecast's confidence bounds from the fitted coefficients'
/// ψ-weight representation, scaled by the recorded RMSE and the 95% normal
/// critical value. Returns the maximum normalized variance.
pub fn set_sigma2_and_confidence_interval(
    coeffs: &ArmaCoefficients,
    forecast_result: &mut ForecastResult,
    forecast_size: usize,
) -> f64 {
    let coeffs_ar = coeffs.ar_coefficients();
    let coeffs_ma = coeffs.ma_coefficients();
    let psi = arma_to_ma(&coeffs_ar, &coeffs_ma, forecast_size);
    forecast_result.set_confidence_interval(CONFIDENCE_CONSTANT_95PCT, &cumulative_sum_of_coeff(&psi))
}

/// Validate the estimation/forecast window against the differencing minimum
/// `d + D*m`.
fn check_arima_data_length(
    order: &ArimaOrder,
    data: &[f64],
    start_index: usize,
    end_index: usize,
) -> Result<()> {
    let initial_condition_size = order.differencing_minimum();
    if data.len() < initial_condition_size
        || start_index < initial_condition_size
        || end_index <= start_index
    {
        return Err(ForecastError::InsufficientData {
            needed: initial_condition_size,
            got: data.len(),
        });
    }
    if start_index > data.len() {
        return Err(ForecastError::IndexOutOfBounds {
            index: start_index,
            size: data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn arma_to_ma_matches_closed_form() {
        let ar = [1.0, -0.25];
        let ma = [1.0, 2.0];
        let psi = arma_to_ma(&ar, &ma, 10);
        let expected = [
            1.0, 2.0, 3.75, 3.25, 2.3125, 1.5, 0.921875, 0.546875, 0.31640625, 0.1796875,
        ];
        assert_eq!(psi.len(), expected.len());
        for (got, want) in psi.iter().zip(expected.iter()) {
            assert_eq!(got, want);
        }
    }

    #[test]
    fn arma_to_ma_zero_horizon_is_empty() {
        assert!(arma_to_ma(&[0.5], &[0.2], 0).is_empty());
    }

    #[test]
    fn cumulative_sum_is_monotone() {
        let cumulative = cumulative_sum_of_coeff(&[1.0, -2.0, 0.5, 0.0]);
        assert_relative_eq!(cumulative[0], 1.0);
        assert_relative_eq!(cumulative[1], 5.0_f64.sqrt());
        for window in cumulative.windows(2) {
            assert!(window[1] >= window[0]);
        }
    }

    #[test]
    fn compute_rmse_basic() {
        let actual = [0.0, 0.0, 1.0, 2.0];
        let forecast = [2.0, 4.0];
        // left offset 2 aligns the forecast with the series tail.
        let rmse = compute_rmse(&actual, &forecast, 2, 0, 2).unwrap();
        assert_relative_eq!(rmse, (2.5_f64).sqrt());
    }

    #[test]
    fn compute_rmse_invalid_window_fails() {
        let data = [1.0, 2.0];
        assert!(compute_rmse(&data, &data, 0, 1, 1).is_err());
        assert!(compute_rmse(&data, &data, 0, 0, 3).is_err());
        assert!(compute_rmse(&data, &[1.0], 2, 0, 1).is_err());
    }

    #[test]
    fn forecast_arma_persists_ar1() {
        let order = ArimaOrder::new(1, 0, 0, 0, 0, 0, 0);
        let mut coeffs = ArmaCoefficients::new(&order).unwrap();
        coeffs.set_params(&[1.0]).unwrap();

        let data = [5.0, 5.0, 5.0, 5.0];
        let forecasts = forecast_arma(&coeffs, &data, 4, 7).unwrap();
        assert_eq!(forecasts, vec![5.0, 5.0, 5.0]);
    }

    #[test]
    fn forecast_arma_invalid_window_fails() {
        let order = ArimaOrder::new(1, 0, 0, 0, 0, 0, 0);
        let coeffs = ArmaCoefficients::new(&order).unwrap();
        assert!(forecast_arma(&coeffs, &[1.0, 2.0], 3, 4).is_err());
        assert!(forecast_arma(&coeffs, &[1.0, 2.0], 2, 1).is_err());
    }

    #[test]
    fn estimate_rejects_short_series() {
        let order = ArimaOrder::new(1, 1, 1, 0, 1, 0, 12);
        let data = vec![1.0; 10]; // minimum is d + D*m = 13
        assert!(matches!(
            estimate_arima(order, &data, 10, 11),
            Err(ForecastError::InsufficientData { needed: 13, .. })
        ));
    }

    #[test]
    fn estimate_rejects_empty_window() {
        let order = ArimaOrder::new(1, 0, 0, 0, 0, 0, 0);
        let data: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert!(estimate_arima(order, &data, 20, 20).is_err());
    }

    #[test]
    fn estimate_and_forecast_on_trend() {
        let order = ArimaOrder::new(1, 1, 0, 0, 0, 0, 0);
        let data: Vec<f64> = (0..40).map(|i| 10.0 + 2.0 * i as f64).collect();
        let model = estimate_arima(order, &data, 40, 41).unwrap();
        let result = model.forecast(5).unwrap();
        assert_eq!(result.len(), 5);
        // A pure trend differenced once is constant; the forecast keeps
        // climbing from the last training value.
        assert!(result.forecast()[0] > data[39]);
    }

    #[test]
    fn confidence_interval_scales_with_rmse() {
        let order = ArimaOrder::new(1, 0, 0, 0, 0, 0, 0);
        let mut coeffs = ArmaCoefficients::new(&order).unwrap();
        coeffs.set_params(&[0.0]).unwrap();

        let mut result = ForecastResult::new(vec![1.0, 1.0, 1.0], 1.0);
        result.set_rmse(2.0);
        set_sigma2_and_confidence_interval(&coeffs, &mut result, 3);

        for i in 0..3 {
            let width = result.upper()[i] - result.lower()[i];
            assert_relative_eq!(width, 2.0 * CONFIDENCE_CONSTANT_95PCT * 2.0);
        }
    }
}
