//! Seasonal ARIMA estimation and forecasting.

pub mod diff;
pub mod hannan_rissanen;
pub mod lag;
pub mod model;
pub mod params;
pub mod solver;
pub mod yule_walker;

pub use diff::{Differencer, DifferencingPath};
pub use lag::LagPolynomial;
pub use model::ArimaModel;
pub use params::{ArimaOrder, ArmaCoefficients};

use crate::core::ForecastResult;
use crate::error::{ForecastError, Result};

/// Fit a seasonal ARIMA model and forecast `forecast_size` future points.
///
/// Runs the full pipeline: estimation on the whole series, validation RMSE
/// on a trailing 15% holdout, point forecast, and ψ-weight-based 95%
/// confidence intervals. A diagnostic log entry summarizing the order and
/// input sizes is appended to the result.
///
/// Any internal failure is reported as
/// [`ForecastError::ForecastFailure`] wrapping the underlying message.
pub fn forecast(data: &[f64], forecast_size: usize, order: ArimaOrder) -> Result<ForecastResult> {
    build_forecast(data, forecast_size, order)
        .map_err(|err| ForecastError::ForecastFailure(err.to_string()))
}

fn build_forecast(
    data: &[f64],
    forecast_size: usize,
    order: ArimaOrder,
) -> Result<ForecastResult> {
    // Estimate model parameters for forecasting.
    let mut fitted_model = solver::estimate_arima(order, data, data.len(), data.len() + 1)?;

    // Compute the RMSE used in the confidence-interval computation.
    let rmse_validation = solver::compute_rmse_validation(data, solver::TEST_SET_PERCENTAGE, order)?;
    fitted_model.set_rmse(rmse_validation);

    let mut forecast_result = fitted_model.forecast(forecast_size)?;

    // Populate the confidence intervals.
    solver::set_sigma2_and_confidence_interval(
        fitted_model.coefficients(),
        &mut forecast_result,
        forecast_size,
    );

    forecast_result.append_log(&format!(
        "{{\"best model param\": \"{}\", \"forecast size\": \"{}\", \"input size\": \"{}\"}}",
        fitted_model.order().summary(),
        forecast_size,
        data.len()
    ));

    Ok(forecast_result)
}
