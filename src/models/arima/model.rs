//! Fitted ARIMA model.

use crate::core::ForecastResult;
use crate::error::Result;
use crate::models::arima::params::{ArimaOrder, ArmaCoefficients};
use crate::models::arima::solver;

/// A fitted seasonal ARIMA model.
///
/// Pairs the fitted coefficients with the original (undifferenced) series
/// and the index marking the end of the training data; produced once per
/// estimation call.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    order: ArimaOrder,
    coefficients: ArmaCoefficients,
    data: Vec<f64>,
    train_data_size: usize,
    rmse: f64,
}

impl ArimaModel {
    pub(crate) fn new(
        order: ArimaOrder,
        coefficients: ArmaCoefficients,
        data: Vec<f64>,
        train_data_size: usize,
    ) -> Self {
        Self {
            order,
            coefficients,
            data,
            train_data_size,
            rmse: 0.0,
        }
    }

    /// The model-order configuration.
    pub fn order(&self) -> &ArimaOrder {
        &self.order
    }

    /// The fitted coefficient state.
    pub fn coefficients(&self) -> &ArmaCoefficients {
        &self.coefficients
    }

    /// Validation RMSE of the fit (zero until set).
    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    /// Record the validation RMSE, which forecasts stamp onto their results.
    pub fn set_rmse(&mut self, rmse: f64) {
        self.rmse = rmse;
    }

    /// Forecast `forecast_size` points past the training data.
    pub fn forecast(&self, forecast_size: usize) -> Result<ForecastResult> {
        let mut result = solver::forecast_arima(
            &self.order,
            &self.coefficients,
            &self.data,
            self.train_data_size,
            self.train_data_size + forecast_size,
        )?;
        result.set_rmse(self.rmse);
        Ok(result)
    }
}
