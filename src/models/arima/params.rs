//! Model-order configuration and fitted ARMA coefficient state.

use crate::error::{ForecastError, Result};
use crate::models::arima::lag::LagPolynomial;

/// Seasonal ARIMA(p,d,q)(P,D,Q)_m order specification.
///
/// A plain value: the seven orders are fixed at construction and never
/// change. Fitted coefficients live in [`ArmaCoefficients`], which only the
/// estimator mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    /// Non-seasonal autoregressive order (p).
    pub p: usize,
    /// Non-seasonal differencing order (d).
    pub d: usize,
    /// Non-seasonal moving-average order (q).
    pub q: usize,
    /// Seasonal autoregressive order (P).
    pub seasonal_p: usize,
    /// Seasonal differencing order (D).
    pub seasonal_d: usize,
    /// Seasonal moving-average order (Q).
    pub seasonal_q: usize,
    /// Seasonal period (m).
    pub period: usize,
}

impl ArimaOrder {
    /// Create an order from (p, d, q, P, D, Q, m).
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        seasonal_p: usize,
        seasonal_d: usize,
        seasonal_q: usize,
        period: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            period,
        }
    }

    /// Whether the order includes seasonal differencing rounds.
    pub fn has_seasonal_i(&self) -> bool {
        self.seasonal_d > 0 && self.period > 0
    }

    /// Whether the order includes non-seasonal differencing rounds.
    pub fn has_non_seasonal_i(&self) -> bool {
        self.d > 0
    }

    /// Minimum series length the differencing rounds consume: `d + D*m`.
    pub fn differencing_minimum(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    /// One-line text form used in the diagnostic log.
    pub fn summary(&self) -> String {
        format!(
            "p={}, d={}, q={}, P={}, D={}, Q={}, m={}",
            self.p,
            self.d,
            self.q,
            self.seasonal_p,
            self.seasonal_d,
            self.seasonal_q,
            self.period
        )
    }
}

/// Combine a non-seasonal operator of the given order with a seasonal one at
/// the given period into a single flat lag polynomial.
fn compose_seasonal(
    non_seasonal_order: usize,
    seasonal_order: usize,
    period: usize,
) -> Result<LagPolynomial> {
    let non_seasonal = LagPolynomial::new(non_seasonal_order, true);
    let mut seasonal = LagPolynomial::new(seasonal_order * period, false);
    for s in 1..=seasonal_order {
        seasonal.set_lag(s * period, true)?;
    }
    Ok(seasonal.compose(&non_seasonal))
}

/// Fitted AR and MA coefficient state for one model.
///
/// Owns the two composed lag polynomials; coefficients are zero until the
/// estimator installs a parameter vector with
/// [`ArmaCoefficients::set_params`].
#[derive(Debug, Clone)]
pub struct ArmaCoefficients {
    ar: LagPolynomial,
    ma: LagPolynomial,
    offsets_ar: Vec<usize>,
    offsets_ma: Vec<usize>,
}

impl ArmaCoefficients {
    /// Build the composed AR and MA polynomials for an order.
    pub fn new(order: &ArimaOrder) -> Result<Self> {
        let mut ar = compose_seasonal(order.p, order.seasonal_p, order.period)?;
        let mut ma = compose_seasonal(order.q, order.seasonal_q, order.period)?;
        ar.init_params(false);
        ma.init_params(false);
        let offsets_ar = ar.param_offsets()?.to_vec();
        let offsets_ma = ma.param_offsets()?.to_vec();
        Ok(Self {
            ar,
            ma,
            offsets_ar,
            offsets_ma,
        })
    }

    /// Degree (maximum lag) of the combined AR polynomial.
    pub fn degree_ar(&self) -> usize {
        self.ar.degree()
    }

    /// Degree (maximum lag) of the combined MA polynomial.
    pub fn degree_ma(&self) -> usize {
        self.ma.degree()
    }

    /// Number of fitted AR parameters.
    pub fn num_params_ar(&self) -> usize {
        self.offsets_ar.len()
    }

    /// Number of fitted MA parameters.
    pub fn num_params_ma(&self) -> usize {
        self.offsets_ma.len()
    }

    /// Active AR lags carrying parameters.
    pub fn offsets_ar(&self) -> &[usize] {
        &self.offsets_ar
    }

    /// Active MA lags carrying parameters.
    pub fn offsets_ma(&self) -> &[usize] {
        &self.offsets_ma
    }

    /// One-step ARMA prediction at `index`: the AR combination of the data
    /// plus the MA combination of the residual errors.
    pub fn forecast_one_point(&self, data: &[f64], errors: &[f64], index: usize) -> Result<f64> {
        let estimate_ar = self.ar.evaluate(data, index)?;
        let estimate_ma = self.ma.evaluate(errors, index)?;
        Ok(estimate_ar + estimate_ma)
    }

    /// Install a parameter vector: the first `num_params_ar` entries are AR
    /// coefficients (in offset order), the rest MA coefficients.
    pub fn set_params(&mut self, values: &[f64]) -> Result<()> {
        let expected = self.offsets_ar.len() + self.offsets_ma.len();
        if values.len() != expected {
            return Err(ForecastError::DimensionMismatch {
                expected,
                got: values.len(),
            });
        }
        let mut index = 0;
        for j in 0..self.offsets_ar.len() {
            let lag = self.offsets_ar[j];
            self.ar.set_param(lag, values[index])?;
            index += 1;
        }
        for j in 0..self.offsets_ma.len() {
            let lag = self.offsets_ma[j];
            self.ma.set_param(lag, values[index])?;
            index += 1;
        }
        Ok(())
    }

    /// Dense per-lag AR coefficients (zeros on inactive lags).
    pub fn ar_coefficients(&self) -> Vec<f64> {
        self.ar.coefficients_flattened()
    }

    /// Dense per-lag MA coefficients (zeros on inactive lags).
    pub fn ma_coefficients(&self) -> Vec<f64> {
        self.ma.coefficients_flattened()
    }
}
