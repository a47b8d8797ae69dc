//! Sparse polynomial over the backshift (lag) operator.

use crate::error::{ForecastError, Result};

/// A polynomial of the backshift operator.
///
/// The polynomial tracks which lags 0..=degree are active; lag 0 is always
/// active on construction (the own-term is always present). After
/// [`LagPolynomial::init_params`] the active non-trivial lags carry fitted
/// coefficients, and the polynomial can be evaluated as a linear combination
/// of lagged series values.
#[derive(Debug, Clone)]
pub struct LagPolynomial {
    degree: usize,
    active: Vec<bool>,
    offsets: Option<Vec<usize>>,
    coeffs: Vec<f64>,
}

impl LagPolynomial {
    /// Create a polynomial of the given degree with every lag's activation
    /// set to `initial`. Lag 0 is forced active.
    pub fn new(degree: usize, initial: bool) -> Self {
        let mut active = vec![initial; degree + 1];
        active[0] = true;
        Self {
            degree,
            active,
            offsets: None,
            coeffs: Vec::new(),
        }
    }

    /// Maximum lag of the polynomial.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Enable or disable a lag.
    pub fn set_lag(&mut self, lag: usize, enable: bool) -> Result<()> {
        if lag > self.degree {
            return Err(ForecastError::IndexOutOfBounds {
                index: lag,
                size: self.degree + 1,
            });
        }
        self.active[lag] = enable;
        Ok(())
    }

    /// Compose this polynomial with another.
    ///
    /// The result has degree `self.degree + other.degree` and its active-lag
    /// set is the pairwise sum of the two activation sets (a Minkowski sum).
    /// Coefficients of the merged lags are free parameters fitted later, not
    /// products of the component coefficients.
    pub fn compose(&self, other: &LagPolynomial) -> LagPolynomial {
        let merged_degree = self.degree + other.degree;
        let mut merged = vec![false; merged_degree + 1];
        for j in 0..=self.degree {
            if self.active[j] {
                for k in 0..=other.degree {
                    merged[j + k] = merged[j + k] || other.active[k];
                }
            }
        }
        Self {
            degree: merged_degree,
            active: merged,
            offsets: None,
            coeffs: Vec::new(),
        }
    }

    /// Freeze the parameter set: every active lag (optionally excluding
    /// lag 0) becomes a zero-initialized fitted coefficient.
    ///
    /// Must be called before any parameter access or evaluation.
    pub fn init_params(&mut self, include_zero_lag: bool) {
        self.active[0] = include_zero_lag;
        let offsets: Vec<usize> = (0..=self.degree).filter(|&j| self.active[j]).collect();
        self.coeffs = vec![0.0; offsets.len()];
        self.offsets = Some(offsets);
    }

    fn offsets_checked(&self) -> Result<&[usize]> {
        self.offsets
            .as_deref()
            .ok_or_else(|| ForecastError::InvalidParameter("parameters not initialized".to_string()))
    }

    /// Number of fitted parameters (zero before `init_params`).
    pub fn num_params(&self) -> usize {
        self.offsets.as_ref().map_or(0, |o| o.len())
    }

    /// Lags carrying fitted parameters.
    pub fn param_offsets(&self) -> Result<&[usize]> {
        self.offsets_checked()
    }

    /// Get the coefficient at the given lag.
    pub fn param(&self, lag: usize) -> Result<f64> {
        let offsets = self.offsets_checked()?;
        for (j, &offset) in offsets.iter().enumerate() {
            if offset == lag {
                return Ok(self.coeffs[j]);
            }
        }
        Err(ForecastError::InvalidParameter(format!(
            "invalid parameter index: {lag}"
        )))
    }

    /// Set the coefficient at the given lag.
    pub fn set_param(&mut self, lag: usize, value: f64) -> Result<()> {
        let offsets = self.offsets_checked()?;
        let position = offsets.iter().position(|&offset| offset == lag);
        match position {
            Some(j) => {
                self.coeffs[j] = value;
                Ok(())
            }
            None => Err(ForecastError::InvalidParameter(format!(
                "invalid parameter index: {lag}"
            ))),
        }
    }

    /// Dense coefficient array indexed by lag, zeros on inactive lags.
    ///
    /// Empty when the polynomial has degree 0 or its parameters were never
    /// initialized.
    pub fn coefficients_flattened(&self) -> Vec<f64> {
        let offsets = match &self.offsets {
            Some(offsets) if self.degree > 0 => offsets,
            _ => return Vec::new(),
        };
        let max_idx = offsets.iter().max().map_or(0, |&m| m + 1);
        let mut flattened = vec![0.0; max_idx];
        for (j, &offset) in offsets.iter().enumerate() {
            flattened[offset] = self.coeffs[j];
        }
        flattened
    }

    /// Evaluate the linear combination Σ coeff(k) · series[index − k] over
    /// the active lags.
    pub fn evaluate(&self, series: &[f64], index: usize) -> Result<f64> {
        let offsets = self.offsets_checked()?;
        if index >= series.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index,
                size: series.len(),
            });
        }
        let mut sum = 0.0;
        for (j, &offset) in offsets.iter().enumerate() {
            if offset > index {
                return Err(ForecastError::IndexOutOfBounds {
                    index,
                    size: series.len(),
                });
            }
            sum += series[index - offset] * self.coeffs[j];
        }
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lag_zero_is_always_active_on_construction() {
        let poly = LagPolynomial::new(3, false);
        assert_eq!(poly.degree(), 3);
        let mut poly = poly;
        poly.init_params(true);
        // only lag 0 active
        assert_eq!(poly.param_offsets().unwrap(), &[0]);
    }

    #[test]
    fn init_params_freezes_active_lags() {
        let mut poly = LagPolynomial::new(2, true);
        poly.init_params(false);
        assert_eq!(poly.param_offsets().unwrap(), &[1, 2]);
        assert_eq!(poly.num_params(), 2);
        assert_eq!(poly.param(1).unwrap(), 0.0);
    }

    #[test]
    fn param_access_before_init_fails() {
        let poly = LagPolynomial::new(2, true);
        assert!(matches!(
            poly.param(1),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(matches!(
            poly.evaluate(&[1.0, 2.0, 3.0], 2),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn invalid_param_index_fails() {
        let mut poly = LagPolynomial::new(2, true);
        poly.init_params(false);
        assert!(poly.param(0).is_err());
        assert!(poly.set_param(3, 1.0).is_err());
    }

    #[test]
    fn evaluate_linear_combination() {
        let mut poly = LagPolynomial::new(2, true);
        poly.init_params(false);
        poly.set_param(1, 0.5).unwrap();
        poly.set_param(2, 0.25).unwrap();
        let series = [4.0, 8.0, 100.0];
        // 0.5 * series[1] + 0.25 * series[0]
        assert_relative_eq!(poly.evaluate(&series, 2).unwrap(), 5.0);
    }

    #[test]
    fn evaluate_needs_enough_history() {
        let mut poly = LagPolynomial::new(2, true);
        poly.init_params(false);
        let series = [1.0, 2.0, 3.0];
        assert!(matches!(
            poly.evaluate(&series, 1),
            Err(ForecastError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            poly.evaluate(&series, 5),
            Err(ForecastError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn composition_is_a_minkowski_sum_of_active_lags() {
        // Non-seasonal AR(2): lags {0, 1, 2}
        let non_seasonal = LagPolynomial::new(2, true);
        // Seasonal AR(1) at period 4: lags {0, 4}
        let mut seasonal = LagPolynomial::new(4, false);
        seasonal.set_lag(4, true).unwrap();

        let mut merged = seasonal.compose(&non_seasonal);
        assert_eq!(merged.degree(), 6);
        merged.init_params(false);
        assert_eq!(merged.param_offsets().unwrap(), &[1, 2, 4, 5, 6]);
    }

    #[test]
    fn flattened_coefficients_place_values_at_lags() {
        let mut poly = LagPolynomial::new(4, false);
        poly.set_lag(2, true).unwrap();
        poly.set_lag(4, true).unwrap();
        poly.init_params(false);
        poly.set_param(2, 0.3).unwrap();
        poly.set_param(4, -0.1).unwrap();
        assert_eq!(poly.coefficients_flattened(), vec![0.0, 0.0, 0.3, 0.0, -0.1]);
    }

    #[test]
    fn flattened_coefficients_empty_before_init() {
        let poly = LagPolynomial::new(3, true);
        assert!(poly.coefficients_flattened().is_empty());
    }
}
