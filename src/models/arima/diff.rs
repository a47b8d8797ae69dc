//! Lag-d differencing and its exact inverse.

use crate::error::{ForecastError, Result};
use crate::models::arima::params::ArimaOrder;

/// Forward-difference `src` at lag `d` into `dst`, capturing the first `d`
/// source values into `initial` so the operation can be inverted exactly.
///
/// `dst[k] = src[k + d] - src[k]`.
pub fn differentiate(src: &[f64], dst: &mut [f64], initial: &mut [f64], d: usize) -> Result<()> {
    if d == 0 || initial.len() != d {
        return Err(ForecastError::InvalidParameter(format!(
            "invalid initial size={}, d={}",
            initial.len(),
            d
        )));
    }
    if src.len() <= d {
        return Err(ForecastError::InsufficientData {
            needed: d + 1,
            got: src.len(),
        });
    }
    if dst.len() != src.len() - d {
        return Err(ForecastError::DimensionMismatch {
            expected: src.len() - d,
            got: dst.len(),
        });
    }

    initial.copy_from_slice(&src[..d]);
    for k in 0..src.len() - d {
        dst[k] = src[k + d] - src[k];
    }
    Ok(())
}

/// Invert [`differentiate`]: seed `dst[..d]` from `initial`, then
/// `dst[j] = dst[j - d] + src[j - d]`.
pub fn integrate(src: &[f64], dst: &mut [f64], initial: &[f64], d: usize) -> Result<()> {
    if d == 0 || initial.len() != d {
        return Err(ForecastError::InvalidParameter(format!(
            "invalid initial size={}, d={}",
            initial.len(),
            d
        )));
    }
    if dst.len() != src.len() + d {
        return Err(ForecastError::DimensionMismatch {
            expected: src.len() + d,
            got: dst.len(),
        });
    }

    dst[..d].copy_from_slice(initial);
    for k in 0..src.len() {
        dst[k + d] = dst[k] + src[k];
    }
    Ok(())
}

/// Add `amount` to every element in place (centering / un-centering).
pub fn shift(data: &mut [f64], amount: f64) {
    for value in data.iter_mut() {
        *value += amount;
    }
}

/// Which differencing rounds an order requires.
///
/// Chosen once per estimation or forecast call and dispatched on, instead of
/// re-deriving the combination at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferencingPath {
    /// No differencing: the series is passed through unchanged.
    Passthrough,
    /// Only seasonal differencing (D rounds at lag m).
    SeasonalOnly,
    /// Only non-seasonal differencing (d rounds at lag 1).
    NonSeasonalOnly,
    /// Seasonal rounds first, then non-seasonal rounds on their output.
    Both,
}

impl DifferencingPath {
    /// Derive the path from the differencing orders.
    pub fn from_order(order: &ArimaOrder) -> Self {
        match (order.has_seasonal_i(), order.has_non_seasonal_i()) {
            (true, true) => Self::Both,
            (true, false) => Self::SeasonalOnly,
            (false, true) => Self::NonSeasonalOnly,
            (false, false) => Self::Passthrough,
        }
    }
}

/// Differencing state for one estimation or forecast call.
///
/// Each seasonal round keeps its own `m`-length initial-condition buffer and
/// each non-seasonal round its own single-value buffer; integration consumes
/// them in the same round order, which is what makes the round trip exact.
#[derive(Debug, Clone)]
pub struct Differencer {
    d: usize,
    seasonal_d: usize,
    period: usize,
    path: DifferencingPath,
    seasonal_initial: Vec<Vec<f64>>,
    non_seasonal_initial: Vec<Vec<f64>>,
}

impl Differencer {
    /// Create the differencing state for an order.
    pub fn new(order: &ArimaOrder) -> Self {
        let path = DifferencingPath::from_order(order);
        let seasonal_initial = if order.has_seasonal_i() {
            vec![vec![0.0; order.period]; order.seasonal_d]
        } else {
            Vec::new()
        };
        let non_seasonal_initial = if order.has_non_seasonal_i() {
            vec![vec![0.0; 1]; order.d]
        } else {
            Vec::new()
        };
        Self {
            d: order.d,
            seasonal_d: order.seasonal_d,
            period: order.period,
            path,
            seasonal_initial,
            non_seasonal_initial,
        }
    }

    /// The differencing path this state dispatches on.
    pub fn path(&self) -> DifferencingPath {
        self.path
    }

    /// Difference a series according to the path, capturing per-round
    /// initial conditions.
    pub fn difference(&mut self, data: &[f64]) -> Result<Vec<f64>> {
        match self.path {
            DifferencingPath::Both => {
                let seasonal = self.difference_seasonal(data)?;
                self.difference_non_seasonal(&seasonal)
            }
            DifferencingPath::SeasonalOnly => self.difference_seasonal(data),
            DifferencingPath::NonSeasonalOnly => self.difference_non_seasonal(data),
            DifferencingPath::Passthrough => Ok(data.to_vec()),
        }
    }

    /// Invert [`Differencer::difference`] on a (possibly extended) series.
    ///
    /// Rounds are undone in reverse order — non-seasonal first, then
    /// seasonal — each consuming the initial-condition buffer its forward
    /// round captured, so the round trip is lossless.
    pub fn integrate(&self, data: &[f64]) -> Result<Vec<f64>> {
        match self.path {
            DifferencingPath::Both => {
                let undone = self.integrate_non_seasonal(data)?;
                self.integrate_seasonal(&undone)
            }
            DifferencingPath::SeasonalOnly => self.integrate_seasonal(data),
            DifferencingPath::NonSeasonalOnly => self.integrate_non_seasonal(data),
            DifferencingPath::Passthrough => Ok(data.to_vec()),
        }
    }

    fn difference_seasonal(&mut self, data: &[f64]) -> Result<Vec<f64>> {
        let mut current = data.to_vec();
        for round in 0..self.seasonal_d {
            let mut next = vec![0.0; current.len().saturating_sub(self.period)];
            differentiate(
                &current,
                &mut next,
                &mut self.seasonal_initial[round],
                self.period,
            )?;
            current = next;
        }
        Ok(current)
    }

    fn difference_non_seasonal(&mut self, data: &[f64]) -> Result<Vec<f64>> {
        let mut current = data.to_vec();
        for round in 0..self.d {
            let mut next = vec![0.0; current.len().saturating_sub(1)];
            differentiate(
                &current,
                &mut next,
                &mut self.non_seasonal_initial[round],
                1,
            )?;
            current = next;
        }
        Ok(current)
    }

    fn integrate_seasonal(&self, data: &[f64]) -> Result<Vec<f64>> {
        let mut current = data.to_vec();
        for round in (0..self.seasonal_d).rev() {
            let mut next = vec![0.0; current.len() + self.period];
            integrate(&current, &mut next, &self.seasonal_initial[round], self.period)?;
            current = next;
        }
        Ok(current)
    }

    fn integrate_non_seasonal(&self, data: &[f64]) -> Result<Vec<f64>> {
        let mut current = data.to_vec();
        for round in (0..self.d).rev() {
            let mut next = vec![0.0; current.len() + 1];
            integrate(&current, &mut next, &self.non_seasonal_initial[round], 1)?;
            current = next;
        }
        Ok(current)
    }
}
