//! # arima-forecast
//!
//! Seasonal ARIMA(p,d,q)(P,D,Q)_m estimation and forecasting for univariate,
//! evenly-spaced time series.
//!
//! The model is fitted with the Hannan-Rissanen procedure (seeded by a
//! Yule-Walker autoregressive estimate), forecasts are produced by one-step
//! recursion on the differenced series, and 95% confidence intervals are
//! derived from the fitted model's infinite moving-average representation.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::manual_memcpy)]

pub mod core;
pub mod error;
pub mod linalg;
pub mod models;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::ForecastResult;
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::arima::{forecast, ArimaModel, ArimaOrder};
}
