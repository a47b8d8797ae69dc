//! Core result types.

pub mod forecast;

pub use forecast::ForecastResult;
