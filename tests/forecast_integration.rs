//! End-to-end tests of the single-call forecast facade.

use approx::assert_abs_diff_eq;
use arima_forecast::models::arima::{forecast, ArimaOrder};
use arima_forecast::ForecastError;

fn trend_with_cycle(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 50.0 + 0.8 * i as f64 + 4.0 * (i as f64 * 0.4).sin())
        .collect()
}

fn seasonal_series(n: usize, period: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            100.0
                + 0.5 * i as f64
                + 12.0 * (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin()
        })
        .collect()
}

#[test]
fn forecast_returns_requested_horizon() {
    let data = trend_with_cycle(60);
    let result = forecast(&data, 8, ArimaOrder::new(1, 1, 1, 0, 0, 0, 0)).unwrap();

    assert_eq!(result.len(), 8);
    assert_eq!(result.upper().len(), 8);
    assert_eq!(result.lower().len(), 8);
    assert!(result.forecast().iter().all(|v| v.is_finite()));
    assert!(result.rmse() >= 0.0);
}

#[test]
fn bounds_bracket_the_point_forecast() {
    let data = trend_with_cycle(60);
    let result = forecast(&data, 10, ArimaOrder::new(2, 1, 1, 0, 0, 0, 0)).unwrap();

    for i in 0..result.len() {
        assert!(result.upper()[i] >= result.forecast()[i]);
        assert!(result.lower()[i] <= result.forecast()[i]);
    }
}

#[test]
fn interval_width_grows_with_horizon() {
    let data = trend_with_cycle(80);
    let result = forecast(&data, 12, ArimaOrder::new(1, 1, 1, 0, 0, 0, 0)).unwrap();

    assert!(result.rmse() > 0.0);
    let widths: Vec<f64> = (0..result.len())
        .map(|i| result.upper()[i] - result.lower()[i])
        .collect();
    for window in widths.windows(2) {
        assert!(
            window[1] >= window[0] - 1e-12,
            "widths must not shrink: {window:?}"
        );
    }
}

#[test]
fn seasonal_model_fits_and_forecasts() {
    let data = seasonal_series(72, 12);
    let result = forecast(&data, 12, ArimaOrder::new(1, 0, 0, 0, 1, 0, 12)).unwrap();

    assert_eq!(result.len(), 12);
    assert!(result.forecast().iter().all(|v| v.is_finite()));
    // The forecast should stay in the neighborhood of the series tail.
    let last = data[data.len() - 1];
    assert!(result.forecast().iter().all(|v| (v - last).abs() < 120.0));
}

#[test]
fn constant_series_forecasts_last_value() {
    let data = vec![42.0; 40];
    let result = forecast(&data, 1, ArimaOrder::new(1, 1, 0, 0, 0, 0, 0)).unwrap();

    assert_eq!(result.len(), 1);
    assert_abs_diff_eq!(result.forecast()[0], 42.0, epsilon = 1e-6);
}

#[test]
fn all_zero_orders_fail_with_wrapped_error() {
    let data = [1.0, 2.0, 3.0, 4.0, 5.0];
    let err = forecast(&data, 1, ArimaOrder::new(0, 0, 0, 0, 0, 0, 0)).unwrap_err();

    assert!(matches!(err, ForecastError::ForecastFailure(_)));
    assert!(err
        .to_string()
        .starts_with("Failed to build ARIMA forecast: "));
}

#[test]
fn short_series_fails_with_wrapped_insufficient_data() {
    let data = [1.0, 2.0, 3.0];
    let err = forecast(&data, 2, ArimaOrder::new(0, 1, 0, 0, 1, 0, 12)).unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("Failed to build ARIMA forecast: "));
    assert!(message.contains("insufficient data"));
    // The computed minimum d + D*m appears in the message.
    assert!(message.contains("13"));
}

#[test]
fn log_entry_summarizes_the_run() {
    let data = trend_with_cycle(50);
    let result = forecast(&data, 4, ArimaOrder::new(1, 1, 0, 0, 0, 0, 0)).unwrap();

    let log = result.log();
    assert!(log.contains("p=1, d=1, q=0, P=0, D=0, Q=0, m=0"));
    assert!(log.contains("\"forecast size\": \"4\""));
    assert!(log.contains("\"input size\": \"50\""));
}
