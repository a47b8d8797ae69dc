//! Benchmarks for end-to-end ARIMA estimation and forecasting.

use arima_forecast::models::arima::{forecast, ArimaOrder};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn generate_seasonal(n: usize, period: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            100.0
                + 0.3 * i as f64
                + 10.0 * (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin()
                + ((i * 37) % 11) as f64 * 0.2
        })
        .collect()
}

fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast");

    for size in [128, 256, 512, 1024].iter() {
        let data = generate_seasonal(*size, 12);

        group.bench_with_input(BenchmarkId::new("arima_111", size), size, |b, _| {
            let order = ArimaOrder::new(1, 1, 1, 0, 0, 0, 0);
            b.iter(|| forecast(black_box(&data), 12, order))
        });

        group.bench_with_input(BenchmarkId::new("sarima_101_011_12", size), size, |b, _| {
            let order = ArimaOrder::new(1, 0, 1, 0, 1, 1, 12);
            b.iter(|| forecast(black_box(&data), 12, order))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_forecast);
criterion_main!(benches);
