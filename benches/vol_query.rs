use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use ivsurface::source::SyntheticSource;
use ivsurface::{Pipeline, PipelineConfig, VolSurface};

fn vol_query_benchmarks(c: &mut Criterion) {
    let surface = Pipeline::new(PipelineConfig::default())
        .and_then(|p| p.run(&SyntheticSource::new()))
        .expect("synthetic surface should build")
        .into_surface();

    let mut group = c.benchmark_group("vol_query");
    group.bench_function("black_vol_interior", |b| {
        b.iter(|| surface.black_vol(black_box(0.2), black_box(447.3)).unwrap());
    });
    group.bench_function("black_vol_outside_grid", |b| {
        b.iter(|| surface.black_vol(black_box(1.0), black_box(380.0)).unwrap());
    });
    group.bench_function("black_variance", |b| {
        b.iter(|| surface.black_variance(black_box(0.2), black_box(447.3)).unwrap());
    });

    let queries: Vec<(f64, f64)> = (0..1000)
        .map(|i| (0.04 + 0.00045 * i as f64, 400.0 + 0.1 * i as f64))
        .collect();
    group.bench_function("batch_1000", |b| {
        b.iter(|| {
            queries
                .iter()
                .map(|&(t, k)| surface.black_vol(t, k).map(|v| v.0).unwrap_or(f64::NAN))
                .sum::<f64>()
        });
    });
    group.finish();
}

criterion_group!(benches, vol_query_benchmarks);
criterion_main!(benches);
