//! Throughput of full spectrum runs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lce_core::autodiff::Linearized;
use lce_core::fields::Lorenz;
use lce_core::{lyapunov_spectrum, RunConfig, State, TangentScheme};

fn bench_lorenz_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("lorenz_spectrum");
    let field = Lorenz::default();
    let start = State::new(1.0, 1.0, 1.0);

    for pullbacks in [100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("pullbacks", pullbacks),
            &pullbacks,
            |b, &pullbacks| {
                let config = RunConfig::new(0.01, 100, 10, pullbacks);
                b.iter(|| lyapunov_spectrum(black_box(&field), config, &start).unwrap())
            },
        );
    }
    group.finish();
}

/// Hand-written linearization against the dual-number one, and the two tangent schemes.
fn bench_linearization(c: &mut Criterion) {
    let mut group = c.benchmark_group("linearization");
    let start = State::new(1.0, 1.0, 1.0);
    let config = RunConfig::new(0.01, 10, 10, 200);

    group.bench_function("analytic", |b| {
        let field = Lorenz::default();
        b.iter(|| lyapunov_spectrum(black_box(&field), config, &start).unwrap())
    });
    group.bench_function("dual", |b| {
        let field = Linearized(Lorenz::default());
        b.iter(|| lyapunov_spectrum(black_box(&field), config, &start).unwrap())
    });
    group.bench_function("stage_coupled", |b| {
        let field = Lorenz::default();
        let coupled = config.with_scheme(TangentScheme::StageCoupled);
        b.iter(|| lyapunov_spectrum(black_box(&field), coupled, &start).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_lorenz_spectrum, bench_linearization);
criterion_main!(benches);
