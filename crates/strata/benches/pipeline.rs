use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use strata::fixtures;
use strata::{LayoutOptions, Layouter, layout};

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.measurement_time(Duration::from_secs(10));

    for name in ["small", "medium", "large"] {
        let Ok(g) = fixtures::named(name) else {
            continue;
        };

        // Cold: fresh scratch buffers on every run.
        group.bench_with_input(BenchmarkId::new("cold", name), &g, |b, g| {
            b.iter(|| {
                let result = layout(black_box(g), &LayoutOptions::default());
                black_box(result.map(|r| r.total_crossings()).unwrap_or(0));
            })
        });

        // Warm: one layouter reused across runs.
        let mut layouter = Layouter::new(LayoutOptions::default());
        group.bench_with_input(BenchmarkId::new("warm", name), &g, |b, g| {
            b.iter(|| {
                let result = layouter.layout(black_box(g));
                black_box(result.map(|r| r.total_crossings()).unwrap_or(0));
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
