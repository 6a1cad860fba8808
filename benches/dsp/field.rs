//! Benchmarks for SmoothLife steps and snapshot publishing.
//!
//! These run on the field thread, not the audio thread; the numbers bound the
//! tick rate a grid size can sustain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_fx::field::{FieldGrid, FieldPublisher, SmoothLifeRules};

pub fn bench_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/field");

    for size in [32, 64, 128] {
        let radius = (size as f32 / 6.0).min(12.0);
        let rules = SmoothLifeRules::default().with_outer_radius(radius);

        let mut grid = FieldGrid::new(size, size, rules, 3).expect("grid");
        grid.randomise();
        group.bench_with_input(BenchmarkId::new("step", size), &size, |b, _| {
            b.iter(|| grid.step())
        });

        let (mut publisher, reader) = FieldPublisher::new(size, size);
        group.bench_with_input(BenchmarkId::new("publish", size), &size, |b, _| {
            b.iter(|| publisher.publish(black_box(&grid)))
        });

        group.bench_with_input(BenchmarkId::new("read_column", size), &size, |b, _| {
            b.iter(|| {
                let snapshot = reader.load();
                let mut sum = 0.0;
                for row in 0..513 {
                    sum += snapshot.sample(0.3, row as f32 / 512.0);
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}
