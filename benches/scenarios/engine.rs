//! Benchmarks for the complete engine pipeline.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_fx::{
    engine::{AudioEngine, EngineConfig, ParamId},
    field::{FieldConfig, FieldRunner},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn engine(resonators: usize, oversampling: usize) -> (AudioEngine, saavy_fx::EngineHandle) {
    let config = EngineConfig {
        sample_rate: SAMPLE_RATE,
        resonators,
        oversampling,
        report_overruns: false,
        ..Default::default()
    };
    let (engine, mut handle) = AudioEngine::new(config).expect("engine");
    handle.set_param(ParamId::VoiceSustain, 0.6).expect("param");
    handle.set_param(ParamId::DriveMix, 0.5).expect("param");
    handle.set_param(ParamId::DelayMix, 0.3).expect("param");
    handle.set_param(ParamId::MaskMix, 0.7).expect("param");
    for note in [48, 55, 60, 64] {
        handle.note_on(note, 100).expect("note");
    }
    (engine, handle)
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // === DEFAULT ===
        // 16 resonators, 2x oversampled drive, no field
        let (mut default, _handle) = engine(16, 2);
        group.bench_with_input(BenchmarkId::new("default", size), &size, |b, _| {
            b.iter(|| default.render(black_box(&mut left), black_box(&mut right)))
        });

        // === DENSE ===
        // full bank, 4x oversampling
        let (mut dense, _dense_handle) = engine(64, 4);
        group.bench_with_input(BenchmarkId::new("dense", size), &size, |b, _| {
            b.iter(|| dense.render(black_box(&mut left), black_box(&mut right)))
        });

        // === LIVE FIELD ===
        // mask remapped every block from a running simulation
        let field = FieldRunner::spawn(FieldConfig::default()).expect("field");
        let (field_engine, mut field_handle) = engine(16, 2);
        field_handle.set_param(ParamId::FieldModDepth, 1.0).expect("param");
        field_handle.set_param(ParamId::FieldScanRate, 0.5).expect("param");
        let mut live = field_engine.with_field(field.reader());
        group.bench_with_input(BenchmarkId::new("live_field", size), &size, |b, _| {
            b.iter(|| live.render(black_box(&mut left), black_box(&mut right)))
        });
    }

    group.finish();
}
