//! Benchmarks for the control-side analysis reads.

use std::hint::black_box;

use criterion::Criterion;
use polysynth::{EngineConfig, Settings, SynthEngine};

pub fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/analysis");

    let (mut engine, mut synth) =
        SynthEngine::headless(EngineConfig::default(), Settings::default()).expect("headless");
    engine.note_on(57).expect("note on");
    engine.note_on(64).expect("note on");
    let mut block = vec![0.0f32; 2048];
    synth.render_block(&mut block);

    group.bench_function("spectrum_2048", |b| {
        b.iter(|| black_box(engine.spectrum_data()))
    });

    group.bench_function("waveform_2048", |b| {
        b.iter(|| black_box(engine.waveform_data()))
    });

    group.finish();
}
