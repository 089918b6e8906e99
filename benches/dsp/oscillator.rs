//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::dsp::oscillator::OscillatorBlock;

use crate::BLOCK_SIZES;

const SR: f32 = 48_000.0;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Sine - uses sin() transcendental function
        let mut osc = OscillatorBlock::sine(440.0);
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(SR));
            })
        });

        // Sawtooth - simple linear ramp
        let mut osc = OscillatorBlock::sawtooth(440.0);
        group.bench_with_input(BenchmarkId::new("sawtooth", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(SR));
            })
        });

        // Square - branch per sample
        let mut osc = OscillatorBlock::square(440.0);
        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(SR));
            })
        });

        // Triangle - absolute value
        let mut osc = OscillatorBlock::triangle(440.0);
        group.bench_with_input(BenchmarkId::new("triangle", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(SR));
            })
        });
    }

    group.finish();
}
