//! Benchmarks for polyphonic rendering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::{PolySynth, Settings, WaveType};

use crate::BLOCK_SIZES;

const SR: f32 = 48_000.0;

fn synth_with_notes(settings: Settings, notes: &[u8]) -> PolySynth {
    let mut synth = PolySynth::new(SR, settings);
    for &note in notes {
        synth.note_on(note).expect("valid note");
    }
    synth
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    // Long sustain so voices never finish mid-benchmark
    let mut pad = Settings::default();
    pad.osc1.envelope.attack = 0.5;
    pad.osc2.envelope.attack = 0.5;
    pad.osc2.wave_type = WaveType::Square;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === SINGLE NOTE ===
        // Baseline: one voice, both oscillators, shared effects
        let mut single = synth_with_notes(pad, &[69]);
        group.bench_with_input(BenchmarkId::new("single", size), &size, |b, _| {
            b.iter(|| {
                single.render_block(black_box(&mut buffer));
            })
        });

        // === TRIAD ===
        let mut triad = synth_with_notes(pad, &[60, 64, 67]);
        group.bench_with_input(BenchmarkId::new("triad", size), &size, |b, _| {
            b.iter(|| {
                triad.render_block(black_box(&mut buffer));
            })
        });

        // === DENSE CLUSTER ===
        // Sixteen voices: a full two-hand chord with the sustain pedal down
        let cluster: Vec<u8> = (48..64).collect();
        let mut dense = synth_with_notes(pad, &cluster);
        group.bench_with_input(BenchmarkId::new("cluster_16", size), &size, |b, _| {
            b.iter(|| {
                dense.render_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
