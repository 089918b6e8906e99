//! Benchmarks for the LFO-swept allpass phaser.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::{effects::Phaser, render::RenderCtx, PhaserSettings};

use crate::BLOCK_SIZES;

pub fn bench_phaser(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/phaser");
    let ctx = RenderCtx::new(48_000.0);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Coefficients recomputed every sample as the LFO moves
        let mut phaser = Phaser::new(&PhaserSettings {
            rate: 0.5,
            depth: 0.8,
            feedback: 0.4,
            mix: 0.5,
        });
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("swept", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                phaser.process(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
