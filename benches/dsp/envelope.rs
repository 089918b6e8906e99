//! ADSR envelope: steady hold plus the gate patterns the voice layer produces
//! (early release, retrigger while releasing, zero-length ramps).

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polysynth::{dsp::envelope::Envelope, render::RenderCtx};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let ctx = RenderCtx::new(48_000.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let split = size / 4;

        // Held note past attack/decay
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.3);
        env.note_on(&ctx);
        for _ in 0..200 {
            env.next_sample(&ctx);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Key released a quarter of the way into a long attack
        let mut env = Envelope::adsr(0.5, 0.1, 0.7, 0.05);
        group.bench_with_input(
            BenchmarkId::new("release_from_attack", size),
            &size,
            |b, _| {
                b.iter(|| {
                    env.reset();
                    env.note_on(&ctx);
                    let (head, tail) = buffer.split_at_mut(split);
                    env.render(black_box(head), &ctx);
                    env.note_off(&ctx);
                    env.render(black_box(tail), &ctx);
                })
            },
        );

        // Same key hit again while its release is still ramping; attack
        // restarts from the current level every block
        let mut env = Envelope::adsr(0.01, 0.05, 0.7, 0.5);
        env.note_on(&ctx);
        for _ in 0..4_000 {
            env.next_sample(&ctx);
        }
        env.note_off(&ctx);
        group.bench_with_input(
            BenchmarkId::new("retrigger_mid_release", size),
            &size,
            |b, _| {
                b.iter(|| {
                    let (head, tail) = buffer.split_at_mut(split);
                    env.note_on(&ctx);
                    env.render(black_box(head), &ctx);
                    env.note_off(&ctx);
                    env.render(black_box(tail), &ctx);
                })
            },
        );

        // All-zero times: every gate resolves inside `enter`
        let mut env = Envelope::adsr(0.0, 0.0, 0.5, 0.0);
        group.bench_with_input(BenchmarkId::new("zero_time_gates", size), &size, |b, _| {
            b.iter(|| {
                env.note_on(&ctx);
                env.render(black_box(&mut buffer), &ctx);
                env.note_off(&ctx);
                black_box(env.level());
            })
        });
    }

    group.finish();
}
