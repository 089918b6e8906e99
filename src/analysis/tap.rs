//! Latest-window hand-off from the audio thread to the analyser.

use std::sync::{
    atomic::{fence, AtomicU32, AtomicU64, AtomicUsize, Ordering},
    Arc,
};

/*
Overwriting Window
==================

The audio thread owns a fixed ring of `len` slots and overwrites the oldest
slot with every new sample. It never waits and never fails: if nobody reads
for a minute, the ring still holds the most recent `len` samples.

Samples are stored as `f32` bit patterns in `AtomicU32`s so both threads can
touch the same memory without locks.

A sequence counter brackets every block the writer publishes:

    seq even   → no write in progress
    seq odd    → writer is mid-block

A reader copies the ring, then checks that `seq` is still the even value it
started from. If not, the copy straddled a write and is retried. The ring is
zero-filled at creation, so before `len` samples have played the front of the
window reads as silence.
*/

/// Copy attempts before a read settles for whatever it got.
const MAX_READ_RETRIES: usize = 8;

struct Shared {
    samples: Box<[AtomicU32]>,
    /// Next slot the writer fills
    head: AtomicUsize,
    seq: AtomicU64,
}

/// Create a window of `len` samples, returning the audio-side writer and the
/// control-side reader.
pub fn window(len: usize) -> (TapWriter, TapReader) {
    let len = len.max(1);
    let shared = Arc::new(Shared {
        samples: (0..len).map(|_| AtomicU32::new(0.0f32.to_bits())).collect(),
        head: AtomicUsize::new(0),
        seq: AtomicU64::new(0),
    });
    (
        TapWriter {
            shared: Arc::clone(&shared),
            head: 0,
        },
        TapReader { shared },
    )
}

/// Audio-side end. There is exactly one; it is not `Clone`.
pub struct TapWriter {
    shared: Arc<Shared>,
    head: usize,
}

impl TapWriter {
    /// Publish a block, overwriting the oldest samples. Wait-free.
    pub fn write(&mut self, block: &[f32]) {
        let shared = &*self.shared;
        let len = shared.samples.len();

        let seq = shared.seq.load(Ordering::Relaxed);
        shared.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        for &sample in block {
            shared.samples[self.head].store(sample.to_bits(), Ordering::Relaxed);
            self.head = (self.head + 1) % len;
        }
        shared.head.store(self.head, Ordering::Relaxed);

        shared.seq.store(seq.wrapping_add(2), Ordering::Release);
    }
}

/// Control-side end.
pub struct TapReader {
    shared: Arc<Shared>,
}

impl TapReader {
    pub fn len(&self) -> usize {
        self.shared.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.samples.is_empty()
    }

    /// Copy the window oldest → newest into `out` (must be `len()` long).
    ///
    /// Returns false if every attempt overlapped a write; `out` then holds
    /// the last attempt, which may mix two neighbouring blocks.
    pub fn snapshot(&self, out: &mut [f32]) -> bool {
        let shared = &*self.shared;
        let len = shared.samples.len();
        debug_assert_eq!(out.len(), len);

        for _ in 0..MAX_READ_RETRIES {
            let before = shared.seq.load(Ordering::Acquire);
            if before % 2 == 1 {
                std::hint::spin_loop();
                continue;
            }

            let head = shared.head.load(Ordering::Relaxed);
            for (i, slot) in out.iter_mut().enumerate() {
                let bits = shared.samples[(head + i) % len].load(Ordering::Relaxed);
                *slot = f32::from_bits(bits);
            }

            fence(Ordering::Acquire);
            if shared.seq.load(Ordering::Relaxed) == before {
                return true;
            }
        }
        false
    }

    pub fn to_vec(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.len()];
        self.snapshot(&mut out);
        out
    }
}
