//! Where the analyzer gets its samples.
//!
//! Capture backends push mono samples into a [`SharedSamples`] ring from their
//! callback thread; the analyzer pulls the most recent window on each tick.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Default ring capacity, enough for the largest supported FFT window.
pub const DEFAULT_CAPACITY: usize = 32768;

/// A live stream of mono samples.
pub trait AudioSource {
    /// Sample rate in Hz of the samples returned by `read_latest`.
    fn sample_rate(&self) -> f32;

    /// Fills `out` with the most recent samples, oldest first. When fewer
    /// samples exist than requested the front is zero-padded. Returns the
    /// number of real samples written.
    fn read_latest(&self, out: &mut [f32]) -> usize;

    /// False once the backing device is gone for good.
    fn is_available(&self) -> bool {
        true
    }
}

struct Ring {
    samples: VecDeque<f32>,
    capacity: usize,
    sample_rate: f32,
}

/// Thread-safe sample ring shared between a capture callback and the analyzer.
#[derive(Clone)]
pub struct SharedSamples {
    inner: Arc<Mutex<Ring>>,
}

impl SharedSamples {
    pub fn new(capacity: usize, sample_rate: f32) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Ring {
                samples: VecDeque::with_capacity(capacity),
                capacity,
                sample_rate,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ring> {
        // A panicking writer leaves plain floats behind, still safe to read
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends mono samples, dropping the oldest once full.
    pub fn push(&self, data: &[f32]) {
        let mut ring = self.lock();
        for &sample in data {
            if ring.samples.len() == ring.capacity {
                ring.samples.pop_front();
            }
            ring.samples.push_back(sample);
        }
    }

    /// Mixes interleaved frames down to mono and appends them.
    pub fn push_interleaved(&self, data: &[f32], channels: usize) {
        let channels = channels.max(1);
        let mut ring = self.lock();
        for frame in data.chunks(channels) {
            let mono = frame.iter().sum::<f32>() / frame.len() as f32;
            if ring.samples.len() == ring.capacity {
                ring.samples.pop_front();
            }
            ring.samples.push_back(mono);
        }
    }

    pub fn clear(&self) {
        self.lock().samples.clear();
    }

    /// Called when a capture backend switches to a device with a different rate.
    pub fn set_sample_rate(&self, sample_rate: f32) {
        self.lock().sample_rate = sample_rate;
    }

    pub fn len(&self) -> usize {
        self.lock().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SharedSamples {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, 44100.0)
    }
}

impl AudioSource for SharedSamples {
    fn sample_rate(&self) -> f32 {
        self.lock().sample_rate
    }

    fn read_latest(&self, out: &mut [f32]) -> usize {
        let ring = self.lock();
        let available = ring.samples.len().min(out.len());
        let pad = out.len() - available;
        out[..pad].fill(0.0);
        let skip = ring.samples.len() - available;
        for (slot, &sample) in out[pad..].iter_mut().zip(ring.samples.iter().skip(skip)) {
            *slot = sample;
        }
        available
    }
}
