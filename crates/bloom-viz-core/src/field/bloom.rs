//! Smoothed bloom intensity.

use crate::audio::BandEnergies;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomTuning {
    /// Bass, mid, treble weights; sum at most 1
    pub weights: [f32; 3],
    /// Added to the target on a beat
    pub beat_bonus: f32,
    /// Fraction of the remaining distance covered per tick
    pub rate: f32,
}

impl Default for BloomTuning {
    fn default() -> Self {
        Self {
            weights: [0.4, 0.3, 0.3],
            beat_bonus: 0.6,
            rate: 0.12,
        }
    }
}

/// Exponentially smoothed glow level in [0, 1].
#[derive(Clone, Debug)]
pub struct Bloom {
    tuning: BloomTuning,
    current: f32,
    target: f32,
}

impl Bloom {
    pub fn new(tuning: BloomTuning) -> Self {
        Self {
            tuning,
            current: 0.0,
            target: 0.0,
        }
    }

    /// Missing bands pull the target to zero.
    pub fn update(&mut self, bands: Option<&BandEnergies>, beat: bool) {
        let mut target = bands.map_or(0.0, |b| b.weighted(self.tuning.weights));
        if beat {
            target += self.tuning.beat_bonus;
        }
        self.target = target.clamp(0.0, 1.0);
        self.current += (self.target - self.current) * self.tuning.rate.clamp(0.0, 1.0);
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn tuning(&self) -> &BloomTuning {
        &self.tuning
    }
}
