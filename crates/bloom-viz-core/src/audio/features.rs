//! Band energies and beat detection derived from a spectral snapshot.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::SpectralSnapshot;

/// Bin ranges of the three bands, fixed and ascending.
pub const BASS_BINS: Range<usize> = 0..64;
pub const MID_BINS: Range<usize> = 64..192;
pub const TREBLE_BINS: Range<usize> = 192..512;

/// Normalized bass/mid/treble energy, each in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandEnergies {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

impl BandEnergies {
    pub const SILENT: Self = Self {
        bass: 0.0,
        mid: 0.0,
        treble: 0.0,
    };

    pub fn from_snapshot(snapshot: &SpectralSnapshot) -> Self {
        Self {
            bass: snapshot.normalized_mean(BASS_BINS),
            mid: snapshot.normalized_mean(MID_BINS),
            treble: snapshot.normalized_mean(TREBLE_BINS),
        }
    }

    /// `weights` are bass, mid, treble.
    pub fn weighted(&self, weights: [f32; 3]) -> f32 {
        self.bass * weights[0] + self.mid * weights[1] + self.treble * weights[2]
    }

    pub fn average(&self) -> f32 {
        (self.bass + self.mid + self.treble) / 3.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeatRule {
    /// Bass above threshold
    Threshold,
    /// Bass above threshold and strictly louder than the previous poll
    #[default]
    RisingEdge,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BeatConfig {
    pub threshold: f32,
    pub cooldown_ms: f64,
    pub rule: BeatRule,
    /// Beat energy is the mean of bins `0..bass_bins`.
    pub bass_bins: usize,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            threshold: 0.35,
            cooldown_ms: 200.0,
            rule: BeatRule::RisingEdge,
            bass_bins: 32,
        }
    }
}

/// Cooldown-gated beat detector. Time is in milliseconds as supplied by the
/// frame driver.
pub struct BeatDetector {
    config: BeatConfig,
    last_beat_ms: Option<f64>,
    last_bass: f32,
}

impl BeatDetector {
    pub fn new(config: BeatConfig) -> Self {
        Self {
            config,
            last_beat_ms: None,
            last_bass: 0.0,
        }
    }

    pub fn config(&self) -> &BeatConfig {
        &self.config
    }

    /// Bass energy recorded by the last `detect` call.
    pub fn last_bass(&self) -> f32 {
        self.last_bass
    }

    pub fn reset(&mut self) {
        self.last_beat_ms = None;
        self.last_bass = 0.0;
    }

    pub fn detect(&mut self, snapshot: &SpectralSnapshot, now_ms: f64) -> bool {
        let bass = snapshot.normalized_mean(0..self.config.bass_bins);
        let previous = std::mem::replace(&mut self.last_bass, bass);

        if let Some(last) = self.last_beat_ms {
            if now_ms - last < self.config.cooldown_ms {
                return false;
            }
        }

        let beat = match self.config.rule {
            BeatRule::Threshold => bass > self.config.threshold,
            BeatRule::RisingEdge => bass > self.config.threshold && bass > previous,
        };
        if beat {
            self.last_beat_ms = Some(now_ms);
        }
        beat
    }
}
