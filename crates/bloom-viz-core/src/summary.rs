//! Per-frame spectrum summary for a host's bar-graph display.

use crate::audio::SpectralSnapshot;

pub const DEFAULT_BAR_COUNT: usize = 32;

/// Bar `i` samples snapshot bin `i * (len / bar_count)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpectrumSummary {
    bars: Vec<u8>,
}

impl SpectrumSummary {
    pub fn new(bar_count: usize) -> Self {
        Self {
            bars: vec![0; bar_count.max(1)],
        }
    }

    /// Resamples `snapshot`; without one every bar drops to zero.
    pub fn update(&mut self, snapshot: Option<&SpectralSnapshot>) {
        let Some(snapshot) = snapshot else {
            self.bars.fill(0);
            return;
        };
        let stride = (snapshot.len() / self.bars.len()).max(1);
        for (i, bar) in self.bars.iter_mut().enumerate() {
            *bar = snapshot.get(i * stride);
        }
    }

    pub fn bars(&self) -> &[u8] {
        &self.bars
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }
}

/// Display parameters for one bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarStyle {
    /// Pixels
    pub height: f32,
    /// Degrees
    pub hue: f32,
    /// Percent
    pub saturation: f32,
    /// Percent
    pub lightness: f32,
    /// Glow radius in pixels, present for loud bars
    pub glow: Option<f32>,
}

pub fn bar_style(value: u8) -> BarStyle {
    let intensity = value as f32 / 255.0;
    BarStyle {
        height: (intensity * 40.0).max(4.0),
        hue: intensity * 240.0 + 180.0,
        saturation: 60.0 + intensity * 40.0,
        lightness: 40.0 + intensity * 50.0,
        glow: (intensity > 0.5).then_some(intensity * 10.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bars_sample_at_stride() {
        let bins: Vec<u8> = (0..1024).map(|i| (i / 4) as u8).collect();
        let mut summary = SpectrumSummary::new(32);
        summary.update(Some(&SpectralSnapshot::from_bins(bins)));

        assert_eq!(summary.bar_count(), 32);
        assert_eq!(summary.bars()[0], 0);
        assert_eq!(summary.bars()[1], 8);
        assert_eq!(summary.bars()[31], (31 * 32 / 4) as u8);

        summary.update(None);
        assert!(summary.bars().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bar_style_extremes() {
        let quiet = bar_style(0);
        assert_eq!(quiet.height, 4.0);
        assert_eq!(quiet.hue, 180.0);
        assert_eq!(quiet.glow, None);

        let loud = bar_style(255);
        assert_eq!(loud.height, 40.0);
        assert_eq!(loud.hue, 420.0);
        assert_eq!(loud.saturation, 100.0);
        assert_eq!(loud.lightness, 90.0);
        assert_eq!(loud.glow, Some(10.0));
    }
}
