//! Derived intensity state that lives beside the particles: the smoothed
//! bloom level, the optional energy grid and shockwave, and the beat flash
//! with its pattern hue.

mod bloom;
mod grid;
mod shockwave;

pub use bloom::{Bloom, BloomTuning};
pub use grid::{EnergyGrid, GridCell, CELL_SIZE};
pub use shockwave::{Shockwave, THICKNESS as SHOCKWAVE_THICKNESS};

use crate::audio::BandEnergies;
use crate::viewport::Viewport;

/// Flash level multiplier per tick
const FLASH_DECAY: f32 = 0.92;
/// Pattern hue jump per beat, degrees
const FLASH_HUE_STEP: f32 = 25.0;
/// Hue drift per tick at full treble, degrees
const HUE_DRIFT: f32 = 2.0;

/// Which accumulator parts a pattern uses.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldPreset {
    pub bloom: Option<BloomTuning>,
    pub grid: bool,
    pub shockwave: bool,
    pub beat_flash: bool,
    pub hue_drift: bool,
}

pub struct Accumulator {
    preset: FieldPreset,
    bloom: Option<Bloom>,
    grid: Option<EnergyGrid>,
    shockwave: Option<Shockwave>,
    flash: f32,
    hue: f32,
}

impl Accumulator {
    pub fn new(preset: FieldPreset, viewport: &Viewport, hue: f32) -> Self {
        Self {
            preset,
            bloom: preset.bloom.map(Bloom::new),
            grid: preset.grid.then(|| EnergyGrid::new(viewport)),
            shockwave: preset.shockwave.then(|| Shockwave::new(viewport)),
            flash: 0.0,
            hue,
        }
    }

    pub fn update(&mut self, bands: Option<&BandEnergies>, beat: bool) {
        let levels = bands.copied().unwrap_or_default();

        if let Some(bloom) = &mut self.bloom {
            bloom.update(bands, beat);
        }

        if let Some(grid) = &mut self.grid {
            grid.update(bands, beat);
        }

        if let Some(wave) = &mut self.shockwave {
            if beat {
                wave.trigger();
            }
            wave.advance(levels.bass);
        }

        if self.preset.beat_flash {
            if beat {
                self.flash = 1.0;
                self.hue = (self.hue + FLASH_HUE_STEP).rem_euclid(360.0);
            }
            self.flash *= FLASH_DECAY;
        }

        if self.preset.hue_drift {
            self.hue = (self.hue + levels.treble * HUE_DRIFT).rem_euclid(360.0);
        }
    }

    /// Bloom level in [0, 1]; 0 for patterns without bloom.
    pub fn current_intensity(&self) -> f32 {
        self.bloom.as_ref().map_or(0.0, Bloom::current)
    }

    pub fn has_bloom(&self) -> bool {
        self.bloom.is_some()
    }

    /// Rebuilds viewport-relative state.
    pub fn resize(&mut self, viewport: &Viewport) {
        if let Some(grid) = &mut self.grid {
            grid.rebuild(viewport);
        }
        if let Some(wave) = &mut self.shockwave {
            wave.resize(viewport);
        }
    }

    pub fn grid(&self) -> Option<&EnergyGrid> {
        self.grid.as_ref()
    }

    /// The shockwave while it is expanding.
    pub fn shockwave(&self) -> Option<&Shockwave> {
        self.shockwave.as_ref().filter(|wave| wave.is_active())
    }

    pub fn flash(&self) -> f32 {
        self.flash
    }

    /// Pattern hue in degrees.
    pub fn hue(&self) -> f32 {
        self.hue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_preset() -> FieldPreset {
        FieldPreset {
            bloom: Some(BloomTuning::default()),
            grid: true,
            shockwave: true,
            beat_flash: true,
            hue_drift: false,
        }
    }

    #[test]
    fn test_bloom_converges_without_overshoot() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut acc = Accumulator::new(full_preset(), &viewport, 0.0);
        let bands = BandEnergies {
            bass: 0.5,
            mid: 0.5,
            treble: 0.5,
        };
        let target = bands.weighted([0.4, 0.3, 0.3]);

        let mut previous = acc.current_intensity();
        for _ in 0..200 {
            acc.update(Some(&bands), false);
            let current = acc.current_intensity();
            assert!(current >= previous - 1e-6);
            assert!(current <= target.max(previous) + 1e-6);
            previous = current;
        }
        assert!((previous - target).abs() < 1e-3);
    }

    #[test]
    fn test_beat_triggers_shockwave_and_flash() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut acc = Accumulator::new(full_preset(), &viewport, 350.0);
        assert!(acc.shockwave().is_none());

        acc.update(Some(&BandEnergies::SILENT), true);
        assert!(acc.shockwave().is_some());
        assert!((acc.flash() - 0.92).abs() < 1e-6);
        assert!((acc.hue() - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_pattern_without_bloom_has_zero_intensity() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut acc = Accumulator::new(FieldPreset::default(), &viewport, 0.0);
        acc.update(Some(&BandEnergies { bass: 1.0, mid: 1.0, treble: 1.0 }), true);
        assert_eq!(acc.current_intensity(), 0.0);
        assert!(acc.grid().is_none());
    }

    #[test]
    fn test_resize_rebuilds_grid() {
        let mut acc = Accumulator::new(full_preset(), &Viewport::new(800.0, 600.0), 0.0);
        acc.resize(&Viewport::new(1920.0, 1080.0));
        assert_eq!(acc.grid().map(EnergyGrid::dims), Some((96, 54)));
    }
}
