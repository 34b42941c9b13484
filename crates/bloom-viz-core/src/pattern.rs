//! The six visual patterns. Each is a preset of the same pipeline: which
//! motions populate the field, how the surface fades, which accumulator
//! parts run and which overlays are drawn.

use serde::{Deserialize, Serialize};

use crate::field::{BloomTuning, FieldPreset};
use crate::sim::{Motion, Shape};
use crate::viewport::Viewport;

/// One homogeneous group of particles.
#[derive(Clone, Copy, Debug)]
pub struct Population {
    pub motion: Motion,
    /// Shapes assigned round-robin across the group
    pub shapes: &'static [Shape],
    /// Count below `SMALL_VIEWPORT_WIDTH`
    pub small: usize,
    pub large: usize,
}

impl Population {
    pub fn count_for(&self, viewport: &Viewport) -> usize {
        if viewport.is_small() {
            self.small
        } else {
            self.large
        }
    }
}

/// How the primary surface is faded each frame to leave motion trails.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Backdrop {
    /// Flat translucent fill
    Fade { rgb: [f32; 3], alpha: f32 },
    /// Radial gradient in the pattern hue whose alpha rises with energy
    Gradient { base_alpha: f32 },
}

/// Central light drawn over the particles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glow {
    /// Breathing blue core, drawn in both passes
    Core,
    /// Large soft glow on the bloom surface only
    Halo,
    /// Hot white-orange star, drawn in both passes
    Star,
    /// Full-screen flash in the pattern hue after each beat
    Flash,
    /// Three-band colored glow on the bloom surface
    TriColor,
    /// Bright burst on the bloom surface once bloom is strong
    Burst,
}

/// Minimum particle state for the bloom pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomGate {
    pub opacity: f32,
    pub life: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct PatternPreset {
    pub name: &'static str,
    pub populations: &'static [Population],
    pub backdrop: Backdrop,
    pub field: FieldPreset,
    pub glow: Glow,
    /// Radial spectrum bars and waveform ring around the center
    pub spectrum_ring: bool,
    /// Soft energy field behind the particles once bloom is visible
    pub energy_field: bool,
    pub bloom_gate: BloomGate,
}

const OPEN_GATE: BloomGate = BloomGate {
    opacity: 0.0,
    life: 0.0,
};

const NEBULA: PatternPreset = PatternPreset {
    name: "Nebula",
    populations: &[Population {
        motion: Motion::Attract,
        shapes: &[Shape::TRIANGLE, Shape::DIAMOND],
        small: 100,
        large: 250,
    }],
    backdrop: Backdrop::Fade {
        rgb: [0.0, 0.0, 10.0 / 255.0],
        alpha: 0.1,
    },
    field: FieldPreset {
        bloom: Some(BloomTuning {
            weights: [0.4, 0.3, 0.3],
            beat_bonus: 0.6,
            rate: 0.12,
        }),
        grid: false,
        shockwave: false,
        beat_flash: false,
        hue_drift: false,
    },
    glow: Glow::Core,
    spectrum_ring: true,
    energy_field: false,
    bloom_gate: OPEN_GATE,
};

const FLUX: PatternPreset = PatternPreset {
    name: "Flux",
    populations: &[Population {
        motion: Motion::Swirl,
        shapes: &[Shape::Spiral, Shape::MORPH, Shape::Filament, Shape::Blob],
        small: 200,
        large: 400,
    }],
    backdrop: Backdrop::Gradient { base_alpha: 0.02 },
    field: FieldPreset {
        bloom: Some(BloomTuning {
            weights: [0.4, 0.3, 0.3],
            beat_bonus: 0.6,
            rate: 0.15,
        }),
        grid: true,
        shockwave: false,
        beat_flash: false,
        hue_drift: true,
    },
    glow: Glow::Halo,
    spectrum_ring: false,
    energy_field: false,
    bloom_gate: BloomGate {
        opacity: 0.2,
        life: 0.3,
    },
};

const STELLAR: PatternPreset = PatternPreset {
    name: "Stellar",
    populations: &[Population {
        motion: Motion::Burst,
        shapes: &[Shape::Blob],
        small: 300,
        large: 500,
    }],
    backdrop: Backdrop::Fade {
        rgb: [10.0 / 255.0, 5.0 / 255.0, 20.0 / 255.0],
        alpha: 0.15,
    },
    field: FieldPreset {
        bloom: Some(BloomTuning {
            weights: [0.6, 0.3, 0.1],
            beat_bonus: 0.6,
            rate: 0.12,
        }),
        grid: false,
        shockwave: true,
        beat_flash: false,
        hue_drift: false,
    },
    glow: Glow::Star,
    spectrum_ring: false,
    energy_field: false,
    bloom_gate: OPEN_GATE,
};

const FILAMENTS: PatternPreset = PatternPreset {
    name: "Filaments",
    populations: &[Population {
        motion: Motion::Streak,
        shapes: &[Shape::Streak],
        small: 150,
        large: 250,
    }],
    backdrop: Backdrop::Fade {
        rgb: [0.0, 0.0, 0.0],
        alpha: 0.18,
    },
    field: FieldPreset {
        bloom: None,
        grid: false,
        shockwave: false,
        beat_flash: true,
        hue_drift: false,
    },
    glow: Glow::Flash,
    spectrum_ring: false,
    energy_field: false,
    bloom_gate: OPEN_GATE,
};

const ORBIT: PatternPreset = PatternPreset {
    name: "Orbit",
    populations: &[Population {
        motion: Motion::Orbit,
        shapes: &[Shape::Blob],
        small: 300,
        large: 500,
    }],
    backdrop: Backdrop::Fade {
        rgb: [0.0, 0.0, 0.0],
        alpha: 0.05,
    },
    field: FieldPreset {
        bloom: Some(BloomTuning {
            weights: [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
            beat_bonus: 0.4,
            rate: 0.1,
        }),
        grid: false,
        shockwave: false,
        beat_flash: false,
        hue_drift: false,
    },
    glow: Glow::TriColor,
    spectrum_ring: false,
    energy_field: false,
    bloom_gate: OPEN_GATE,
};

const CRYSTAL: PatternPreset = PatternPreset {
    name: "Crystal",
    populations: &[
        Population {
            motion: Motion::Crystal,
            shapes: &[Shape::TRIANGLE, Shape::DIAMOND, Shape::HEXAGON, Shape::STAR],
            small: 200,
            large: 350,
        },
        Population {
            motion: Motion::Ripple,
            shapes: &[Shape::Blob],
            small: 50,
            large: 80,
        },
    ],
    backdrop: Backdrop::Fade {
        rgb: [0.0, 0.0, 0.0],
        alpha: 0.03,
    },
    field: FieldPreset {
        bloom: Some(BloomTuning {
            weights: [0.4, 0.3, 0.3],
            beat_bonus: 0.6,
            rate: 0.12,
        }),
        grid: false,
        shockwave: false,
        beat_flash: false,
        hue_drift: false,
    },
    glow: Glow::Burst,
    spectrum_ring: false,
    energy_field: true,
    bloom_gate: OPEN_GATE,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    #[default]
    Nebula,
    Flux,
    Stellar,
    Filaments,
    Orbit,
    Crystal,
}

impl Pattern {
    pub const ALL: [Pattern; 6] = [
        Pattern::Nebula,
        Pattern::Flux,
        Pattern::Stellar,
        Pattern::Filaments,
        Pattern::Orbit,
        Pattern::Crystal,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        self.preset().name
    }

    pub fn preset(self) -> &'static PatternPreset {
        match self {
            Pattern::Nebula => &NEBULA,
            Pattern::Flux => &FLUX,
            Pattern::Stellar => &STELLAR,
            Pattern::Filaments => &FILAMENTS,
            Pattern::Orbit => &ORBIT,
            Pattern::Crystal => &CRYSTAL,
        }
    }
}
