//! Frame rendering onto two CPU surfaces: the primary surface that keeps
//! trails between frames, and a half-resolution bloom surface rebuilt every
//! frame it is used and added onto the primary scaled by the bloom intensity.

mod canvas;
mod color;
mod overlay;
mod shapes;

pub use canvas::{Blend, Canvas, Paint, Stop, Style};
pub use color::{hsl_to_rgb, Color};

use nannou::prelude::*;

use crate::audio::{BandEnergies, SpectralSnapshot};
use crate::field::Accumulator;
use crate::pattern::PatternPreset;
use crate::sim::Particle;
use crate::viewport::Viewport;

/// Bloom intensity below which the bloom surface is skipped
pub const BLOOM_FLOOR: f32 = 0.05;

/// Viewport pixels per bloom pixel along each axis
pub const BLOOM_DOWNSCALE: usize = 2;

fn bloom_size(width: usize, height: usize) -> (usize, usize) {
    (width.div_ceil(BLOOM_DOWNSCALE), height.div_ceil(BLOOM_DOWNSCALE))
}

/// Which surface a draw call targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Main,
    Bloom,
}

/// Read-only view of everything a frame depends on.
pub struct Scene<'a> {
    pub preset: &'a PatternPreset,
    pub viewport: Viewport,
    pub particles: &'a [Particle],
    pub field: &'a Accumulator,
    pub bands: BandEnergies,
    pub snapshot: Option<&'a SpectralSnapshot>,
}

/// Composited output, opaque RGBA8 in row-major order.
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 4]>,
}

impl Frame {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Raw bytes for texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

pub struct Renderer {
    main: Canvas,
    bloom: Canvas,
    frame: Frame,
    scratch: Vec<Vec2>,
}

impl Renderer {
    pub fn new(viewport: &Viewport) -> Self {
        let (width, height) = viewport.pixel_size();
        let (bloom_w, bloom_h) = bloom_size(width, height);
        Self {
            main: Canvas::new(width, height),
            bloom: Canvas::with_scale(bloom_w, bloom_h, BLOOM_DOWNSCALE as f32),
            frame: Frame::new(width, height),
            scratch: Vec::with_capacity(32),
        }
    }

    /// Matches surface sizes to the viewport; the primary surface is cleared
    /// when it changes.
    pub fn resize(&mut self, viewport: &Viewport) {
        let (width, height) = viewport.pixel_size();
        if (width, height) == (self.frame.width, self.frame.height) {
            return;
        }
        let (bloom_w, bloom_h) = bloom_size(width, height);
        self.main.resize(width, height);
        self.bloom.resize(bloom_w, bloom_h);
        self.frame = Frame::new(width, height);
    }

    /// Wipes the trails, used when the pattern changes.
    pub fn clear(&mut self) {
        self.main.clear();
        self.bloom.clear();
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn render(&mut self, scene: &Scene) -> &Frame {
        self.resize(&scene.viewport);
        let intensity = scene.field.current_intensity();

        overlay::backdrop(&mut self.main, scene);
        overlay::grid(&mut self.main, scene);
        overlay::energy_field(&mut self.main, scene, intensity);

        for p in scene.particles {
            shapes::draw_particle(&mut self.main, p, Pass::Main, scene, &mut self.scratch);
        }

        overlay::foreground(&mut self.main, scene, Pass::Main, &mut self.scratch);

        if scene.field.has_bloom() && intensity > BLOOM_FLOOR {
            self.bloom.clear();
            let gate = scene.preset.bloom_gate;
            for p in scene
                .particles
                .iter()
                .filter(|p| p.opacity > gate.opacity && p.life > gate.life)
            {
                shapes::draw_particle(&mut self.bloom, p, Pass::Bloom, scene, &mut self.scratch);
            }
            overlay::bloom_glow(&mut self.bloom, scene, intensity);
            self.main.composite_add(&self.bloom, intensity);
        }

        overlay::foreground(&mut self.main, scene, Pass::Bloom, &mut self.scratch);

        self.main.write_rgba8(&mut self.frame.pixels);
        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Accumulator;
    use crate::pattern::Pattern;
    use crate::sim::{Simulation, Tick};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn render_once(pattern: Pattern, bands: BandEnergies, beat: bool) -> Vec<[u8; 4]> {
        let viewport = Viewport::new(160.0, 120.0);
        let preset = pattern.preset();
        let mut sim = Simulation::new(StdRng::seed_from_u64(1));
        let tick = Tick {
            bands,
            beat,
            viewport,
            base_hue: 200.0,
        };
        sim.populate(preset.populations, &tick, Some(40));
        let mut field = Accumulator::new(preset.field, &viewport, 200.0);
        for _ in 0..10 {
            field.update(Some(&bands), beat);
            sim.update(&tick, field.shockwave());
        }

        let snapshot = SpectralSnapshot::from_bins(vec![180; 1024]);
        let mut renderer = Renderer::new(&viewport);
        let scene = Scene {
            preset,
            viewport,
            particles: sim.particles(),
            field: &field,
            bands,
            snapshot: Some(&snapshot),
        };
        renderer.render(&scene).pixels().to_vec()
    }

    #[test]
    fn test_every_pattern_draws_something() {
        let bands = BandEnergies {
            bass: 0.8,
            mid: 0.6,
            treble: 0.5,
        };
        for pattern in Pattern::ALL {
            let pixels = render_once(pattern, bands, true);
            assert_eq!(pixels.len(), 160 * 120);
            assert!(
                pixels.iter().any(|p| p[0] > 0 || p[1] > 0 || p[2] > 0),
                "{pattern:?} rendered a black frame"
            );
            assert!(pixels.iter().all(|p| p[3] == 255));
        }
    }

    #[test]
    fn test_frame_bytes_match_dimensions() {
        let mut renderer = Renderer::new(&Viewport::new(8.0, 4.0));
        assert_eq!(renderer.frame().as_bytes().len(), 8 * 4 * 4);

        renderer.resize(&Viewport::new(16.0, 9.0));
        assert_eq!(renderer.frame().width(), 16);
        assert_eq!(renderer.frame().as_bytes().len(), 16 * 9 * 4);
        assert_eq!((renderer.bloom.width(), renderer.bloom.height()), (8, 5));
    }
}
