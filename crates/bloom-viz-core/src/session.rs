//! The per-tick pipeline: analyze, extract features, simulate, render.
//!
//! A [`Session`] owns every stateful part of the visualizer. Hosts feed it
//! [`SessionEvent`]s between frames and call [`Session::tick`] once per
//! display refresh.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::audio::{
    AnalyzerConfig, AudioSource, BandEnergies, BeatConfig, BeatDetector, SpectralAnalyzer,
};
use crate::error::Result;
use crate::field::Accumulator;
use crate::pattern::Pattern;
use crate::render::{Frame, Renderer, Scene};
use crate::sim::{Simulation, Tick};
use crate::summary::{SpectrumSummary, DEFAULT_BAR_COUNT};
use crate::viewport::Viewport;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub analyzer: AnalyzerConfig,
    pub beat: BeatConfig,
    pub pattern: Pattern,
    /// Replaces the viewport-derived size of the main particle group
    pub particle_count: Option<usize>,
    pub bar_count: usize,
    /// Fixed simulation seed; random when unset
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            beat: BeatConfig::default(),
            pattern: Pattern::default(),
            particle_count: None,
            bar_count: DEFAULT_BAR_COUNT,
            seed: None,
        }
    }
}

/// Inbound notifications from the host.
pub enum SessionEvent {
    /// Connects the analyzer; only the first source is accepted.
    AudioReady(Box<dyn AudioSource>),
    /// Applied at the start of the next tick; later resizes replace earlier
    /// pending ones.
    Resize { width: f32, height: f32 },
    /// Reinitializes particles and field for the new pattern.
    SetPattern(Pattern),
}

/// Outbound notifications, both optional.
pub trait FrameListener {
    /// Fired once per detected beat, before the frame is drawn.
    fn on_beat_detected(&mut self) {}

    fn on_frame_rendered(&mut self, _summary: &SpectrumSummary) {}
}

impl FrameListener for () {}

pub struct Session {
    config: SessionConfig,
    analyzer: SpectralAnalyzer,
    beat: BeatDetector,
    simulation: Simulation,
    field: Accumulator,
    renderer: Renderer,
    summary: SpectrumSummary,
    viewport: Viewport,
    pending_resize: Option<Viewport>,
    pattern: Pattern,
    bands: BandEnergies,
}

impl Session {
    pub fn new(config: SessionConfig, width: f32, height: f32) -> Result<Self> {
        let analyzer = SpectralAnalyzer::new(config.analyzer.clone())?;
        let viewport = Viewport::new(width, height);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let pattern = config.pattern;
        let mut simulation = Simulation::new(rng);
        let hue = simulation.random_hue();
        let field = Accumulator::new(pattern.preset().field, &viewport, hue);
        simulation.populate(
            pattern.preset().populations,
            &Tick::quiet(viewport, hue),
            config.particle_count,
        );
        info!(
            pattern = pattern.name(),
            particles = simulation.len(),
            width = viewport.width,
            height = viewport.height,
            "session created"
        );

        Ok(Self {
            beat: BeatDetector::new(config.beat.clone()),
            renderer: Renderer::new(&viewport),
            summary: SpectrumSummary::new(config.bar_count),
            analyzer,
            simulation,
            field,
            viewport,
            pending_resize: None,
            pattern,
            bands: BandEnergies::SILENT,
            config,
        })
    }

    pub fn handle(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::AudioReady(source) => self.analyzer.initialize(source),
            SessionEvent::Resize { width, height } => {
                self.pending_resize = Some(Viewport::new(width, height));
                Ok(())
            }
            SessionEvent::SetPattern(pattern) => {
                self.set_pattern(pattern);
                Ok(())
            }
        }
    }

    fn set_pattern(&mut self, pattern: Pattern) {
        let preset = pattern.preset();
        let hue = self.simulation.random_hue();
        self.field = Accumulator::new(preset.field, &self.viewport, hue);
        self.simulation.populate(
            preset.populations,
            &Tick::quiet(self.viewport, hue),
            self.config.particle_count,
        );
        self.renderer.clear();
        self.pattern = pattern;
        info!(
            pattern = pattern.name(),
            particles = self.simulation.len(),
            "pattern switched"
        );
    }

    fn apply_resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        let previous = std::mem::replace(&mut self.viewport, viewport);
        self.simulation.recenter(previous, viewport);
        self.field.resize(&viewport);
        self.renderer.resize(&viewport);
        debug!(
            width = viewport.width,
            height = viewport.height,
            "viewport resized"
        );
    }

    /// Runs one frame. Without audio the pipeline keeps going on silent input.
    pub fn tick<L: FrameListener + ?Sized>(&mut self, now_ms: f64, listener: &mut L) -> &Frame {
        if let Some(viewport) = self.pending_resize.take() {
            self.apply_resize(viewport);
        }

        let snapshot = self.analyzer.poll();
        let (bands, beat) = match snapshot {
            Some(snapshot) => (
                BandEnergies::from_snapshot(snapshot),
                self.beat.detect(snapshot, now_ms),
            ),
            None => (BandEnergies::SILENT, false),
        };
        self.bands = bands;

        if beat {
            trace!(now_ms, bass = bands.bass, "beat");
            listener.on_beat_detected();
        }

        self.field.update(snapshot.is_some().then_some(&bands), beat);
        let tick = Tick {
            bands,
            beat,
            viewport: self.viewport,
            base_hue: self.field.hue(),
        };
        self.simulation.update(&tick, self.field.shockwave());

        let scene = Scene {
            preset: self.pattern.preset(),
            viewport: self.viewport,
            particles: self.simulation.particles(),
            field: &self.field,
            bands,
            snapshot,
        };
        self.renderer.render(&scene);

        self.summary.update(snapshot);
        listener.on_frame_rendered(&self.summary);

        self.renderer.frame()
    }

    pub fn frame(&self) -> &Frame {
        self.renderer.frame()
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particle_count(&self) -> usize {
        self.simulation.len()
    }

    /// Band energies from the latest tick.
    pub fn bands(&self) -> BandEnergies {
        self.bands
    }

    pub fn bloom_intensity(&self) -> f32 {
        self.field.current_intensity()
    }

    pub fn is_audio_ready(&self) -> bool {
        self.analyzer.is_ready()
    }

    pub fn summary(&self) -> &SpectrumSummary {
        &self.summary
    }
}
