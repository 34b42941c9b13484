//! Particle simulation.
//!
//! A fixed population of agents, each following one [`Motion`] rule. The
//! population is created once per pattern; dead particles are re-randomized
//! in their slot, so the count never changes between reinitializations.

mod motion;
mod particle;
mod shape;

pub use motion::CRYSTAL_MARGIN;
pub use particle::{Motion, MotionState, Particle, RespawnPolicy, Trail, TRAIL_LEN};
pub use shape::Shape;

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use crate::audio::BandEnergies;
use crate::field::Shockwave;
use crate::pattern::Population;
use crate::viewport::Viewport;

/// Inputs shared by every particle for one tick.
#[derive(Clone, Copy, Debug)]
pub struct Tick {
    pub bands: BandEnergies,
    pub beat: bool,
    pub viewport: Viewport,
    /// Pattern-wide hue that some motions spawn around
    pub base_hue: f32,
}

impl Tick {
    /// Tick with no audio energy and no beat.
    pub fn quiet(viewport: Viewport, base_hue: f32) -> Self {
        Self {
            bands: BandEnergies::SILENT,
            beat: false,
            viewport,
            base_hue,
        }
    }
}

pub struct Simulation {
    particles: Vec<Particle>,
    rng: StdRng,
}

impl Simulation {
    pub fn new(rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            rng,
        }
    }

    /// Replaces the population. Group sizes come from the viewport width
    /// unless `first_group_count` overrides the first group.
    pub fn populate(
        &mut self,
        groups: &[Population],
        tick: &Tick,
        first_group_count: Option<usize>,
    ) {
        self.particles.clear();
        for (i, group) in groups.iter().enumerate() {
            let count = match first_group_count {
                Some(n) if i == 0 => n,
                _ => group.count_for(&tick.viewport),
            };
            self.particles.reserve(count);
            for k in 0..count {
                let shape = group
                    .shapes
                    .get(k % group.shapes.len().max(1))
                    .copied()
                    .unwrap_or(Shape::Blob);
                self.particles
                    .push(Particle::spawn(group.motion, shape, tick, &mut self.rng));
            }
            debug!(motion = ?group.motion, count, "spawned particle group");
        }
    }

    /// Advances every particle, applies an active shockwave's push, then
    /// respawns whatever died or escaped.
    pub fn update(&mut self, tick: &Tick, shockwave: Option<&Shockwave>) {
        let center = tick.viewport.center();
        for p in &mut self.particles {
            p.advance(tick, &mut self.rng);

            if let Some(push) = shockwave.and_then(|wave| wave.impulse(p.pos, center)) {
                p.vel += push;
                p.flash = 1.0;
            }

            if p.needs_respawn(&tick.viewport) {
                p.respawn(tick, &mut self.rng);
            }
        }
    }

    /// Keeps free-flying particles in place relative to a moved center.
    pub fn recenter(&mut self, from: Viewport, to: Viewport) {
        let delta = to.center() - from.center();
        if delta == Vec2::ZERO {
            return;
        }
        for p in &mut self.particles {
            p.shift(delta);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn random_hue(&mut self) -> f32 {
        self.rng.random_range(0.0..360.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use rand::SeedableRng;

    fn simulation_for(pattern: Pattern, viewport: Viewport) -> Simulation {
        let mut sim = Simulation::new(StdRng::seed_from_u64(42));
        sim.populate(pattern.preset().populations, &Tick::quiet(viewport, 200.0), None);
        sim
    }

    #[test]
    fn test_population_sizes_follow_viewport() {
        let large = simulation_for(Pattern::Crystal, Viewport::new(1920.0, 1080.0));
        assert_eq!(large.len(), 350 + 80);

        let small = simulation_for(Pattern::Crystal, Viewport::new(600.0, 800.0));
        assert_eq!(small.len(), 200 + 50);
    }

    #[test]
    fn test_override_replaces_first_group_only() {
        let viewport = Viewport::new(1920.0, 1080.0);
        let mut sim = Simulation::new(StdRng::seed_from_u64(1));
        sim.populate(
            Pattern::Crystal.preset().populations,
            &Tick::quiet(viewport, 0.0),
            Some(10),
        );
        assert_eq!(sim.len(), 10 + 80);
    }

    #[test]
    fn test_population_and_life_invariants_hold() {
        let viewport = Viewport::new(800.0, 600.0);
        let loud = BandEnergies {
            bass: 0.9,
            mid: 0.6,
            treble: 0.4,
        };

        for pattern in Pattern::ALL {
            let mut sim = simulation_for(pattern, viewport);
            let count = sim.len();
            let mut wave = Shockwave::new(&viewport);

            for frame in 0..400 {
                let beat = frame % 13 == 0;
                let tick = Tick {
                    bands: loud,
                    beat,
                    viewport,
                    base_hue: 120.0,
                };
                if beat {
                    wave.trigger();
                }
                wave.advance(loud.bass);
                sim.update(&tick, wave.is_active().then_some(&wave));

                assert_eq!(sim.len(), count);
                for p in sim.particles() {
                    assert!(
                        p.life > 0.0 && p.life <= 1.0,
                        "{pattern:?} life {} out of range",
                        p.life
                    );
                    assert!(p.pos.is_finite());
                }
            }
        }
    }

    #[test]
    fn test_recenter_shifts_free_particles() {
        let before = Viewport::new(800.0, 600.0);
        let after = Viewport::new(1920.0, 1080.0);
        let mut sim = simulation_for(Pattern::Flux, before);
        let first = sim.particles()[0].pos;

        sim.recenter(before, after);
        assert_eq!(sim.particles()[0].pos, first + vec2(560.0, 240.0));
    }
}
