//! Per-motion tick rules.
//!
//! Every motion runs the same stages in the same order: base kinematics,
//! band perturbation, beat impulse, friction and relaxation, then
//! integration with life decay. Beat impulses are always larger than the
//! steady per-tick band push so beats read as distinct events.

use nannou::prelude::*;
use rand::Rng;

use super::particle::{MotionState, Particle, RespawnPolicy, Trail};
use super::Tick;
use crate::viewport::{polar, Viewport};

/// Crystals wrap once this far past an edge
pub const CRYSTAL_MARGIN: f32 = 50.0;

fn wrap_hue(hue: f32) -> f32 {
    hue.rem_euclid(360.0)
}

impl Particle {
    /// Runs one tick of this particle's motion rule.
    pub fn advance<R: Rng + ?Sized>(&mut self, tick: &Tick, rng: &mut R) {
        // Take the state out so the per-motion rules can borrow both halves
        let mut state = std::mem::replace(&mut self.state, MotionState::Attract);
        match &mut state {
            MotionState::Attract => self.attract(tick, rng),
            MotionState::Swirl {
                attraction,
                wave,
                morph,
            } => self.swirl(tick, *attraction, wave, morph),
            MotionState::Burst => self.burst(tick, rng),
            MotionState::Streak {
                angle,
                distance,
                speed,
                length,
                base_length,
            } => self.streak(tick, rng, *angle, distance, speed, length, *base_length),
            MotionState::Orbit {
                angle,
                radius,
                speed,
            } => self.orbit(tick, angle, radius, speed),
            MotionState::Crystal {
                scale,
                target_scale,
                trail,
            } => self.crystal(tick, rng, scale, target_scale, trail),
            MotionState::Ripple {
                angle,
                radius,
                base_radius,
                speed,
                wave,
            } => self.ripple(tick, angle, radius, *base_radius, *speed, wave),
        }
        self.state = state;
        self.life = self.life.min(1.0);
    }

    /// Whether the motion's escape condition holds, independent of life.
    pub fn escaped(&self, viewport: &Viewport) -> bool {
        match &self.state {
            MotionState::Swirl { .. } => !viewport.contains(self.pos),
            MotionState::Streak {
                distance, length, ..
            } => *distance > viewport.max_radius() + *length,
            MotionState::Crystal { .. } => self.opacity < 0.01,
            MotionState::Attract
            | MotionState::Burst
            | MotionState::Orbit { .. }
            | MotionState::Ripple { .. } => false,
        }
    }

    pub fn needs_respawn(&self, viewport: &Viewport) -> bool {
        if self.life <= 0.0 {
            return true;
        }
        match self.motion().respawn_policy() {
            RespawnPolicy::LifeOnly => false,
            RespawnPolicy::LifeOrBounds => self.escaped(viewport),
        }
    }

    fn attract<R: Rng + ?Sized>(&mut self, tick: &Tick, rng: &mut R) {
        let bands = tick.bands;
        let to_center = (tick.viewport.center() - self.pos).normalize_or_zero();

        self.vel += to_center * 0.03;

        self.size = self.base_size * (1.0 + bands.bass * 0.8);

        if tick.beat {
            let strength = (1.0 + bands.bass * 5.0).min(2.5);
            self.vel -= to_center * strength;
            self.hue = rng.random_range(300.0..360.0);
            self.flash = 1.0;
        } else {
            // Drift back into the cool range
            self.hue += (rng.random_range(200.0..260.0) - self.hue) * 0.05;
        }

        self.vel *= 0.985;
        self.opacity += (1.0 - self.opacity) * 0.05;
        self.flash *= 0.9;

        self.pos += self.vel;
        self.rotation += self.rotation_speed * (1.0 + bands.treble * 2.0);
        self.life -= self.decay;
    }

    fn swirl(&mut self, tick: &Tick, attraction: f32, wave: &mut f32, morph: &mut f32) {
        let bass = tick.bands.bass * 3.0;
        let mid = tick.bands.mid * 2.0;
        let treble = tick.bands.treble * 1.5;
        let to_center = (tick.viewport.center() - self.pos).normalize_or_zero();

        self.vel += to_center * attraction;

        self.vel += vec2(wave.sin(), wave.cos()) * bass * 0.1;
        self.size = self.base_size + bass * 2.0 + mid + self.flash * 8.0;
        self.hue = wrap_hue(self.hue + treble * 2.0);
        self.lightness = (self.lightness + mid * 0.05).min(1.0);
        *wave += 0.02 + treble * 0.05;
        *morph += 0.01 + bass * 0.02;

        if tick.beat {
            let tangent = vec2(-to_center.y, to_center.x);
            self.vel = self.vel * 1.5 + tangent * 2.0;
            self.size += 8.0;
            self.opacity = (self.opacity + 0.4).min(1.0);
            self.flash = 1.0;
        }

        self.vel *= 0.99;
        self.opacity *= 0.9999;
        self.lightness += (0.7 - self.lightness) * 0.02;
        self.flash *= 0.9;

        self.pos += self.vel;
        self.rotation += self.rotation_speed;
        self.pulse += 0.1;
        self.life -= self.decay;
    }

    fn burst<R: Rng + ?Sized>(&mut self, tick: &Tick, rng: &mut R) {
        let bands = tick.bands;

        let jitter = bands.treble * 0.1;
        self.vel += vec2(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * jitter;
        self.size = self.base_size + bands.bass * 2.0 + self.flash * 3.0;

        if tick.beat {
            self.vel += self.vel.normalize_or_zero() * 0.5;
            self.flash = self.flash.max(0.6);
        }

        self.vel *= 0.985;
        self.flash = (self.flash - 0.05).max(0.0);

        self.pos += self.vel;
        self.life -= self.decay;
    }

    #[allow(clippy::too_many_arguments)]
    fn streak<R: Rng + ?Sized>(
        &mut self,
        tick: &Tick,
        rng: &mut R,
        angle: f32,
        distance: &mut f32,
        speed: &mut f32,
        length: &mut f32,
        base_length: f32,
    ) {
        let bands = tick.bands;

        *speed += bands.mid * 0.15;
        *length = (base_length + (bands.treble - 0.2) * 60.0).max(10.0);
        self.size = (self.base_size + (bands.bass - 0.2) * 20.0).max(2.0);

        if tick.beat {
            *speed *= 2.8;
            self.life = 1.0;
            self.hue = wrap_hue(tick.base_hue + rng.random_range(-40.0..40.0));
        }

        *speed *= 0.97;

        *distance += *speed;
        self.pos = tick.viewport.center() + polar(angle, *distance);
        self.vel = polar(angle, *speed);
        self.life -= self.decay;
    }

    fn orbit(&mut self, tick: &Tick, angle: &mut f32, radius: &mut f32, speed: &mut f32) {
        let bands = tick.bands;

        *angle += *speed;

        *radius = (*radius + (bands.bass * 50.0 - 25.0) * 0.1).max(10.0);
        *speed += bands.mid * 0.01;
        self.size = self.base_size + bands.bass * 3.0;

        if tick.beat {
            *radius += 20.0;
            self.opacity = (self.opacity + 0.3).min(1.0);
            self.flash = 1.0;
        }

        *speed = (*speed * 0.95).max(0.005);
        self.opacity *= 0.998;
        self.flash *= 0.9;

        self.pos = tick.viewport.center() + polar(*angle, *radius);
        self.life -= self.decay;
    }

    fn crystal<R: Rng + ?Sized>(
        &mut self,
        tick: &Tick,
        rng: &mut R,
        scale: &mut f32,
        target_scale: &mut f32,
        trail: &mut Trail,
    ) {
        let bands = tick.bands;
        let energy = bands.average();

        trail.push(self.pos);

        // Steer by whichever band dominates; a flat spectrum gives no push
        self.vel += vec2(bands.bass - energy, bands.mid - energy) * 0.2;
        self.rotation_speed = (bands.treble - 0.5) * 0.3;
        self.hue = wrap_hue(self.hue + bands.treble * 5.0);
        self.opacity = (self.opacity + bands.mid * 0.1).min(1.0);

        if tick.beat {
            *target_scale = 2.5;
            self.vel += vec2(rng.random_range(-2.0..2.0), rng.random_range(-2.0..2.0));
            self.opacity = (self.opacity + 0.5).min(1.0);
            self.flash = 1.0;
        }

        *scale += (*target_scale - *scale) * 0.15;
        *target_scale = 1.0 + (*target_scale - 1.0) * 0.95;
        self.vel *= 0.99;
        self.opacity *= 0.999;
        self.flash *= 0.9;

        let moved = self.pos + self.vel;
        let wrapped = tick.viewport.wrap(moved, CRYSTAL_MARGIN);
        if wrapped != moved {
            trail.clear();
        }
        self.pos = wrapped;
        self.size = self.base_size * *scale;
        self.rotation += self.rotation_speed;
        self.pulse += 0.1 + energy * 0.2;
        self.life -= self.decay;
    }

    fn ripple(
        &mut self,
        tick: &Tick,
        angle: &mut f32,
        radius: &mut f32,
        base_radius: f32,
        speed: f32,
        wave: &mut f32,
    ) {
        let bands = tick.bands;

        *angle += speed;
        *wave += 0.05;

        *radius = base_radius
            + (*wave + *angle * 3.0).sin() * bands.bass * 50.0
            + bands.mid * 30.0
            + self.flash * 40.0;
        self.hue = wrap_hue(self.hue + bands.treble * 2.0);

        if tick.beat {
            *radius += 40.0;
            self.size = (self.size * 1.5).min(self.base_size * 4.0);
            self.flash = 1.0;
        }

        self.size = self.base_size + (self.size - self.base_size) * 0.95;
        self.flash *= 0.9;

        self.pos = tick.viewport.center() + polar(*angle, *radius);
        self.life -= self.decay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::BandEnergies;
    use crate::sim::{Motion, Shape};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn tick(bands: BandEnergies, beat: bool) -> Tick {
        Tick {
            bands,
            beat,
            viewport: viewport(),
            base_hue: 200.0,
        }
    }

    fn loud() -> BandEnergies {
        BandEnergies {
            bass: 0.5,
            mid: 0.5,
            treble: 0.5,
        }
    }

    #[test]
    fn test_attract_beat_pushes_outward() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut p = Particle::spawn(Motion::Attract, Shape::TRIANGLE, &tick(loud(), false), &mut rng);
        let center = viewport().center();
        let before = p.pos.distance(center);

        p.advance(&tick(loud(), true), &mut rng);
        assert!(p.vel.dot(p.pos - center) > 0.0);
        assert!(p.pos.distance(center) > before);
        assert!(p.hue >= 300.0);
    }

    #[test]
    fn test_beat_impulse_exceeds_ambient_push() {
        let quiet_tick = tick(loud(), false);
        let beat_tick = tick(loud(), true);

        for motion in [Motion::Swirl, Motion::Burst, Motion::Crystal] {
            let mut rng = StdRng::seed_from_u64(5);
            let base = Particle::spawn(motion, Shape::Blob, &quiet_tick, &mut rng);

            let mut ambient = base.clone();
            let mut rng_a = StdRng::seed_from_u64(9);
            ambient.advance(&quiet_tick, &mut rng_a);

            let mut kicked = base.clone();
            let mut rng_b = StdRng::seed_from_u64(9);
            kicked.advance(&beat_tick, &mut rng_b);

            let ambient_change = (ambient.vel - base.vel).length();
            let beat_change = (kicked.vel - base.vel).length();
            assert!(
                beat_change > ambient_change,
                "{motion:?}: beat {beat_change} <= ambient {ambient_change}"
            );
        }
    }

    #[test]
    fn test_streak_beat_refreshes_life() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut p = Particle::spawn(Motion::Streak, Shape::Streak, &tick(loud(), false), &mut rng);
        p.life = 0.3;

        p.advance(&tick(loud(), true), &mut rng);
        assert!(p.life > 0.9 && p.life <= 1.0);
    }

    #[test]
    fn test_streak_escapes_past_max_radius() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut p = Particle::spawn(Motion::Streak, Shape::Streak, &tick(loud(), false), &mut rng);
        if let MotionState::Streak { distance, .. } = &mut p.state {
            *distance = 2000.0;
        }
        assert!(p.needs_respawn(&viewport()));
    }

    #[test]
    fn test_orbit_only_respawns_on_life() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut p = Particle::spawn(Motion::Orbit, Shape::Blob, &tick(loud(), false), &mut rng);
        p.pos = vec2(-5000.0, -5000.0);
        assert!(!p.needs_respawn(&viewport()));
        p.life = 0.0;
        assert!(p.needs_respawn(&viewport()));
    }

    #[test]
    fn test_crystal_wraps_instead_of_leaving() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut p = Particle::spawn(Motion::Crystal, Shape::HEXAGON, &tick(loud(), false), &mut rng);
        p.pos = vec2(-49.0, 300.0);
        p.vel = vec2(-5.0, 0.0);
        p.opacity = 1.0;

        p.advance(&tick(BandEnergies::SILENT, false), &mut rng);
        assert!(p.pos.x > 800.0);
        assert!(!p.needs_respawn(&viewport()));
        if let MotionState::Crystal { trail, .. } = &p.state {
            assert!(trail.is_empty());
        }
    }

    #[test]
    fn test_silent_crystal_does_not_drift() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut p = Particle::spawn(Motion::Crystal, Shape::DIAMOND, &tick(loud(), false), &mut rng);
        p.vel = Vec2::ZERO;
        p.pos = viewport().center();

        p.advance(&tick(BandEnergies::SILENT, false), &mut rng);
        assert_eq!(p.vel, Vec2::ZERO);
    }
}
