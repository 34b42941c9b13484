//! Beat-triggered expanding ring that pushes particles outward.

use nannou::prelude::*;

use crate::viewport::Viewport;

const SPEED: f32 = 5.0;
const FORCE: f32 = 2.0;
/// Width of the band around the ring that receives the push
pub const THICKNESS: f32 = 25.0;
const LIFE_DECAY: f32 = 0.02;

#[derive(Clone, Debug)]
pub struct Shockwave {
    radius: f32,
    life: f32,
    max_radius: f32,
}

impl Shockwave {
    pub fn new(viewport: &Viewport) -> Self {
        Self {
            radius: 0.0,
            life: 0.0,
            max_radius: viewport.max_radius(),
        }
    }

    /// Restarts the ring at the center.
    pub fn trigger(&mut self) {
        self.radius = 0.0;
        self.life = 1.0;
    }

    pub fn resize(&mut self, viewport: &Viewport) {
        self.max_radius = viewport.max_radius();
    }

    /// Grows the ring; louder bass spreads it faster.
    pub fn advance(&mut self, bass: f32) {
        if !self.is_active() {
            return;
        }
        self.radius += SPEED * (1.0 + bass);
        self.life = (self.life - LIFE_DECAY).max(0.0);
    }

    pub fn is_active(&self) -> bool {
        self.life > 0.0
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    /// Outward velocity for a particle at `pos` when it rides the ring.
    pub fn impulse(&self, pos: Vec2, center: Vec2) -> Option<Vec2> {
        if !self.is_active() {
            return None;
        }
        let offset = pos - center;
        let dist = offset.length();
        if (dist - self.radius).abs() >= THICKNESS || dist == 0.0 {
            return None;
        }
        let strength = FORCE * (1.0 - dist / self.max_radius).max(0.0);
        Some(offset / dist * strength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_wave_pushes_nothing() {
        let wave = Shockwave::new(&Viewport::new(800.0, 600.0));
        assert!(wave.impulse(vec2(400.0, 300.0), vec2(400.0, 300.0)).is_none());
    }

    #[test]
    fn test_ring_pushes_outward_and_weakens_with_distance() {
        let viewport = Viewport::new(800.0, 600.0);
        let center = viewport.center();
        let mut wave = Shockwave::new(&viewport);
        wave.trigger();
        for _ in 0..10 {
            wave.advance(0.0);
        }
        assert_eq!(wave.radius(), 50.0);

        let push = wave.impulse(center + vec2(50.0, 0.0), center).unwrap();
        assert!(push.x > 0.0 && push.y == 0.0);
        assert!((push.x - 2.0 * (1.0 - 50.0 / 400.0)).abs() < 1e-5);

        assert!(wave.impulse(center + vec2(200.0, 0.0), center).is_none());
    }

    #[test]
    fn test_wave_outlives_max_radius_until_life_runs_out() {
        let viewport = Viewport::new(200.0, 100.0);
        let center = viewport.center();
        let mut wave = Shockwave::new(&viewport);
        wave.trigger();
        for _ in 0..40 {
            wave.advance(1.0);
        }
        // 400 px out on a 100 px max radius, still fading
        assert_eq!(wave.radius(), 400.0);
        assert!(wave.is_active());
        assert!(wave.impulse(center + vec2(400.0, 0.0), center).unwrap().length() == 0.0);

        for _ in 40..52 {
            wave.advance(1.0);
        }
        assert!(!wave.is_active());
    }
}
