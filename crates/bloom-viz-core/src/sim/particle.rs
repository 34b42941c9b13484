//! Particle state and the spawn distributions for each motion.

use nannou::prelude::*;
use rand::Rng;

use super::{Shape, Tick};
use crate::viewport::polar;

/// Trail points kept per crystal particle
pub const TRAIL_LEN: usize = 8;

/// Per-step fade of successive trail points
const TRAIL_FADE: f32 = 0.9;

/// Fixed-capacity ring of recent positions, stored inline.
#[derive(Clone, Debug, Default)]
pub struct Trail {
    points: [Vec2; TRAIL_LEN],
    head: usize,
    len: usize,
}

impl Trail {
    pub fn push(&mut self, point: Vec2) {
        self.points[self.head] = point;
        self.head = (self.head + 1) % TRAIL_LEN;
        self.len = (self.len + 1).min(TRAIL_LEN);
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Points newest first, each with its fade factor.
    pub fn iter(&self) -> impl Iterator<Item = (Vec2, f32)> + '_ {
        (0..self.len).map(move |age| {
            let idx = (self.head + TRAIL_LEN - 1 - age) % TRAIL_LEN;
            (self.points[idx], TRAIL_FADE.powi(age as i32 + 1))
        })
    }
}

/// Kinematic rule a particle follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    /// Pulled toward the center, blown outward on beats
    Attract,
    /// Free drift with a sinusoidal bass push, respawns off-screen
    Swirl,
    /// Ballistic flight outward from the center
    Burst,
    /// Radial streak accelerating away from the center
    Streak,
    /// Circular orbit whose radius breathes with the bass
    Orbit,
    /// Band-steered drift wrapping at the edges, with a trail
    Crystal,
    /// Ring particle with a bass-modulated radius
    Ripple,
}

/// When a particle is re-randomized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RespawnPolicy {
    LifeOnly,
    /// Also when the motion's escape condition holds
    LifeOrBounds,
}

impl Motion {
    pub fn respawn_policy(self) -> RespawnPolicy {
        match self {
            Motion::Attract | Motion::Burst | Motion::Orbit | Motion::Ripple => {
                RespawnPolicy::LifeOnly
            }
            Motion::Swirl | Motion::Streak | Motion::Crystal => RespawnPolicy::LifeOrBounds,
        }
    }
}

/// Motion-specific state.
#[derive(Clone, Debug)]
pub enum MotionState {
    Attract,
    Swirl {
        attraction: f32,
        wave: f32,
        morph: f32,
    },
    Burst,
    Streak {
        angle: f32,
        distance: f32,
        speed: f32,
        length: f32,
        base_length: f32,
    },
    Orbit {
        angle: f32,
        radius: f32,
        speed: f32,
    },
    Crystal {
        scale: f32,
        target_scale: f32,
        trail: Trail,
    },
    Ripple {
        angle: f32,
        radius: f32,
        base_radius: f32,
        speed: f32,
        wave: f32,
    },
}

impl MotionState {
    pub fn motion(&self) -> Motion {
        match self {
            MotionState::Attract => Motion::Attract,
            MotionState::Swirl { .. } => Motion::Swirl,
            MotionState::Burst => Motion::Burst,
            MotionState::Streak { .. } => Motion::Streak,
            MotionState::Orbit { .. } => Motion::Orbit,
            MotionState::Crystal { .. } => Motion::Crystal,
            MotionState::Ripple { .. } => Motion::Ripple,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in (0, 1]
    pub life: f32,
    /// Life lost per tick
    pub decay: f32,
    pub size: f32,
    pub base_size: f32,
    /// Degrees
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub opacity: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Phase of the size pulse
    pub pulse: f32,
    /// Beat highlight, 1 right after a beat and decaying toward 0
    pub flash: f32,
    pub shape: Shape,
    pub state: MotionState,
}

impl Particle {
    /// Fresh particle drawn from the motion's spawn distribution.
    pub fn spawn<R: Rng + ?Sized>(motion: Motion, shape: Shape, tick: &Tick, rng: &mut R) -> Self {
        let viewport = tick.viewport;
        let center = viewport.center();

        let mut p = Particle {
            pos: center,
            vel: Vec2::ZERO,
            life: 1.0,
            decay: 0.01,
            size: 1.0,
            base_size: 1.0,
            hue: 0.0,
            saturation: 0.9,
            lightness: 0.7,
            opacity: 1.0,
            rotation: rng.random_range(0.0..TAU),
            rotation_speed: 0.0,
            pulse: rng.random_range(0.0..TAU),
            flash: 0.0,
            shape,
            state: MotionState::Attract,
        };

        match motion {
            Motion::Attract => {
                let angle = rng.random_range(0.0..TAU);
                let radius = rng.random::<f32>() * viewport.width * 0.5 + 50.0;
                p.pos = center + polar(angle, radius);
                p.base_size = rng.random_range(1.0..4.0);
                p.rotation_speed = rng.random_range(-0.02..0.02);
                p.decay = rng.random_range(0.005..0.01);
                p.opacity = 0.0;
                p.hue = rng.random_range(200.0..260.0);
            }
            Motion::Swirl => {
                p.pos = viewport.random_point(rng);
                p.vel = vec2(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
                p.base_size = rng.random_range(2.0..6.0);
                p.opacity = rng.random_range(0.2..1.0);
                p.hue = rng.random_range(0.0..360.0);
                p.saturation = rng.random_range(0.5..1.0);
                p.lightness = rng.random_range(0.6..1.0);
                p.decay = rng.random_range(0.002..0.007);
                p.rotation_speed = rng.random_range(-0.05..0.05);
                p.state = MotionState::Swirl {
                    attraction: rng.random_range(0.0005..0.0015),
                    wave: rng.random_range(0.0..TAU),
                    morph: rng.random_range(0.0..TAU),
                };
            }
            Motion::Burst => {
                let angle = rng.random_range(0.0..TAU);
                p.vel = polar(angle, rng.random_range(1.0..3.0));
                p.decay = rng.random_range(0.002..0.01);
                p.base_size = rng.random_range(1.0..3.0);
                p.hue = rng.random_range(190.0..310.0);
                p.lightness = 0.75;
            }
            Motion::Streak => {
                let angle = rng.random_range(0.0..TAU);
                let distance = rng.random_range(0.0..10.0);
                let speed = rng.random_range(1.0..3.0);
                let base_length = rng.random_range(30.0..70.0);
                p.pos = center + polar(angle, distance);
                p.vel = polar(angle, speed);
                p.decay = rng.random_range(0.005..0.01);
                p.base_size = rng.random_range(3.0..9.0);
                p.hue = (tick.base_hue + rng.random_range(-40.0..40.0)).rem_euclid(360.0);
                p.saturation = 1.0;
                p.lightness = 0.6;
                p.state = MotionState::Streak {
                    angle,
                    distance,
                    speed,
                    length: base_length,
                    base_length,
                };
            }
            Motion::Orbit => {
                let angle = rng.random_range(0.0..TAU);
                let radius = rng.random_range(50.0..250.0);
                p.pos = center + polar(angle, radius);
                p.opacity = rng.random_range(0.5..1.0);
                p.hue = rng.random_range(0.0..360.0);
                p.saturation = 0.8;
                p.lightness = 0.6;
                p.decay = rng.random_range(0.005..0.015);
                p.base_size = rng.random_range(1.0..4.0);
                p.state = MotionState::Orbit {
                    angle,
                    radius,
                    speed: rng.random_range(0.005..0.025),
                };
            }
            Motion::Crystal => {
                p.pos = viewport.random_point(rng);
                p.vel = vec2(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
                p.decay = rng.random_range(0.002..0.007);
                p.opacity = rng.random_range(0.2..1.0);
                p.hue = rng.random_range(0.0..360.0);
                p.saturation = rng.random_range(0.5..1.0);
                p.lightness = 0.6;
                p.base_size = rng.random_range(3.0..8.0);
                p.rotation_speed = rng.random_range(-0.05..0.05);
                p.state = MotionState::Crystal {
                    scale: 1.0,
                    target_scale: 1.0,
                    trail: Trail::default(),
                };
            }
            Motion::Ripple => {
                let angle = rng.random_range(0.0..TAU);
                let base_radius = rng.random_range(100.0..250.0);
                p.pos = center + polar(angle, base_radius);
                p.base_size = rng.random_range(1.0..3.0);
                p.hue = rng.random_range(180.0..240.0);
                p.saturation = 0.8;
                p.lightness = 0.8;
                p.decay = rng.random_range(0.0008..0.0015);
                p.state = MotionState::Ripple {
                    angle,
                    radius: base_radius,
                    base_radius,
                    speed: rng.random_range(0.01..0.03),
                    wave: rng.random_range(0.0..TAU),
                };
            }
        }

        p.size = p.base_size;
        p
    }

    pub fn motion(&self) -> Motion {
        self.state.motion()
    }

    /// Re-randomizes this slot in place, keeping motion and shape.
    pub fn respawn<R: Rng + ?Sized>(&mut self, tick: &Tick, rng: &mut R) {
        *self = Self::spawn(self.motion(), self.shape, tick, rng);
    }

    /// Moves free-flying particles along with a re-centered viewport.
    pub fn shift(&mut self, delta: Vec2) {
        self.pos += delta;
        if let MotionState::Crystal { trail, .. } = &mut self.state {
            trail.clear();
        }
    }
}
