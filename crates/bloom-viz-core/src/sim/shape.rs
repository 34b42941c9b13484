//! Closed set of particle outlines.

use nannou::prelude::*;

use crate::viewport::polar;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Regular polygon outline
    Polygon { sides: u8 },
    /// Star with alternating outer/inner vertices
    Star { points: u8 },
    /// Soft radial gradient disc
    Blob,
    /// Short line segment along the direction of travel
    Filament,
    /// Open arc winding out from the particle position
    Spiral,
    /// Tapered radial triangle pointing away from the center
    Streak,
}

impl Shape {
    pub const TRIANGLE: Self = Shape::Polygon { sides: 3 };
    pub const DIAMOND: Self = Shape::Polygon { sides: 4 };
    pub const HEXAGON: Self = Shape::Polygon { sides: 6 };
    pub const MORPH: Self = Shape::Polygon { sides: 8 };
    pub const STAR: Self = Shape::Star { points: 5 };

    /// Outline vertices around `center`, written into `out`. Shapes without a
    /// closed outline leave `out` empty.
    ///
    /// `wobble` displaces vertices radially by up to that fraction of
    /// `radius`, phased by `phase`.
    pub fn outline(
        self,
        center: Vec2,
        radius: f32,
        rotation: f32,
        wobble: f32,
        phase: f32,
        out: &mut Vec<Vec2>,
    ) {
        out.clear();
        match self {
            Shape::Polygon { sides } => {
                let sides = sides.max(3) as usize;
                for i in 0..sides {
                    let angle = rotation + i as f32 / sides as f32 * TAU;
                    let r = radius * (1.0 + (phase + i as f32 * 2.0).sin() * wobble);
                    out.push(center + polar(angle, r));
                }
            }
            Shape::Star { points } => {
                let points = points.max(3) as usize;
                for i in 0..points * 2 {
                    let angle = rotation + i as f32 / (points * 2) as f32 * TAU;
                    let r = if i % 2 == 0 { radius } else { radius * 0.45 };
                    out.push(center + polar(angle, r));
                }
            }
            Shape::Blob | Shape::Filament | Shape::Spiral | Shape::Streak => {}
        }
    }
}
