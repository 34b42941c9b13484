//! Drawing-surface dimensions and the geometry helpers built on them.
//!
//! Coordinates are surface pixels: origin at the top-left corner, y grows
//! downward.

use nannou::prelude::*;
use rand::Rng;

/// Widths below this get the small particle population
pub const SMALL_VIEWPORT_WIDTH: f32 = 768.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Dimensions are clamped to at least one pixel.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.width / 2.0, self.height / 2.0)
    }

    pub fn max_dim(&self) -> f32 {
        self.width.max(self.height)
    }

    pub fn min_dim(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Farthest reach of an effect centered on the surface before it clips.
    pub fn max_radius(&self) -> f32 {
        let center = self.center();
        center.x.max(center.y)
    }

    pub fn is_small(&self) -> bool {
        self.width < SMALL_VIEWPORT_WIDTH
    }

    /// Pixel dimensions for buffers backing this viewport.
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width.round() as usize, self.height.round() as usize)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Uniformly random point on the surface.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        vec2(
            rng.random::<f32>() * self.width,
            rng.random::<f32>() * self.height,
        )
    }

    /// Teleports a point that drifted more than `margin` past one edge to the
    /// same distance beyond the opposite edge.
    pub fn wrap(&self, point: Vec2, margin: f32) -> Vec2 {
        let wrap_axis = |v: f32, extent: f32| {
            if v < -margin {
                extent + margin
            } else if v > extent + margin {
                -margin
            } else {
                v
            }
        };
        vec2(wrap_axis(point.x, self.width), wrap_axis(point.y, self.height))
    }
}

/// Point at `radius` from the origin along `angle` radians.
pub fn polar(angle: f32, radius: f32) -> Vec2 {
    vec2(angle.cos() * radius, angle.sin() * radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_radius() {
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(viewport.center(), vec2(400.0, 300.0));
        assert_eq!(viewport.max_radius(), 400.0);
        assert!(!viewport.is_small());
        assert!(Viewport::new(500.0, 900.0).is_small());
    }

    #[test]
    fn test_degenerate_size_is_clamped() {
        let viewport = Viewport::new(0.0, -5.0);
        assert_eq!(viewport.pixel_size(), (1, 1));
    }

    #[test]
    fn test_wrap_crosses_to_opposite_edge() {
        let viewport = Viewport::new(100.0, 100.0);
        assert_eq!(viewport.wrap(vec2(-60.0, 50.0), 50.0), vec2(150.0, 50.0));
        assert_eq!(viewport.wrap(vec2(20.0, 151.0), 50.0), vec2(20.0, -50.0));
        assert_eq!(viewport.wrap(vec2(-40.0, 120.0), 50.0), vec2(-40.0, 120.0));
    }

    #[test]
    fn test_polar_quarter_turn() {
        let p = polar(PI / 2.0, 10.0);
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 10.0).abs() < 1e-5);
    }
}
