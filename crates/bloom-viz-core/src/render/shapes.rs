//! Per-shape particle drawing.

use nannou::prelude::*;

use super::canvas::{Canvas, Paint, Style};
use super::color::Color;
use super::{Pass, Scene};
use crate::sim::{MotionState, Particle, Shape};
use crate::viewport::polar;

/// Particles fainter than this are skipped
const MIN_ALPHA: f32 = 0.01;

/// Crystal scale above which sparkle rays appear
const SPARKLE_SCALE: f32 = 1.5;

const SPIRAL_POINTS: usize = 12;

pub(super) fn draw_particle(
    canvas: &mut Canvas,
    p: &Particle,
    pass: Pass,
    scene: &Scene,
    scratch: &mut Vec<Vec2>,
) {
    let alpha = (p.opacity * p.life).clamp(0.0, 1.0);
    if alpha <= MIN_ALPHA {
        return;
    }

    let (scale, lightness, style) = match pass {
        Pass::Main => (1.0, p.lightness + p.flash * 0.2, Style::over(1.0)),
        Pass::Bloom => (2.0, p.lightness + 0.1, Style::add(1.0)),
    };
    let color = Color::hsla(p.hue, p.saturation, lightness.min(1.0), alpha);
    let radius = p.size * scale * (1.0 + p.pulse.sin() * 0.1);

    if let (Pass::Main, MotionState::Crystal { trail, .. }) = (pass, &p.state) {
        for (point, fade) in trail.iter() {
            let dot = Paint::Solid(color.fade(fade * 0.5));
            canvas.fill_circle(point, (p.size * 0.3 * fade).max(0.75), &dot, Style::add(1.0));
        }
    }

    match p.shape {
        Shape::Polygon { .. } | Shape::Star { .. } => {
            let wobble = if p.shape == Shape::MORPH { 0.25 } else { 0.0 };
            p.shape
                .outline(p.pos, radius, p.rotation, wobble, p.pulse, scratch);
            let stops = [(0.0, color.lighten(0.3)), (1.0, color.fade(0.6))];
            let paint = Paint::Radial {
                center: p.pos,
                radius,
                stops: &stops,
            };
            canvas.fill_polygon(scratch, &paint, style);

            if let (Pass::Main, MotionState::Crystal { scale, .. }) = (pass, &p.state) {
                if *scale > SPARKLE_SCALE {
                    sparkle(canvas, p, color, radius, scratch);
                }
            }
        }
        Shape::Blob => {
            let r = radius * 2.0;
            let stops = [
                (0.0, color),
                (0.4, color.fade(0.6)),
                (1.0, color.with_alpha(0.0)),
            ];
            let paint = Paint::Radial {
                center: p.pos,
                radius: r,
                stops: &stops,
            };
            canvas.fill_circle(p.pos, r, &paint, style);
        }
        Shape::Filament => {
            let half = heading(p) * radius * 2.0;
            scratch.clear();
            scratch.extend([p.pos - half, p.pos + half]);
            let width = (radius * 0.4).max(1.0);
            canvas.stroke_polyline(scratch, width, false, &Paint::Solid(color), style);
        }
        Shape::Spiral => {
            scratch.clear();
            scratch.extend((0..SPIRAL_POINTS).map(|i| {
                let t = i as f32 / (SPIRAL_POINTS - 1) as f32;
                p.pos + polar(p.rotation + t * TAU * 1.5, radius * 2.0 * t)
            }));
            let width = if pass == Pass::Main { 1.0 } else { 2.0 };
            canvas.stroke_polyline(scratch, width, false, &Paint::Solid(color), style);
        }
        Shape::Streak => streak(canvas, p, color, scene, style, scratch),
    }
}

/// Unit direction of travel, falling back to the rotation angle at rest.
fn heading(p: &Particle) -> Vec2 {
    let dir = p.vel.normalize_or_zero();
    if dir == Vec2::ZERO {
        polar(p.rotation, 1.0)
    } else {
        dir
    }
}

fn sparkle(canvas: &mut Canvas, p: &Particle, color: Color, radius: f32, scratch: &mut Vec<Vec2>) {
    let ray = Paint::Solid(color.lighten(0.5).fade(0.8));
    for i in 0..4 {
        let angle = p.rotation + i as f32 * PI / 2.0;
        scratch.clear();
        scratch.extend([
            p.pos + polar(angle, radius),
            p.pos + polar(angle, radius * 2.5),
        ]);
        canvas.stroke_polyline(scratch, 1.0, false, &ray, Style::add(1.0));
    }
}

/// Tapered triangle from a transparent tail to a bright tip.
fn streak(
    canvas: &mut Canvas,
    p: &Particle,
    color: Color,
    scene: &Scene,
    style: Style,
    scratch: &mut Vec<Vec2>,
) {
    let length = match &p.state {
        MotionState::Streak { length, .. } => *length,
        _ => p.size * 6.0,
    };
    let dir = (p.pos - scene.viewport.center()).normalize_or_zero();
    let dir = if dir == Vec2::ZERO { heading(p) } else { dir };
    let perp = vec2(-dir.y, dir.x) * p.size * 0.5;
    let tail = p.pos - dir * length;

    scratch.clear();
    scratch.extend([p.pos, tail + perp, tail - perp]);

    let tip = Color::hsla(
        p.hue + scene.bands.bass * 60.0,
        p.saturation,
        (p.lightness + 0.15).min(1.0),
        color.a,
    );
    let stops = [(0.0, tip.with_alpha(0.0)), (1.0, tip)];
    let paint = Paint::Linear {
        from: tail,
        to: p.pos,
        stops: &stops,
    };
    canvas.fill_polygon(scratch, &paint, style);
}
