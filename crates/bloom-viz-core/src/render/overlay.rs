//! Everything drawn that is not a particle: backdrops, the energy grid,
//! central glows, the shockwave ring and the spectrum ring.

use nannou::prelude::*;

use super::canvas::{Canvas, Paint, Style};
use super::color::Color;
use super::{Pass, Scene};
use crate::field::{CELL_SIZE, SHOCKWAVE_THICKNESS};
use crate::pattern::{Backdrop, Glow};
use crate::viewport::polar;

const RING_BARS: usize = 64;
const WAVE_POINTS: usize = 128;

/// Cell energy a grid glow needs before it shows
const GRID_MIN: f32 = 0.1;
/// Bloom level the energy field needs before it shows
const ENERGY_FIELD_MIN: f32 = 0.1;
/// Bloom level the crystal burst needs before it shows
const BURST_MIN: f32 = 0.3;

pub(super) fn backdrop(canvas: &mut Canvas, scene: &Scene) {
    match scene.preset.backdrop {
        Backdrop::Fade { rgb, alpha } => {
            let color = Color::rgba(rgb[0], rgb[1], rgb[2], alpha);
            canvas.fill(&Paint::Solid(color), Style::over(1.0));
        }
        Backdrop::Gradient { base_alpha } => {
            let bands = scene.bands;
            let alpha = base_alpha + (bands.bass + bands.mid + bands.treble) * 0.01;
            let hue = scene.field.hue();
            let stops = [
                (0.0, Color::hsla(hue, 0.5, 0.1, alpha)),
                (1.0, Color::hsla(hue + 60.0, 0.5, 0.05, alpha)),
            ];
            let paint = Paint::Radial {
                center: scene.viewport.center(),
                radius: scene.viewport.max_dim() * 0.75,
                stops: &stops,
            };
            // Fade toward black first so trails still die out
            canvas.fill(&Paint::Solid(Color::BLACK.with_alpha(alpha)), Style::over(1.0));
            canvas.fill(&paint, Style::add(1.0));
        }
    }
}

pub(super) fn grid(canvas: &mut Canvas, scene: &Scene) {
    let Some(grid) = scene.field.grid() else {
        return;
    };
    if grid.peak() <= GRID_MIN {
        return;
    }
    let hue = scene.field.hue();
    let inner: Vec<Option<Color>> = grid
        .cells()
        .map(|(_, energy)| {
            (energy > GRID_MIN)
                .then(|| Color::hsla(hue + energy * 60.0, 0.8, 0.6, 0.8).fade(energy * 0.3))
        })
        .collect();
    let outer = Color::hsla(hue + 30.0, 0.6, 0.4, 0.0);

    canvas.shade(Style::screen(1.0), |point| {
        let (index, lattice) = grid.nearest(point)?;
        let color = inner[index]?;
        let t = point.distance(lattice) / CELL_SIZE;
        Some(color.mix(outer, t))
    });
}

pub(super) fn energy_field(canvas: &mut Canvas, scene: &Scene, intensity: f32) {
    if !scene.preset.energy_field || intensity <= ENERGY_FIELD_MIN {
        return;
    }
    let hue = 200.0 + scene.bands.bass * 100.0;
    let stops = [
        (0.0, Color::hsla(hue, 0.8, 0.5, intensity * 0.15)),
        (1.0, Color::hsla(hue, 0.8, 0.5, 0.0)),
    ];
    let center = scene.viewport.center();
    let radius = scene.viewport.max_dim() * 0.6;
    let paint = Paint::Radial {
        center,
        radius,
        stops: &stops,
    };
    canvas.fill_circle(center, radius, &paint, Style::screen(1.0));
}

/// Central glow and rings drawn straight onto the primary surface.
pub(super) fn foreground(canvas: &mut Canvas, scene: &Scene, pass: Pass, scratch: &mut Vec<Vec2>) {
    let center = scene.viewport.center();
    let bands = scene.bands;

    match scene.preset.glow {
        Glow::Core => {
            let radius = scene.viewport.min_dim() * 0.2 * (1.0 + bands.bass * 0.5);
            let hue = 200.0 + bands.bass * 80.0;
            let (inner, middle) = match pass {
                Pass::Main => (0.18, 0.08),
                Pass::Bloom => (0.4, 0.15),
            };
            let stops = [
                (0.0, Color::hsla(hue, 1.0, 0.7, inner)),
                (0.5, Color::hsla(hue, 1.0, 0.5, middle)),
                (1.0, Color::hsla(hue, 1.0, 0.5, 0.0)),
            ];
            radial_disc(canvas, center, radius, &stops, Style::add(1.0));
        }
        Glow::Star => {
            let size = 10.0 + bands.bass * 80.0 + bands.mid * 20.0;
            let (radius, alpha) = match pass {
                Pass::Main => (size, 1.0),
                Pass::Bloom => (size * 2.0, 0.5),
            };
            let stops = [
                (0.0, Color::WHITE.with_alpha(alpha)),
                (0.3, Color::hsla(45.0, 1.0, 0.7, alpha * 0.8)),
                (1.0, Color::hsla(30.0, 1.0, 0.5, 0.0)),
            ];
            radial_disc(canvas, center, radius, &stops, Style::add(1.0));
        }
        Glow::Flash if pass == Pass::Main => {
            let level = scene.field.flash();
            if level > 0.01 {
                let hue = scene.field.hue();
                let stops = [
                    (0.0, Color::hsla(hue, 1.0, 0.6, level * 0.35)),
                    (1.0, Color::hsla(hue, 1.0, 0.6, 0.0)),
                ];
                radial_disc(canvas, center, scene.viewport.max_dim() * 0.7, &stops, Style::add(1.0));
            }
        }
        Glow::Flash | Glow::Halo | Glow::TriColor | Glow::Burst => {}
    }

    if pass == Pass::Main {
        if let Some(wave) = scene.field.shockwave() {
            let ring = Paint::Solid(Color::WHITE.with_alpha(wave.life() * 0.7));
            canvas.stroke_ring(center, wave.radius(), 2.0, &ring, Style::over(1.0));
        }
        if scene.preset.spectrum_ring {
            spectrum_ring(canvas, scene, scratch);
        }
    }
}

/// Glows that live on the bloom surface and get scaled by the composite.
pub(super) fn bloom_glow(canvas: &mut Canvas, scene: &Scene, intensity: f32) {
    let center = scene.viewport.center();
    let bands = scene.bands;

    match scene.preset.glow {
        Glow::Halo => {
            let hue = scene.field.hue();
            let stops = [
                (0.0, Color::hsla(hue, 0.8, 0.6, 0.5)),
                (1.0, Color::hsla(hue, 0.8, 0.6, 0.0)),
            ];
            radial_disc(canvas, center, 300.0 + intensity * 200.0, &stops, Style::add(1.0));
        }
        Glow::TriColor => {
            let stops = [
                (0.0, Color::hsla(bands.bass * 60.0, 1.0, 0.6, bands.bass * 0.6)),
                (0.5, Color::hsla(120.0 + bands.mid * 60.0, 1.0, 0.5, bands.mid * 0.4)),
                (1.0, Color::hsla(240.0 + bands.treble * 60.0, 1.0, 0.5, 0.0)),
            ];
            radial_disc(canvas, center, 200.0 + intensity * 300.0, &stops, Style::add(1.0));
        }
        Glow::Burst if intensity > BURST_MIN => {
            let hue = 200.0 + bands.bass * 100.0;
            let stops = [
                (0.0, Color::hsla(hue, 1.0, 0.9, 0.8)),
                (0.3, Color::hsla(hue, 1.0, 0.6, 0.4)),
                (1.0, Color::hsla(hue, 1.0, 0.6, 0.0)),
            ];
            radial_disc(canvas, center, 100.0 + intensity * 200.0, &stops, Style::add(1.0));
        }
        Glow::Burst | Glow::Core | Glow::Star | Glow::Flash => {}
    }

    if let Some(wave) = scene.field.shockwave() {
        let ring = Paint::Solid(Color::hsla(200.0, 1.0, 0.7, wave.life() * 0.5));
        let width = SHOCKWAVE_THICKNESS * wave.life();
        canvas.stroke_ring(center, wave.radius(), width, &ring, Style::add(1.0));
    }
}

fn radial_disc(canvas: &mut Canvas, center: Vec2, radius: f32, stops: &[(f32, Color)], style: Style) {
    let paint = Paint::Radial {
        center,
        radius,
        stops,
    };
    canvas.fill_circle(center, radius, &paint, style);
}

/// Radial bars for the low bins plus a ring traced by the spectrum shape.
fn spectrum_ring(canvas: &mut Canvas, scene: &Scene, scratch: &mut Vec<Vec2>) {
    let Some(snapshot) = scene.snapshot else {
        return;
    };
    let center = scene.viewport.center();
    let base = scene.viewport.min_dim() * 0.25;

    for i in 0..RING_BARS {
        let value = snapshot.get(i) as f32 / 255.0;
        if value <= 0.0 {
            continue;
        }
        let angle = i as f32 / RING_BARS as f32 * TAU;
        let height = value * base * 0.4;
        let color = Color::hsla(200.0 + i as f32 / RING_BARS as f32 * 120.0, 0.8, 0.6, 0.6);
        scratch.clear();
        scratch.extend([center + polar(angle, base), center + polar(angle, base + height)]);
        canvas.stroke_polyline(scratch, 2.0, false, &Paint::Solid(color), Style::add(1.0));
    }

    let radius = scene.viewport.min_dim() * 0.3;
    scratch.clear();
    scratch.extend((0..WAVE_POINTS).map(|i| {
        let deviation = snapshot.get(i) as f32 / 128.0 - 1.0;
        let angle = i as f32 / WAVE_POINTS as f32 * TAU;
        center + polar(angle, radius + deviation * 20.0)
    }));
    let color = Color::hsla(220.0 + scene.bands.treble * 60.0, 0.8, 0.7, 0.3);
    canvas.stroke_polyline(scratch, 1.5, true, &Paint::Solid(color), Style::add(1.0));
}
