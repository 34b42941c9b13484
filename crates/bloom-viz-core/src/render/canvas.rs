//! CPU pixel surface with the handful of primitives the patterns draw with.
//!
//! Pixels are RGB floats; coverage is binary, tested at pixel centers.
//! Shapes are given in viewport units; a surface with `scale` 2 covers the
//! same viewport with a quarter of the pixels.

use nannou::prelude::*;
use rayon::prelude::*;

use super::color::Color;

/// Spans smaller than this are drawn on the calling thread
const PAR_MIN_PIXELS: usize = 16_384;

/// How a source color combines with what is already on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blend {
    /// Alpha blending
    Over,
    /// Additive, saturating at white
    Add,
    Screen,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub blend: Blend,
    /// Multiplies every source alpha
    pub opacity: f32,
}

impl Style {
    pub const fn over(opacity: f32) -> Self {
        Self {
            blend: Blend::Over,
            opacity,
        }
    }

    pub const fn add(opacity: f32) -> Self {
        Self {
            blend: Blend::Add,
            opacity,
        }
    }

    pub const fn screen(opacity: f32) -> Self {
        Self {
            blend: Blend::Screen,
            opacity,
        }
    }
}

/// Gradient stop: offset in [0, 1] and color.
pub type Stop = (f32, Color);

pub enum Paint<'a> {
    Solid(Color),
    Radial {
        center: Vec2,
        radius: f32,
        stops: &'a [Stop],
    },
    Linear {
        from: Vec2,
        to: Vec2,
        stops: &'a [Stop],
    },
}

impl Paint<'_> {
    fn color_at(&self, point: Vec2) -> Color {
        match self {
            Paint::Solid(color) => *color,
            Paint::Radial {
                center,
                radius,
                stops,
            } => {
                let t = if *radius > 0.0 {
                    point.distance(*center) / radius
                } else {
                    1.0
                };
                sample_stops(stops, t)
            }
            Paint::Linear { from, to, stops } => {
                let axis = *to - *from;
                let len_sq = axis.length_squared();
                let t = if len_sq > 0.0 {
                    (point - *from).dot(axis) / len_sq
                } else {
                    0.0
                };
                sample_stops(stops, t)
            }
        }
    }
}

fn sample_stops(stops: &[Stop], t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let Some(&(first_at, first)) = stops.first() else {
        return Color::TRANSPARENT;
    };
    if t <= first_at {
        return first;
    }
    for pair in stops.windows(2) {
        let (a_at, a) = pair[0];
        let (b_at, b) = pair[1];
        if t <= b_at {
            let span = b_at - a_at;
            let local = if span > 0.0 { (t - a_at) / span } else { 1.0 };
            return a.mix(b, local);
        }
    }
    stops[stops.len() - 1].1
}

fn blend_pixel(dst: &mut [f32; 3], color: Color, style: Style) {
    let a = (color.a * style.opacity).clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let src = color.rgb();
    for (d, s) in dst.iter_mut().zip(src) {
        *d = match style.blend {
            Blend::Over => *d + (s - *d) * a,
            Blend::Add => (*d + s * a).min(1.0),
            Blend::Screen => 1.0 - (1.0 - *d) * (1.0 - s * a),
        };
    }
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    p.distance(a + ab * t)
}

/// Pixel-center coordinate of column or row `i`.
fn center_of(i: usize) -> f32 {
    i as f32 + 0.5
}

pub struct Canvas {
    width: usize,
    height: usize,
    /// Viewport units per pixel
    scale: f32,
    pixels: Vec<[f32; 3]>,
    /// Scanline edge crossings, reused between polygons
    crossings: Vec<f32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_scale(width, height, 1.0)
    }

    pub fn with_scale(width: usize, height: usize, scale: f32) -> Self {
        Self {
            width,
            height,
            scale,
            pixels: vec![[0.0; 3]; width * height],
            crossings: Vec::new(),
        }
    }

    /// Reallocates and clears when the dimensions change.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![[0.0; 3]; width * height];
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pixels(&self) -> &[[f32; 3]] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.pixels[y * self.width + x]
    }

    pub fn clear(&mut self) {
        self.pixels.par_iter_mut().for_each(|px| *px = [0.0; 3]);
    }

    /// Clamped pixel bounds `(x0, x1, y0, y1)`, end-exclusive, of a box in
    /// viewport units.
    fn bounds(&self, min: Vec2, max: Vec2) -> Option<(usize, usize, usize, usize)> {
        let (min, max) = (min / self.scale, max / self.scale);
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().max(0.0) as usize).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as usize).min(self.height);
        (x0 < x1 && y0 < y1).then_some((x0, x1, y0, y1))
    }

    /// Calls `visit` with the viewport position of every pixel center inside
    /// `bounds`, splitting rows across threads for large spans.
    fn for_each_pixel<F>(&mut self, (x0, x1, y0, y1): (usize, usize, usize, usize), visit: F)
    where
        F: Fn(Vec2, &mut [f32; 3]) + Sync,
    {
        let width = self.width;
        let scale = self.scale;
        let run = |(i, row): (usize, &mut [[f32; 3]])| {
            let y = center_of(y0 + i) * scale;
            for (x, px) in row.iter_mut().enumerate().take(x1).skip(x0) {
                visit(vec2(center_of(x) * scale, y), px);
            }
        };
        let rows = &mut self.pixels[y0 * width..y1 * width];
        if (x1 - x0) * (y1 - y0) >= PAR_MIN_PIXELS {
            rows.par_chunks_mut(width).enumerate().for_each(run);
        } else {
            rows.chunks_mut(width).enumerate().for_each(run);
        }
    }

    fn fill_where<F>(&mut self, min: Vec2, max: Vec2, paint: &Paint, style: Style, covered: F)
    where
        F: Fn(Vec2) -> bool + Sync,
    {
        let Some(bounds) = self.bounds(min, max) else {
            return;
        };
        self.for_each_pixel(bounds, |point, px| {
            if covered(point) {
                blend_pixel(px, paint.color_at(point), style);
            }
        });
    }

    /// Paints the whole surface.
    pub fn fill(&mut self, paint: &Paint, style: Style) {
        let max = vec2(self.width as f32, self.height as f32) * self.scale;
        self.fill_where(Vec2::ZERO, max, paint, style, |_| true);
    }

    /// Blends whatever `shader` returns for each pixel center, skipping
    /// pixels it returns `None` for.
    pub fn shade<F>(&mut self, style: Style, shader: F)
    where
        F: Fn(Vec2) -> Option<Color> + Sync,
    {
        let max = vec2(self.width as f32, self.height as f32) * self.scale;
        let Some(bounds) = self.bounds(Vec2::ZERO, max) else {
            return;
        };
        self.for_each_pixel(bounds, |point, px| {
            if let Some(color) = shader(point) {
                blend_pixel(px, color, style);
            }
        });
    }

    pub fn fill_rect(&mut self, min: Vec2, max: Vec2, paint: &Paint, style: Style) {
        self.fill_where(min, max, paint, style, |_| true);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint, style: Style) {
        if radius <= 0.0 {
            return;
        }
        let r_sq = radius * radius;
        let extent = Vec2::splat(radius);
        self.fill_where(center - extent, center + extent, paint, style, |p| {
            p.distance_squared(center) <= r_sq
        });
    }

    /// Even-odd scanline fill of a closed polygon.
    pub fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint, style: Style) {
        if points.len() < 3 {
            return;
        }
        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        );
        let Some((x0, x1, y0, y1)) = self.bounds(min, max) else {
            return;
        };
        let scale = self.scale;

        for y in y0..y1 {
            let sy = center_of(y) * scale;
            self.crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= sy) != (b.y <= sy) {
                    let t = (sy - a.y) / (b.y - a.y);
                    self.crossings.push((a.x + t * (b.x - a.x)) / scale);
                }
            }
            self.crossings.sort_by(f32::total_cmp);

            let row = &mut self.pixels[y * self.width..(y + 1) * self.width];
            for span in self.crossings.chunks_exact(2) {
                let start = ((span[0] - 0.5).ceil().max(x0 as f32) as usize).min(x1);
                let end = ((span[1] - 0.5).ceil().max(x0 as f32) as usize).min(x1);
                for (x, px) in row.iter_mut().enumerate().take(end).skip(start) {
                    let point = vec2(center_of(x) * scale, sy);
                    blend_pixel(px, paint.color_at(point), style);
                }
            }
        }
    }

    /// Thinnest stroke half-width that still reaches a pixel center.
    fn min_half_width(&self) -> f32 {
        0.5 * self.scale
    }

    /// Strokes each segment of `points`, closing the loop when `closed`.
    pub fn stroke_polyline(
        &mut self,
        points: &[Vec2],
        width: f32,
        closed: bool,
        paint: &Paint,
        style: Style,
    ) {
        if points.len() < 2 {
            return;
        }
        let half = (width * 0.5).max(self.min_half_width());
        let segments = if closed { points.len() } else { points.len() - 1 };
        for i in 0..segments {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            let pad = Vec2::splat(half);
            self.fill_where(a.min(b) - pad, a.max(b) + pad, paint, style, |p| {
                segment_distance(p, a, b) <= half
            });
        }
    }

    pub fn stroke_ring(&mut self, center: Vec2, radius: f32, width: f32, paint: &Paint, style: Style) {
        if radius <= 0.0 {
            return;
        }
        let half = (width * 0.5).max(self.min_half_width());
        let extent = Vec2::splat(radius + half);
        self.fill_where(center - extent, center + extent, paint, style, |p| {
            (p.distance(center) - radius).abs() <= half
        });
    }

    /// Adds `layer * scale` onto this surface, saturating at white. A layer
    /// at a coarser scale is stretched with nearest-neighbour sampling.
    pub fn composite_add(&mut self, layer: &Canvas, scale: f32) {
        if scale <= 0.0 || self.pixels.is_empty() || layer.pixels.is_empty() {
            return;
        }
        let ratio = self.scale / layer.scale;
        let width = self.width;
        let (layer_w, layer_h) = (layer.width, layer.height);
        self.pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let ly = ((center_of(y) * ratio) as usize).min(layer_h - 1);
                let src_row = &layer.pixels[ly * layer_w..(ly + 1) * layer_w];
                for (x, dst) in row.iter_mut().enumerate() {
                    let lx = ((center_of(x) * ratio) as usize).min(layer_w - 1);
                    for (d, s) in dst.iter_mut().zip(src_row[lx]) {
                        *d = (*d + s * scale).min(1.0);
                    }
                }
            });
    }

    /// Converts to opaque RGBA8.
    pub fn write_rgba8(&self, out: &mut [[u8; 4]]) {
        let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        out.par_iter_mut()
            .zip(self.pixels.par_iter())
            .for_each(|(dst, src)| {
                *dst = [to_byte(src[0]), to_byte(src[1]), to_byte(src[2]), 255];
            });
    }
}
