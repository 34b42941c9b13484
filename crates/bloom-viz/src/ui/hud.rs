//! Spectrum bars and beat indicator, fed by the session's frame callbacks.

use std::time::{Duration, Instant};

use bloom_viz_core::{bar_style, FrameListener, SpectrumSummary};
use nannou::prelude::*;

/// How long the beat indicator stays lit
pub const BEAT_FLASH: Duration = Duration::from_millis(200);

const BAR_GAP: f32 = 2.0;
const BAR_MARGIN: f32 = 12.0;
const INDICATOR_RADIUS: f32 = 10.0;

pub struct Hud {
    pub show_bars: bool,
    bars: Vec<u8>,
    last_beat: Option<Instant>,
}

impl Hud {
    pub fn new() -> Self {
        Self {
            show_bars: true,
            bars: Vec::new(),
            last_beat: None,
        }
    }

    pub fn toggle_bars(&mut self) {
        self.show_bars = !self.show_bars;
    }

    pub fn beat_lit(&self, now: Instant) -> bool {
        self.last_beat
            .map(|t| now.saturating_duration_since(t) < BEAT_FLASH)
            .unwrap_or(false)
    }

    pub fn draw(&self, draw: &Draw, bounds: Rect, now: Instant) {
        if self.beat_lit(now) {
            draw.ellipse()
                .x_y(bounds.right() - BAR_MARGIN - INDICATOR_RADIUS, bounds.top() - BAR_MARGIN - INDICATOR_RADIUS)
                .radius(INDICATOR_RADIUS)
                .color(rgba(1.0, 0.35, 0.55, 0.9));
        }

        if !self.show_bars || self.bars.is_empty() {
            return;
        }

        let slot = (bounds.w() - BAR_MARGIN * 2.0) / self.bars.len() as f32;
        let width = (slot - BAR_GAP).max(1.0);
        let base = bounds.bottom() + BAR_MARGIN;

        for (i, &value) in self.bars.iter().enumerate() {
            let style = bar_style(value);
            let x = bounds.left() + BAR_MARGIN + slot * (i as f32 + 0.5);
            let y = base + style.height / 2.0;
            let hue = (style.hue % 360.0) / 360.0;
            let saturation = style.saturation / 100.0;
            let lightness = style.lightness / 100.0;

            if let Some(glow) = style.glow {
                draw.rect()
                    .x_y(x, y)
                    .w_h(width + glow, style.height + glow)
                    .color(hsla(hue, saturation, lightness, 0.25));
            }

            draw.rect()
                .x_y(x, y)
                .w_h(width, style.height)
                .color(hsla(hue, saturation, lightness, 0.9));
        }
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameListener for Hud {
    fn on_beat_detected(&mut self) {
        self.last_beat = Some(Instant::now());
    }

    fn on_frame_rendered(&mut self, summary: &SpectrumSummary) {
        self.bars.clear();
        self.bars.extend_from_slice(summary.bars());
    }
}
