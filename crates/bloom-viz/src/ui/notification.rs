//! Transient status text at the top of the window.

use nannou::prelude::*;

const NOTIFICATION_FRAMES: u32 = 180; // ~3 seconds at 60fps

#[derive(Default)]
pub struct Notification {
    text: Option<String>,
    frames: u32,
}

impl Notification {
    /// Shows a notification message for 3 seconds
    pub fn show(&mut self, text: String) {
        self.text = Some(text);
        self.frames = NOTIFICATION_FRAMES;
    }

    pub fn update(&mut self) {
        if self.frames > 0 {
            self.frames -= 1;
            if self.frames == 0 {
                self.text = None;
            }
        }
    }

    pub fn draw(&self, draw: &Draw, bounds: Rect) {
        if let Some(ref text) = self.text {
            let alpha = (self.frames as f32 / NOTIFICATION_FRAMES as f32 * 4.0).min(1.0);
            draw.text(text)
                .x_y(0.0, bounds.top() - 30.0)
                .w(bounds.w())
                .color(rgba(1.0, 1.0, 1.0, alpha))
                .font_size(24);
        }
    }
}
