//! Help overlay showing keyboard shortcuts.

use bloom_viz_core::Pattern;
use nannou::prelude::*;

const PADDING: f32 = 25.0;
const LINE_HEIGHT: f32 = 24.0;
const FONT_SIZE: u32 = 18;
const WIDTH: f32 = 520.0;
const KEY_COL_WIDTH: f32 = 110.0;

/// Manages help overlay visibility
pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn draw(&self, draw: &Draw, current: Pattern, frozen: bool) {
        if !self.visible {
            return;
        }

        let freeze = if frozen { "Resume visuals (currently FROZEN)" } else { "Freeze visuals" };
        let mut lines: Vec<(String, String)> = vec![
            ("h".into(), "Toggle this help".into()),
            ("q".into(), "Quit".into()),
            (String::new(), String::new()),
            ("--- Patterns ---".into(), String::new()),
        ];
        for pattern in Pattern::ALL {
            let marker = if pattern == current { " <" } else { "" };
            lines.push(((pattern.index() + 1).to_string(), format!("{}{}", pattern.name(), marker)));
        }
        lines.extend([
            (String::new(), String::new()),
            ("--- Other ---".into(), String::new()),
            ("Space".into(), freeze.into()),
            ("b".into(), "Toggle spectrum bars".into()),
            ("f".into(), "Toggle fullscreen".into()),
            ("Tab".into(), "Next audio device".into()),
        ]);

        let height = LINE_HEIGHT * lines.len() as f32 + PADDING * 2.0;

        draw.rect()
            .x_y(0.0, 0.0)
            .w_h(WIDTH, height)
            .color(rgba(0.0, 0.0, 0.0, 0.9));

        draw.rect()
            .x_y(0.0, 0.0)
            .w_h(WIDTH, height)
            .stroke(rgba(1.0, 1.0, 1.0, 0.3))
            .stroke_weight(1.0)
            .no_fill();

        let start_y = height / 2.0 - PADDING - LINE_HEIGHT / 2.0;
        let left_edge = -WIDTH / 2.0 + PADDING;
        let desc_width = WIDTH - KEY_COL_WIDTH - PADDING * 2.0 - 15.0;

        for (i, (key, desc)) in lines.iter().enumerate() {
            let y = start_y - i as f32 * LINE_HEIGHT;

            if key.is_empty() {
                continue;
            }

            if key.starts_with("---") {
                draw.text(key)
                    .xy(pt2(0.0, y))
                    .wh(pt2(WIDTH - PADDING * 2.0, LINE_HEIGHT))
                    .center_justify()
                    .color(rgba(1.0, 0.7, 0.4, 0.8))
                    .font_size(FONT_SIZE);
                continue;
            }

            draw.text(key)
                .xy(pt2(left_edge + KEY_COL_WIDTH / 2.0, y))
                .wh(pt2(KEY_COL_WIDTH, LINE_HEIGHT))
                .right_justify()
                .color(rgb(1.0, 0.6, 0.3))
                .font_size(FONT_SIZE);

            draw.text(desc)
                .xy(pt2(left_edge + KEY_COL_WIDTH + 15.0 + desc_width / 2.0, y))
                .wh(pt2(desc_width, LINE_HEIGHT))
                .left_justify()
                .color(rgb(1.0, 1.0, 1.0))
                .font_size(FONT_SIZE);
        }
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}
