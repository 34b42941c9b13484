mod bindings;
mod help_overlay;
mod hud;
mod notification;

pub use bindings::{parse_key, Action};
pub use help_overlay::HelpOverlay;
pub use hud::Hud;
pub use notification::Notification;
