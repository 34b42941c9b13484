//! Audio-reactive particle visualizer core.
//!
//! Everything here is windowing-agnostic: audio arrives through the
//! [`AudioSource`] trait, frames leave as RGBA8 buffers from
//! [`Session::tick`]. The `bloom-viz` binary wires these to cpal and nannou.

pub mod audio;
pub mod error;
pub mod field;
pub mod pattern;
pub mod render;
pub mod session;
pub mod sim;
pub mod summary;
pub mod viewport;

pub use audio::{
    AnalyzerConfig, AudioSource, BandEnergies, BeatConfig, BeatDetector, BeatRule, SharedSamples,
    SpectralAnalyzer, SpectralSnapshot,
};
pub use error::{Result, VizError};
pub use pattern::{Pattern, PatternPreset};
pub use render::Frame;
pub use session::{FrameListener, Session, SessionConfig, SessionEvent};
pub use summary::{bar_style, BarStyle, SpectrumSummary};
pub use viewport::Viewport;
