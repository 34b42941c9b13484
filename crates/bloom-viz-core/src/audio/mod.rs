//! Audio input abstraction, spectral analysis and derived features.

mod analyzer;
mod features;
mod source;

pub use analyzer::{AnalyzerConfig, SpectralAnalyzer, SpectralSnapshot, DEFAULT_FFT_SIZE};
pub use features::{BandEnergies, BeatConfig, BeatDetector, BeatRule};
pub use source::{AudioSource, SharedSamples};
