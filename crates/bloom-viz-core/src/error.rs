//! Error types shared by the analysis and session layers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VizError>;

#[derive(Debug, Error)]
pub enum VizError {
    /// The analyzer accepts exactly one source per lifetime.
    #[error("an audio source is already connected to the analyzer")]
    AlreadyConnected,

    #[error("FFT size {0} must be a power of two between 32 and 32768")]
    InvalidFftSize(usize),

    #[error("smoothing time constant {0} must lie within [0, 1]")]
    InvalidSmoothing(f32),

    #[error("audio source unavailable: {0}")]
    SourceUnavailable(String),
}
