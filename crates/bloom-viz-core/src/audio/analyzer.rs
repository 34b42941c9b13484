//! Windowed spectral analysis.
//!
//! Turns the latest block of samples from an [`AudioSource`] into a byte
//! spectrum: Blackman window, forward FFT, per-bin exponential smoothing and a
//! decibel range mapped onto 0..=255.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::Deserialize;
use std::f32::consts::PI;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::AudioSource;
use crate::error::{Result, VizError};

/// 2048 samples gives 1024 bins, ~21.5 Hz each at 44.1kHz
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Weight of the previous frame in the per-bin smoothing
pub const DEFAULT_SMOOTHING: f32 = 0.8;

const MIN_FFT_SIZE: usize = 32;
const MAX_FFT_SIZE: usize = 32768;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub fft_size: usize,
    /// Time constant in [0, 1]; higher values hold onto older frames longer.
    pub smoothing: f32,
    /// Level mapped to byte 0
    pub min_decibels: f32,
    /// Level mapped to byte 255
    pub max_decibels: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            smoothing: DEFAULT_SMOOTHING,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyzerConfig {
    fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(VizError::InvalidFftSize(self.fft_size));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(VizError::InvalidSmoothing(self.smoothing));
        }
        Ok(())
    }
}

/// Byte magnitudes per frequency bin, ascending frequency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpectralSnapshot {
    bins: Vec<u8>,
}

impl SpectralSnapshot {
    pub fn silent(len: usize) -> Self {
        Self { bins: vec![0; len] }
    }

    pub fn from_bins(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Bin value, 0 past the end.
    pub fn get(&self, index: usize) -> u8 {
        self.bins.get(index).copied().unwrap_or(0)
    }

    /// Mean of a bin range divided by 255. The range is clipped to the
    /// snapshot; an empty range yields 0.
    pub fn normalized_mean(&self, range: Range<usize>) -> f32 {
        let end = range.end.min(self.bins.len());
        let start = range.start.min(end);
        if start == end {
            return 0.0;
        }
        let sum: u32 = self.bins[start..end].iter().map(|&b| b as u32).sum();
        sum as f32 / (end - start) as f32 / 255.0
    }
}

/// Owns the FFT plan and the one audio source it reads from.
pub struct SpectralAnalyzer {
    config: AnalyzerConfig,
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    window: Vec<f32>,
    samples: Vec<f32>,
    smoothed: Vec<f32>,
    snapshot: SpectralSnapshot,
    source: Option<Box<dyn AudioSource>>,
    failure_reported: bool,
}

impl SpectralAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let size = config.fft_size;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        // Blackman window (alpha = 0.16)
        let window = (0..size)
            .map(|i| {
                let x = 2.0 * PI * i as f32 / size as f32;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        Ok(Self {
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
            window,
            samples: vec![0.0; size],
            smoothed: vec![0.0; size / 2],
            snapshot: SpectralSnapshot::silent(size / 2),
            source: None,
            failure_reported: false,
            config,
        })
    }

    /// Connects the audio source. Only one source may ever be attached; later
    /// calls fail and leave the existing connection in place.
    pub fn initialize(&mut self, source: Box<dyn AudioSource>) -> Result<()> {
        let result = if self.source.is_some() {
            Err(VizError::AlreadyConnected)
        } else if !source.is_available() {
            Err(VizError::SourceUnavailable("source reported no device".into()))
        } else {
            Ok(())
        };

        match result {
            Ok(()) => {
                info!(
                    fft_size = self.config.fft_size,
                    sample_rate = source.sample_rate(),
                    "spectral analyzer connected"
                );
                self.source = Some(source);
                Ok(())
            }
            Err(err) => {
                if !self.failure_reported {
                    warn!(%err, "spectral analyzer initialization failed");
                    self.failure_reported = true;
                }
                Err(err)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.source.is_some()
    }

    pub fn bin_count(&self) -> usize {
        self.config.fft_size / 2
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes the latest samples. `None` until a source is connected.
    pub fn poll(&mut self) -> Option<&SpectralSnapshot> {
        let source = self.source.as_ref()?;
        let read = source.read_latest(&mut self.samples);
        if read < self.samples.len() {
            debug!(read, wanted = self.samples.len(), "short sample window");
        }

        for ((slot, &sample), &w) in self
            .fft_buffer
            .iter_mut()
            .zip(self.samples.iter())
            .zip(self.window.iter())
        {
            // One NaN would spread to every bin through the FFT
            let sample = if sample.is_finite() { sample } else { 0.0 };
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);

        let size = self.config.fft_size as f32;
        let tau = self.config.smoothing;
        let db_range = self.config.max_decibels - self.config.min_decibels;
        let bins = &mut self.snapshot.bins;

        for (k, (smoothed, out)) in self.smoothed.iter_mut().zip(bins.iter_mut()).enumerate() {
            let magnitude = self.fft_buffer[k].norm() / size;
            if magnitude.is_finite() {
                *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            }

            *out = if *smoothed > 0.0 && smoothed.is_finite() {
                let db = 20.0 * smoothed.log10();
                let scaled = 255.0 / db_range * (db - self.config.min_decibels);
                scaled.clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }

        Some(&self.snapshot)
    }

    /// Last snapshot produced by `poll`, if connected.
    pub fn snapshot(&self) -> Option<&SpectralSnapshot> {
        self.source.as_ref().map(|_| &self.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SharedSamples;

    fn sine_source(size: usize, bin: usize) -> SharedSamples {
        let samples = SharedSamples::new(size, 44100.0);
        let tone: Vec<f32> = (0..size)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / size as f32).sin())
            .collect();
        samples.push(&tone);
        samples
    }

    #[test]
    fn test_poll_before_initialize_is_none() {
        let mut analyzer = SpectralAnalyzer::new(AnalyzerConfig::default()).unwrap();
        assert!(!analyzer.is_ready());
        assert!(analyzer.poll().is_none());
        assert!(analyzer.snapshot().is_none());
    }

    #[test]
    fn test_second_initialize_is_rejected() {
        let mut analyzer = SpectralAnalyzer::new(AnalyzerConfig::default()).unwrap();
        analyzer
            .initialize(Box::new(SharedSamples::default()))
            .unwrap();

        let again = analyzer.initialize(Box::new(SharedSamples::default()));
        assert!(matches!(again, Err(VizError::AlreadyConnected)));
        assert!(analyzer.is_ready());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalyzerConfig {
            fft_size: 1000,
            ..Default::default()
        };
        assert!(matches!(
            SpectralAnalyzer::new(config),
            Err(VizError::InvalidFftSize(1000))
        ));

        let config = AnalyzerConfig {
            smoothing: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            SpectralAnalyzer::new(config),
            Err(VizError::InvalidSmoothing(_))
        ));
    }

    #[test]
    fn test_silence_yields_zero_bins() {
        let mut analyzer = SpectralAnalyzer::new(AnalyzerConfig::default()).unwrap();
        analyzer
            .initialize(Box::new(SharedSamples::default()))
            .unwrap();

        let snapshot = analyzer.poll().unwrap();
        assert_eq!(snapshot.len(), DEFAULT_FFT_SIZE / 2);
        assert!(snapshot.bins().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let size = 1024;
        let config = AnalyzerConfig {
            fft_size: size,
            ..Default::default()
        };
        let mut analyzer = SpectralAnalyzer::new(config).unwrap();
        analyzer.initialize(Box::new(sine_source(size, 40))).unwrap();

        let snapshot = analyzer.poll().unwrap();
        assert_eq!(snapshot.get(40), 255);
        assert!(snapshot.get(200) < 64);
        assert_eq!(snapshot.get(10_000), 0);
    }

    #[test]
    fn test_non_finite_samples_do_not_stick() {
        let size = 1024;
        let config = AnalyzerConfig {
            fft_size: size,
            ..Default::default()
        };
        let samples = SharedSamples::new(size, 44100.0);
        let mut tone: Vec<f32> = (0..size)
            .map(|i| (2.0 * PI * 40.0 * i as f32 / size as f32).sin())
            .collect();
        let clean = tone.clone();
        tone[100] = f32::NAN;
        tone[600] = f32::INFINITY;
        samples.push(&tone);

        let mut analyzer = SpectralAnalyzer::new(config).unwrap();
        analyzer.initialize(Box::new(samples.clone())).unwrap();
        assert_eq!(analyzer.poll().unwrap().get(40), 255);

        samples.push(&clean);
        for _ in 0..3 {
            assert_eq!(analyzer.poll().unwrap().get(40), 255);
        }
        assert!(analyzer.smoothed.iter().all(|m| m.is_finite()));
    }

    #[test]
    fn test_normalized_mean_clips_range() {
        let snapshot = SpectralSnapshot::from_bins(vec![255; 100]);
        assert_eq!(snapshot.normalized_mean(0..64), 1.0);
        assert_eq!(snapshot.normalized_mean(64..192), 1.0);
        assert_eq!(snapshot.normalized_mean(192..512), 0.0);
    }
}
