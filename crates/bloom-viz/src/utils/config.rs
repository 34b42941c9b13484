//! Configuration file management.
//!
//! Handles loading and saving user preferences to `~/.bloom-viz.toml`.

use std::fs;
use std::path::PathBuf;

use bloom_viz_core::{AnalyzerConfig, BeatConfig, BeatRule, Pattern, SessionConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;

const CONFIG_TEMPLATE: &str = r#"# bloom-viz configuration file

# Timeout in seconds when switching audio devices (default: 3)
# device_timeout_secs = 3

# Last selected audio device (auto-saved)
# last_device = "Device Name"
# last_device_is_input = false

# =============================================================================
# Visuals
# =============================================================================

# Pattern shown at startup (default: "nebula")
#   "nebula", "flux", "stellar", "filaments", "orbit" or "crystal"
# pattern = "nebula"

# Size of the main particle group (default: derived from the window size)
# particle_count = 400

# Number of bars in the spectrum display (default: 32)
# bar_count = 32

# =============================================================================
# Analysis
# =============================================================================

# Transform size in samples, power of two (default: 2048)
# fft_size = 2048

# Spectrum smoothing between frames, 0.0-1.0 (default: 0.8)
# smoothing = 0.8

# Beat detection
# beat_threshold = 0.35           # Normalized bass level that counts as a beat
# beat_cooldown_ms = 200          # Minimum time between beats
# beat_rule = "rising_edge"       # "rising_edge" or "threshold"
"#;

#[derive(Serialize, Deserialize, Default)]
pub struct Config {
    pub last_device: Option<String>,
    pub last_device_is_input: Option<bool>,
    pub device_timeout_secs: Option<u64>,

    pub pattern: Option<Pattern>,
    pub particle_count: Option<usize>,
    pub bar_count: Option<usize>,

    pub fft_size: Option<usize>,
    pub smoothing: Option<f32>,
    pub beat_threshold: Option<f32>,
    pub beat_cooldown_ms: Option<f64>,
    pub beat_rule: Option<BeatRule>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".bloom-viz.toml"))
    }

    pub fn load() -> Self {
        let path = match Self::path() {
            Some(p) => p,
            None => return Self::default(),
        };

        // Create template file if it doesn't exist
        if !path.exists() {
            match fs::write(&path, CONFIG_TEMPLATE) {
                Ok(()) => info!("Created config template at {:?}", path),
                Err(e) => warn!("Could not write config template {:?}: {}", path, e),
            }
        }

        let content = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(_) => return Self::default(),
        };
        Self::parse(&content)
    }

    fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_else(|e| {
            warn!("Ignoring malformed config: {}", e);
            Self::default()
        })
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Ok(content) = toml::to_string(self) {
                match fs::write(&path, &content) {
                    Ok(()) => info!("Config saved to {:?}", path),
                    Err(e) => warn!("Could not save config {:?}: {}", path, e),
                }
            }
        }
    }

    pub fn set_device(&mut self, name: &str, is_input: bool) {
        self.last_device = Some(name.to_string());
        self.last_device_is_input = Some(is_input);
        self.save();
    }

    pub fn device_timeout_secs(&self) -> u64 {
        self.device_timeout_secs
            .unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS)
    }

    /// Session settings with file values laid over the defaults
    pub fn session_config(&self) -> SessionConfig {
        let analyzer_defaults = AnalyzerConfig::default();
        let beat_defaults = BeatConfig::default();
        let session_defaults = SessionConfig::default();

        SessionConfig {
            analyzer: AnalyzerConfig {
                fft_size: self.fft_size.unwrap_or(analyzer_defaults.fft_size),
                smoothing: self.smoothing.unwrap_or(analyzer_defaults.smoothing),
                ..analyzer_defaults
            },
            beat: BeatConfig {
                threshold: self.beat_threshold.unwrap_or(beat_defaults.threshold),
                cooldown_ms: self.beat_cooldown_ms.unwrap_or(beat_defaults.cooldown_ms),
                rule: self.beat_rule.unwrap_or_default(),
                ..beat_defaults
            },
            pattern: self.pattern.unwrap_or_default(),
            particle_count: self.particle_count,
            bar_count: self.bar_count.unwrap_or(session_defaults.bar_count),
            seed: None,
        }
    }
}
