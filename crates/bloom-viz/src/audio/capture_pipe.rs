//! Live capture from cpal devices into the analyzer's sample ring.
//!
//! The ring handed to the session is created once; switching devices swaps
//! the stream feeding it, so the analyzer never needs reconnecting.

use std::sync::mpsc;
use std::time::Duration;

use bloom_viz_core::SharedSamples;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::utils::Config;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no audio devices found")]
    NoDevices,
    #[error("device config timed out after {0:?}")]
    ConfigTimeout(Duration),
    #[error("failed to get device config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to play stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

pub struct DeviceInfo {
    pub device: Device,
    pub name: String,
    pub is_input: bool,
}

impl DeviceInfo {
    fn kind(&self) -> &'static str {
        if self.is_input {
            "input"
        } else {
            "output"
        }
    }
}

pub struct CapturePipe {
    samples: SharedSamples,
    devices: Vec<DeviceInfo>,
    current_device: usize,
    timeout: Duration,
    _stream: Option<Stream>,
}

impl CapturePipe {
    /// Opens the remembered device, or the best guess for system audio.
    pub fn new(config: &Config, samples: SharedSamples) -> Self {
        let devices = Self::collect_devices();
        let timeout = Duration::from_secs(config.device_timeout_secs());

        let default_output = cpal::default_host()
            .default_output_device()
            .and_then(|d| d.name().ok());
        let listing: Vec<(&str, bool)> = devices
            .iter()
            .map(|d| (d.name.as_str(), d.is_input))
            .collect();
        let start_index = preferred_device(
            &listing,
            config.last_device.as_deref(),
            config.last_device_is_input.unwrap_or(false),
            default_output.as_deref(),
        );

        let mut pipe = Self {
            samples,
            devices,
            current_device: start_index,
            timeout,
            _stream: None,
        };

        match pipe.open(start_index) {
            Ok(stream) => {
                let info = &pipe.devices[start_index];
                info!("[{}] Selected: {} ({})", start_index, info.name, info.kind());
                pipe._stream = Some(stream);
            }
            Err(e) => error!("Audio capture unavailable: {}", e),
        }

        pipe
    }

    pub fn list_devices() {
        let devices = Self::collect_devices();
        println!("\n=== Audio Devices ===");
        for (idx, info) in devices.iter().enumerate() {
            println!("  [{}] {} ({})", idx, info.name, info.kind());
        }
        println!("Use Tab to cycle devices\n");
    }

    fn collect_devices() -> Vec<DeviceInfo> {
        let host = cpal::default_host();
        let mut devices = Vec::new();

        if let Ok(input_devices) = host.input_devices() {
            for device in input_devices {
                if let Ok(name) = device.name() {
                    devices.push(DeviceInfo { device, name, is_input: true });
                }
            }
        }

        if let Ok(output_devices) = host.output_devices() {
            for device in output_devices {
                if let Ok(name) = device.name() {
                    devices.push(DeviceInfo { device, name, is_input: false });
                }
            }
        }

        info!("Found {} audio devices", devices.len());
        devices
    }

    /// The default-config call can hang on a bad device, so it runs on its own thread.
    fn config_with_timeout(&self, info: &DeviceInfo) -> Result<StreamConfig, CaptureError> {
        let device = info.device.clone();
        let is_input = info.is_input;
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let config = if is_input {
                device.default_input_config()
            } else {
                device.default_output_config()
            };
            let _ = tx.send(config);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(config) => Ok(config?.into()),
            Err(_) => Err(CaptureError::ConfigTimeout(self.timeout)),
        }
    }

    fn open(&self, index: usize) -> Result<Stream, CaptureError> {
        let info = self.devices.get(index).ok_or(CaptureError::NoDevices)?;
        let stream_config = self.config_with_timeout(info)?;
        let channels = stream_config.channels as usize;

        self.samples.clear();
        self.samples.set_sample_rate(stream_config.sample_rate.0 as f32);

        let samples = self.samples.clone();
        let stream = info.device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                samples.push_interleaved(data, channels);
            },
            |err| warn!("Audio stream error: {}", err),
            None,
        )?;
        stream.play()?;
        Ok(stream)
    }

    /// Attempts to select a device.
    /// Returns Some((device_name, success)) if a switch was attempted, None if index invalid.
    pub fn select_device(&mut self, index: usize, config: &mut Config) -> Option<(String, bool)> {
        let info = self.devices.get(index)?;
        if index == self.current_device && self._stream.is_some() {
            return Some((info.name.clone(), true));
        }

        let device_name = info.name.clone();
        let is_input = info.is_input;
        info!("[{}] Selecting: {} ({})", index, device_name, info.kind());

        match self.open(index) {
            Ok(stream) => {
                self._stream = Some(stream);
                self.current_device = index;
                config.set_device(&device_name, is_input);
                Some((device_name, true))
            }
            Err(e) => {
                warn!("  -> {}", e);
                Some((device_name, false))
            }
        }
    }

    /// Moves to the following device, wrapping around.
    pub fn next_device(&mut self, config: &mut Config) -> Option<(String, bool)> {
        if self.devices.is_empty() {
            return None;
        }
        let index = (self.current_device + 1) % self.devices.len();
        self.select_device(index, config)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

/// Picks the starting device: the remembered one, then a PipeWire or Pulse
/// input, then the system's default output for loopback capture.
fn preferred_device(
    devices: &[(&str, bool)],
    last_device: Option<&str>,
    last_is_input: bool,
    default_output: Option<&str>,
) -> usize {
    let find = |name: &str, is_input: bool| {
        devices
            .iter()
            .position(|&(n, input)| n == name && input == is_input)
    };

    last_device
        .and_then(|name| find(name, last_is_input))
        .or_else(|| find("pipewire", true))
        .or_else(|| find("pulse", true))
        .or_else(|| default_output.and_then(|name| find(name, false)))
        .unwrap_or(0)
}
