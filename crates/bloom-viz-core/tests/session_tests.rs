//! End-to-end tests driving a `Session` with synthetic audio.

use bloom_viz_core::{
    AudioSource, BandEnergies, BeatConfig, BeatDetector, FrameListener, Pattern, Session,
    SessionConfig, SessionEvent, SpectralSnapshot, SpectrumSummary, VizError,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FRAME_MS: f64 = 1000.0 / 60.0;

/// Deterministic white noise, loud enough to saturate every band.
struct NoiseSource {
    samples: Vec<f32>,
}

impl NoiseSource {
    fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            samples: (0..4096).map(|_| rng.random_range(-1.0..1.0)).collect(),
        }
    }
}

impl AudioSource for NoiseSource {
    fn sample_rate(&self) -> f32 {
        44100.0
    }

    fn read_latest(&self, out: &mut [f32]) -> usize {
        let n = out.len().min(self.samples.len());
        out[..n].copy_from_slice(&self.samples[self.samples.len() - n..]);
        n
    }
}

#[derive(Default)]
struct Recorder {
    beats: usize,
    frames: usize,
    last_bars: Vec<u8>,
}

impl FrameListener for Recorder {
    fn on_beat_detected(&mut self) {
        self.beats += 1;
    }

    fn on_frame_rendered(&mut self, summary: &SpectrumSummary) {
        self.frames += 1;
        self.last_bars = summary.bars().to_vec();
    }
}

fn config(pattern: Pattern) -> SessionConfig {
    SessionConfig {
        pattern,
        seed: Some(99),
        particle_count: Some(60),
        ..Default::default()
    }
}

#[test]
fn silent_session_keeps_rendering() {
    let mut session = Session::new(config(Pattern::Nebula), 200.0, 150.0).unwrap();
    let mut recorder = Recorder::default();
    let count = session.particle_count();

    for frame in 0..30 {
        let out = session.tick(frame as f64 * FRAME_MS, &mut recorder);
        assert_eq!((out.width(), out.height()), (200, 150));
    }

    assert!(!session.is_audio_ready());
    assert_eq!(recorder.beats, 0);
    assert_eq!(recorder.frames, 30);
    assert_eq!(recorder.last_bars, vec![0; 32]);
    assert_eq!(session.particle_count(), count);
    assert_eq!(session.bands(), BandEnergies::SILENT);
}

#[test]
fn noise_drives_beats_within_cooldown() {
    let mut session = Session::new(config(Pattern::Stellar), 200.0, 150.0).unwrap();
    session
        .handle(SessionEvent::AudioReady(Box::new(NoiseSource::new(1))))
        .unwrap();
    let mut recorder = Recorder::default();

    // One second of frames
    for frame in 0..60 {
        session.tick(frame as f64 * FRAME_MS, &mut recorder);
    }

    assert!(recorder.beats >= 1);
    assert!(recorder.beats <= 5, "{} beats in one second", recorder.beats);
    assert!(recorder.last_bars.iter().any(|&b| b > 0));
    assert!(session.bands().bass > 0.35);
    assert!(session.bloom_intensity() > 0.0);
}

#[test]
fn second_audio_source_is_rejected() {
    let mut session = Session::new(config(Pattern::Flux), 120.0, 90.0).unwrap();
    session
        .handle(SessionEvent::AudioReady(Box::new(NoiseSource::new(2))))
        .unwrap();

    let again = session.handle(SessionEvent::AudioReady(Box::new(NoiseSource::new(3))));
    assert!(matches!(again, Err(VizError::AlreadyConnected)));

    session.tick(0.0, &mut ());
    assert!(session.is_audio_ready());
}

#[test]
fn resize_mid_session_keeps_population() {
    let mut session = Session::new(
        SessionConfig {
            pattern: Pattern::Flux,
            seed: Some(5),
            ..Default::default()
        },
        800.0,
        600.0,
    )
    .unwrap();
    session
        .handle(SessionEvent::AudioReady(Box::new(NoiseSource::new(4))))
        .unwrap();
    let count = session.particle_count();
    assert_eq!(count, 400);

    session.tick(0.0, &mut ());
    session
        .handle(SessionEvent::Resize {
            width: 1920.0,
            height: 1080.0,
        })
        .unwrap();

    // Deferred until the next tick
    assert_eq!(session.frame().width(), 800);

    let frame = session.tick(FRAME_MS, &mut ());
    assert_eq!((frame.width(), frame.height()), (1920, 1080));
    assert_eq!(session.particle_count(), count);
}

#[test]
fn pending_resizes_coalesce() {
    let mut session = Session::new(config(Pattern::Orbit), 100.0, 100.0).unwrap();
    for (w, h) in [(300.0, 200.0), (50.0, 40.0), (160.0, 90.0)] {
        session
            .handle(SessionEvent::Resize {
                width: w,
                height: h,
            })
            .unwrap();
    }
    let frame = session.tick(0.0, &mut ());
    assert_eq!((frame.width(), frame.height()), (160, 90));
}

#[test]
fn set_pattern_reinitializes_population() {
    let mut session = Session::new(
        SessionConfig {
            seed: Some(8),
            ..Default::default()
        },
        1024.0,
        768.0,
    )
    .unwrap();
    assert_eq!(session.pattern(), Pattern::Nebula);
    assert_eq!(session.particle_count(), 250);

    session
        .handle(SessionEvent::SetPattern(Pattern::Crystal))
        .unwrap();
    assert_eq!(session.pattern(), Pattern::Crystal);
    assert_eq!(session.particle_count(), 350 + 80);
}

#[test]
fn every_pattern_survives_a_noisy_minute_slice() {
    for pattern in Pattern::ALL {
        let mut session = Session::new(config(pattern), 160.0, 120.0).unwrap();
        session
            .handle(SessionEvent::AudioReady(Box::new(NoiseSource::new(6))))
            .unwrap();
        let count = session.particle_count();
        for frame in 0..120 {
            session.tick(frame as f64 * FRAME_MS, &mut ());
        }
        assert_eq!(session.particle_count(), count, "{pattern:?}");
    }
}

#[test]
fn invalid_analyzer_config_fails_creation() {
    let mut config = SessionConfig::default();
    config.analyzer.fft_size = 3000;
    assert!(matches!(
        Session::new(config, 100.0, 100.0),
        Err(VizError::InvalidFftSize(3000))
    ));
}

proptest! {
    #[test]
    fn band_energies_stay_normalized(bins in prop::collection::vec(any::<u8>(), 0..2048)) {
        let bands = BandEnergies::from_snapshot(&SpectralSnapshot::from_bins(bins));
        for value in [bands.bass, bands.mid, bands.treble] {
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn silent_snapshots_never_beat(len in 0usize..2048, now in 0.0f64..1e6) {
        let snapshot = SpectralSnapshot::silent(len);
        prop_assert_eq!(BandEnergies::from_snapshot(&snapshot), BandEnergies::SILENT);
        let mut detector = BeatDetector::new(BeatConfig::default());
        prop_assert!(!detector.detect(&snapshot, now));
    }

    #[test]
    fn beats_respect_cooldown(
        levels in prop::collection::vec(any::<u8>(), 1..200),
        steps in prop::collection::vec(1.0f64..120.0, 200),
    ) {
        let config = BeatConfig::default();
        let cooldown = config.cooldown_ms;
        let mut detector = BeatDetector::new(config);
        let mut now = 0.0;
        let mut last_beat: Option<f64> = None;

        for (level, step) in levels.iter().zip(steps.iter()) {
            now += step;
            let mut bins = vec![0u8; 1024];
            bins[..64].fill(*level);
            if detector.detect(&SpectralSnapshot::from_bins(bins), now) {
                if let Some(last) = last_beat {
                    prop_assert!(now - last >= cooldown);
                }
                last_beat = Some(now);
            }
        }
    }
}
