//! Wall-clock frame budget at 1080p. Timing depends on the host, so this only
//! runs on request: `cargo test --release --test frame_budget -- --ignored`

use std::time::{Duration, Instant};

use bloom_viz_core::{Pattern, Session, SessionConfig, SessionEvent, SharedSamples};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FRAME_MS: f64 = 1000.0 / 60.0;
const WARMUP: usize = 30;
const MEASURED: usize = 60;

/// Mean tick has to keep up with 30 fps
const BUDGET: Duration = Duration::from_micros(33_333);

#[test]
#[ignore]
fn every_pattern_ticks_within_budget_at_1080p() {
    let mut rng = StdRng::seed_from_u64(5);
    let noise: Vec<f32> = (0..4096).map(|_| rng.random_range(-1.0..1.0)).collect();
    let mut over = Vec::new();

    for pattern in Pattern::ALL {
        let config = SessionConfig {
            pattern,
            seed: Some(11),
            ..Default::default()
        };
        let mut session = Session::new(config, 1920.0, 1080.0).unwrap();
        let samples = SharedSamples::new(8192, 44100.0);
        session
            .handle(SessionEvent::AudioReady(Box::new(samples.clone())))
            .unwrap();
        samples.push(&noise);

        for frame in 0..WARMUP {
            session.tick(frame as f64 * FRAME_MS, &mut ());
        }
        let start = Instant::now();
        for frame in WARMUP..WARMUP + MEASURED {
            session.tick(frame as f64 * FRAME_MS, &mut ());
        }
        let mean = start.elapsed() / MEASURED as u32;
        println!("{:<10} {:>8.2?}", pattern.name(), mean);
        if mean > BUDGET {
            over.push((pattern, mean));
        }
    }

    assert!(over.is_empty(), "patterns over {BUDGET:?}: {over:?}");
}
