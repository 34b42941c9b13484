use std::hint::black_box;

use bloom_viz_core::{Pattern, Session, SessionConfig, SessionEvent, SharedSamples};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FRAME_MS: f64 = 1000.0 / 60.0;

/// Session at 1080p fed with loud noise, warmed up so trails and bloom are live.
fn loud_session(pattern: Pattern) -> (Session, SharedSamples) {
    let config = SessionConfig {
        pattern,
        seed: Some(7),
        ..Default::default()
    };
    let mut session = Session::new(config, 1920.0, 1080.0).unwrap();
    let samples = SharedSamples::new(8192, 44100.0);
    session
        .handle(SessionEvent::AudioReady(Box::new(samples.clone())))
        .unwrap();

    let mut rng = StdRng::seed_from_u64(3);
    let noise: Vec<f32> = (0..4096).map(|_| rng.random_range(-1.0..1.0)).collect();
    samples.push(&noise);
    for frame in 0..30 {
        session.tick(frame as f64 * FRAME_MS, &mut ());
    }
    (session, samples)
}

fn tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_1080p");
    group.sample_size(20);
    for pattern in Pattern::ALL {
        let (mut session, _samples) = loud_session(pattern);
        let mut now = 30.0 * FRAME_MS;
        group.bench_function(pattern.name(), |b| {
            b.iter(|| {
                now += FRAME_MS;
                black_box(session.tick(now, &mut ()).pixels().len());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, tick_benchmark);
criterion_main!(benches);
