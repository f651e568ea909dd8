//! Benchmarks for MIMIC pose synthesis

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use mimic_core::{Emotion, FrameTime};
use mimic_timeline::{TextTimelineBuilder, TextTimingConfig, TimelineModel};
use mimic_visual::{DriveSignal, IdleConfig, IdlePhaseState, PoseSynthesizer, PoseVector};

const SCRIPT: &str = "The quick brown fox jumps over the lazy dog, twice. Then it rests!";

fn bench_text_frame(c: &mut Criterion) {
    let builder = TextTimelineBuilder::new(TextTimingConfig::default());
    let multiplier = builder.multiplier_for_rate(1.0);
    let timeline = builder
        .build(SCRIPT, multiplier, FrameTime::ZERO, Emotion::Happy)
        .unwrap();
    let synthesizer = PoseSynthesizer::new(IdleConfig::default());
    let mut idle = IdlePhaseState::default();
    let mut rng = StdRng::seed_from_u64(1);
    let mut pose = PoseVector::default();
    let mut now = FrameTime::ZERO;

    c.bench_function("synthesize_text_frame", |b| {
        b.iter(|| {
            now = now + Duration::from_micros(16_667);
            if now.since(FrameTime::ZERO) > timeline.duration() {
                now = FrameTime::ZERO;
            }
            synthesizer.synthesize(
                &timeline,
                black_box(now),
                DriveSignal::Script,
                &mut idle,
                &mut rng,
                &mut pose,
            )
        })
    });
}

fn bench_audio_frame(c: &mut Criterion) {
    let timeline =
        TimelineModel::audio(FrameTime::ZERO, Duration::from_secs(30), Emotion::Surprised)
            .unwrap();
    let synthesizer = PoseSynthesizer::new(IdleConfig::default());
    let mut idle = IdlePhaseState::default();
    let mut rng = StdRng::seed_from_u64(2);
    let mut pose = PoseVector::default();
    let mut tick = 0u64;

    c.bench_function("synthesize_audio_frame", |b| {
        b.iter(|| {
            tick = (tick + 1) % 1800;
            let now = FrameTime::from_micros(tick * 16_667);
            let level = (tick % 100) as f32 / 100.0;
            synthesizer.synthesize(
                &timeline,
                black_box(now),
                DriveSignal::Spectral(level),
                &mut idle,
                &mut rng,
                &mut pose,
            )
        })
    });
}

fn bench_pose_clamp(c: &mut Criterion) {
    let mut pose = PoseVector::default();

    c.bench_function("pose_clamp_all", |b| {
        b.iter(|| {
            pose.head_tilt = black_box(40.0);
            pose.mouth_openness = black_box(-1.0);
            pose.clamp_all();
            black_box(pose.is_within_bounds())
        })
    });
}

criterion_group!(benches, bench_text_frame, bench_audio_frame, bench_pose_clamp);
criterion_main!(benches);
