//! Benchmarks for MIMIC timeline building and playback

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use mimic_core::{Emotion, FrameTime};
use mimic_runtime::RunSource;
use mimic_test::{PlaybackSimulator, SimulatorConfig};
use mimic_timeline::{TextTimelineBuilder, TextTimingConfig};

fn script(words: usize) -> String {
    (0..words)
        .map(|i| if i % 7 == 6 { "sentence." } else { "word" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_plan(c: &mut Criterion) {
    let builder = TextTimelineBuilder::new(TextTimingConfig::default());
    let multiplier = builder.multiplier_for_rate(1.0);
    let mut group = c.benchmark_group("text_plan");

    for words in [8, 64, 512] {
        let text = script(words);
        group.bench_with_input(BenchmarkId::from_parameter(words), &text, |b, text| {
            b.iter(|| builder.plan(black_box(text), multiplier))
        });
    }
    group.finish();
}

fn bench_active_segment(c: &mut Criterion) {
    let builder = TextTimelineBuilder::new(TextTimingConfig::default());
    let timeline = builder
        .build(&script(256), 82.0, FrameTime::ZERO, Emotion::Neutral)
        .unwrap();
    let end = timeline.duration();
    let mut elapsed = Duration::ZERO;

    c.bench_function("active_segment_256", |b| {
        b.iter(|| {
            elapsed += Duration::from_millis(17);
            if elapsed > end {
                elapsed = Duration::ZERO;
            }
            timeline.active_segment(black_box(elapsed)).map(|a| a.index)
        })
    });
}

fn bench_controller_frame(c: &mut Criterion) {
    let mut sim = PlaybackSimulator::new(SimulatorConfig::default()).unwrap();

    c.bench_function("controller_frame", |b| {
        b.iter(|| {
            if sim.controller.state() == mimic_runtime::PlaybackState::Idle {
                sim.controller
                    .generate(RunSource::Text(script(32)))
                    .unwrap();
                sim.controller
                    .on_speech_event(mimic_runtime::SpeechEvent::started(sim.pending_utterance()));
            }
            black_box(sim.step())
        })
    });
}

criterion_group!(benches, bench_plan, bench_active_segment, bench_controller_frame);
criterion_main!(benches);
