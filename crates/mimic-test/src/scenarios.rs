//! End-to-end playback scenarios
//!
//! Each scenario drives a [`PlaybackSimulator`] through a complete run
//! and reports what a viewer would have seen:
//! - Token timing and labels of a short script
//! - Constant-level audio runs
//! - Runs superseded or stopped midway

use std::time::Duration;

use mimic_core::{Emotion, FrameTime};
use mimic_runtime::{PlaybackState, PlaybackStatus, RunSource};

use crate::fakes::{fake_clip, AudioCall};
use crate::simulator::{PlaybackSimulator, SimulationReport, SimulatorConfig};

/// Result of a scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub report: SimulationReport,
    /// Token boundaries (ms from run start) of text runs
    pub boundaries_ms: Vec<u64>,
    /// Labels shown, consecutive duplicates collapsed
    pub labels: Vec<String>,
    /// Every published pose stayed inside its ranges
    pub poses_in_bounds: bool,
    /// Frames requested but never cancelled or fired after the run
    pub leaked_frames: usize,
}

impl ScenarioResult {
    fn collect(sim: &PlaybackSimulator, report: SimulationReport, boundaries_ms: Vec<u64>) -> Self {
        let mut labels: Vec<String> = Vec::new();
        for frame in &report.run_frames {
            if labels.last() != Some(&frame.pose.timeline_label) {
                labels.push(frame.pose.timeline_label.clone());
            }
        }
        let poses_in_bounds = sim
            .frames()
            .frames()
            .iter()
            .all(|f| f.pose.is_within_bounds());

        ScenarioResult {
            report,
            boundaries_ms,
            labels,
            poses_in_bounds,
            leaked_frames: sim.queue().pending_count(),
        }
    }

    pub fn passed(&self) -> bool {
        self.poses_in_bounds && self.leaked_frames == 0 && self.report.is_monotonic()
    }
}

/// Speak `script` to completion
pub fn run_script(script: &str, emotion: Emotion) -> Option<ScenarioResult> {
    let mut sim = PlaybackSimulator::new(SimulatorConfig::default()).ok()?;
    sim.controller.set_emotion(emotion);
    sim.speak(script).ok()?;

    let mut boundaries_ms = Vec::new();
    let mut end = Duration::ZERO;
    for segment in sim.controller.timeline()?.segments() {
        end += segment.duration;
        boundaries_ms.push(end.as_millis() as u64);
    }

    let report = sim.run_to_rest();
    Some(ScenarioResult::collect(&sim, report, boundaries_ms))
}

/// Play a clip of `duration_ms` whose spectrum sits at `magnitude`
pub fn run_constant_audio(duration_ms: u64, magnitude: u8) -> Option<ScenarioResult> {
    let mut sim = PlaybackSimulator::new(SimulatorConfig::default()).ok()?;
    let (clip, _log) = fake_clip(duration_ms, magnitude);
    sim.play(clip).ok()?;

    let report = sim.run_to_rest();
    Some(ScenarioResult::collect(&sim, report, Vec::new()))
}

/// Start one script, then another after `after`; only the second
/// may finish
pub fn run_superseded(first: &str, second: &str, after: Duration) -> Option<ScenarioResult> {
    let mut sim = PlaybackSimulator::new(SimulatorConfig::default()).ok()?;
    let first_id = sim.speak(first).ok()?;
    let deadline = sim.now() + after;
    while sim.now() < deadline {
        sim.step();
    }

    sim.speak(second).ok()?;
    // Late events for the superseded utterance are ignored
    sim.controller
        .on_speech_event(mimic_runtime::SpeechEvent::ended(first_id));

    let report = sim.run_to_rest();
    Some(ScenarioResult::collect(&sim, report, Vec::new()))
}

/// Play audio and stop it after `after`
pub fn run_stopped_audio(duration_ms: u64, after: Duration) -> Option<(ScenarioResult, Vec<AudioCall>)> {
    let mut sim = PlaybackSimulator::new(SimulatorConfig::default()).ok()?;
    let (clip, log) = fake_clip(duration_ms, 120);
    sim.play(clip).ok()?;

    let stop_at = FrameTime::ZERO + after;
    while sim.now() < stop_at && sim.controller.state() == PlaybackState::Running {
        sim.step();
    }
    sim.controller.stop();

    let report = sim.run_to_rest();
    Some((ScenarioResult::collect(&sim, report, Vec::new()), log.calls()))
}
