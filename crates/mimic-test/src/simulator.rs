//! Playback Simulator - deterministic frame loop for testing
//!
//! Simulates:
//! - A display host firing frames at a fixed refresh interval
//! - The speech service confirming (or failing) utterances
//! - Audio clips ending on their own

use std::time::Duration;

use mimic_core::{FrameTime, MimicResult};
use mimic_runtime::{
    ControllerConfig, PlaybackController, PlaybackState, PlaybackStatus, PoseFrame, RunId,
    RunSource, SpeechEvent,
};
use mimic_time::{Clock, FrameQueue, VirtualClock};
use mimic_timeline::AudioClip;

use crate::fakes::{FrameLog, RecordingSink, ScriptedSpeech, SpeechLog};

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Time between display refreshes
    pub frame_interval: Duration,
    /// Seed for idle randomness
    pub seed: u64,
    /// Give up after this many frames when running to completion
    pub max_frames: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            frame_interval: Duration::from_micros(16_667),
            seed: 7,
            max_frames: 10_000,
        }
    }
}

/// Outcome of running a simulation to rest
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Frames that fired while the run was active
    pub frames_fired: usize,
    /// Frames published by the run, in order
    pub run_frames: Vec<PoseFrame>,
    pub final_status: PlaybackStatus,
    /// Clock reading when the controller went idle
    pub ended_at: FrameTime,
}

impl SimulationReport {
    /// Progress readouts of the run frames, in order
    pub fn progress(&self) -> Vec<f32> {
        self.run_frames.iter().map(|f| f.progress_percent).collect()
    }

    pub fn is_monotonic(&self) -> bool {
        self.progress().windows(2).all(|w| w[0] <= w[1])
    }
}

/// Controller wired to a virtual clock, a frame queue and scripted
/// delegates
pub struct PlaybackSimulator {
    pub controller: PlaybackController<VirtualClock, FrameQueue>,
    clock: VirtualClock,
    queue: FrameQueue,
    speech: SpeechLog,
    frames: FrameLog,
    config: SimulatorConfig,
}

impl PlaybackSimulator {
    pub fn new(config: SimulatorConfig) -> MimicResult<Self> {
        Self::with_controller_config(config.clone(), ControllerConfig::deterministic(config.seed))
    }

    pub fn with_controller_config(
        config: SimulatorConfig,
        controller_config: ControllerConfig,
    ) -> MimicResult<Self> {
        let clock = VirtualClock::new();
        let queue = FrameQueue::new();
        let (speech, speech_log) = ScriptedSpeech::new();
        let (sink, frame_log) = RecordingSink::new();

        let controller = PlaybackController::new(
            controller_config,
            clock.clone(),
            queue.clone(),
            Box::new(speech),
            Box::new(sink),
        )?;

        Ok(PlaybackSimulator {
            controller,
            clock,
            queue,
            speech: speech_log,
            frames: frame_log,
            config,
        })
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    pub fn queue(&self) -> &FrameQueue {
        &self.queue
    }

    pub fn speech(&self) -> &SpeechLog {
        &self.speech
    }

    pub fn frames(&self) -> &FrameLog {
        &self.frames
    }

    pub fn now(&self) -> FrameTime {
        self.clock.now()
    }

    /// Advance the clock without firing frames
    pub fn advance(&mut self, dt: Duration) -> FrameTime {
        self.clock.advance(dt)
    }

    /// Fire every frame requested so far, at the current time
    pub fn fire_due(&mut self) -> usize {
        let due = self.queue.take_due();
        let fired = due.len();
        for request in due {
            self.controller.on_frame(request);
        }
        fired
    }

    /// One display refresh: advance the clock, then fire due frames
    pub fn step(&mut self) -> usize {
        self.clock.advance(self.config.frame_interval);
        self.fire_due()
    }

    /// Refresh `n` times; returns frames fired
    pub fn step_n(&mut self, n: usize) -> usize {
        (0..n).map(|_| self.step()).sum()
    }

    /// Generate a text run and have the speech service start it
    pub fn speak(&mut self, script: &str) -> MimicResult<RunId> {
        self.controller
            .generate(RunSource::Text(script.to_string()))?;
        let id = self.pending_utterance();
        self.controller.on_speech_event(SpeechEvent::started(id));
        Ok(id)
    }

    /// Utterance id of the most recent speech request
    pub fn pending_utterance(&self) -> RunId {
        self.speech
            .last_request()
            .map(|r| r.utterance)
            .unwrap_or(RunId(0))
    }

    /// Deliver `ended` for the most recent utterance
    pub fn finish_speech(&mut self) {
        let id = self.pending_utterance();
        self.controller.on_speech_event(SpeechEvent::ended(id));
    }

    /// Load `clip` and start an audio run
    pub fn play(&mut self, clip: AudioClip) -> MimicResult<()> {
        self.controller.load_audio(clip);
        self.controller.generate(RunSource::Audio)
    }

    /// Refresh until the controller is idle again
    pub fn run_to_rest(&mut self) -> SimulationReport {
        let first_frame = self.frames.frame_count();
        let mut fired = self.fire_due();
        let mut steps = 0;
        while self.controller.state() != PlaybackState::Idle && steps < self.config.max_frames {
            fired += self.step();
            steps += 1;
        }

        let run_frames = self.frames.frames()[first_frame..]
            .iter()
            .filter(|f| f.run.is_some())
            .cloned()
            .collect();

        SimulationReport {
            frames_fired: fired,
            run_frames,
            final_status: self.controller.status().clone(),
            ended_at: self.clock.now(),
        }
    }
}
