//! Scripted collaborators - speech, audio, sinks and renderers
//!
//! Every fake records what the controller asked of it through a shared
//! log handle, so a test keeps one clone while the controller owns the
//! boxed delegate.

use std::sync::Arc;
use std::time::Duration;

use mimic_core::{MimicError, MimicResult};
use mimic_runtime::{
    FrameSink, PlaybackStatus, PoseFrame, Renderer, SpeechDelegate, SpeechRequest,
    StyleDescriptor,
};
use mimic_timeline::{AudioClip, AudioResource, SpectralSampler};
use mimic_visual::PoseVector;
use parking_lot::Mutex;

// ============================================================================
// SPEECH
// ============================================================================

#[derive(Debug, Default)]
struct SpeechLogInner {
    requests: Vec<SpeechRequest>,
    cancels: usize,
    refuse: Option<String>,
}

/// Shared record of a [`ScriptedSpeech`] delegate
#[derive(Debug, Clone, Default)]
pub struct SpeechLog {
    inner: Arc<Mutex<SpeechLogInner>>,
}

impl SpeechLog {
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.inner.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<SpeechRequest> {
        self.inner.lock().requests.last().cloned()
    }

    pub fn cancels(&self) -> usize {
        self.inner.lock().cancels
    }

    /// Refuse every later utterance with `reason`
    pub fn refuse_with(&self, reason: impl Into<String>) {
        self.inner.lock().refuse = Some(reason.into());
    }
}

/// Speech delegate that accepts (or refuses) utterances and stays silent.
/// Lifecycle events are delivered by the test.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSpeech {
    log: SpeechLog,
}

impl ScriptedSpeech {
    pub fn new() -> (Self, SpeechLog) {
        let speech = ScriptedSpeech::default();
        let log = speech.log.clone();
        (speech, log)
    }
}

impl SpeechDelegate for ScriptedSpeech {
    fn speak(&mut self, request: &SpeechRequest) -> MimicResult<()> {
        let mut inner = self.log.inner.lock();
        if let Some(reason) = &inner.refuse {
            return Err(MimicError::SpeechFailed(reason.clone()));
        }
        inner.requests.push(request.clone());
        Ok(())
    }

    fn cancel(&mut self) {
        self.log.inner.lock().cancels += 1;
    }
}

// ============================================================================
// AUDIO
// ============================================================================

/// One call made on a fake clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCall {
    Play,
    Pause,
    SeekToStart,
    Attach,
    Detach,
}

/// Shared record of calls made on a fake clip
#[derive(Debug, Clone, Default)]
pub struct AudioLog {
    calls: Arc<Mutex<Vec<AudioCall>>>,
}

impl AudioLog {
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: AudioCall) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn push(&self, call: AudioCall) {
        self.calls.lock().push(call);
    }
}

/// Audio resource with a fixed (or unknown) duration
#[derive(Debug)]
pub struct FakeAudio {
    duration: Option<Duration>,
    refuse: Option<String>,
    log: AudioLog,
}

impl AudioResource for FakeAudio {
    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn play(&mut self) -> MimicResult<()> {
        if let Some(reason) = &self.refuse {
            return Err(MimicError::AudioPlaybackFailed(reason.clone()));
        }
        self.log.push(AudioCall::Play);
        Ok(())
    }

    fn pause(&mut self) {
        self.log.push(AudioCall::Pause);
    }

    fn seek_to_start(&mut self) {
        self.log.push(AudioCall::SeekToStart);
    }
}

/// Sampler reporting the same magnitude in every bin
#[derive(Debug)]
pub struct ConstantSpectrum {
    magnitude: u8,
    log: AudioLog,
}

impl SpectralSampler for ConstantSpectrum {
    fn attach(&mut self) {
        self.log.push(AudioCall::Attach);
    }

    fn detach(&mut self) {
        self.log.push(AudioCall::Detach);
    }

    fn read_magnitudes(&mut self, bins: &mut [u8]) {
        bins.fill(self.magnitude);
    }
}

/// Builder for fake audio clips
#[derive(Debug, Clone, Default)]
pub struct FakeClipBuilder {
    duration: Option<Duration>,
    magnitude: u8,
    refuse: Option<String>,
}

impl FakeClipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn magnitude(mut self, magnitude: u8) -> Self {
        self.magnitude = magnitude;
        self
    }

    /// Make `play` fail with `reason`
    pub fn refuse_play(mut self, reason: impl Into<String>) -> Self {
        self.refuse = Some(reason.into());
        self
    }

    pub fn build(self) -> (AudioClip, AudioLog) {
        let log = AudioLog::default();
        let resource = FakeAudio {
            duration: self.duration,
            refuse: self.refuse,
            log: log.clone(),
        };
        let sampler = ConstantSpectrum {
            magnitude: self.magnitude,
            log: log.clone(),
        };
        (AudioClip::new(Box::new(resource), Box::new(sampler)), log)
    }
}

/// Clip of `duration_ms` whose spectrum sits at `magnitude`
pub fn fake_clip(duration_ms: u64, magnitude: u8) -> (AudioClip, AudioLog) {
    FakeClipBuilder::new()
        .duration(Duration::from_millis(duration_ms))
        .magnitude(magnitude)
        .build()
}

// ============================================================================
// PUBLICATION
// ============================================================================

#[derive(Debug, Default)]
struct FrameLogInner {
    frames: Vec<PoseFrame>,
    statuses: Vec<PlaybackStatus>,
}

/// Shared record of a [`RecordingSink`]
#[derive(Debug, Clone, Default)]
pub struct FrameLog {
    inner: Arc<Mutex<FrameLogInner>>,
}

impl FrameLog {
    pub fn frames(&self) -> Vec<PoseFrame> {
        self.inner.lock().frames.clone()
    }

    pub fn frame_count(&self) -> usize {
        self.inner.lock().frames.len()
    }

    pub fn last_frame(&self) -> Option<PoseFrame> {
        self.inner.lock().frames.last().cloned()
    }

    /// Frames produced by a run (idle rest frames excluded)
    pub fn run_frames(&self) -> Vec<PoseFrame> {
        self.inner
            .lock()
            .frames
            .iter()
            .filter(|f| f.run.is_some())
            .cloned()
            .collect()
    }

    pub fn statuses(&self) -> Vec<PlaybackStatus> {
        self.inner.lock().statuses.clone()
    }

    pub fn last_status(&self) -> Option<PlaybackStatus> {
        self.inner.lock().statuses.last().cloned()
    }
}

/// Frame sink that keeps every published frame and status
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: FrameLog,
}

impl RecordingSink {
    pub fn new() -> (Self, FrameLog) {
        let sink = RecordingSink::default();
        let log = sink.log.clone();
        (sink, log)
    }
}

impl FrameSink for RecordingSink {
    fn publish(&mut self, frame: &PoseFrame) {
        self.log.inner.lock().frames.push(frame.clone());
    }

    fn status(&mut self, status: &PlaybackStatus) {
        self.log.inner.lock().statuses.push(status.clone());
    }
}

/// Renderer that counts frames and out-of-range poses
#[derive(Debug, Default)]
pub struct BoundsCheckingRenderer {
    pub frames: usize,
    pub violations: usize,
    pub last_label: String,
}

impl Renderer for BoundsCheckingRenderer {
    fn render(&mut self, pose: &PoseVector, _style: &StyleDescriptor) {
        self.frames += 1;
        if !pose.is_within_bounds() {
            self.violations += 1;
        }
        self.last_label.clone_from(&pose.timeline_label);
    }
}

#[cfg(test)]
mod tests {
    use mimic_timeline::{AudioTimelineAdapter, AudioTimingConfig};

    use super::*;

    #[test]
    fn test_fake_clip_level() {
        let (mut clip, log) = fake_clip(4000, 90);
        let adapter = AudioTimelineAdapter::default();

        assert_eq!(clip.read_level(&AudioTimingConfig::default()), 0.0);
        adapter
            .start(&mut clip, mimic_core::FrameTime::ZERO, Default::default())
            .unwrap();
        assert_eq!(clip.read_level(&AudioTimingConfig::default()), 0.5);
        assert_eq!(log.calls(), vec![AudioCall::Attach, AudioCall::Play]);
    }

    #[test]
    fn test_scripted_speech_refusal() {
        let (mut speech, log) = ScriptedSpeech::new();
        log.refuse_with("busy");

        let request = SpeechRequest {
            utterance: mimic_runtime::RunId(1),
            text: "hi".into(),
            voice: Default::default(),
        };
        assert_eq!(
            speech.speak(&request),
            Err(MimicError::SpeechFailed("busy".into()))
        );
        assert!(log.requests().is_empty());
    }
}
