//! Playback Controller - run lifecycle and the per-frame loop

use mimic_core::{Emotion, MimicError, MimicResult};
use mimic_time::{Clock, FrameRequest, FrameScheduler};
use mimic_timeline::{
    AudioClip, AudioTimelineAdapter, TextPlan, TextTimelineBuilder, TimelineMode, TimelineModel,
};
use mimic_visual::{DriveSignal, IdlePhaseState, PoseSynthesizer, PoseVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

use crate::{
    ControllerConfig, FrameSink, PlaybackState, PlaybackStats, PlaybackStatus, PoseFrame, RunId,
    SpeechDelegate, SpeechEvent, SpeechEventKind, SpeechRequest, SpeechVoice,
};

/// What a "generate" command should play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSource {
    /// Speak a script
    Text(String),
    /// Play the loaded audio clip
    Audio,
}

/// Phase of the active run
#[derive(Debug)]
enum RunPhase {
    /// Text planned; timeline is anchored when speech becomes audible
    AwaitingSpeech(TextPlan),
    Active(TimelineModel),
}

#[derive(Debug)]
struct ActiveRun {
    id: RunId,
    mode: TimelineMode,
    emotion: Emotion,
    phase: RunPhase,
}

impl ActiveRun {
    fn timeline(&self) -> Option<&TimelineModel> {
        match &self.phase {
            RunPhase::Active(timeline) => Some(timeline),
            RunPhase::AwaitingSpeech(_) => None,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEnd {
    Completed,
    Cancelled,
    Failed,
}

/// Playback controller
///
/// Owns the single pose vector and the idle phase state. At most one
/// run exists at a time; a new run always tears the old one down first.
pub struct PlaybackController<C: Clock, S: FrameScheduler> {
    config: ControllerConfig,
    clock: C,
    scheduler: S,
    speech: Box<dyn SpeechDelegate>,
    sink: Box<dyn FrameSink>,
    text_builder: TextTimelineBuilder,
    audio_adapter: AudioTimelineAdapter,
    synthesizer: PoseSynthesizer,
    audio_clip: Option<AudioClip>,
    emotion: Emotion,
    voice: SpeechVoice,
    state: PlaybackState,
    run: Option<ActiveRun>,
    pending_frame: Option<FrameRequest>,
    /// Cleared to end an audio run on its next frame
    previewing: bool,
    pose: PoseVector,
    idle: IdlePhaseState,
    rng: StdRng,
    status: PlaybackStatus,
    next_run: u64,
    stats: PlaybackStats,
}

impl<C: Clock, S: FrameScheduler> PlaybackController<C, S> {
    /// Create a controller and publish the idle pose
    pub fn new(
        config: ControllerConfig,
        clock: C,
        scheduler: S,
        speech: Box<dyn SpeechDelegate>,
        sink: Box<dyn FrameSink>,
    ) -> MimicResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut controller = PlaybackController {
            text_builder: TextTimelineBuilder::new(config.text.clone()),
            audio_adapter: AudioTimelineAdapter::new(config.audio.clone()),
            synthesizer: PoseSynthesizer::new(config.idle.clone()),
            config,
            clock,
            scheduler,
            speech,
            sink,
            audio_clip: None,
            emotion: Emotion::Neutral,
            voice: SpeechVoice::default(),
            state: PlaybackState::Idle,
            run: None,
            pending_frame: None,
            previewing: false,
            pose: PoseVector::rest(Emotion::Neutral),
            idle: IdlePhaseState::default(),
            rng,
            status: PlaybackStatus::Ready,
            next_run: 0,
            stats: PlaybackStats::default(),
        };
        controller.publish_rest(0.0);
        Ok(controller)
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn status(&self) -> &PlaybackStatus {
        &self.status
    }

    pub fn stats(&self) -> &PlaybackStats {
        &self.stats
    }

    /// Current pose (read-only; sinks get their own copies)
    pub fn pose(&self) -> &PoseVector {
        &self.pose
    }

    pub fn idle_state(&self) -> &IdlePhaseState {
        &self.idle
    }

    /// Timeline of the active run, once anchored
    pub fn timeline(&self) -> Option<&TimelineModel> {
        self.run.as_ref().and_then(ActiveRun::timeline)
    }

    pub fn active_run(&self) -> Option<RunId> {
        self.run.as_ref().map(|run| run.id)
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending_frame
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    /// Emotion for the next run; the active run keeps its own
    pub fn set_emotion(&mut self, emotion: Emotion) {
        self.emotion = emotion;
        if !self.state.is_active() {
            self.pose.emotion = emotion;
        }
    }

    pub fn voice(&self) -> &SpeechVoice {
        &self.voice
    }

    pub fn set_voice(&mut self, voice: SpeechVoice) {
        self.voice = voice.clamped();
    }

    /// Select the clip used by audio runs
    pub fn load_audio(&mut self, clip: AudioClip) {
        if self.active_mode() == Some(TimelineMode::Audio) {
            self.stop();
        }
        debug!(?clip, "audio clip loaded");
        self.audio_clip = Some(clip);
    }

    pub fn unload_audio(&mut self) -> Option<AudioClip> {
        if self.active_mode() == Some(TimelineMode::Audio) {
            self.stop();
        }
        self.audio_clip.take()
    }

    pub fn has_audio(&self) -> bool {
        self.audio_clip.is_some()
    }

    fn active_mode(&self) -> Option<TimelineMode> {
        self.run.as_ref().map(|run| run.mode)
    }

    /// Start a run.
    ///
    /// Invalid input is refused before anything changes: the active run
    /// (if any) keeps playing and the status line is untouched.
    pub fn generate(&mut self, source: RunSource) -> MimicResult<()> {
        match source {
            RunSource::Text(script) => {
                let multiplier = self.text_builder.multiplier_for_rate(self.voice.rate);
                let Some(plan) = self.text_builder.plan(&script, multiplier) else {
                    debug!("generate refused: empty script");
                    return Err(MimicError::EmptyScript);
                };
                let id = self.begin_run();
                self.start_text(id, script, plan)
            }
            RunSource::Audio => {
                if self.audio_clip.is_none() {
                    debug!("generate refused: no audio clip");
                    return Err(MimicError::NoAudioSelected);
                }
                let id = self.begin_run();
                self.start_audio(id)
            }
        }
    }

    /// Tear down any active run and allocate the next run id
    fn begin_run(&mut self) -> RunId {
        let was_active = self.state.is_active();
        if was_active {
            info!(run = ?self.active_run(), "superseding active run");
            self.teardown(RunEnd::Cancelled, None);
        }
        if !was_active {
            let now = self.clock.now();
            self.idle.prime(now, &self.config.idle, &mut self.rng);
        }
        self.next_run += 1;
        self.stats.runs_started += 1;
        RunId(self.next_run)
    }

    fn start_text(&mut self, id: RunId, script: String, plan: TextPlan) -> MimicResult<()> {
        let request = SpeechRequest {
            utterance: id,
            text: script,
            voice: self.voice.clone(),
        };
        self.run = Some(ActiveRun {
            id,
            mode: TimelineMode::Text,
            emotion: self.emotion,
            phase: RunPhase::AwaitingSpeech(plan),
        });
        self.state = PlaybackState::Starting;

        if let Err(e) = self.speech.speak(&request) {
            warn!(run = ?id, error = %e, "speech delegate refused utterance");
            self.teardown(RunEnd::Failed, Some(PlaybackStatus::Error(e.to_string())));
            return Err(e);
        }

        info!(run = ?id, tokens = self.planned_tokens(), "text run waiting for speech");
        self.set_status(PlaybackStatus::WaitingForSpeech);
        Ok(())
    }

    fn planned_tokens(&self) -> usize {
        match self.run.as_ref().map(|run| &run.phase) {
            Some(RunPhase::AwaitingSpeech(plan)) => plan.token_count(),
            Some(RunPhase::Active(timeline)) => timeline.segments().len(),
            None => 0,
        }
    }

    fn start_audio(&mut self, id: RunId) -> MimicResult<()> {
        let now = self.clock.now();
        let emotion = self.emotion;
        let Some(clip) = self.audio_clip.as_mut() else {
            return Err(MimicError::NoAudioSelected);
        };

        let started = self.audio_adapter.start(clip, now, emotion);
        let timeline = match started {
            Ok(Some(timeline)) => timeline,
            Ok(None) => {
                self.audio_adapter.release(clip);
                let e = MimicError::AudioPlaybackFailed("clip has no duration".into());
                self.fail_before_start(&e);
                return Err(e);
            }
            Err(e) => {
                warn!(run = ?id, error = %e, "audio run failed to start");
                self.fail_before_start(&e);
                return Err(e);
            }
        };

        info!(run = ?id, duration = ?timeline.duration(), "audio run started");
        self.run = Some(ActiveRun {
            id,
            mode: TimelineMode::Audio,
            emotion,
            phase: RunPhase::Active(timeline),
        });
        self.state = PlaybackState::Running;
        self.previewing = true;
        self.set_status(PlaybackStatus::PlayingAudio);
        self.schedule_frame();
        Ok(())
    }

    fn fail_before_start(&mut self, error: &MimicError) {
        self.stats.runs_failed += 1;
        self.pose.reset_dynamic();
        self.publish_rest(0.0);
        self.set_status(PlaybackStatus::Error(error.to_string()));
    }

    /// Deliver a lifecycle signal from the speech delegate
    pub fn on_speech_event(&mut self, event: SpeechEvent) {
        let current = self
            .run
            .as_ref()
            .filter(|run| run.mode == TimelineMode::Text)
            .map(|run| run.id);
        if current != Some(event.utterance) {
            debug!(utterance = ?event.utterance, kind = ?event.kind, "ignoring speech event for inactive utterance");
            self.stats.ignored_speech_events += 1;
            return;
        }

        match event.kind {
            SpeechEventKind::Started => self.anchor_text_run(),
            SpeechEventKind::Ended => {
                info!(run = ?event.utterance, "speech ended");
                self.teardown(RunEnd::Completed, Some(PlaybackStatus::Complete));
            }
            SpeechEventKind::Error(reason) => {
                warn!(run = ?event.utterance, %reason, "speech delegate error");
                self.teardown(RunEnd::Failed, Some(PlaybackStatus::Error(reason)));
            }
        }
    }

    fn anchor_text_run(&mut self) {
        let now = self.clock.now();
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let phase = std::mem::replace(&mut run.phase, RunPhase::AwaitingSpeech(empty_plan()));
        let plan = match phase {
            RunPhase::AwaitingSpeech(plan) => plan,
            active @ RunPhase::Active(_) => {
                // Duplicate `started`; keep the original anchor
                run.phase = active;
                return;
            }
        };

        match plan.into_timeline(now, run.emotion) {
            Some(timeline) => {
                info!(run = ?run.id, duration = ?timeline.duration(), "text run started");
                run.phase = RunPhase::Active(timeline);
                self.state = PlaybackState::Running;
                self.set_status(PlaybackStatus::Speaking);
                self.schedule_frame();
            }
            None => {
                self.teardown(
                    RunEnd::Failed,
                    Some(PlaybackStatus::Error(MimicError::EmptyScript.to_string())),
                );
            }
        }
    }

    /// The audio clip finished on its own; the run completes on its
    /// next frame.
    pub fn on_audio_ended(&mut self) {
        if self.active_mode() == Some(TimelineMode::Audio) {
            debug!("audio clip reported end");
            self.previewing = false;
        }
    }

    /// Run one scheduled frame.
    ///
    /// Frames other than the one currently requested are ignored, so a
    /// frame that fires after cancellation does nothing.
    pub fn on_frame(&mut self, request: FrameRequest) {
        if self.pending_frame != Some(request) {
            trace!(?request, "stale frame");
            self.stats.stale_frames += 1;
            return;
        }
        self.pending_frame = None;
        if self.state != PlaybackState::Running {
            return;
        }

        let now = self.clock.now();
        let Some(run) = self.run.as_ref() else {
            return;
        };
        let (id, mode) = (run.id, run.mode);
        let Some(timeline) = run.timeline() else {
            return;
        };

        let drive = match mode {
            TimelineMode::Text => DriveSignal::Script,
            TimelineMode::Audio => {
                let level = self
                    .audio_clip
                    .as_mut()
                    .map(|clip| clip.read_level(&self.config.audio))
                    .unwrap_or(0.0);
                DriveSignal::Spectral(level)
            }
        };

        let output = self.synthesizer.synthesize(
            timeline,
            now,
            drive,
            &mut self.idle,
            &mut self.rng,
            &mut self.pose,
        );
        self.stats.ticks += 1;

        let frame = PoseFrame {
            pose: self.pose.clone(),
            progress_percent: output.progress_percent,
            run: Some(id),
            at: now,
        };
        self.sink.publish(&frame);

        let keep_going = match mode {
            TimelineMode::Text => !output.finished,
            TimelineMode::Audio => !output.finished && self.previewing,
        };
        if keep_going {
            self.schedule_frame();
        } else {
            info!(run = ?id, elapsed = ?output.elapsed, "run complete");
            self.teardown(RunEnd::Completed, Some(PlaybackStatus::Complete));
        }
    }

    /// Stop the active run and reset idle timers. No-op when idle.
    pub fn stop(&mut self) {
        if !self.state.is_active() {
            trace!("stop while idle");
            return;
        }
        info!(run = ?self.active_run(), "stopping run");
        self.previewing = false;
        self.teardown(RunEnd::Cancelled, Some(PlaybackStatus::Stopped));
        self.idle.reset();
    }

    fn schedule_frame(&mut self) {
        if let Some(previous) = self.pending_frame.take() {
            self.scheduler.cancel_frame(previous);
        }
        self.pending_frame = Some(self.scheduler.request_frame());
    }

    /// Cancel the pending frame, release the run's resource, discard the
    /// timeline and return the pose to rest.
    fn teardown(&mut self, end: RunEnd, status: Option<PlaybackStatus>) {
        if let Some(request) = self.pending_frame.take() {
            self.scheduler.cancel_frame(request);
        }

        if let Some(run) = self.run.take() {
            match run.mode {
                TimelineMode::Text => self.speech.cancel(),
                TimelineMode::Audio => {
                    if let Some(clip) = self.audio_clip.as_mut() {
                        self.audio_adapter.release(clip);
                    }
                }
            }
            debug!(run = ?run.id, ?end, "run torn down");
        }

        match end {
            RunEnd::Completed => self.stats.runs_completed += 1,
            RunEnd::Cancelled => self.stats.runs_cancelled += 1,
            RunEnd::Failed => self.stats.runs_failed += 1,
        }

        self.state = PlaybackState::Idle;
        self.previewing = false;
        self.pose.reset_dynamic();
        self.pose.emotion = self.emotion;
        let progress = if end == RunEnd::Completed { 100.0 } else { 0.0 };
        self.publish_rest(progress);

        if let Some(status) = status {
            self.set_status(status);
        }
    }

    fn publish_rest(&mut self, progress_percent: f32) {
        let frame = PoseFrame {
            pose: self.pose.clone(),
            progress_percent,
            run: None,
            at: self.clock.now(),
        };
        self.sink.publish(&frame);
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            debug!(%status, "status");
        }
        self.status = status;
        self.sink.status(&self.status);
    }
}

fn empty_plan() -> TextPlan {
    TextPlan::default()
}

impl<C: Clock, S: FrameScheduler> std::fmt::Debug for PlaybackController<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("status", &self.status)
            .field("run", &self.active_run())
            .field("pending_frame", &self.pending_frame)
            .field("emotion", &self.emotion)
            .finish()
    }
}
