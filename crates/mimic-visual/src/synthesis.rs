//! Pose Synthesis - (timeline, now, idle state) → pose vector
//!
//! Called once per frame. Everything is recomputed from absolute
//! readings, so late or irregular frames need no special handling.

use std::f32::consts::{PI, TAU};
use std::time::Duration;

use mimic_core::{Emotion, FrameTime};
use mimic_timeline::{progress_percent, TimelineMode, TimelineModel, TextTimelineBuilder};
use rand::Rng;
use tracing::trace;

use crate::{emotion_bias, EmotionBias, IdleConfig, IdlePhaseState, PoseVector};

/// Quietest drive level while text is being spoken
pub const TEXT_LEVEL_FLOOR: f32 = 0.05;

/// Letters at which a token reaches full phonetic energy (before offset)
const ENERGY_LETTERS: f32 = 6.0;
const ENERGY_OFFSET: f32 = 0.2;

/// Drive signal sampled for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveSignal {
    /// Text runs derive their level from the active token
    Script,
    /// Spectral level of the playing clip [0.0 - 1.0]
    Spectral(f32),
}

/// Per-frame timing produced alongside the pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisOutput {
    /// Elapsed run time, clamped to the run duration
    pub elapsed: Duration,
    /// Linear progress [0.0 - 1.0]
    pub ratio: f64,
    /// Eased progress [0.0 - 1.0]
    pub eased_progress: f64,
    /// Eased progress as a percentage, one decimal
    pub progress_percent: f32,
    /// Has the run reached its duration?
    pub finished: bool,
}

/// Heuristic articulation strength of a token [0.2 - 1.0]
pub fn phonetic_energy(token: &str) -> f32 {
    let letters = TextTimelineBuilder::letter_count(token) as f32;
    (letters / ENERGY_LETTERS + ENERGY_OFFSET).min(1.0)
}

/// Half-sine envelope over a token's local progress
#[inline]
pub fn token_envelope(local_ratio: f64) -> f32 {
    (local_ratio.clamp(0.0, 1.0) as f32 * PI).sin().max(0.0)
}

#[inline]
fn wave(t: f32, period_secs: f32) -> f32 {
    (t * TAU / period_secs).sin()
}

/// Drive layer result
struct Drive {
    level: f32,
    label: String,
}

/// Pose synthesizer
#[derive(Debug, Clone, Default)]
pub struct PoseSynthesizer {
    idle: IdleConfig,
}

impl PoseSynthesizer {
    pub fn new(idle: IdleConfig) -> Self {
        PoseSynthesizer { idle }
    }

    pub fn idle_config(&self) -> &IdleConfig {
        &self.idle
    }

    /// Compute the pose for `now` and write it into `pose`.
    ///
    /// Every field of `pose` is assigned, and all bounded fields are
    /// clamped before returning.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        timeline: &TimelineModel,
        now: FrameTime,
        drive: DriveSignal,
        idle: &mut IdlePhaseState,
        rng: &mut R,
        pose: &mut PoseVector,
    ) -> SynthesisOutput {
        let elapsed = timeline.elapsed(now);
        let ratio = timeline.ratio(now);
        let eased = timeline.eased_progress(now);

        let drive = match timeline.mode() {
            TimelineMode::Text => Self::text_drive(timeline, elapsed),
            TimelineMode::Audio => Self::audio_drive(drive),
        };

        self.compose(
            now,
            eased as f32,
            drive,
            timeline.emotion(),
            idle,
            rng,
            pose,
        );

        let output = SynthesisOutput {
            elapsed,
            ratio,
            eased_progress: eased,
            progress_percent: progress_percent(eased),
            finished: timeline.is_complete(now),
        };
        trace!(?now, level = pose.audio_level, progress = output.progress_percent, "synthesized");
        output
    }

    fn text_drive(timeline: &TimelineModel, elapsed: Duration) -> Drive {
        match timeline.active_segment(elapsed) {
            Some(active) => {
                let energy = phonetic_energy(&active.segment.token);
                let envelope = token_envelope(active.local_ratio);
                Drive {
                    level: (envelope * energy).max(TEXT_LEVEL_FLOOR),
                    label: active.segment.token.clone(),
                }
            }
            None => Drive {
                level: TEXT_LEVEL_FLOOR,
                label: String::new(),
            },
        }
    }

    fn audio_drive(drive: DriveSignal) -> Drive {
        let level = match drive {
            DriveSignal::Spectral(level) if level.is_finite() => level.clamp(0.0, 1.0),
            _ => 0.0,
        };
        Drive {
            level,
            label: format!("energy {:.0}%", level * 100.0),
        }
    }

    /// Layer idle behaviors and emotion bias over the drive level
    #[allow(clippy::too_many_arguments)]
    fn compose<R: Rng + ?Sized>(
        &self,
        now: FrameTime,
        progress: f32,
        drive: Drive,
        emotion: Emotion,
        idle: &mut IdlePhaseState,
        rng: &mut R,
        pose: &mut PoseVector,
    ) {
        let t = now.as_secs_f64() as f32;
        let e = drive.level;
        let bias: &EmotionBias = emotion_bias(emotion);

        let blink = idle.blink(now, &self.idle, rng);
        let pulse = idle.emotion_pulse(now, &self.idle);

        let mouth_openness = 0.04 + e * 0.9;
        let mouth_width = 0.45 + e * 0.25 + bias.mouth_width;
        let mouth_roundness =
            0.2 + e * 0.35 * (0.5 + 0.5 * wave(t, 0.37)) + bias.mouth_roundness;
        let brow_lift = 0.08 * wave(t, 4.3) + e * 0.3 + bias.brow_lift;

        let head_tilt =
            3.5 * wave(t, 5.1) + 2.0 * (progress - 0.5) + 2.5 * e * wave(t, 1.3) + bias.head_tilt;
        let head_turn = 5.0 * wave(t, 7.3) + 1.5 * (progress * PI).sin() + 2.0 * e * wave(t, 2.1);

        let eye_offset_x = 0.3 * wave(t, 3.9) + 0.08 * (progress * TAU).sin();
        let eye_offset_y = 0.15 * wave(t, 5.7) - 0.05 * progress + bias.gaze_y;

        let hand_cycle = (t * TAU / 2.6 + progress * PI).sin() * (0.25 + 0.75 * e);
        let emotion_intensity = bias.base_intensity * (0.75 + 0.25 * pulse) + 0.25 * e;
        let shimmer = 0.5 + 0.5 * wave(t, 1.6);

        *pose = PoseVector {
            mouth_openness,
            mouth_width,
            mouth_roundness,
            eye_offset_x,
            eye_offset_y,
            blink,
            brow_lift,
            head_tilt,
            head_turn,
            hand_cycle,
            emotion,
            emotion_intensity,
            audio_level: e,
            timeline_label: drive.label,
            shimmer,
        };
        pose.clamp_all();
    }
}
