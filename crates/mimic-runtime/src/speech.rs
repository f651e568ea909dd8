//! Speech delegate - the platform text-to-speech service

use mimic_core::MimicResult;
use serde::{Deserialize, Serialize};

use crate::RunId;

/// Voice settings for text runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechVoice {
    /// Speaking rate (0.5 - 2.0); also scales token timing
    pub rate: f32,
    /// Pitch (0.0 - 2.0); passed to the delegate only
    pub pitch: f32,
    /// Platform voice identifier
    pub voice: Option<String>,
}

impl Default for SpeechVoice {
    fn default() -> Self {
        SpeechVoice {
            rate: 1.0,
            pitch: 1.0,
            voice: None,
        }
    }
}

impl SpeechVoice {
    /// Same voice with rate and pitch inside their ranges; non-finite
    /// values fall back to the defaults
    pub fn clamped(&self) -> SpeechVoice {
        let defaults = SpeechVoice::default();
        SpeechVoice {
            rate: finite_or(self.rate, defaults.rate).clamp(0.5, 2.0),
            pitch: finite_or(self.pitch, defaults.pitch).clamp(0.0, 2.0),
            voice: self.voice.clone(),
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// One utterance handed to the speech delegate
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    /// Echoed back in every event for this utterance
    pub utterance: RunId,
    pub text: String,
    pub voice: SpeechVoice,
}

/// Lifecycle signal kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEventKind {
    Started,
    Ended,
    Error(String),
}

/// Lifecycle signal from the speech delegate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechEvent {
    pub utterance: RunId,
    pub kind: SpeechEventKind,
}

impl SpeechEvent {
    pub fn started(utterance: RunId) -> Self {
        SpeechEvent {
            utterance,
            kind: SpeechEventKind::Started,
        }
    }

    pub fn ended(utterance: RunId) -> Self {
        SpeechEvent {
            utterance,
            kind: SpeechEventKind::Ended,
        }
    }

    pub fn error(utterance: RunId, reason: impl Into<String>) -> Self {
        SpeechEvent {
            utterance,
            kind: SpeechEventKind::Error(reason.into()),
        }
    }
}

/// Platform speech synthesis
///
/// `speak` only queues the utterance; the host later delivers
/// [`SpeechEvent`]s to the controller.
pub trait SpeechDelegate {
    fn speak(&mut self, request: &SpeechRequest) -> MimicResult<()>;

    /// Silence any current utterance. Must be safe to call when idle.
    fn cancel(&mut self);
}

/// Speech delegate for hosts without text-to-speech: accepts every
/// utterance and stays silent. The host emits `started` itself.
#[derive(Debug, Default)]
pub struct SilentSpeech;

impl SpeechDelegate for SilentSpeech {
    fn speak(&mut self, _request: &SpeechRequest) -> MimicResult<()> {
        Ok(())
    }

    fn cancel(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_clamped() {
        let voice = SpeechVoice {
            rate: 5.0,
            pitch: -1.0,
            voice: Some("en-GB".into()),
        }
        .clamped();

        assert_eq!(voice.rate, 2.0);
        assert_eq!(voice.pitch, 0.0);
        assert_eq!(voice.voice.as_deref(), Some("en-GB"));
    }

    #[test]
    fn test_voice_non_finite_falls_back() {
        let voice = SpeechVoice {
            rate: f32::NAN,
            pitch: f32::INFINITY,
            voice: None,
        }
        .clamped();

        assert_eq!(voice.rate, 1.0);
        assert_eq!(voice.pitch, 1.0);
    }

    #[test]
    fn test_event_constructors() {
        let id = RunId(3);
        assert_eq!(SpeechEvent::started(id).kind, SpeechEventKind::Started);
        assert_eq!(SpeechEvent::ended(id).utterance, id);
        assert_eq!(
            SpeechEvent::error(id, "no voice").kind,
            SpeechEventKind::Error("no voice".into())
        );
    }
}
