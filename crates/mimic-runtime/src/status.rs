//! Playback state, status line and statistics

use std::fmt;

/// Identity of one playback run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No run; no frames scheduled
    #[default]
    Idle,
    /// Speech requested, waiting for it to become audible
    Starting,
    /// Frames are being synthesized
    Running,
}

impl PlaybackState {
    /// Does a run exist (starting or running)?
    pub fn is_active(self) -> bool {
        !matches!(self, PlaybackState::Idle)
    }
}

/// User-facing status line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Ready,
    WaitingForSpeech,
    Speaking,
    PlayingAudio,
    Complete,
    Stopped,
    Error(String),
}

impl PlaybackStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, PlaybackStatus::Error(_))
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackStatus::Ready => f.write_str("Ready"),
            PlaybackStatus::WaitingForSpeech => f.write_str("Preparing speech..."),
            PlaybackStatus::Speaking => f.write_str("Speaking"),
            PlaybackStatus::PlayingAudio => f.write_str("Playing audio"),
            PlaybackStatus::Complete => f.write_str("Complete"),
            PlaybackStatus::Stopped => f.write_str("Stopped"),
            PlaybackStatus::Error(reason) => write!(f, "Error: {reason}"),
        }
    }
}

/// Counters kept by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub runs_started: u64,
    pub runs_completed: u64,
    pub runs_cancelled: u64,
    pub runs_failed: u64,
    pub ticks: u64,
    /// Frames that fired after being superseded or cancelled
    pub stale_frames: u64,
    /// Speech events for an utterance that is no longer active
    pub ignored_speech_events: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(PlaybackStatus::Complete.to_string(), "Complete");
        assert_eq!(
            PlaybackStatus::Error("voice unavailable".into()).to_string(),
            "Error: voice unavailable"
        );
        assert!(PlaybackStatus::Error(String::new()).is_error());
        assert!(!PlaybackStatus::Stopped.is_error());
    }

    #[test]
    fn test_state_activity() {
        assert!(!PlaybackState::Idle.is_active());
        assert!(PlaybackState::Starting.is_active());
        assert!(PlaybackState::Running.is_active());
    }
}
