//! Error types for MIMIC

use thiserror::Error;

/// Core MIMIC errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MimicError {
    // Invalid input
    #[error("Script contains no speakable tokens")]
    EmptyScript,

    #[error("No audio clip selected")]
    NoAudioSelected,

    #[error("Unknown emotion: {0}")]
    UnknownEmotion(String),

    // Delegate failures
    #[error("Speech failed: {0}")]
    SpeechFailed(String),

    #[error("Audio playback failed: {0}")]
    AudioPlaybackFailed(String),

    // Configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MimicError {
    /// Caller supplied something unusable; no run was started
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            MimicError::EmptyScript | MimicError::NoAudioSelected | MimicError::UnknownEmotion(_)
        )
    }

    /// An external delegate reported failure
    pub fn is_delegate_failure(&self) -> bool {
        matches!(
            self,
            MimicError::SpeechFailed(_) | MimicError::AudioPlaybackFailed(_)
        )
    }
}

/// Result type for MIMIC operations
pub type MimicResult<T> = Result<T, MimicError>;
