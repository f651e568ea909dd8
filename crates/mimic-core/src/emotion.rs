//! Emotion - the categorical emotional direction of a run

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MimicError;

/// Emotional direction selected at the start of a run
///
/// Fixed for the lifetime of the run; changing it mid-run only affects
/// the next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Sad,
    Surprised,
    Angry,
}

impl Emotion {
    /// All emotions, in table order
    pub fn all() -> &'static [Emotion] {
        &[
            Emotion::Neutral,
            Emotion::Happy,
            Emotion::Sad,
            Emotion::Surprised,
            Emotion::Angry,
        ]
    }

    /// Number of emotions
    pub const fn count() -> usize {
        5
    }

    /// Position in table order
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprised => "surprised",
            Emotion::Angry => "angry",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Emotion {
    type Err = MimicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neutral" | "calm" => Ok(Emotion::Neutral),
            "happy" | "joy" => Ok(Emotion::Happy),
            "sad" => Ok(Emotion::Sad),
            "surprised" | "surprise" => Ok(Emotion::Surprised),
            "angry" | "anger" => Ok(Emotion::Angry),
            other => Err(MimicError::UnknownEmotion(other.to_string())),
        }
    }
}
