//! Emotion biases - fixed offsets keyed by emotion
//!
//! Kept as a table rather than branching so a new emotion is one row.

use mimic_core::Emotion;

/// Additive offsets applied on top of the animated pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionBias {
    /// Degrees
    pub head_tilt: f32,
    pub brow_lift: f32,
    pub mouth_roundness: f32,
    pub mouth_width: f32,
    /// Positive looks down
    pub gaze_y: f32,
    /// Expression strength before pulsing [0.0 - 1.0]
    pub base_intensity: f32,
}

impl EmotionBias {
    pub const NONE: EmotionBias = EmotionBias {
        head_tilt: 0.0,
        brow_lift: 0.0,
        mouth_roundness: 0.0,
        mouth_width: 0.0,
        gaze_y: 0.0,
        base_intensity: 0.25,
    };
}

/// Rows in `Emotion::all()` order
const BIAS_TABLE: [EmotionBias; Emotion::count()] = [
    // Neutral
    EmotionBias::NONE,
    // Happy
    EmotionBias {
        head_tilt: 2.0,
        brow_lift: 0.15,
        mouth_roundness: -0.05,
        mouth_width: 0.15,
        gaze_y: -0.05,
        base_intensity: 0.7,
    },
    // Sad
    EmotionBias {
        head_tilt: -6.0,
        brow_lift: 0.1,
        mouth_roundness: 0.0,
        mouth_width: -0.1,
        gaze_y: 0.3,
        base_intensity: 0.6,
    },
    // Surprised
    EmotionBias {
        head_tilt: 1.0,
        brow_lift: 0.5,
        mouth_roundness: 0.35,
        mouth_width: -0.05,
        gaze_y: -0.1,
        base_intensity: 0.85,
    },
    // Angry
    EmotionBias {
        head_tilt: -1.5,
        brow_lift: -0.45,
        mouth_roundness: -0.1,
        mouth_width: 0.05,
        gaze_y: 0.05,
        base_intensity: 0.8,
    },
];

/// Bias row for an emotion
#[inline]
pub fn emotion_bias(emotion: Emotion) -> &'static EmotionBias {
    &BIAS_TABLE[emotion.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_has_no_offsets() {
        let bias = emotion_bias(Emotion::Neutral);
        assert_eq!(*bias, EmotionBias::NONE);
    }

    #[test]
    fn test_documented_directions() {
        let sad = emotion_bias(Emotion::Sad);
        assert!(sad.head_tilt < 0.0);
        assert!(sad.gaze_y > 0.0);

        assert!(emotion_bias(Emotion::Surprised).mouth_roundness > 0.0);
        assert!(emotion_bias(Emotion::Angry).brow_lift < 0.0);
    }

    #[test]
    fn test_every_emotion_has_a_row() {
        for emotion in Emotion::all() {
            let bias = emotion_bias(*emotion);
            assert!((0.0..=1.0).contains(&bias.base_intensity));
        }
    }
}
