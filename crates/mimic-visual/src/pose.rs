//! Pose Vector - everything a renderer needs for one frame

use std::ops::RangeInclusive;

use mimic_core::Emotion;

/// Declared range of each bounded field
pub mod ranges {
    use std::ops::RangeInclusive;

    pub const MOUTH: RangeInclusive<f32> = 0.0..=1.0;
    pub const EYE_OFFSET: RangeInclusive<f32> = -1.0..=1.0;
    pub const BLINK: RangeInclusive<f32> = 0.0..=1.0;
    pub const BROW_LIFT: RangeInclusive<f32> = -1.0..=1.0;
    /// Degrees
    pub const HEAD_TILT: RangeInclusive<f32> = -12.0..=12.0;
    /// Degrees
    pub const HEAD_TURN: RangeInclusive<f32> = -18.0..=18.0;
    pub const HAND_CYCLE: RangeInclusive<f32> = -1.0..=1.0;
    pub const UNIT: RangeInclusive<f32> = 0.0..=1.0;
}

/// Label shown while no run is active
pub const IDLE_LABEL: &str = "idle";

#[inline]
pub(crate) fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        return range.start().max(0.0).min(*range.end());
    }
    value.clamp(*range.start(), *range.end())
}

/// Complete pose of the avatar at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct PoseVector {
    // Face
    /// Mouth openness (0.0 = closed, 1.0 = fully open)
    pub mouth_openness: f32,
    /// Mouth width (0.0 = pursed, 1.0 = stretched)
    pub mouth_width: f32,
    /// Mouth roundness (0.0 = flat, 1.0 = "oo")
    pub mouth_roundness: f32,
    /// Horizontal gaze offset [-1.0 - 1.0]
    pub eye_offset_x: f32,
    /// Vertical gaze offset [-1.0 - 1.0], positive looks down
    pub eye_offset_y: f32,
    /// Blink (0.0 = open, 1.0 = closed)
    pub blink: f32,
    /// Brow lift [-1.0 - 1.0], negative furrows
    pub brow_lift: f32,

    // Head, degrees
    pub head_tilt: f32,
    pub head_turn: f32,

    // Body
    /// Gesture phase [-1.0 - 1.0]
    pub hand_cycle: f32,

    // Expression
    pub emotion: Emotion,
    pub emotion_intensity: f32,

    // Meta
    /// Driving signal strength [0.0 - 1.0]
    pub audio_level: f32,
    /// Active token or energy readout
    pub timeline_label: String,
    /// Cosmetic oscillator [0.0 - 1.0]
    pub shimmer: f32,
}

impl Default for PoseVector {
    fn default() -> Self {
        Self::rest(Emotion::Neutral)
    }
}

impl PoseVector {
    /// Neutral rest pose
    pub fn rest(emotion: Emotion) -> Self {
        PoseVector {
            mouth_openness: 0.04,
            mouth_width: 0.5,
            mouth_roundness: 0.2,
            eye_offset_x: 0.0,
            eye_offset_y: 0.0,
            blink: 0.0,
            brow_lift: 0.0,
            head_tilt: 0.0,
            head_turn: 0.0,
            hand_cycle: 0.0,
            emotion,
            emotion_intensity: 0.2,
            audio_level: 0.0,
            timeline_label: IDLE_LABEL.to_string(),
            shimmer: 0.5,
        }
    }

    /// Return dynamic fields to rest, keeping emotion and the cosmetic
    /// shimmer so the idle presentation does not jump
    pub fn reset_dynamic(&mut self) {
        let rest = PoseVector::rest(self.emotion);
        self.mouth_openness = rest.mouth_openness;
        self.mouth_width = rest.mouth_width;
        self.mouth_roundness = rest.mouth_roundness;
        self.eye_offset_x = rest.eye_offset_x;
        self.eye_offset_y = rest.eye_offset_y;
        self.blink = rest.blink;
        self.brow_lift = rest.brow_lift;
        self.head_tilt = rest.head_tilt;
        self.head_turn = rest.head_turn;
        self.hand_cycle = rest.hand_cycle;
        self.emotion_intensity = rest.emotion_intensity;
        self.audio_level = rest.audio_level;
        self.timeline_label = rest.timeline_label;
    }

    /// Clamp every bounded field to its declared range
    pub fn clamp_all(&mut self) {
        self.mouth_openness = clamp_to(self.mouth_openness, &ranges::MOUTH);
        self.mouth_width = clamp_to(self.mouth_width, &ranges::MOUTH);
        self.mouth_roundness = clamp_to(self.mouth_roundness, &ranges::MOUTH);
        self.eye_offset_x = clamp_to(self.eye_offset_x, &ranges::EYE_OFFSET);
        self.eye_offset_y = clamp_to(self.eye_offset_y, &ranges::EYE_OFFSET);
        self.blink = clamp_to(self.blink, &ranges::BLINK);
        self.brow_lift = clamp_to(self.brow_lift, &ranges::BROW_LIFT);
        self.head_tilt = clamp_to(self.head_tilt, &ranges::HEAD_TILT);
        self.head_turn = clamp_to(self.head_turn, &ranges::HEAD_TURN);
        self.hand_cycle = clamp_to(self.hand_cycle, &ranges::HAND_CYCLE);
        self.emotion_intensity = clamp_to(self.emotion_intensity, &ranges::UNIT);
        self.audio_level = clamp_to(self.audio_level, &ranges::UNIT);
        self.shimmer = clamp_to(self.shimmer, &ranges::UNIT);
    }

    /// Are all bounded fields inside their declared ranges?
    pub fn is_within_bounds(&self) -> bool {
        ranges::MOUTH.contains(&self.mouth_openness)
            && ranges::MOUTH.contains(&self.mouth_width)
            && ranges::MOUTH.contains(&self.mouth_roundness)
            && ranges::EYE_OFFSET.contains(&self.eye_offset_x)
            && ranges::EYE_OFFSET.contains(&self.eye_offset_y)
            && ranges::BLINK.contains(&self.blink)
            && ranges::BROW_LIFT.contains(&self.brow_lift)
            && ranges::HEAD_TILT.contains(&self.head_tilt)
            && ranges::HEAD_TURN.contains(&self.head_turn)
            && ranges::HAND_CYCLE.contains(&self.hand_cycle)
            && ranges::UNIT.contains(&self.emotion_intensity)
            && ranges::UNIT.contains(&self.audio_level)
            && ranges::UNIT.contains(&self.shimmer)
    }

    /// Are the dynamic fields at rest?
    pub fn is_at_rest(&self) -> bool {
        let rest = PoseVector::rest(self.emotion);
        PoseVector {
            shimmer: rest.shimmer,
            ..self.clone()
        } == rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_pose_in_bounds() {
        for emotion in Emotion::all() {
            let pose = PoseVector::rest(*emotion);
            assert!(pose.is_within_bounds());
            assert!(pose.is_at_rest());
        }
    }

    #[test]
    fn test_clamp_all() {
        let mut pose = PoseVector::default();
        pose.mouth_openness = 1.7;
        pose.blink = -0.2;
        pose.head_tilt = 40.0;
        pose.head_turn = -90.0;
        pose.eye_offset_y = f32::NAN;
        assert!(!pose.is_within_bounds());

        pose.clamp_all();
        assert!(pose.is_within_bounds());
        assert_eq!(pose.mouth_openness, 1.0);
        assert_eq!(pose.blink, 0.0);
        assert_eq!(pose.head_tilt, 12.0);
        assert_eq!(pose.head_turn, -18.0);
        assert_eq!(pose.eye_offset_y, 0.0);
    }

    #[test]
    fn test_reset_dynamic_keeps_cosmetics() {
        let mut pose = PoseVector::rest(Emotion::Angry);
        pose.mouth_openness = 0.8;
        pose.head_turn = 9.0;
        pose.timeline_label = "word".into();
        pose.shimmer = 0.9;

        pose.reset_dynamic();
        assert!(pose.is_at_rest());
        assert_eq!(pose.emotion, Emotion::Angry);
        assert_eq!(pose.shimmer, 0.9);
        assert_eq!(pose.timeline_label, IDLE_LABEL);
    }
}
