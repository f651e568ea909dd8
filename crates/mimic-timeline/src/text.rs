//! Text Timeline Builder - timed tokens from a script

use std::time::Duration;

use mimic_core::{Emotion, FrameTime, MimicError, MimicResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Segment, TimelineModel};

/// Token timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextTimingConfig {
    /// Milliseconds per letter at speech rate 1.0
    pub letter_ms: f64,
    /// Fixed offset added to every token
    pub base_ms: f64,
    /// Extra pause after terminal punctuation
    pub punctuation_bonus_ms: f64,
    /// Characters that earn the punctuation bonus when they end a token
    pub terminal_punctuation: String,
}

impl Default for TextTimingConfig {
    fn default() -> Self {
        TextTimingConfig {
            letter_ms: 82.0,
            base_ms: 240.0,
            punctuation_bonus_ms: 420.0,
            terminal_punctuation: ".,!?".to_string(),
        }
    }
}

impl TextTimingConfig {
    pub fn validate(&self) -> MimicResult<()> {
        if !(self.letter_ms > 0.0) {
            return Err(MimicError::InvalidConfig("letter_ms must be positive".into()));
        }
        if !(self.base_ms >= 0.0) || !(self.punctuation_bonus_ms >= 0.0) {
            return Err(MimicError::InvalidConfig(
                "base_ms and punctuation_bonus_ms must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Timed tokens of a script, not yet anchored in time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextPlan {
    segments: Vec<Segment>,
    duration: Duration,
}

impl TextPlan {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn token_count(&self) -> usize {
        self.segments.len()
    }

    /// Anchor the plan at `start_time`
    pub fn into_timeline(self, start_time: FrameTime, emotion: Emotion) -> Option<TimelineModel> {
        TimelineModel::text(start_time, self.segments, emotion)
    }
}

/// Builds text timelines from scripts
#[derive(Debug, Clone, Default)]
pub struct TextTimelineBuilder {
    config: TextTimingConfig,
}

impl TextTimelineBuilder {
    pub fn new(config: TextTimingConfig) -> Self {
        TextTimelineBuilder { config }
    }

    pub fn config(&self) -> &TextTimingConfig {
        &self.config
    }

    /// Per-letter multiplier for a speech rate (rate clamped to 0.5..=2.0,
    /// non-finite rates count as 1.0)
    pub fn multiplier_for_rate(&self, rate: f32) -> f64 {
        let rate = if rate.is_finite() { rate.clamp(0.5, 2.0) } else { 1.0 };
        self.config.letter_ms / rate as f64
    }

    /// Whitespace-delimited tokens
    pub fn tokenize(script: &str) -> Vec<&str> {
        script.split_whitespace().collect()
    }

    /// Does any token carry a letter or digit?
    pub fn is_speakable(tokens: &[&str]) -> bool {
        tokens
            .iter()
            .any(|token| token.chars().any(char::is_alphanumeric))
    }

    /// Alphabetic characters in a token, at least 1
    pub fn letter_count(token: &str) -> usize {
        token.chars().filter(|c| c.is_alphabetic()).count().max(1)
    }

    fn ends_with_punctuation(&self, token: &str) -> bool {
        token
            .chars()
            .last()
            .is_some_and(|c| self.config.terminal_punctuation.contains(c))
    }

    /// Spoken duration of one token, in milliseconds
    pub fn segment_ms(&self, token: &str, multiplier: f64) -> f64 {
        let letters = Self::letter_count(token) as f64;
        let bonus = if self.ends_with_punctuation(token) {
            self.config.punctuation_bonus_ms
        } else {
            0.0
        };
        letters * multiplier + self.config.base_ms + bonus
    }

    /// Time every token of `script`. `None` if the script has no letter
    /// or digit, or the multiplier is not a positive finite number.
    pub fn plan(&self, script: &str, multiplier: f64) -> Option<TextPlan> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            debug!(multiplier, "refusing text plan with invalid multiplier");
            return None;
        }
        let tokens = Self::tokenize(script);
        if !Self::is_speakable(&tokens) {
            debug!("script has no speakable tokens");
            return None;
        }

        let segments: Vec<Segment> = tokens
            .into_iter()
            .map(|token| {
                let ms = self.segment_ms(token, multiplier);
                Segment::new(token, Duration::from_micros((ms * 1000.0).round() as u64))
            })
            .collect();
        let duration = segments.iter().map(|s| s.duration).sum();

        debug!(tokens = segments.len(), ?duration, "planned text timeline");
        Some(TextPlan { segments, duration })
    }

    /// Build an anchored timeline in one step
    pub fn build(
        &self,
        script: &str,
        multiplier: f64,
        start_time: FrameTime,
        emotion: Emotion,
    ) -> Option<TimelineModel> {
        self.plan(script, multiplier)?.into_timeline(start_time, emotion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_there() {
        let builder = TextTimelineBuilder::default();
        let timeline = builder
            .build("Hello there.", 82.0, FrameTime::ZERO, Emotion::Neutral)
            .unwrap();

        let segments = timeline.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].token, "Hello");
        assert_eq!(segments[0].duration, Duration::from_millis(650));
        assert_eq!(segments[1].token, "there.");
        assert_eq!(segments[1].duration, Duration::from_millis(1070));
        assert_eq!(timeline.duration(), Duration::from_millis(1720));
    }

    #[test]
    fn test_whitespace_normalized() {
        let builder = TextTimelineBuilder::default();
        let plan = builder.plan("  one\t\ttwo \n three  ", 82.0).unwrap();
        let tokens: Vec<_> = plan.segments().iter().map(|s| s.token.as_str()).collect();
        assert_eq!(tokens, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        let builder = TextTimelineBuilder::default();
        assert!(builder.plan("", 82.0).is_none());
        assert!(builder.plan("   \n\t ", 82.0).is_none());
        assert!(builder.plan(" ... !? , ", 82.0).is_none());
    }

    #[test]
    fn test_punctuation_tokens_kept() {
        let builder = TextTimelineBuilder::default();
        let plan = builder.plan("Hello - there", 82.0).unwrap();

        assert_eq!(plan.token_count(), "Hello - there".split_whitespace().count());
        assert_eq!(plan.segments()[1].token, "-");
        assert_eq!(plan.segments()[1].duration, Duration::from_millis(322));
        assert_eq!(plan.duration(), Duration::from_millis(650 + 322 + 650));
    }

    #[test]
    fn test_invalid_multiplier_refused() {
        let builder = TextTimelineBuilder::default();
        assert!(builder.plan("Hello", f64::NAN).is_none());
        assert!(builder.plan("Hello", f64::INFINITY).is_none());
        assert!(builder.plan("Hello", 0.0).is_none());
        assert!(builder.plan("Hello", -82.0).is_none());
    }

    #[test]
    fn test_single_letter_minimum() {
        let builder = TextTimelineBuilder::default();
        assert_eq!(TextTimelineBuilder::letter_count("I"), 1);
        assert_eq!(TextTimelineBuilder::letter_count("42"), 1);
        assert_eq!(builder.segment_ms("42", 82.0), 82.0 + 240.0);
        assert_eq!(builder.segment_ms("a!", 82.0), 82.0 + 240.0 + 420.0);
    }

    #[test]
    fn test_punctuation_bonus_only_terminal() {
        let builder = TextTimelineBuilder::default();
        assert_eq!(builder.segment_ms("don't", 82.0), 4.0 * 82.0 + 240.0);
        assert_eq!(builder.segment_ms("wait,", 82.0), 4.0 * 82.0 + 240.0 + 420.0);
        assert_eq!(builder.segment_ms("why?", 82.0), 3.0 * 82.0 + 240.0 + 420.0);
    }

    #[test]
    fn test_rate_scales_multiplier() {
        let builder = TextTimelineBuilder::default();
        assert_eq!(builder.multiplier_for_rate(1.0), 82.0);
        assert_eq!(builder.multiplier_for_rate(2.0), 41.0);
        // Clamped
        assert_eq!(builder.multiplier_for_rate(10.0), 41.0);
        assert_eq!(builder.multiplier_for_rate(0.1), 164.0);
        assert_eq!(builder.multiplier_for_rate(f32::NAN), 82.0);
        assert_eq!(builder.multiplier_for_rate(f32::INFINITY), 82.0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = TextTimingConfig::default();
        assert!(config.validate().is_ok());
        config.letter_ms = 0.0;
        assert!(config.validate().is_err());
    }
}
