//! Timeline Model - one playback run
//!
//! Created at run start, discarded at run end or cancel. Never mutated.

use std::time::Duration;

use mimic_core::{duration_ms, Emotion, FrameTime};

/// Exponent of the sub-linear progress curve
pub const PROGRESS_EASING: f64 = 0.9;

/// How a run is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineMode {
    /// Heuristic token timing from a script
    Text,
    /// Live spectral sampling of an audio clip
    Audio,
}

/// One timed token of a text run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub token: String,
    pub duration: Duration,
}

impl Segment {
    pub fn new(token: impl Into<String>, duration: Duration) -> Self {
        Segment {
            token: token.into(),
            duration,
        }
    }
}

/// The segment covering a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveSegment<'a> {
    pub index: usize,
    pub segment: &'a Segment,
    /// Progress within the segment [0.0 - 1.0]
    pub local_ratio: f64,
}

/// Immutable description of one playback run
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineModel {
    mode: TimelineMode,
    start_time: FrameTime,
    duration: Duration,
    segments: Vec<Segment>,
    emotion: Emotion,
}

impl TimelineModel {
    /// Text run; duration is the sum of segment durations.
    /// Returns `None` when there are no segments.
    pub fn text(start_time: FrameTime, segments: Vec<Segment>, emotion: Emotion) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        let duration = segments.iter().map(|s| s.duration).sum();
        if duration == Duration::ZERO {
            return None;
        }
        Some(TimelineModel {
            mode: TimelineMode::Text,
            start_time,
            duration,
            segments,
            emotion,
        })
    }

    /// Audio run with a measured duration.
    /// Returns `None` for a zero duration.
    pub fn audio(start_time: FrameTime, duration: Duration, emotion: Emotion) -> Option<Self> {
        if duration == Duration::ZERO {
            return None;
        }
        Some(TimelineModel {
            mode: TimelineMode::Audio,
            start_time,
            duration,
            segments: Vec::new(),
            emotion,
        })
    }

    pub fn mode(&self) -> TimelineMode {
        self.mode
    }

    pub fn start_time(&self) -> FrameTime {
        self.start_time
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    /// Elapsed run time, clamped to `[0, duration]`
    pub fn elapsed(&self, now: FrameTime) -> Duration {
        now.since(self.start_time).min(self.duration)
    }

    /// Linear progress [0.0 - 1.0]
    pub fn ratio(&self, now: FrameTime) -> f64 {
        let total = duration_ms(self.duration);
        if total <= 0.0 {
            return 0.0;
        }
        (duration_ms(self.elapsed(now)) / total).clamp(0.0, 1.0)
    }

    /// Sub-linear progress curve, front-loads perceived motion
    pub fn eased_progress(&self, now: FrameTime) -> f64 {
        self.ratio(now).powf(PROGRESS_EASING)
    }

    /// Progress readout, percent rounded to one decimal
    pub fn progress_percent(&self, now: FrameTime) -> f32 {
        progress_percent(self.eased_progress(now))
    }

    /// Has the run reached its declared duration?
    pub fn is_complete(&self, now: FrameTime) -> bool {
        now.since(self.start_time) >= self.duration
    }

    /// Segment covering `elapsed`: the first whose accumulated end is
    /// at or past `elapsed`. Always `None` in audio mode.
    pub fn active_segment(&self, elapsed: Duration) -> Option<ActiveSegment<'_>> {
        let mut start = Duration::ZERO;
        for (index, segment) in self.segments.iter().enumerate() {
            let end = start + segment.duration;
            if end >= elapsed {
                let local = if segment.duration.is_zero() {
                    0.0
                } else {
                    duration_ms(elapsed.saturating_sub(start)) / duration_ms(segment.duration)
                };
                return Some(ActiveSegment {
                    index,
                    segment,
                    local_ratio: local.clamp(0.0, 1.0),
                });
            }
            start = end;
        }
        // Past the end: hold the final token fully articulated
        self.segments.last().map(|segment| ActiveSegment {
            index: self.segments.len() - 1,
            segment,
            local_ratio: 1.0,
        })
    }
}

/// Percent of eased progress, rounded to one decimal
pub fn progress_percent(eased: f64) -> f32 {
    ((eased.clamp(0.0, 1.0) * 1000.0).round() / 10.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_words() -> TimelineModel {
        TimelineModel::text(
            FrameTime::from_millis(1000),
            vec![
                Segment::new("Hello", Duration::from_millis(650)),
                Segment::new("there.", Duration::from_millis(1070)),
            ],
            Emotion::Neutral,
        )
        .unwrap()
    }

    #[test]
    fn test_text_duration_is_segment_sum() {
        let timeline = two_words();
        assert_eq!(timeline.duration(), Duration::from_millis(1720));
        assert_eq!(timeline.mode(), TimelineMode::Text);
    }

    #[test]
    fn test_empty_construction_rejected() {
        assert!(TimelineModel::text(FrameTime::ZERO, Vec::new(), Emotion::Neutral).is_none());
        assert!(TimelineModel::audio(FrameTime::ZERO, Duration::ZERO, Emotion::Neutral).is_none());
    }

    #[test]
    fn test_elapsed_clamped() {
        let timeline = two_words();

        // Before start
        assert_eq!(timeline.elapsed(FrameTime::from_millis(500)), Duration::ZERO);
        // Past end
        assert_eq!(
            timeline.elapsed(FrameTime::from_millis(10_000)),
            Duration::from_millis(1720)
        );
        assert!(timeline.is_complete(FrameTime::from_millis(2720)));
        assert!(!timeline.is_complete(FrameTime::from_millis(2719)));
    }

    #[test]
    fn test_active_segment_walk() {
        let timeline = two_words();

        let first = timeline.active_segment(Duration::ZERO).unwrap();
        assert_eq!(first.segment.token, "Hello");
        assert_eq!(first.local_ratio, 0.0);

        let boundary = timeline.active_segment(Duration::from_millis(650)).unwrap();
        assert_eq!(boundary.segment.token, "Hello");
        assert!((boundary.local_ratio - 1.0).abs() < 1e-9);

        let second = timeline.active_segment(Duration::from_millis(1700)).unwrap();
        assert_eq!(second.segment.token, "there.");
        assert!(second.local_ratio > 0.9);
    }

    #[test]
    fn test_progress_percent_eased() {
        let timeline = two_words();

        assert_eq!(timeline.progress_percent(FrameTime::from_millis(1000)), 0.0);
        assert_eq!(timeline.progress_percent(FrameTime::from_millis(2720)), 100.0);

        // Halfway: 0.5^0.9 = 0.5359 -> 53.6
        let half = FrameTime::from_millis(1000 + 860);
        assert!((timeline.progress_percent(half) - 53.6).abs() < 1e-3);
    }

    #[test]
    fn test_audio_has_no_segments() {
        let timeline =
            TimelineModel::audio(FrameTime::ZERO, Duration::from_millis(4000), Emotion::Sad).unwrap();
        assert!(timeline.segments().is_empty());
        assert!(timeline.active_segment(Duration::from_millis(10)).is_none());
        assert_eq!(timeline.emotion(), Emotion::Sad);
    }
}
