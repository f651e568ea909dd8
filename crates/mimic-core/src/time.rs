//! Time primitive for MIMIC
//!
//! Every clock reading in the engine is a `FrameTime`: a monotonic
//! offset from the clock's epoch. Synthesis always recomputes from
//! absolute readings, never from the spacing between frames.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Monotonic clock reading, microseconds since clock epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameTime(pub u64);

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime(0);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        FrameTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        FrameTime(millis * 1000)
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        FrameTime((secs.max(0.0) * 1_000_000.0) as u64)
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    /// Milliseconds with sub-millisecond precision
    #[inline]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        FrameTime(self.0.saturating_add(duration.as_micros() as u64))
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    #[inline]
    pub fn since(self, earlier: FrameTime) -> Duration {
        self - earlier
    }
}

impl Add<Duration> for FrameTime {
    type Output = FrameTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<FrameTime> for FrameTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: FrameTime) -> Self::Output {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

impl std::fmt::Debug for FrameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.as_millis_f64())
    }
}

/// Milliseconds of a duration as `f64`
#[inline]
pub fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_time_monotonic() {
        let t1 = FrameTime::from_millis(100);
        let t2 = t1 + Duration::from_millis(10);

        assert!(t2 > t1);
        assert_eq!(t2 - t1, Duration::from_millis(10));
    }

    #[test]
    fn test_frame_time_sub_saturates() {
        let early = FrameTime::from_millis(5);
        let late = FrameTime::from_millis(50);

        assert_eq!(early - late, Duration::ZERO);
        assert_eq!(late.since(early), Duration::from_millis(45));
    }

    #[test]
    fn test_millis_f64_precision() {
        let t = FrameTime::from_micros(1_500);
        assert!((t.as_millis_f64() - 1.5).abs() < 1e-9);
        assert_eq!(t.as_millis(), 1);
        assert!((duration_ms(Duration::from_micros(2_250)) - 2.25).abs() < 1e-9);
    }
}
