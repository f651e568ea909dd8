//! Idle phase state - blinking and emotion pulsing across runs
//!
//! Lives for the whole process. Owned by the playback controller and
//! threaded into every synthesis call; reset only on an explicit stop.

use std::f32::consts::TAU;
use std::time::Duration;

use mimic_core::{duration_ms, FrameTime, MimicError, MimicResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Idle behavior configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Shortest gap between blinks (ms)
    pub blink_interval_min_ms: u64,
    /// Longest gap between blinks (ms, exclusive)
    pub blink_interval_max_ms: u64,
    /// Length of one blink (ms)
    pub blink_window_ms: u64,
    /// Sharpening exponent of the blink pulse
    pub blink_exponent: f32,
    /// Period of the emotion-intensity pulse (ms)
    pub emotion_pulse_period_ms: u64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        IdleConfig {
            blink_interval_min_ms: 2500,
            blink_interval_max_ms: 5700,
            blink_window_ms: 180,
            blink_exponent: 2.0,
            emotion_pulse_period_ms: 6000,
        }
    }
}

impl IdleConfig {
    /// Slower blinking and a longer emotional breath
    pub fn calm() -> Self {
        IdleConfig {
            blink_interval_min_ms: 3500,
            blink_interval_max_ms: 7500,
            blink_window_ms: 220,
            blink_exponent: 2.0,
            emotion_pulse_period_ms: 9000,
        }
    }

    pub fn validate(&self) -> MimicResult<()> {
        if self.blink_interval_min_ms >= self.blink_interval_max_ms {
            return Err(MimicError::InvalidConfig(
                "blink_interval_min_ms must be below blink_interval_max_ms".into(),
            ));
        }
        if self.blink_window_ms == 0 || self.emotion_pulse_period_ms == 0 {
            return Err(MimicError::InvalidConfig(
                "blink window and pulse period must be positive".into(),
            ));
        }
        if self.blink_window_ms >= self.blink_interval_min_ms {
            return Err(MimicError::InvalidConfig(
                "blink window must be shorter than the blink interval".into(),
            ));
        }
        Ok(())
    }

    fn sample_blink_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.blink_interval_min_ms..self.blink_interval_max_ms))
    }
}

/// Long-lived timers for blinking and emotion pulsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdlePhaseState {
    /// When the current blink cycle began
    pub last_blink: FrameTime,
    /// Gap until the next blink
    pub next_blink: Duration,
    /// Phase origin of the emotion pulse
    pub last_pulse: FrameTime,
}

impl Default for IdlePhaseState {
    fn default() -> Self {
        IdlePhaseState {
            last_blink: FrameTime::ZERO,
            next_blink: Duration::from_millis(4100),
            last_pulse: FrameTime::ZERO,
        }
    }
}

impl IdlePhaseState {
    /// Restart all timers from `now`
    pub fn prime<R: Rng + ?Sized>(&mut self, now: FrameTime, config: &IdleConfig, rng: &mut R) {
        self.last_blink = now;
        self.next_blink = config.sample_blink_interval(rng);
        self.last_pulse = now;
    }

    /// Back to defaults (explicit stop)
    pub fn reset(&mut self) {
        *self = IdlePhaseState::default();
    }

    /// Blink amount at `now` [0.0 - 1.0]
    ///
    /// Once the interval has passed the cycle restarts and a new
    /// interval is drawn. The first `blink_window` of a cycle carries a
    /// triangular pulse peaking at the window midpoint, raised to
    /// `blink_exponent`.
    pub fn blink<R: Rng + ?Sized>(&mut self, now: FrameTime, config: &IdleConfig, rng: &mut R) -> f32 {
        let mut since = now.since(self.last_blink);
        if since > self.next_blink {
            self.last_blink = now;
            self.next_blink = config.sample_blink_interval(rng);
            since = Duration::ZERO;
        }

        let window = config.blink_window_ms as f64;
        let t = duration_ms(since);
        if t >= window {
            return 0.0;
        }
        let half = window / 2.0;
        let triangle = (1.0 - (t / half - 1.0).abs()).clamp(0.0, 1.0) as f32;
        triangle.powf(config.blink_exponent)
    }

    /// Emotion pulse at `now` [-1.0 - 1.0]
    pub fn emotion_pulse(&mut self, now: FrameTime, config: &IdleConfig) -> f32 {
        let period = Duration::from_millis(config.emotion_pulse_period_ms);
        let since = now.since(self.last_pulse);
        if since >= period {
            let whole = (since.as_micros() / period.as_micros()) as u32;
            self.last_pulse = self.last_pulse + period * whole;
        }
        let phase = duration_ms(now.since(self.last_pulse)) / duration_ms(period);
        (phase as f32 * TAU).sin()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn primed(at: u64) -> (IdlePhaseState, IdleConfig, StdRng) {
        let config = IdleConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = IdlePhaseState::default();
        state.prime(FrameTime::from_millis(at), &config, &mut rng);
        (state, config, rng)
    }

    #[test]
    fn test_prime_samples_interval_in_range() {
        let config = IdleConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = IdlePhaseState::default();
        for i in 0..200 {
            state.prime(FrameTime::from_millis(i), &config, &mut rng);
            assert!(state.next_blink >= Duration::from_millis(2500));
            assert!(state.next_blink < Duration::from_millis(5700));
        }
    }

    #[test]
    fn test_blink_pulse_shape() {
        let (mut state, config, mut rng) = primed(0);
        state.next_blink = Duration::from_millis(3000);

        assert_eq!(state.blink(FrameTime::from_millis(0), &config, &mut rng), 0.0);
        let quarter = state.blink(FrameTime::from_millis(45), &config, &mut rng);
        assert!((quarter - 0.25).abs() < 1e-4);
        let peak = state.blink(FrameTime::from_millis(90), &config, &mut rng);
        assert!((peak - 1.0).abs() < 1e-6);
        assert_eq!(state.blink(FrameTime::from_millis(180), &config, &mut rng), 0.0);
        assert_eq!(state.blink(FrameTime::from_millis(1500), &config, &mut rng), 0.0);
    }

    #[test]
    fn test_blink_cycle_restarts_after_interval() {
        let (mut state, config, mut rng) = primed(0);
        state.next_blink = Duration::from_millis(3000);

        state.blink(FrameTime::from_millis(3001), &config, &mut rng);
        assert_eq!(state.last_blink, FrameTime::from_millis(3001));
        assert!(state.next_blink >= Duration::from_millis(2500));

        let mid = state.blink(FrameTime::from_millis(3091), &config, &mut rng);
        assert!(mid > 0.99);
    }

    #[test]
    fn test_emotion_pulse_period() {
        let (mut state, config, _rng) = primed(0);

        assert!(state.emotion_pulse(FrameTime::ZERO, &config).abs() < 1e-6);
        assert!((state.emotion_pulse(FrameTime::from_millis(1500), &config) - 1.0).abs() < 1e-4);
        assert!((state.emotion_pulse(FrameTime::from_millis(4500), &config) + 1.0).abs() < 1e-4);

        // Wraps and moves the origin forward by whole periods
        let wrapped = state.emotion_pulse(FrameTime::from_millis(13_500), &config);
        assert!((wrapped - 1.0).abs() < 1e-4);
        assert_eq!(state.last_pulse, FrameTime::from_millis(12_000));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (mut state, _config, _rng) = primed(5000);
        state.reset();
        assert_eq!(state, IdlePhaseState::default());
    }

    #[test]
    fn test_config_validation() {
        assert!(IdleConfig::default().validate().is_ok());
        assert!(IdleConfig::calm().validate().is_ok());

        let inverted = IdleConfig {
            blink_interval_min_ms: 6000,
            ..IdleConfig::default()
        };
        assert!(inverted.validate().is_err());
    }
}
