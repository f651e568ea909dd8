//! Clock implementations for MIMIC

use std::sync::Arc;
use std::time::{Duration, Instant};

use mimic_core::FrameTime;
use parking_lot::Mutex;

/// Source of monotonic readings
/// INVARIANT: successive calls to `now` never go backwards
pub trait Clock {
    fn now(&self) -> FrameTime;
}

/// Wall clock backed by the OS monotonic clock
pub struct SystemClock {
    /// Reference instant (epoch)
    reference: Instant,
}

impl SystemClock {
    /// Create a clock whose epoch is now
    pub fn new() -> Self {
        SystemClock {
            reference: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> FrameTime {
        let elapsed = Instant::now().duration_since(self.reference);
        FrameTime::from_micros(elapsed.as_micros() as u64)
    }
}

/// Manually advanced clock
///
/// Clones share the same reading, so a test can hold one handle while
/// the controller holds another.
#[derive(Clone, Default)]
pub struct VirtualClock {
    value: Arc<Mutex<FrameTime>>,
}

impl VirtualClock {
    /// Create a virtual clock starting at zero
    pub fn new() -> Self {
        Self::starting_at(FrameTime::ZERO)
    }

    pub fn starting_at(t: FrameTime) -> Self {
        VirtualClock {
            value: Arc::new(Mutex::new(t)),
        }
    }

    /// Advance by `dt` and return the new reading
    pub fn advance(&self, dt: Duration) -> FrameTime {
        let mut value = self.value.lock();
        *value = value.saturating_add(dt);
        *value
    }

    /// Jump to `t`; only moves forward
    pub fn set(&self, t: FrameTime) {
        let mut value = self.value.lock();
        if t > *value {
            *value = t;
        }
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> FrameTime {
        *self.value.lock()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> FrameTime {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();

        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = clock.now();

        assert!(t2 > t1);
    }

    #[test]
    fn test_virtual_clock_shared() {
        let clock = VirtualClock::new();
        let handle = clock.clone();

        handle.advance(Duration::from_millis(16));
        assert_eq!(clock.now(), FrameTime::from_millis(16));
    }

    #[test]
    fn test_virtual_clock_never_rewinds() {
        let clock = VirtualClock::starting_at(FrameTime::from_millis(100));

        clock.set(FrameTime::from_millis(50));
        assert_eq!(clock.now(), FrameTime::from_millis(100));

        clock.set(FrameTime::from_millis(150));
        assert_eq!(clock.now(), FrameTime::from_millis(150));
    }
}
