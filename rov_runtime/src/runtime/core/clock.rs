// rov_runtime/src/runtime/core/clock.rs

use bevy::prelude::Resource;
use std::time::{Duration, Instant};

/// Monotonic time base shared by the loop and the sensor source.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Seconds since the clock was started.
    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Timing of the control loop.
#[derive(Resource, Debug, Clone)]
pub struct LoopClock {
    pub clock: MonotonicClock,
    /// Nominal period; this is the `dt` handed to the control law.
    pub period: Duration,
    /// Run time after which the loop asks the app to exit.
    pub run_for: Option<Duration>,
}

impl LoopClock {
    pub fn new(clock: MonotonicClock, rate_hz: f64, run_for: Option<Duration>) -> Self {
        Self {
            clock,
            period: Duration::from_secs_f64(1.0 / rate_hz),
            run_for,
        }
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn dt(&self) -> f64 {
        self.period.as_secs_f64()
    }

    pub fn expired(&self) -> bool {
        self.run_for
            .map_or(false, |limit| self.now() >= limit.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_follows_rate() {
        let clock = LoopClock::new(MonotonicClock::start(), 20.0, None);
        assert!((clock.dt() - 0.05).abs() < 1e-12);
        assert!(!clock.expired());
    }

    #[test]
    fn zero_run_time_expires_immediately() {
        let clock = LoopClock::new(MonotonicClock::start(), 10.0, Some(Duration::ZERO));
        assert!(clock.expired());
    }

    #[test]
    fn monotonic_time_never_goes_back() {
        let clock = MonotonicClock::start();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
