// rov_core/src/arbiter.rs

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ParameterError;

/// The shortest debounce the arbiter accepts.
pub const MIN_TOGGLE_COOLDOWN: Duration = Duration::from_secs(1);

/// Which demand source feeds the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Manual,
    Autonomous,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Manual => ControlMode::Autonomous,
            ControlMode::Autonomous => ControlMode::Manual,
        }
    }
}

/// An accepted mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: ControlMode,
    pub to: ControlMode,
}

impl ModeTransition {
    pub fn enters_autonomous(&self) -> bool {
        self.to == ControlMode::Autonomous
    }
}

/// Edge-triggered, debounced manual/autonomous selector.
///
/// The mode only flips on a rising edge of the toggle input, and only if at least
/// `cooldown` has passed since the last accepted flip. A button held across many
/// cycles is a single edge.
#[derive(Debug, Clone)]
pub struct ModeArbiter {
    mode: ControlMode,
    cooldown: f64,
    last_toggle: Option<f64>,
    toggle_held: bool,
}

impl ModeArbiter {
    pub fn new(initial: ControlMode, cooldown: Duration) -> Result<Self, ParameterError> {
        if cooldown < MIN_TOGGLE_COOLDOWN {
            return Err(ParameterError::OutOfRange {
                name: "toggle_cooldown",
                reason: format!(
                    "must be at least {:?}, got {:?}",
                    MIN_TOGGLE_COOLDOWN, cooldown
                ),
            });
        }
        Ok(Self {
            mode: initial,
            cooldown: cooldown.as_secs_f64(),
            last_toggle: None,
            toggle_held: false,
        })
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Feeds the toggle level seen at time `now` (seconds, monotonic).
    pub fn observe(&mut self, pressed: bool, now: f64) -> Option<ModeTransition> {
        let rising = pressed && !self.toggle_held;
        self.toggle_held = pressed;
        if !rising {
            return None;
        }
        self.flip(now)
    }

    /// An explicit one-shot toggle. It is an edge by itself, independent of the
    /// held level seen by `observe`, and still subject to the cooldown.
    pub fn request(&mut self, now: f64) -> Option<ModeTransition> {
        self.flip(now)
    }

    fn flip(&mut self, now: f64) -> Option<ModeTransition> {
        if let Some(last) = self.last_toggle {
            if now - last < self.cooldown {
                debug!(
                    "Ignoring mode toggle {:.3}s after the last one (cooldown {:.3}s)",
                    now - last,
                    self.cooldown
                );
                return None;
            }
        }

        let transition = ModeTransition {
            from: self.mode,
            to: self.mode.toggled(),
        };
        self.mode = transition.to;
        self.last_toggle = Some(now);
        info!("Control mode {:?} -> {:?}", transition.from, transition.to);
        Some(transition)
    }
}

impl Default for ModeArbiter {
    fn default() -> Self {
        Self {
            mode: ControlMode::Manual,
            cooldown: MIN_TOGGLE_COOLDOWN.as_secs_f64(),
            last_toggle: None,
            toggle_held: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arbiter() -> ModeArbiter {
        ModeArbiter::new(ControlMode::Manual, Duration::from_millis(1000)).unwrap()
    }

    #[test]
    fn toggles_200ms_apart_flip_once() {
        let mut arbiter = arbiter();
        let mut changes = 0;
        // Press/release pairs, each press 200 ms after the previous one.
        for i in 0..5 {
            let t = i as f64 * 0.2;
            changes += arbiter.observe(true, t).is_some() as usize;
            changes += arbiter.observe(false, t + 0.1).is_some() as usize;
        }
        assert_eq!(changes, 1);
        assert_eq!(arbiter.mode(), ControlMode::Autonomous);
    }

    #[test]
    fn held_button_is_one_edge() {
        let mut arbiter = arbiter();
        assert!(arbiter.observe(true, 0.0).is_some());
        for i in 1..50 {
            assert!(arbiter.observe(true, i as f64 * 0.1).is_none());
        }
        assert_eq!(arbiter.mode(), ControlMode::Autonomous);
    }

    #[test]
    fn toggle_after_cooldown_is_accepted() {
        let mut arbiter = arbiter();
        let first = arbiter.observe(true, 0.0).unwrap();
        assert!(first.enters_autonomous());
        arbiter.observe(false, 0.5);
        let second = arbiter.observe(true, 1.0).unwrap();
        assert_eq!(second.to, ControlMode::Manual);
    }

    #[test]
    fn request_toggles_while_pad_button_is_held() {
        let mut arbiter = arbiter();
        assert!(arbiter.observe(true, 0.0).is_some());
        assert!(arbiter.observe(true, 5.0).is_none());

        let transition = arbiter.request(5.0).unwrap();
        assert_eq!(transition.to, ControlMode::Manual);
        // The held button still does not count as a new press.
        assert!(arbiter.observe(true, 7.0).is_none());
        assert_eq!(arbiter.mode(), ControlMode::Manual);
    }

    #[test]
    fn request_honours_the_cooldown() {
        let mut arbiter = arbiter();
        assert!(arbiter.request(0.0).is_some());
        assert!(arbiter.request(0.5).is_none());
        assert!(arbiter.request(1.0).is_some());
    }

    #[test]
    fn short_cooldown_is_rejected() {
        assert!(ModeArbiter::new(ControlMode::Manual, Duration::from_millis(200)).is_err());
    }
}
