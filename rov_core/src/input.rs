// rov_core/src/input.rs

//! Pilot input shaping: deadzone filtering and the gamepad-to-axis mapping of the
//! pilot station.

use serde::{Deserialize, Serialize};

use crate::types::{AxisCommand, CommandFlags};

/// Stick deflection below which an axis reads as zero.
pub const DEFAULT_DEADZONE: f64 = 0.2;

pub fn apply_deadzone(value: f64, deadzone: f64) -> f64 {
    if value.abs() < deadzone {
        0.0
    } else {
        value
    }
}

/// Raw gamepad state as sent by the pilot station. Missing fields read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadState {
    pub lx: f64,
    pub ly: f64,
    pub rx: f64,
    pub ry: f64,
    /// Left trigger, 0..1.
    pub lt: f64,
    /// Right trigger, 0..1.
    pub rt: f64,
    /// Autonomy toggle button.
    pub auto: bool,
}

impl GamepadState {
    /// Maps the pad to vehicle axes. The sticks are deadzone-filtered, the
    /// triggers are not. Right stick x is flipped to match the vehicle's yaw sense.
    pub fn to_axis_command(&self, deadzone: f64) -> AxisCommand {
        let lx = apply_deadzone(self.lx, deadzone);
        let ly = apply_deadzone(self.ly, deadzone);
        let rx = apply_deadzone(self.rx, deadzone);
        let ry = apply_deadzone(self.ry, deadzone);

        AxisCommand::new(
            [ly, lx, self.lt - self.rt, 0.0, ry, -rx],
            CommandFlags {
                mode_toggle: self.auto,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Axis;

    #[test]
    fn deadzone_zeroes_small_deflections() {
        assert_eq!(apply_deadzone(0.19, 0.2), 0.0);
        assert_eq!(apply_deadzone(-0.19, 0.2), 0.0);
        assert_eq!(apply_deadzone(0.2, 0.2), 0.2);
        assert_eq!(apply_deadzone(-0.7, 0.2), -0.7);
    }

    #[test]
    fn gamepad_maps_to_vehicle_axes() {
        let pad = GamepadState {
            lx: 0.5,
            ly: -0.8,
            rx: 0.6,
            ry: 0.1,
            lt: 0.3,
            rt: 0.9,
            auto: true,
        };
        let cmd = pad.to_axis_command(DEFAULT_DEADZONE);
        assert_eq!(cmd.get(Axis::Surge), -0.8);
        assert_eq!(cmd.get(Axis::Sway), 0.5);
        assert!((cmd.get(Axis::Heave) - (-0.6)).abs() < 1e-12);
        assert_eq!(cmd.get(Axis::Roll), 0.0);
        assert_eq!(cmd.get(Axis::Pitch), 0.0);
        assert_eq!(cmd.get(Axis::Yaw), -0.6);
        assert!(cmd.flags.mode_toggle);
    }

    #[test]
    fn missing_fields_default_to_rest() {
        let pad: GamepadState = serde_json::from_str(r#"{"ly": 1.0}"#).unwrap();
        assert_eq!(pad.lx, 0.0);
        assert!(!pad.auto);
        assert_eq!(pad.to_axis_command(0.2).get(Axis::Surge), 1.0);
    }
}
