// rov_core/src/types.rs

use nalgebra::{Vector3, Vector6};
use serde::{Deserialize, Serialize};

// --- Core Type Aliases ---
/// A 6-DOF vector ordered `[surge, sway, heave, roll, pitch, yaw]`.
pub type Dof6 = Vector6<f64>;

/// One of the six degrees of freedom, in the order used by every `Dof6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Surge,
    Sway,
    Heave,
    Roll,
    Pitch,
    Yaw,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::Surge,
        Axis::Sway,
        Axis::Heave,
        Axis::Roll,
        Axis::Pitch,
        Axis::Yaw,
    ];

    /// Position of this axis inside a `Dof6` and inside the allocation matrix columns.
    pub fn index(self) -> usize {
        match self {
            Axis::Surge => 0,
            Axis::Sway => 1,
            Axis::Heave => 2,
            Axis::Roll => 3,
            Axis::Pitch => 4,
            Axis::Yaw => 5,
        }
    }
}

/// Discrete pilot requests that travel alongside the axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandFlags {
    /// Level of the autonomy toggle button. The arbiter reacts to its rising edge.
    pub mode_toggle: bool,
}

/// An immutable snapshot of the pilot's 6-axis command.
///
/// Every component is guaranteed to lie in `[-1, 1]`; the constructor clamps finite
/// values and maps NaN/Inf to zero so a corrupt packet can never command motion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisCommand {
    axes: Dof6,
    pub flags: CommandFlags,
}

impl AxisCommand {
    pub fn new(axes: [f64; 6], flags: CommandFlags) -> Self {
        Self {
            axes: Dof6::from_iterator(axes.into_iter().map(sanitize_axis)),
            flags,
        }
    }

    /// All axes at rest, no flags raised.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn axes(&self) -> &Dof6 {
        &self.axes
    }

    pub fn get(&self, axis: Axis) -> f64 {
        self.axes[axis.index()]
    }
}

fn sanitize_axis(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// A single inertial measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    /// Seconds on a monotonic clock.
    pub timestamp: f64,
    /// Linear acceleration in m/s^2.
    pub acceleration: Vector3<f64>,
    /// Angular rate in rad/s, ordered roll, pitch, yaw.
    pub angular_rate: Vector3<f64>,
    /// Optional magnetometer reading. Carried for telemetry, not used by the estimator.
    pub magnetic_field: Option<Vector3<f64>>,
}

impl SensorSample {
    pub fn new(timestamp: f64, acceleration: Vector3<f64>, angular_rate: Vector3<f64>) -> Self {
        Self {
            timestamp,
            acceleration,
            angular_rate,
            magnetic_field: None,
        }
    }

    pub fn with_magnetic_field(mut self, field: Vector3<f64>) -> Self {
        self.magnetic_field = Some(field);
        self
    }

    /// True when no component (including the optional magnetometer) is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.timestamp.is_finite()
            && self.acceleration.iter().all(|v| v.is_finite())
            && self.angular_rate.iter().all(|v| v.is_finite())
            && self
                .magnetic_field
                .map_or(true, |m| m.iter().all(|v| v.is_finite()))
    }
}

/// The dead-reckoning estimate of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VehicleState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    /// Roll, pitch, yaw in radians.
    pub orientation: Vector3<f64>,
    /// Timestamp of the last sample that updated this state.
    pub timestamp: f64,
}

impl VehicleState {
    /// The subset of the state the control laws regulate: `[position, orientation]`,
    /// which lines up with the `Dof6` axis order.
    pub fn pose(&self) -> Dof6 {
        Dof6::new(
            self.position.x,
            self.position.y,
            self.position.z,
            self.orientation.x,
            self.orientation.y,
            self.orientation.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_command_clamps_and_scrubs_non_finite() {
        let cmd = AxisCommand::new(
            [1.5, -3.0, f64::NAN, 0.25, f64::INFINITY, -0.5],
            CommandFlags::default(),
        );
        assert_eq!(cmd.get(Axis::Surge), 1.0);
        assert_eq!(cmd.get(Axis::Sway), -1.0);
        assert_eq!(cmd.get(Axis::Heave), 0.0);
        assert_eq!(cmd.get(Axis::Roll), 0.25);
        assert_eq!(cmd.get(Axis::Pitch), 0.0);
        assert_eq!(cmd.get(Axis::Yaw), -0.5);
    }

    #[test]
    fn axis_indices_follow_dof_order() {
        for (i, axis) in Axis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
        }
    }

    #[test]
    fn sample_finiteness_checks_optional_field() {
        let sample = SensorSample::new(1.0, Vector3::zeros(), Vector3::zeros());
        assert!(sample.is_finite());
        let bad = sample.with_magnetic_field(Vector3::new(0.0, f64::NAN, 0.0));
        assert!(!bad.is_finite());
    }

    #[test]
    fn pose_concatenates_position_and_orientation() {
        let state = VehicleState {
            position: Vector3::new(1.0, 2.0, 3.0),
            orientation: Vector3::new(0.1, 0.2, 0.3),
            ..Default::default()
        };
        assert_eq!(state.pose(), Dof6::new(1.0, 2.0, 3.0, 0.1, 0.2, 0.3));
    }
}
