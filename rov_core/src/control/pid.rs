// rov_core/src/control/pid.rs

use crate::control::params::PidGains;
use crate::control::{ControlLaw, ControlLawKind};
use crate::error::ParameterError;
use crate::types::{Dof6, VehicleState};

/// Per-axis PID on the vehicle pose with diagonal (independent) gains.
#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidGains,
    /// Symmetric bound on every integral component, if any.
    integral_limit: Option<f64>,
    goal: Dof6,
    integral: Dof6,
    prev_error: Dof6,
}

impl Pid {
    pub fn new(gains: PidGains, goal: Dof6, integral_limit: Option<f64>) -> Result<Self, ParameterError> {
        gains.validate()?;
        if let Some(limit) = integral_limit {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ParameterError::OutOfRange {
                    name: "integral_limit",
                    reason: format!("must be positive and finite, got {}", limit),
                });
            }
        }

        Ok(Self {
            gains,
            integral_limit,
            goal,
            integral: Dof6::zeros(),
            prev_error: Dof6::zeros(),
        })
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    pub fn integral(&self) -> &Dof6 {
        &self.integral
    }
}

impl ControlLaw for Pid {
    fn kind(&self) -> ControlLawKind {
        ControlLawKind::Pid
    }

    fn update(&mut self, state: &VehicleState, dt: f64) -> Dof6 {
        let error = self.goal - state.pose();
        let mut output = self.gains.p.component_mul(&error);

        // Without a usable dt there is no meaningful integral or derivative this step.
        if dt.is_finite() && dt > 0.0 {
            self.integral += error * dt;
            if let Some(limit) = self.integral_limit {
                self.integral.apply(|v| *v = v.clamp(-limit, limit));
            }
            output += self.gains.i.component_mul(&self.integral);
            output += self.gains.d.component_mul(&((error - self.prev_error) / dt));
        }

        self.prev_error = error;
        output
    }

    fn reset(&mut self) {
        self.integral = Dof6::zeros();
        self.prev_error = Dof6::zeros();
    }

    fn goal(&self) -> &Dof6 {
        &self.goal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    fn state_at(x: f64, yaw: f64) -> VehicleState {
        VehicleState {
            position: Vector3::new(x, 0.0, 0.0),
            orientation: Vector3::new(0.0, 0.0, yaw),
            ..Default::default()
        }
    }

    #[test]
    fn proportional_term_acts_per_axis() {
        let gains = PidGains {
            p: Dof6::new(2.0, 0.0, 0.0, 0.0, 0.0, 0.5),
            ..PidGains::uniform(0.0, 0.0, 0.0)
        };
        let mut pid = Pid::new(gains, Dof6::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0), None).unwrap();
        let out = pid.update(&state_at(0.0, 0.0), 0.1);
        assert_abs_diff_eq!(out[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[5], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(out[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn integral_accumulates_error_times_dt() {
        let mut pid = Pid::new(PidGains::uniform(0.0, 1.0, 0.0), Dof6::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0), None).unwrap();
        let state = state_at(0.0, 0.0);
        for _ in 0..10 {
            pid.update(&state, 0.1);
        }
        // Ten steps of error 1.0 over 0.1s is an integral of 1.0, not an exploding sum.
        assert_abs_diff_eq!(pid.integral()[0], 1.0, epsilon = 1e-9);
        let out = pid.update(&state, 0.1);
        assert_abs_diff_eq!(out[0], 1.1, epsilon = 1e-9);
    }

    #[test]
    fn integral_is_clamped() {
        let mut pid = Pid::new(PidGains::uniform(0.0, 1.0, 0.0), Dof6::new(5.0, -5.0, 0.0, 0.0, 0.0, 0.0), Some(0.5)).unwrap();
        for _ in 0..100 {
            pid.update(&state_at(0.0, 0.0), 0.1);
        }
        assert_abs_diff_eq!(pid.integral()[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(pid.integral()[1], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn derivative_uses_error_change_over_dt() {
        let mut pid = Pid::new(PidGains::uniform(0.0, 0.0, 1.0), Dof6::zeros(), None).unwrap();
        pid.update(&state_at(0.0, 0.0), 0.1);
        // Error goes from 0 to -0.2 in 0.1s.
        let out = pid.update(&state_at(0.2, 0.0), 0.1);
        assert_abs_diff_eq!(out[0], -2.0, epsilon = 1e-9);
    }

    #[test]
    fn non_positive_dt_falls_back_to_proportional() {
        let mut pid = Pid::new(PidGains::uniform(1.0, 1.0, 1.0), Dof6::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0), None).unwrap();
        let out = pid.update(&state_at(0.0, 0.0), 0.0);
        assert_abs_diff_eq!(out[0], 1.0, epsilon = 1e-12);
        assert_eq!(*pid.integral(), Dof6::zeros());
    }

    #[test]
    fn reset_then_zero_error_gives_zero_output() {
        let goal = Dof6::new(1.0, 2.0, 3.0, 0.1, 0.2, 0.3);
        let mut pid = Pid::new(PidGains::uniform(1.0, 0.5, 0.2), goal, None).unwrap();
        for _ in 0..5 {
            pid.update(&state_at(-3.0, 1.0), 0.1);
        }
        pid.reset();

        let at_goal = VehicleState {
            position: Vector3::new(1.0, 2.0, 3.0),
            orientation: Vector3::new(0.1, 0.2, 0.3),
            ..Default::default()
        };
        let out = pid.update(&at_goal, 0.1);
        assert_abs_diff_eq!(out.amax(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_bad_integral_limit() {
        assert!(Pid::new(PidGains::default(), Dof6::zeros(), Some(0.0)).is_err());
        assert!(Pid::new(PidGains::default(), Dof6::zeros(), Some(f64::NAN)).is_err());
    }
}
