// rov_core/src/models/dynamics.rs

use nalgebra::{DVector, Vector3};
use std::fmt::Debug;

use crate::types::SensorSample;
use crate::utils::integrators::Integrator;

pub type State = DVector<f64>;
pub type Control = DVector<f64>;

// --- DYNAMICS MODEL TRAIT ---
// Represents the kinematic model the estimator integrates. `x_dot = f(x, u)`
pub trait Dynamics: Debug + Send + Sync {
    /// Returns the total number of states (the length of the state vector `x`).
    fn get_state_dim(&self) -> usize;

    /// Returns the number of dimensions in the control input vector `u`.
    fn get_control_dim(&self) -> usize;

    /// Computes the time derivative of the state vector: `x_dot = f(x, u, t)`.
    fn get_derivatives(&self, x: &State, u: &Control, t: f64) -> State;

    /// Propagates the state forward by `dt` with the given integrator.
    /// `u` is held constant over the step.
    ///
    /// Callers must pass a non-negative `dt`; a negative span is treated as no motion.
    fn propagate(
        &self,
        x: &State,
        u: &Control,
        t: f64,
        dt: f64,
        integrator: &dyn Integrator<f64>,
    ) -> State {
        if dt <= 0.0 || u.nrows() != self.get_control_dim() {
            return x.clone();
        }

        let func = |func_x: &State, func_t: f64| -> State { self.get_derivatives(func_x, u, func_t) };

        integrator.step(&func, x, t, t + dt)
    }
}

// --- Dead Reckoning Kinematics ---
// State: [px, py, pz, vx, vy, vz, roll, pitch, yaw]
// Input: [ax, ay, az, wx, wy, wz] straight from the IMU.
//
// Acceleration is integrated in the body frame as if it were the world frame, with no
// gravity removal and no bias states. Orientation comes from integrating the angular
// rate, never from a sensor-reported attitude.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeadReckoningKinematics;

impl DeadReckoningKinematics {
    pub const STATE_DIM: usize = 9;
    pub const CONTROL_DIM: usize = 6;

    /// Packs position, velocity and orientation into the model's state vector.
    pub fn pack_state(
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        orientation: &Vector3<f64>,
    ) -> State {
        let mut x = State::zeros(Self::STATE_DIM);
        x.fixed_rows_mut::<3>(0).copy_from(position);
        x.fixed_rows_mut::<3>(3).copy_from(velocity);
        x.fixed_rows_mut::<3>(6).copy_from(orientation);
        x
    }

    /// Splits a state vector back into `(position, velocity, orientation)`.
    pub fn unpack_state(x: &State) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        (
            x.fixed_rows::<3>(0).into_owned(),
            x.fixed_rows::<3>(3).into_owned(),
            x.fixed_rows::<3>(6).into_owned(),
        )
    }

    /// The control vector `u` for a sample: acceleration then angular rate.
    pub fn control_from_sample(sample: &SensorSample) -> Control {
        let mut u = Control::zeros(Self::CONTROL_DIM);
        u.fixed_rows_mut::<3>(0).copy_from(&sample.acceleration);
        u.fixed_rows_mut::<3>(3).copy_from(&sample.angular_rate);
        u
    }
}

impl Dynamics for DeadReckoningKinematics {
    fn get_state_dim(&self) -> usize {
        Self::STATE_DIM
    }

    fn get_control_dim(&self) -> usize {
        Self::CONTROL_DIM
    }

    fn get_derivatives(&self, x: &State, u: &Control, _t: f64) -> State {
        let mut x_dot = State::zeros(Self::STATE_DIM);

        // d(Position)/dt = Velocity
        x_dot.fixed_rows_mut::<3>(0).copy_from(&x.fixed_rows::<3>(3));
        // d(Velocity)/dt = measured acceleration
        x_dot.fixed_rows_mut::<3>(3).copy_from(&u.fixed_rows::<3>(0));
        // d(Orientation)/dt = measured angular rate
        x_dot.fixed_rows_mut::<3>(6).copy_from(&u.fixed_rows::<3>(3));

        x_dot
    }
}
