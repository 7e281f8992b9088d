// rov_core/src/control/lqr.rs

use nalgebra::Matrix6;

use crate::control::{ControlLaw, ControlLawKind};
use crate::error::ParameterError;
use crate::types::{Dof6, VehicleState};

const MAX_ITERATIONS: usize = 10_000;
const TOLERANCE: f64 = 1e-10;

/// Discrete plant `x[k+1] = A x[k] + B u[k]` the gain is designed for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LqrModel {
    pub a: Matrix6<f64>,
    pub b: Matrix6<f64>,
}

impl LqrModel {
    /// Six decoupled single integrators: each demand axis drives the rate of the
    /// matching pose component over one step of `dt` seconds.
    pub fn single_integrator(dt: f64) -> Self {
        Self {
            a: Matrix6::identity(),
            b: Matrix6::from_diagonal_element(dt),
        }
    }
}

impl Default for LqrModel {
    fn default() -> Self {
        Self::single_integrator(0.1)
    }
}

/// Solves the discrete algebraic Riccati equation by fixed-point iteration and
/// returns the steady-state gain `K = (R + B'PB)^-1 B'PA`.
///
/// The iteration is deterministic: the same inputs always produce the same `K`.
pub fn solve(
    a: &Matrix6<f64>,
    b: &Matrix6<f64>,
    q: &Matrix6<f64>,
    r: &Matrix6<f64>,
) -> Result<Matrix6<f64>, ParameterError> {
    validate_weights(q, r)?;
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return Err(ParameterError::OutOfRange {
            name: "model",
            reason: "A and B must be finite".to_string(),
        });
    }

    let mut p = *q;
    for _ in 0..MAX_ITERATIONS {
        let gain = riccati_gain(a, b, r, &p)?;

        // P' = Q + A'P(A - BK), symmetrized to keep round-off from drifting.
        let next = q + a.transpose() * p * (a - b * gain);
        let next = (next + next.transpose()) * 0.5;
        if next.iter().any(|v| !v.is_finite()) {
            return Err(ParameterError::RiccatiDiverged {
                iterations: MAX_ITERATIONS,
            });
        }

        let delta = (next - p).amax();
        p = next;
        if delta <= TOLERANCE * (1.0 + p.amax()) {
            return riccati_gain(a, b, r, &p);
        }
    }

    Err(ParameterError::RiccatiDiverged {
        iterations: MAX_ITERATIONS,
    })
}

fn riccati_gain(
    a: &Matrix6<f64>,
    b: &Matrix6<f64>,
    r: &Matrix6<f64>,
    p: &Matrix6<f64>,
) -> Result<Matrix6<f64>, ParameterError> {
    let bt_p = b.transpose() * p;
    let s = r + bt_p * b;
    let s_inv = s.try_inverse().ok_or(ParameterError::SingularRiccati)?;
    Ok(s_inv * bt_p * a)
}

fn validate_weights(q: &Matrix6<f64>, r: &Matrix6<f64>) -> Result<(), ParameterError> {
    if q.iter().any(|v| !v.is_finite()) || q.diagonal().iter().any(|v| *v < 0.0) {
        return Err(ParameterError::InvalidWeight {
            name: "q",
            reason: "state weights must be finite and non-negative".to_string(),
        });
    }
    if r.iter().any(|v| !v.is_finite()) || r.cholesky().is_none() {
        return Err(ParameterError::InvalidWeight {
            name: "r",
            reason: "input weights must be positive definite".to_string(),
        });
    }
    Ok(())
}

/// Steady-state LQR regulating the vehicle pose towards `goal`.
#[derive(Debug, Clone)]
pub struct Lqr {
    gain: Matrix6<f64>,
    goal: Dof6,
}

impl Lqr {
    /// Solves for the gain once; the law then runs with a fixed `K`.
    pub fn new(
        model: &LqrModel,
        q: &Matrix6<f64>,
        r: &Matrix6<f64>,
        goal: Dof6,
    ) -> Result<Self, ParameterError> {
        let gain = solve(&model.a, &model.b, q, r)?;
        Ok(Self { gain, goal })
    }

    pub fn gain(&self) -> &Matrix6<f64> {
        &self.gain
    }
}

impl ControlLaw for Lqr {
    fn kind(&self) -> ControlLawKind {
        ControlLawKind::Lqr
    }

    fn update(&mut self, state: &VehicleState, _dt: f64) -> Dof6 {
        -(self.gain * (state.pose() - self.goal))
    }

    fn reset(&mut self) {
        // A steady-state LQR keeps no memory between calls.
    }

    fn goal(&self) -> &Dof6 {
        &self.goal
    }
}
