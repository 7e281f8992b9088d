// rov_core/src/control/mod.rs

use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::types::{Dof6, VehicleState};

pub mod channel;
pub mod lqr;
pub mod params;
pub mod pid;

pub use lqr::Lqr;
pub use pid::Pid;

/// Which family a control law belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlLawKind {
    Pid,
    Lqr,
}

// --- CONTROL LAW TRAIT ---
// Maps the current estimate (and the time since the last call) to a 6-DOF demand.
/// The contract for an autonomous control law.
///
/// Exactly one law is active at a time. Whenever a law becomes active, whether by
/// entering autonomous mode or by a parameter change, `reset` is called first so
/// accumulated error never leaks across switches.
pub trait ControlLaw: DynClone + Debug + Send + Sync {
    fn kind(&self) -> ControlLawKind;

    /// Computes the demand `[surge, sway, heave, roll, pitch, yaw]` for this step.
    fn update(&mut self, state: &VehicleState, dt: f64) -> Dof6;

    /// Clears any memory the law keeps between calls.
    fn reset(&mut self);

    /// The setpoint this law regulates the vehicle pose towards.
    fn goal(&self) -> &Dof6;
}

dyn_clone::clone_trait_object!(ControlLaw);
