// rov_core/src/estimation/mod.rs

use crate::error::SampleError;
use crate::types::{SensorSample, VehicleState};

pub mod dead_reckoning;

/// What an accepted sample did to the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// The state was integrated over a valid `dt` (possibly zero).
    Integrated,
    /// The gap since the last sample was too large; only the timestamp moved.
    GapSkipped,
}

/// The contract for any algorithm that performs the "State Estimator" role.
/// Its sole responsibility is to estimate the state of the vehicle.
pub trait StateEstimator: Send + Sync {
    /// Feeds one sample. A rejected sample leaves the estimate untouched.
    fn process(&mut self, sample: &SensorSample) -> Result<StepKind, SampleError>;

    /// Returns a reference to the current best estimate of the state.
    fn get_state(&self) -> &VehicleState;
}
