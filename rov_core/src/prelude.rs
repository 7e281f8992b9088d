// rov_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::actuation::ActuationSink;
pub use crate::control::{ControlLaw, ControlLawKind};
pub use crate::estimation::StateEstimator;
pub use crate::models::dynamics::Dynamics;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::allocation::{Allocation, AllocationMatrix, PulseRange, ThrusterCommand};
pub use crate::arbiter::{ControlMode, ModeTransition};
pub use crate::control::params::{ControlLawParameters, LqrWeights, ParameterUpdate, PidGains};
pub use crate::types::{Axis, AxisCommand, CommandFlags, Dof6, SensorSample, VehicleState};

// --- Runtime building blocks ---
pub use crate::allocation::ThrusterAllocator;
pub use crate::arbiter::ModeArbiter;
pub use crate::control::channel::ParameterChannel;
pub use crate::cycle::{ControlCycle, CycleStats, TickInput, TickOutput, TickReport};
pub use crate::input::GamepadState;
pub use crate::error::{ActuationError, CoreError, ParameterError, SampleError};
pub use crate::estimation::dead_reckoning::DeadReckoningEstimator;
pub use crate::slot::LatestSlot;
