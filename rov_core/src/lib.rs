// rov_core/src/lib.rs

// Framework-agnostic motion-control core: estimation, control laws,
// thruster allocation and the per-tick glue that ties them together.
pub mod actuation;
pub mod allocation;
pub mod arbiter;
pub mod control;
pub mod cycle;
pub mod error;
pub mod estimation;
pub mod input;
pub mod models;
pub mod prelude;
pub mod slot;
pub mod types;
pub mod utils;
