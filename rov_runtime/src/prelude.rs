// rov_runtime/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the rov_core prelude so the pure types are one import away.
pub use rov_core::prelude::*;

pub use crate::cli::Cli;
pub use crate::runtime::config::{ConfigError, RovConfig};
pub use crate::runtime::core::clock::{LoopClock, MonotonicClock};
pub use crate::runtime::core::setup::{insert_runtime_resources, Actuator};
pub use crate::runtime::core::shared::{SharedIo, Telemetry};
pub use crate::runtime::plugins::control_loop::{ControlLoopPlugin, LoopSet};
pub use crate::runtime::plugins::io::logging_sink::LoggingSink;
pub use crate::RovControlPlugin;
