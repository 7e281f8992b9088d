// rov_runtime/src/runtime/core/shared.rs

use bevy::prelude::Resource;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rov_core::prelude::*;

/// What the loop publishes after every tick for the `state` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub tick: u64,
    pub mode: ControlMode,
    pub law: ControlLawKind,
    pub goal: [f64; 6],
    pub state: VehicleState,
    pub command: ThrusterCommand,
    pub saturated: bool,
}

/// Handles shared between the control loop and the I/O threads.
///
/// Cloning is cheap; every clone refers to the same slots and flags.
#[derive(Resource, Clone, Default)]
pub struct SharedIo {
    pub command: LatestSlot<AxisCommand>,
    pub sample: LatestSlot<SensorSample>,
    pub telemetry: LatestSlot<Telemetry>,
    toggle_request: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
}

impl SharedIo {
    /// Raises a one-shot autonomy toggle for the next tick.
    pub fn request_toggle(&self) {
        self.toggle_request.store(true, Ordering::SeqCst);
    }

    /// Consumes a pending toggle request.
    pub fn take_toggle(&self) -> bool {
        self.toggle_request.swap(false, Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_request_is_one_shot() {
        let io = SharedIo::default();
        assert!(!io.take_toggle());
        io.clone().request_toggle();
        assert!(io.take_toggle());
        assert!(!io.take_toggle());
    }

    #[test]
    fn clones_share_the_same_slots() {
        let io = SharedIo::default();
        let writer = io.clone();
        writer.command.publish(AxisCommand::neutral());
        writer.request_shutdown();
        assert_eq!(io.command.latest(), Some(AxisCommand::neutral()));
        assert!(io.shutdown_requested());
    }
}
