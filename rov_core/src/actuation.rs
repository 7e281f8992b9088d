// rov_core/src/actuation.rs

use crate::allocation::ThrusterCommand;
use crate::error::ActuationError;

/// The collaborator that turns thruster pulses into hardware signals.
///
/// Implementations own their device handle; it is constructed ready and injected,
/// the core never initializes hardware lazily.
pub trait ActuationSink: Send + Sync {
    fn write(&mut self, command: &ThrusterCommand) -> Result<(), ActuationError>;
}
