// rov_runtime/src/runtime/core/setup.rs

use bevy::prelude::*;
use std::time::Duration;

use rov_core::prelude::*;

use crate::runtime::config::{ConfigError, RovConfig};
use crate::runtime::core::clock::{LoopClock, MonotonicClock};
use crate::runtime::core::shared::SharedIo;

/// The actuation sink the loop writes to, boxed so hardware sinks can be injected.
#[derive(Resource)]
pub struct Actuator(pub Box<dyn ActuationSink>);

/// Builds the control cycle and the parameter channel from `config`. Every
/// validation the core performs happens here, before the loop starts.
pub fn assemble(config: &RovConfig) -> Result<(ControlCycle, ParameterChannel), ConfigError> {
    let allocation = &config.allocation;
    let allocator = ThrusterAllocator::new(
        allocation.matrix.to_matrix()?,
        allocation.bias.clone(),
        allocation.max_power,
        allocation.pulse,
    )?;

    let (channel, law) = ParameterChannel::new(
        config.controller.to_parameters(),
        config.controller.lqr_model(),
    )?;

    let arbiter = ModeArbiter::new(
        config.control_loop.initial_mode,
        Duration::from_millis(config.control_loop.toggle_cooldown_ms),
    )?;

    let estimator = DeadReckoningEstimator::new(config.estimator.dt_max);

    info!(
        "Assembled control cycle: {} thrusters, {:?} law, starting in {:?} mode",
        allocator.thruster_count(),
        law.kind(),
        arbiter.mode()
    );

    Ok((
        ControlCycle::new(Box::new(estimator), law, arbiter, allocator),
        channel,
    ))
}

/// Inserts every resource the control loop systems need.
pub fn insert_runtime_resources(
    app: &mut App,
    config: &RovConfig,
    clock: MonotonicClock,
    io: SharedIo,
    sink: Box<dyn ActuationSink>,
) -> Result<(), ConfigError> {
    let (cycle, channel) = assemble(config)?;
    let run_for = config
        .control_loop
        .duration_seconds
        .map(Duration::from_secs_f64);

    app.insert_resource(config.clone())
        .insert_resource(cycle)
        .insert_resource(channel)
        .insert_resource(io)
        .insert_resource(Actuator(sink))
        .insert_resource(LoopClock::new(clock, config.control_loop.rate_hz, run_for));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::config::structs::ControllerConfig;

    #[test]
    fn reference_config_assembles() {
        let (cycle, channel) = assemble(&RovConfig::default()).unwrap();
        assert_eq!(cycle.allocator().thruster_count(), 8);
        assert_eq!(cycle.mode(), ControlMode::Manual);
        assert_eq!(channel.accepted().kind(), ControlLawKind::Pid);
    }

    #[test]
    fn lqr_startup_law_is_solved_at_assembly() {
        let config = RovConfig {
            controller: ControllerConfig {
                law: ControlLawKind::Lqr,
                ..Default::default()
            },
            ..Default::default()
        };
        let (cycle, _) = assemble(&config).unwrap();
        assert_eq!(cycle.law().kind(), ControlLawKind::Lqr);
    }

    #[test]
    fn bias_length_mismatch_is_a_config_error() {
        let mut config = RovConfig::default();
        config.allocation.bias.pop();
        assert!(matches!(
            assemble(&config),
            Err(ConfigError::Invalid(ParameterError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn negative_startup_gain_is_a_config_error() {
        let mut config = RovConfig::default();
        config.controller.kd = -1.0;
        assert!(assemble(&config).is_err());
    }
}
