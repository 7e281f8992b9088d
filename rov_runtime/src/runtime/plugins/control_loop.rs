// rov_runtime/src/runtime/plugins/control_loop.rs

use bevy::prelude::*;

use rov_core::cycle::{ControlCycle, TickInput, TickOutput};
use rov_core::prelude::ParameterChannel;

use crate::runtime::core::clock::LoopClock;
use crate::runtime::core::setup::Actuator;
use crate::runtime::core::shared::{SharedIo, Telemetry};

/// Ordering inside one loop iteration: the tick always completes before a
/// shutdown request is acted on.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoopSet {
    Tick,
    Supervise,
}

pub struct ControlLoopPlugin;

impl Plugin for ControlLoopPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(Update, (LoopSet::Tick, LoopSet::Supervise).chain())
            .add_systems(Update, control_tick_system.in_set(LoopSet::Tick))
            .add_systems(Update, shutdown_request_system.in_set(LoopSet::Supervise))
            // Runs in the same frame the exit was requested, before the runner returns.
            .add_systems(Last, neutral_on_exit_system);
    }
}

/// One control period. Reads whatever the I/O threads last published; never waits.
pub fn control_tick_system(
    mut cycle: ResMut<ControlCycle>,
    channel: Res<ParameterChannel>,
    io: Res<SharedIo>,
    clock: Res<LoopClock>,
    mut actuator: ResMut<Actuator>,
) {
    let command = io.command.latest();
    let sample = io.sample.latest();

    let input = TickInput {
        now: clock.now(),
        dt: clock.dt(),
        command: command.as_ref(),
        sample: sample.as_ref(),
        toggle_request: io.take_toggle(),
        law_swap: channel.take_pending(),
    };

    let report = cycle.tick(input, actuator.0.as_mut());
    if let Some(transition) = report.output.transition {
        info!("Mode switched to {:?}", transition.to);
    }
    io.telemetry.publish(telemetry(&cycle, &report.output));
}

fn telemetry(cycle: &ControlCycle, output: &TickOutput) -> Telemetry {
    let goal = cycle.law().goal();
    Telemetry {
        tick: cycle.stats().ticks,
        mode: output.mode,
        law: cycle.law().kind(),
        goal: [goal[0], goal[1], goal[2], goal[3], goal[4], goal[5]],
        state: output.state,
        command: cycle.last_command().clone(),
        saturated: output.allocation.saturation.is_some(),
    }
}

pub fn shutdown_request_system(
    io: Res<SharedIo>,
    clock: Res<LoopClock>,
    mut exit: EventWriter<AppExit>,
) {
    if io.shutdown_requested() {
        info!("Shutdown requested, finishing the control loop.");
        exit.write(AppExit::Success);
    } else if clock.expired() {
        info!("Configured run time elapsed, finishing the control loop.");
        io.request_shutdown();
        exit.write(AppExit::Success);
    }
}

/// Commands neutral thrust once the app has been asked to exit.
pub fn neutral_on_exit_system(
    mut exits: EventReader<AppExit>,
    mut cycle: ResMut<ControlCycle>,
    mut actuator: ResMut<Actuator>,
    mut stopped: Local<bool>,
) {
    if exits.read().next().is_none() || *stopped {
        return;
    }
    *stopped = true;

    match cycle.stop(actuator.0.as_mut()) {
        Ok(()) => info!(
            "Thrusters commanded to neutral after {} ticks",
            cycle.stats().ticks
        ),
        Err(e) => error!("Failed to command neutral thrust on shutdown: {}", e),
    }
}
