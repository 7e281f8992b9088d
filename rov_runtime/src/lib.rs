// rov_runtime/src/lib.rs

use bevy::prelude::*;

use crate::runtime::plugins::control_loop::ControlLoopPlugin;

// This prelude is for convenience for other files WITHIN the rov_runtime crate.
pub mod prelude;

pub mod cli;
pub mod runtime;

/// The plugin that turns a headless Bevy app into the vehicle's control loop.
/// `main.rs` inserts the resources from `runtime::core::setup` and adds this.
pub struct RovControlPlugin;

impl Plugin for RovControlPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ControlLoopPlugin);
    }
}
