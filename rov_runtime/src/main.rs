// rov_runtime/src/main.rs

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;

use rov_core::prelude::ParameterChannel;
use rov_runtime::cli::Cli;
use rov_runtime::runtime::config;
use rov_runtime::runtime::core::clock::{LoopClock, MonotonicClock};
use rov_runtime::runtime::core::setup::insert_runtime_resources;
use rov_runtime::runtime::core::shared::SharedIo;
use rov_runtime::runtime::plugins::io::{logging_sink::LoggingSink, spawn_collaborators};
use rov_runtime::RovControlPlugin;

fn main() -> AppExit {
    let cli = Cli::parse();

    // --- 1. Load Configuration ---
    let config = match config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return AppExit::error();
        }
    };

    if cli.print_config {
        return match config::to_toml(&config) {
            Ok(text) => {
                print!("{}", text);
                AppExit::Success
            }
            Err(e) => {
                eprintln!("error: {}", e);
                AppExit::error()
            }
        };
    }

    // --- 2. Headless App: the schedule runner is the fixed-period loop ---
    let clock = MonotonicClock::start();
    let period = LoopClock::new(clock, config.control_loop.rate_hz, None).period;

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(period)),
        LogPlugin {
            level: Level::DEBUG,
            filter: config.logging.filter.clone(),
            ..default()
        },
    ));
    info!(
        "Configuration loaded from '{}', loop at {:.1} Hz",
        cli.config.display(),
        config.control_loop.rate_hz
    );

    // --- 3. Core resources and I/O collaborators ---
    let io = SharedIo::default();
    let sink = LoggingSink::new(config.allocation.bias.len());
    if let Err(e) = insert_runtime_resources(&mut app, &config, clock, io.clone(), Box::new(sink)) {
        error!("Refusing to start: {}", e);
        return AppExit::error();
    }

    let channel = app.world().resource::<ParameterChannel>().clone();
    if let Err(e) = spawn_collaborators(&config, clock, &io, &channel) {
        error!("Failed to start I/O: {}", e);
        return AppExit::error();
    }

    // --- 4. Run until `stop`, SIGINT/SIGTERM or the configured duration ---
    app.add_plugins(RovControlPlugin);
    app.run()
}
