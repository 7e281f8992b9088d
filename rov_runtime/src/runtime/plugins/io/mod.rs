// rov_runtime/src/runtime/plugins/io/mod.rs

//! Thin I/O collaborators. They run off the loop thread and only ever talk to the
//! loop through the shared latest-value slots and flags.

pub mod command_tcp;
pub mod gamepad_udp;
pub mod logging_sink;
pub mod signals;
pub mod synthetic_imu;

use bevy::prelude::*;
use std::io;
use std::net::TcpListener;
use std::thread;

use rov_core::prelude::ParameterChannel;

use crate::runtime::config::RovConfig;
use crate::runtime::core::clock::MonotonicClock;
use crate::runtime::core::shared::SharedIo;

/// Starts every collaborator the configuration enables.
pub fn spawn_collaborators(
    config: &RovConfig,
    clock: MonotonicClock,
    io: &SharedIo,
    channel: &ParameterChannel,
) -> io::Result<()> {
    if let Some(addr) = &config.network.gamepad_udp {
        gamepad_udp::spawn(gamepad_udp::bind(addr)?, config.pilot.deadzone, io.clone())?;
        info!("Listening for gamepad datagrams on udp://{}", addr);
    }
    let commands = match &config.network.command_tcp {
        Some(addr) => {
            let listener = TcpListener::bind(addr)?;
            listener.set_nonblocking(true)?;
            info!("Accepting commands on tcp://{}", addr);
            Some(listener)
        }
        None => None,
    };
    spawn_io_runtime(commands, io.clone(), channel.clone())?;
    if config.imu.enabled {
        let imu = synthetic_imu::SyntheticImu::new(&config.imu)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        synthetic_imu::spawn(imu, config.imu.rate_hz, clock, io.clone())?;
        info!("Synthetic IMU running at {:.1} Hz", config.imu.rate_hz);
    }
    Ok(())
}

/// Runs the async collaborators on one current-thread tokio runtime: the command
/// server, if enabled, and the OS signal watcher. Both end once shutdown is requested.
fn spawn_io_runtime(
    commands: Option<TcpListener>,
    io: SharedIo,
    channel: ParameterChannel,
) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    thread::Builder::new()
        .name("io-runtime".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                let server = async {
                    let Some(listener) = commands else { return };
                    match tokio::net::TcpListener::from_std(listener) {
                        Ok(listener) => command_tcp::serve(listener, io.clone(), channel).await,
                        Err(e) => error!("Command server failed to start: {}", e),
                    }
                };
                let watcher = signals::forward_shutdown(signals::shutdown_signal(), io.clone());
                tokio::join!(server, watcher);
            });
        })?;
    Ok(())
}
