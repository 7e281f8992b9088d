// rov_runtime/src/cli.rs

use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// rov: the motion-control loop of a remotely operated vehicle.
///
/// Values given here override the configuration file and the `ROV_` environment.
#[derive(Parser, Debug, Resource, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the vehicle configuration TOML file.
    #[arg(short, long, default_value = "config/rov.toml")]
    pub config: PathBuf,

    /// Control loop rate in Hz.
    #[arg(long)]
    pub rate_hz: Option<f64>,

    /// Stop after this many seconds instead of running until a `stop` command.
    #[arg(long)]
    pub duration: Option<f64>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub print_config: bool,

    /// Log filter, e.g. `info` or `info,rov_core=debug`.
    #[arg(long)]
    pub log_level: Option<String>,
}
