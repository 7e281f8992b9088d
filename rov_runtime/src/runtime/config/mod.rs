// rov_runtime/src/runtime/config/mod.rs

//! Loading and validating the runtime configuration: built-in defaults, then the
//! TOML file, then `ROV_` environment variables, then command-line overrides.

pub mod structs;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;
use thiserror::Error;

use rov_core::arbiter::MIN_TOGGLE_COOLDOWN;
use rov_core::error::ParameterError;

use crate::cli::Cli;
pub use structs::RovConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ParameterError),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// The provider stack, lowest priority first. Nested keys in the environment are
/// separated by a double underscore, e.g. `ROV_CONTROL_LOOP__RATE_HZ=20`.
pub fn figment(path: &Path) -> Figment {
    Figment::from(Serialized::defaults(RovConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ROV_").split("__"))
}

pub fn load(cli: &Cli) -> Result<RovConfig, ConfigError> {
    extract(figment(&cli.config), cli)
}

/// Extracts the config from `figment`, applies the CLI overrides and validates.
pub fn extract(figment: Figment, cli: &Cli) -> Result<RovConfig, ConfigError> {
    let mut config: RovConfig = figment.extract()?;

    if let Some(rate_hz) = cli.rate_hz {
        config.control_loop.rate_hz = rate_hz;
    }
    if let Some(duration) = cli.duration {
        config.control_loop.duration_seconds = Some(duration);
    }
    if let Some(filter) = &cli.log_level {
        config.logging.filter = filter.clone();
    }

    validate(&config)?;
    Ok(config)
}

pub fn to_toml(config: &RovConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

/// Checks the values the core constructors do not see. Matrix, bias, power,
/// pulse and gain checks happen when the core objects are built.
pub fn validate(config: &RovConfig) -> Result<(), ParameterError> {
    let positive = |name: &'static str, value: f64| {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ParameterError::OutOfRange {
                name,
                reason: format!("must be positive and finite, got {}", value),
            })
        }
    };

    positive("control_loop.rate_hz", config.control_loop.rate_hz)?;
    if let Some(duration) = config.control_loop.duration_seconds {
        positive("control_loop.duration_seconds", duration)?;
    }
    if (config.control_loop.toggle_cooldown_ms as u128) < MIN_TOGGLE_COOLDOWN.as_millis() {
        return Err(ParameterError::OutOfRange {
            name: "control_loop.toggle_cooldown_ms",
            reason: format!(
                "must be at least {} ms, got {}",
                MIN_TOGGLE_COOLDOWN.as_millis(),
                config.control_loop.toggle_cooldown_ms
            ),
        });
    }
    positive("estimator.dt_max", config.estimator.dt_max)?;
    positive("controller.model_dt", config.controller.model_dt)?;

    let deadzone = config.pilot.deadzone;
    if !(0.0..1.0).contains(&deadzone) {
        return Err(ParameterError::OutOfRange {
            name: "pilot.deadzone",
            reason: format!("must be in [0, 1), got {}", deadzone),
        });
    }

    if config.imu.enabled {
        positive("imu.rate_hz", config.imu.rate_hz)?;
        for std in config
            .imu
            .accel_noise_stddev
            .iter()
            .chain(config.imu.gyro_noise_stddev.iter())
        {
            if !std.is_finite() || *std < 0.0 {
                return Err(ParameterError::OutOfRange {
                    name: "imu noise stddev",
                    reason: format!("must be non-negative and finite, got {}", std),
                });
            }
        }
    }
    Ok(())
}
