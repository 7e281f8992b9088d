// rov_runtime/src/runtime/config/structs.rs

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use rov_core::allocation::{reference_bias, reference_columns, AllocationMatrix, PulseRange};
use rov_core::arbiter::ControlMode;
use rov_core::control::lqr::LqrModel;
use rov_core::control::params::{ControlLawParameters, LqrWeights, PidGains};
use rov_core::control::ControlLawKind;
use rov_core::error::ParameterError;
use rov_core::types::Dof6;

// =========================================================================
// == Top-Level Configuration Resource ==
// =========================================================================

/// # RovConfig
/// Everything the runtime needs to assemble the control loop, parsed from
/// `rov.toml` with `ROV_` environment overrides on top.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct RovConfig {
    #[serde(default)]
    pub control_loop: LoopConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub pilot: PilotConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub imu: ImuConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoopConfig {
    /// Control loop frequency in Hz.
    pub rate_hz: f64,
    /// Optional run time in seconds; the loop runs until `stop` when absent.
    pub duration_seconds: Option<f64>,
    pub initial_mode: ControlMode,
    /// Debounce for the autonomy toggle. Must be at least 1000.
    pub toggle_cooldown_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            rate_hz: 10.0,
            duration_seconds: None,
            initial_mode: ControlMode::Manual,
            toggle_cooldown_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EstimatorConfig {
    /// Largest sample gap, in seconds, that is still integrated.
    pub dt_max: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self { dt_max: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ControllerConfig {
    /// The law active at startup.
    pub law: ControlLawKind,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integral_limit: Option<f64>,
    pub q: LqrWeights,
    pub r: LqrWeights,
    /// Step of the single-integrator plant the LQR gain is designed for.
    pub model_dt: f64,
    /// Pose setpoint `[x, y, z, roll, pitch, yaw]`.
    pub goal: [f64; 6],
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            law: ControlLawKind::Pid,
            kp: 2.0,
            ki: 0.0,
            kd: 0.0,
            integral_limit: None,
            q: LqrWeights::Scalar(1.0),
            r: LqrWeights::Scalar(1.0),
            model_dt: 0.1,
            goal: [0.0; 6],
        }
    }
}

impl ControllerConfig {
    pub fn lqr_model(&self) -> LqrModel {
        LqrModel::single_integrator(self.model_dt)
    }

    pub fn to_parameters(&self) -> ControlLawParameters {
        let goal = Dof6::from(self.goal);
        match self.law {
            ControlLawKind::Pid => ControlLawParameters::Pid {
                gains: PidGains::uniform(self.kp, self.ki, self.kd),
                integral_limit: self.integral_limit,
                goal,
            },
            ControlLawKind::Lqr => ControlLawParameters::Lqr {
                q: self.q,
                r: self.r,
                model: self.lqr_model(),
                goal,
            },
        }
    }
}

/// Per-axis thruster weight vectors; each list has one entry per thruster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisColumns {
    pub surge: Vec<f64>,
    pub sway: Vec<f64>,
    pub heave: Vec<f64>,
    pub roll: Vec<f64>,
    pub pitch: Vec<f64>,
    pub yaw: Vec<f64>,
}

impl Default for AxisColumns {
    fn default() -> Self {
        let [surge, sway, heave, roll, pitch, yaw] = reference_columns();
        Self {
            surge,
            sway,
            heave,
            roll,
            pitch,
            yaw,
        }
    }
}

impl AxisColumns {
    pub fn to_matrix(&self) -> Result<AllocationMatrix, ParameterError> {
        AllocationMatrix::from_axis_columns(&[
            self.surge.clone(),
            self.sway.clone(),
            self.heave.clone(),
            self.roll.clone(),
            self.pitch.clone(),
            self.yaw.clone(),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AllocationConfig {
    pub matrix: AxisColumns,
    /// Mounting orientation of each thruster, +1 or -1.
    pub bias: Vec<f64>,
    /// Fraction of full thrust the vehicle may use.
    pub max_power: f64,
    pub pulse: PulseRange,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            matrix: AxisColumns::default(),
            bias: reference_bias(),
            max_power: 0.4,
            pulse: PulseRange::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PilotConfig {
    pub deadzone: f64,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self { deadzone: 0.2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NetworkConfig {
    /// Where gamepad datagrams arrive. Disabled when absent.
    pub gamepad_udp: Option<String>,
    /// Where the line-based command server listens. Disabled when absent.
    pub command_tcp: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            gamepad_udp: Some("0.0.0.0:30002".to_string()),
            command_tcp: Some("0.0.0.0:30002".to_string()),
        }
    }
}

/// The synthetic IMU used when no sensor hardware is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ImuConfig {
    pub enabled: bool,
    pub rate_hz: f64,
    /// Optional seed for the noise generator, for reproducible runs.
    pub seed: Option<u64>,
    pub accel_noise_stddev: [f64; 3], // [x, y, z]
    pub gyro_noise_stddev: [f64; 3],  // [roll, pitch, yaw]
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate_hz: 50.0,
            seed: None,
            accel_noise_stddev: [0.02; 3],
            gyro_noise_stddev: [0.005; 3],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// An `EnvFilter` string.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,rov_core=info,rov_runtime=debug".to_string(),
        }
    }
}
