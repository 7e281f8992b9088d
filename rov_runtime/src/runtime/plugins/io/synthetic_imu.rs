// rov_runtime/src/runtime/plugins/io/synthetic_imu.rs

use bevy::prelude::*;
use nalgebra::Vector3;
use rand_distr::{Distribution, Normal};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rov_core::error::ParameterError;
use rov_core::types::SensorSample;

use crate::runtime::config::structs::ImuConfig;
use crate::runtime::core::clock::MonotonicClock;
use crate::runtime::core::prng::SensorRng;
use crate::runtime::core::shared::SharedIo;

/// Stand-in sensor source for bench runs: a stationary vehicle seen through a
/// noisy, gravity-compensated 6-DOF IMU.
pub struct SyntheticImu {
    rng: SensorRng,
    accel_noise: [Normal<f64>; 3], // X, Y, Z
    gyro_noise: [Normal<f64>; 3],  // roll, pitch, yaw
}

impl SyntheticImu {
    pub fn new(config: &ImuConfig) -> Result<Self, ParameterError> {
        let normal = |std: f64| {
            Normal::new(0.0, std).map_err(|e| ParameterError::OutOfRange {
                name: "imu noise stddev",
                reason: e.to_string(),
            })
        };
        let [ax, ay, az] = config.accel_noise_stddev;
        let [gx, gy, gz] = config.gyro_noise_stddev;

        Ok(Self {
            rng: SensorRng::new(config.seed),
            accel_noise: [normal(ax)?, normal(ay)?, normal(az)?],
            gyro_noise: [normal(gx)?, normal(gy)?, normal(gz)?],
        })
    }

    pub fn sample(&mut self, timestamp: f64) -> SensorSample {
        let rng = &mut self.rng.0;
        let acceleration = Vector3::from_iterator(self.accel_noise.iter().map(|n| n.sample(rng)));
        let angular_rate = Vector3::from_iterator(self.gyro_noise.iter().map(|n| n.sample(rng)));
        SensorSample::new(timestamp, acceleration, angular_rate)
    }
}

pub fn spawn(
    mut imu: SyntheticImu,
    rate_hz: f64,
    clock: MonotonicClock,
    io: SharedIo,
) -> io::Result<JoinHandle<()>> {
    let period = Duration::from_secs_f64(1.0 / rate_hz);
    thread::Builder::new()
        .name("synthetic-imu".to_string())
        .spawn(move || {
            while !io.shutdown_requested() {
                io.sample.publish(imu.sample(clock.now()));
                thread::sleep(period);
            }
            debug!("Synthetic IMU stopped");
        })
}
