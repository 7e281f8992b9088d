// rov_core/src/estimation/dead_reckoning.rs

use tracing::{debug, warn};

use crate::error::SampleError;
use crate::estimation::{StateEstimator, StepKind};
use crate::models::dynamics::{DeadReckoningKinematics, Dynamics};
use crate::types::{SensorSample, VehicleState};
use crate::utils::integrators::RK1;

/// Default upper bound on the integration step, in seconds.
pub const DEFAULT_DT_MAX: f64 = 1.0;

/// Advances `state` by one sample.
///
/// * `dt < 0` (clock rollback) and non-finite samples are rejected; `state` is not touched.
/// * `dt > dt_max` records the new timestamp and skips integration.
/// * Otherwise position, velocity and orientation are integrated with a single
///   first-order step, so position uses the velocity from before this sample.
pub fn advance(
    state: &VehicleState,
    sample: &SensorSample,
    dt_max: f64,
) -> Result<(VehicleState, StepKind), SampleError> {
    if !sample.is_finite() {
        return Err(SampleError::NonFinite);
    }

    let dt = sample.timestamp - state.timestamp;
    if dt < 0.0 {
        return Err(SampleError::TimestampRollback {
            timestamp: sample.timestamp,
            last: state.timestamp,
        });
    }

    if dt > dt_max {
        let next = VehicleState {
            timestamp: sample.timestamp,
            ..*state
        };
        return Ok((next, StepKind::GapSkipped));
    }

    let model = DeadReckoningKinematics;
    let x = DeadReckoningKinematics::pack_state(&state.position, &state.velocity, &state.orientation);
    let u = DeadReckoningKinematics::control_from_sample(sample);
    let x_next = model.propagate(&x, &u, state.timestamp, dt, &RK1);
    let (position, velocity, orientation) = DeadReckoningKinematics::unpack_state(&x_next);

    Ok((
        VehicleState {
            position,
            velocity,
            orientation,
            timestamp: sample.timestamp,
        },
        StepKind::Integrated,
    ))
}

/// Counters for how samples were handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EstimatorStats {
    pub integrated: u64,
    pub gap_skipped: u64,
    pub rejected: u64,
}

/// Drift-accumulating dead-reckoning estimator. Intended for short-horizon
/// stabilization: no bias estimation, no gravity compensation.
#[derive(Debug, Clone)]
pub struct DeadReckoningEstimator {
    state: VehicleState,
    dt_max: f64,
    stats: EstimatorStats,
}

impl DeadReckoningEstimator {
    pub fn new(dt_max: f64) -> Self {
        Self::with_state(VehicleState::default(), dt_max)
    }

    pub fn with_state(state: VehicleState, dt_max: f64) -> Self {
        Self {
            state,
            dt_max,
            stats: EstimatorStats::default(),
        }
    }

    pub fn dt_max(&self) -> f64 {
        self.dt_max
    }

    pub fn stats(&self) -> EstimatorStats {
        self.stats
    }
}

impl Default for DeadReckoningEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_DT_MAX)
    }
}

impl StateEstimator for DeadReckoningEstimator {
    fn process(&mut self, sample: &SensorSample) -> Result<StepKind, SampleError> {
        match advance(&self.state, sample, self.dt_max) {
            Ok((next, kind)) => {
                if kind == StepKind::GapSkipped {
                    debug!(
                        "Sample gap of {:.3}s exceeds dt_max {:.3}s, integration skipped",
                        sample.timestamp - self.state.timestamp,
                        self.dt_max
                    );
                    self.stats.gap_skipped += 1;
                } else {
                    self.stats.integrated += 1;
                }
                self.state = next;
                Ok(kind)
            }
            Err(e) => {
                self.stats.rejected += 1;
                warn!("Dropping sensor sample: {}", e);
                Err(e)
            }
        }
    }

    fn get_state(&self) -> &VehicleState {
        &self.state
    }
}
