// rov_core/src/allocation.rs

//! Thruster force allocation: a fixed N×6 matrix maps a 6-DOF demand onto the
//! individual thrusters, followed by mounting-orientation correction,
//! mix-preserving normalization and the mapping into the ESC pulse range.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ParameterError;
use crate::types::{Axis, Dof6};

/// Pulse widths understood by the ESCs, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulseRange {
    pub min_us: f64,
    pub neutral_us: f64,
    pub max_us: f64,
}

impl PulseRange {
    pub fn validate(&self) -> Result<(), ParameterError> {
        let ordered = self.min_us < self.neutral_us && self.neutral_us < self.max_us;
        let finite = [self.min_us, self.neutral_us, self.max_us]
            .iter()
            .all(|v| v.is_finite());
        if ordered && finite {
            Ok(())
        } else {
            Err(ParameterError::OutOfRange {
                name: "pulse",
                reason: format!(
                    "expected finite min < neutral < max, got {} / {} / {}",
                    self.min_us, self.neutral_us, self.max_us
                ),
            })
        }
    }

    /// Maps a normalized value in `[-1, 1]` to a pulse, spanning neutral→max for
    /// positive values and neutral→min for negative ones, then clamps. NaN maps
    /// to neutral.
    pub fn map(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.neutral_us;
        }
        let span = if value >= 0.0 {
            self.max_us - self.neutral_us
        } else {
            self.neutral_us - self.min_us
        };
        (self.neutral_us + value * span).clamp(self.min_us, self.max_us)
    }
}

impl Default for PulseRange {
    fn default() -> Self {
        Self {
            min_us: 1100.0,
            neutral_us: 1500.0,
            max_us: 1900.0,
        }
    }
}

/// The constant N×6 allocation matrix. Column `j` is the weight vector of axis `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationMatrix {
    weights: DMatrix<f64>,
}

impl AllocationMatrix {
    /// Builds the matrix from one weight vector per axis, in `Axis::ALL` order.
    pub fn from_axis_columns(columns: &[Vec<f64>; 6]) -> Result<Self, ParameterError> {
        let thrusters = columns[0].len();
        if thrusters == 0 {
            return Err(ParameterError::DimensionMismatch {
                what: "allocation matrix",
                expected: 1,
                found: 0,
            });
        }
        for column in columns.iter() {
            if column.len() != thrusters {
                return Err(ParameterError::DimensionMismatch {
                    what: "allocation matrix column",
                    expected: thrusters,
                    found: column.len(),
                });
            }
            if column.iter().any(|w| !w.is_finite()) {
                return Err(ParameterError::OutOfRange {
                    name: "allocation matrix",
                    reason: "weights must be finite".to_string(),
                });
            }
        }

        let weights = DMatrix::from_fn(thrusters, 6, |row, col| columns[col][row]);
        Ok(Self { weights })
    }

    /// The eight-thruster vectored layout of the reference vehicle.
    pub fn reference_octo() -> Self {
        let columns = reference_columns();
        Self {
            weights: DMatrix::from_fn(8, 6, |row, col| columns[col][row]),
        }
    }

    pub fn thruster_count(&self) -> usize {
        self.weights.nrows()
    }

    /// The weight vector for one axis, one entry per thruster.
    pub fn column(&self, axis: Axis) -> DVector<f64> {
        self.weights.column(axis.index()).into_owned()
    }
}

impl Default for AllocationMatrix {
    fn default() -> Self {
        Self::reference_octo()
    }
}

/// Surge, sway, heave, roll, pitch, yaw weight vectors of the reference vehicle.
pub fn reference_columns() -> [Vec<f64>; 6] {
    [
        vec![1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0],
        vec![1.0, -1.0, 0.0, 0.0, 1.0, -1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0],
        vec![0.0, 0.0, 1.0, -1.0, 0.0, 0.0, -1.0, 1.0],
        vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, -1.0, -1.0],
        vec![-1.0, 1.0, 0.0, 0.0, 1.0, -1.0, 0.0, 0.0],
    ]
}

/// Per-thruster sign correction for how each thruster is mounted on the reference vehicle.
pub fn reference_bias() -> Vec<f64> {
    vec![-1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 1.0, -1.0]
}

/// Pulse widths for every thruster, ready for the actuation sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThrusterCommand {
    pub pulses_us: Vec<f64>,
}

impl ThrusterCommand {
    pub fn neutral(thrusters: usize, pulse: &PulseRange) -> Self {
        Self {
            pulses_us: vec![pulse.neutral_us; thrusters],
        }
    }

    pub fn len(&self) -> usize {
        self.pulses_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses_us.is_empty()
    }
}

/// Everything one allocation produced, for the sink and for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Step 1: linear superposition of the axis columns.
    pub combined: DVector<f64>,
    /// After bias correction and normalization, before power scaling.
    pub mix: DVector<f64>,
    /// Peak magnitude that triggered normalization, if it was triggered.
    pub saturation: Option<f64>,
    pub command: ThrusterCommand,
}

/// Maps 6-DOF demands to thruster pulses. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct ThrusterAllocator {
    matrix: AllocationMatrix,
    bias: DVector<f64>,
    max_power: f64,
    pulse: PulseRange,
}

impl ThrusterAllocator {
    pub fn new(
        matrix: AllocationMatrix,
        bias: Vec<f64>,
        max_power: f64,
        pulse: PulseRange,
    ) -> Result<Self, ParameterError> {
        if bias.len() != matrix.thruster_count() {
            return Err(ParameterError::DimensionMismatch {
                what: "thruster bias",
                expected: matrix.thruster_count(),
                found: bias.len(),
            });
        }
        if bias.iter().any(|b| !b.is_finite()) {
            return Err(ParameterError::OutOfRange {
                name: "bias",
                reason: "bias entries must be finite".to_string(),
            });
        }
        if !(max_power > 0.0 && max_power <= 1.0) {
            return Err(ParameterError::OutOfRange {
                name: "max_power",
                reason: format!("must be in (0, 1], got {}", max_power),
            });
        }
        pulse.validate()?;

        Ok(Self {
            matrix,
            bias: DVector::from_vec(bias),
            max_power,
            pulse,
        })
    }

    /// The reference vehicle: eight thrusters, 40% power, 1100–1900 µs.
    pub fn reference() -> Self {
        Self {
            matrix: AllocationMatrix::reference_octo(),
            bias: DVector::from_vec(reference_bias()),
            max_power: 0.4,
            pulse: PulseRange::default(),
        }
    }

    pub fn thruster_count(&self) -> usize {
        self.matrix.thruster_count()
    }

    pub fn matrix(&self) -> &AllocationMatrix {
        &self.matrix
    }

    pub fn pulse(&self) -> &PulseRange {
        &self.pulse
    }

    /// Every thruster at its neutral pulse.
    pub fn neutral(&self) -> ThrusterCommand {
        ThrusterCommand::neutral(self.thruster_count(), &self.pulse)
    }

    /// Weighted sum of the axis columns scaled by `demand`. Non-finite demand
    /// components contribute nothing.
    pub fn combine(&self, demand: &Dof6) -> DVector<f64> {
        let demand = DVector::from_iterator(
            6,
            demand.iter().map(|d| if d.is_finite() { *d } else { 0.0 }),
        );
        &self.matrix.weights * demand
    }

    pub fn allocate(&self, demand: &Dof6) -> Allocation {
        let combined = self.combine(demand);

        let mut mix = combined.component_mul(&self.bias);

        // Finite demands can still overflow when summed. There is no ratio left to
        // preserve, so the thrusters go neutral.
        if mix.iter().any(|m| !m.is_finite()) {
            warn!("Allocator mix overflowed, commanding neutral thrust");
            return Allocation {
                combined,
                mix: DVector::zeros(self.thruster_count()),
                saturation: Some(f64::INFINITY),
                command: self.neutral(),
            };
        }

        // Divide by the peak rather than clipping channels, so the ratio between
        // thrusters (and therefore the direction of motion) is preserved.
        let peak = mix.amax();
        let saturation = if peak > 1.0 {
            mix /= peak;
            debug!("Allocator saturated at {:.3}, normalizing thruster mix", peak);
            Some(peak)
        } else {
            None
        };

        let pulses_us = mix
            .iter()
            .map(|m| self.pulse.map(m * self.max_power))
            .collect();

        Allocation {
            combined,
            mix,
            saturation,
            command: ThrusterCommand { pulses_us },
        }
    }
}

impl Default for ThrusterAllocator {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn axis_demand(axis: Axis, value: f64) -> Dof6 {
        let mut d = Dof6::zeros();
        d[axis.index()] = value;
        d
    }

    #[test]
    fn zero_demand_is_neutral_everywhere() {
        let allocator = ThrusterAllocator::reference();
        let allocation = allocator.allocate(&Dof6::zeros());
        assert_eq!(allocation.command, allocator.neutral());
        assert!(allocation.saturation.is_none());
    }

    #[test]
    fn unit_surge_reproduces_surge_column() {
        let allocator = ThrusterAllocator::reference();
        let allocation = allocator.allocate(&axis_demand(Axis::Surge, 1.0));
        let column = allocator.matrix().column(Axis::Surge);
        assert_eq!(allocation.combined, column);

        let peak = column.amax();
        let expected = column.component_mul(&DVector::from_vec(reference_bias())) / peak;
        assert_eq!(allocation.mix, expected);
    }

    #[test]
    fn single_axis_over_unity_normalizes_to_exactly_one() {
        let allocator = ThrusterAllocator::reference();
        for axis in Axis::ALL {
            let allocation = allocator.allocate(&axis_demand(axis, 2.5));
            assert_eq!(allocation.mix.amax(), 1.0, "axis {:?}", axis);
            assert_eq!(allocation.saturation, Some(2.5));
        }
    }

    #[test]
    fn below_unity_is_not_normalized() {
        let allocator = ThrusterAllocator::reference();
        let allocation = allocator.allocate(&axis_demand(Axis::Heave, 0.6));
        assert!(allocation.saturation.is_none());
        assert_abs_diff_eq!(allocation.mix.amax(), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn normalization_keeps_signs_and_zero_channels() {
        let allocator = ThrusterAllocator::reference();
        let demand = Dof6::new(1.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        let allocation = allocator.allocate(&demand);
        let raw = allocation.combined.component_mul(&DVector::from_vec(reference_bias()));
        assert!(allocation.saturation.is_some());
        for (m, r) in allocation.mix.iter().zip(raw.iter()) {
            assert!(m * r >= 0.0, "normalization flipped a sign");
            if *r == 0.0 {
                assert_eq!(*m, 0.0);
            }
        }
    }

    #[test]
    fn pulses_stay_inside_the_safe_range() {
        let allocator = ThrusterAllocator::new(
            AllocationMatrix::reference_octo(),
            reference_bias(),
            1.0,
            PulseRange::default(),
        )
        .unwrap();
        let allocation = allocator.allocate(&Dof6::new(9.0, -9.0, 9.0, -9.0, 9.0, -9.0));
        for pulse in &allocation.command.pulses_us {
            assert!((1100.0..=1900.0).contains(pulse));
        }
    }

    #[test]
    fn power_fraction_scales_around_neutral() {
        let allocator = ThrusterAllocator::reference();
        let allocation = allocator.allocate(&axis_demand(Axis::Heave, 1.0));
        // Heave column on thruster 2 is +1 with bias +1: 1500 + 0.4 * 400.
        assert_abs_diff_eq!(allocation.command.pulses_us[2], 1660.0, epsilon = 1e-9);
        // Thruster 3 has bias -1: 1500 - 0.4 * 400.
        assert_abs_diff_eq!(allocation.command.pulses_us[3], 1340.0, epsilon = 1e-9);
        // Thruster 0 has no heave contribution.
        assert_eq!(allocation.command.pulses_us[0], 1500.0);
    }

    #[test]
    fn non_finite_demand_contributes_nothing() {
        let allocator = ThrusterAllocator::reference();
        let allocation = allocator.allocate(&Dof6::new(f64::NAN, 0.0, 0.0, 0.0, 0.0, f64::INFINITY));
        assert_eq!(allocation.command, allocator.neutral());
    }

    #[test]
    fn overflowing_sum_of_finite_demands_goes_neutral() {
        let allocator = ThrusterAllocator::reference();
        let demand = Dof6::new(1.5e308, 1.5e308, 0.0, 0.0, 0.0, 0.0);
        let allocation = allocator.allocate(&demand);

        assert_eq!(allocation.saturation, Some(f64::INFINITY));
        assert_eq!(allocation.command, allocator.neutral());
        assert!(allocation.mix.iter().all(|m| *m == 0.0));
    }

    #[test]
    fn nan_pulse_value_maps_to_neutral() {
        let pulse = PulseRange::default();
        assert_eq!(pulse.map(f64::NAN), 1500.0);
        assert_eq!(pulse.map(f64::INFINITY), 1900.0);
        assert_eq!(pulse.map(f64::NEG_INFINITY), 1100.0);
    }

    #[test]
    fn construction_validates_shapes_and_ranges() {
        let mut columns = reference_columns();
        columns[3].pop();
        assert!(AllocationMatrix::from_axis_columns(&columns).is_err());

        let matrix = AllocationMatrix::reference_octo();
        assert!(ThrusterAllocator::new(matrix.clone(), vec![1.0; 7], 0.4, PulseRange::default()).is_err());
        assert!(ThrusterAllocator::new(matrix.clone(), reference_bias(), 0.0, PulseRange::default()).is_err());
        let inverted = PulseRange {
            min_us: 1900.0,
            neutral_us: 1500.0,
            max_us: 1100.0,
        };
        assert!(ThrusterAllocator::new(matrix, reference_bias(), 0.4, inverted).is_err());
    }

    #[test]
    fn custom_matrix_matches_reference_layout() {
        let matrix = AllocationMatrix::from_axis_columns(&reference_columns()).unwrap();
        assert_eq!(matrix, AllocationMatrix::reference_octo());
        assert_eq!(matrix.thruster_count(), 8);
    }
}
