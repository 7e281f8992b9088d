// rov_core/src/cycle.rs

use tracing::{debug, info, warn};

use crate::actuation::ActuationSink;
use crate::allocation::{Allocation, ThrusterAllocator, ThrusterCommand};
use crate::arbiter::{ControlMode, ModeArbiter, ModeTransition};
use crate::control::ControlLaw;
use crate::error::ActuationError;
use crate::estimation::StateEstimator;
use crate::types::{AxisCommand, Dof6, SensorSample, VehicleState};

/// What the loop hands to one tick. Everything is read at tick start.
#[derive(Default)]
pub struct TickInput<'a> {
    /// Monotonic time of this tick, in seconds.
    pub now: f64,
    /// Nominal loop period, passed to the control law.
    pub dt: f64,
    /// Latest pilot command, if one has ever arrived.
    pub command: Option<&'a AxisCommand>,
    /// Latest sensor sample, if one has ever arrived.
    pub sample: Option<&'a SensorSample>,
    /// A one-shot toggle request from outside the command stream.
    pub toggle_request: bool,
    /// A fully built law to install before anything else runs.
    pub law_swap: Option<Box<dyn ControlLaw>>,
}

/// The computed part of a tick.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub mode: ControlMode,
    pub demand: Dof6,
    pub allocation: Allocation,
    pub state: VehicleState,
    pub transition: Option<ModeTransition>,
}

/// One tick's output plus the outcome of handing it to the sink.
#[derive(Debug)]
pub struct TickReport {
    pub output: TickOutput,
    pub actuation: Result<(), ActuationError>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub ticks: u64,
    pub samples_processed: u64,
    pub samples_rejected: u64,
    pub law_swaps: u64,
    pub saturated_ticks: u64,
    pub actuation_failures: u64,
}

/// One fixed-period step of the motion-control chain: estimator, arbiter,
/// control law, allocator, sink.
#[cfg_attr(feature = "bevy", derive(bevy_ecs::prelude::Resource))]
pub struct ControlCycle {
    estimator: Box<dyn StateEstimator>,
    law: Box<dyn ControlLaw>,
    arbiter: ModeArbiter,
    allocator: ThrusterAllocator,
    last_command: ThrusterCommand,
    last_sample_ts: Option<f64>,
    stats: CycleStats,
}

impl ControlCycle {
    pub fn new(
        estimator: Box<dyn StateEstimator>,
        law: Box<dyn ControlLaw>,
        arbiter: ModeArbiter,
        allocator: ThrusterAllocator,
    ) -> Self {
        let last_command = allocator.neutral();
        Self {
            estimator,
            law,
            arbiter,
            allocator,
            last_command,
            last_sample_ts: None,
            stats: CycleStats::default(),
        }
    }

    pub fn tick(&mut self, input: TickInput<'_>, sink: &mut dyn ActuationSink) -> TickReport {
        self.stats.ticks += 1;

        if let Some(mut law) = input.law_swap {
            law.reset();
            info!("Installed new {:?} control law", law.kind());
            self.law = law;
            self.stats.law_swaps += 1;
        }

        if let Some(sample) = input.sample {
            self.ingest(sample);
        }

        let pad_toggle = input.command.map_or(false, |c| c.flags.mode_toggle);
        let mut transition = self.arbiter.observe(pad_toggle, input.now);
        if input.toggle_request && transition.is_none() {
            transition = self.arbiter.request(input.now);
        }
        if transition.map_or(false, |t| t.enters_autonomous()) {
            self.law.reset();
        }

        let state = *self.estimator.get_state();
        let mode = self.arbiter.mode();
        let demand = match mode {
            ControlMode::Manual => input.command.map_or_else(Dof6::zeros, |c| *c.axes()),
            ControlMode::Autonomous => self.law.update(&state, input.dt),
        };

        let allocation = self.allocator.allocate(&demand);
        if allocation.saturation.is_some() {
            self.stats.saturated_ticks += 1;
        }

        let actuation = sink.write(&allocation.command);
        match &actuation {
            Ok(()) => self.last_command = allocation.command.clone(),
            Err(e) => {
                self.stats.actuation_failures += 1;
                warn!("Actuation write failed, holding last command: {}", e);
            }
        }

        TickReport {
            output: TickOutput {
                mode,
                demand,
                allocation,
                state,
                transition,
            },
            actuation,
        }
    }

    /// Commands every thruster to neutral. Used on shutdown.
    pub fn stop(&mut self, sink: &mut dyn ActuationSink) -> Result<(), ActuationError> {
        let neutral = self.neutral();
        sink.write(&neutral)?;
        self.last_command = neutral;
        Ok(())
    }

    pub fn neutral(&self) -> ThrusterCommand {
        self.allocator.neutral()
    }

    pub fn state(&self) -> &VehicleState {
        self.estimator.get_state()
    }

    pub fn mode(&self) -> ControlMode {
        self.arbiter.mode()
    }

    pub fn law(&self) -> &dyn ControlLaw {
        self.law.as_ref()
    }

    /// The last command the sink accepted.
    pub fn last_command(&self) -> &ThrusterCommand {
        &self.last_command
    }

    pub fn allocator(&self) -> &ThrusterAllocator {
        &self.allocator
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    // The slot keeps returning the same sample until a fresh one lands.
    fn ingest(&mut self, sample: &SensorSample) {
        if self.last_sample_ts == Some(sample.timestamp) {
            return;
        }
        self.last_sample_ts = Some(sample.timestamp);
        match self.estimator.process(sample) {
            Ok(kind) => {
                debug!("Sample at {:.3}s: {:?}", sample.timestamp, kind);
                self.stats.samples_processed += 1;
            }
            Err(_) => self.stats.samples_rejected += 1,
        }
    }
}
