// src/simulation/engine.rs

use crate::io::color_source::ColorSource;
use crate::model::buffer::{BlockKind, LineId};
use crate::model::color::Color;
use crate::model::network::{
    BufferNetwork, DrainedVehicle, ExtractionOutcome, NetworkSnapshot, PlacementOutcome,
};
use crate::model::vehicle::{Group, Vehicle};
use crate::simulation::config::SimulationConfig;
use crate::simulation::error::SimulationError;
use crate::simulation::metrics::{ConveyorEntry, Metrics, MetricsReport, WindowReport};
use crate::strategy::traits::{ExtractionPolicy, PlacementPolicy};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::str::FromStr;

/// Lifecycle of the cycle driver. A reset always lands back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriverState {
    Idle,
    Running,
    Paused,
}

impl DriverState {
    pub fn as_str(self) -> &'static str {
        match self {
            DriverState::Idle => "idle",
            DriverState::Running => "running",
            DriverState::Paused => "paused",
        }
    }
}

/// One unit of manual work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Draw one color per oven.
    Generate,
    /// Place both pending bodies (and drain the temporary queue if allowed).
    Place,
    /// Pull one body onto the main conveyor and close the cycle.
    Extract,
    /// Run whatever is left of the current cycle.
    FullCycle,
}

impl StepMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StepMode::Generate => "generate",
            StepMode::Place => "place",
            StepMode::Extract => "extract",
            StepMode::FullCycle => "full_cycle",
        }
    }
}

impl FromStr for StepMode {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generate" => Ok(StepMode::Generate),
            "place" => Ok(StepMode::Place),
            "extract" => Ok(StepMode::Extract),
            "full_cycle" | "full-cycle" | "cycle" => Ok(StepMode::FullCycle),
            _ => Err(SimulationError::InvalidStepMode(s.to_string())),
        }
    }
}

/// Which sub-step the current cycle is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Generate,
    Place,
    Extract,
}

impl Phase {
    fn mode(self) -> StepMode {
        match self {
            Phase::Generate => StepMode::Generate,
            Phase::Place => StepMode::Place,
            Phase::Extract => StepMode::Extract,
        }
    }
}

/// The colors coming out of both ovens in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Arrivals {
    pub first: Color,
    pub second: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRecord {
    pub vehicle: Vehicle,
    pub outcome: PlacementOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRecord {
    pub line: LineId,
    pub vehicle: Vehicle,
    pub changeover: bool,
}

/// Everything that happened in one completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRecord {
    pub cycle: u64,
    pub arrivals: Option<Arrivals>,
    pub first: Option<PlacementRecord>,
    pub second: Option<PlacementRecord>,
    /// Held bodies moved back onto lines before the second oven's body.
    pub drained: Vec<DrainedVehicle>,
    pub extraction: Option<ExtractionRecord>,
    /// Penalty seconds charged this cycle (spill + changeover).
    pub penalty_time: f64,
    /// Temporary queue length when the cycle closed.
    pub temporary_len: usize,
}

impl CycleRecord {
    fn new(cycle: u64) -> Self {
        Self {
            cycle,
            arrivals: None,
            first: None,
            second: None,
            drained: Vec::new(),
            extraction: None,
            penalty_time: 0.0,
            temporary_len: 0,
        }
    }

    pub fn placements(&self) -> impl Iterator<Item = &PlacementRecord> + '_ {
        self.first.iter().chain(self.second.iter())
    }

    pub fn overflows(&self) -> usize {
        self.placements()
            .filter(|p| p.outcome == PlacementOutcome::Overflow)
            .count()
    }
}

fn placement_label(record: &Option<PlacementRecord>) -> String {
    match record {
        Some(p) => format!("{} -> {}", p.vehicle.color, p.outcome.label()),
        None => "-".to_string(),
    }
}

/// The cycle-stepped scheduling engine.
///
/// Each cycle runs, in this order: generate one color per oven, place the
/// first oven's body, drain the temporary queue if the second group is open,
/// place the second oven's body, extract at most one body, record. The
/// manual sub-steps expose the same phases and refuse to run out of order.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    network: BufferNetwork,
    placement: Box<dyn PlacementPolicy>,
    extraction: Box<dyn ExtractionPolicy>,
    source: ColorSource,
    rng: StdRng,
    state: DriverState,
    phase: Phase,
    cycle: u64,
    next_sequence: u64,
    pending: Option<(Vehicle, Vehicle)>,
    current: CycleRecord,
    history: Vec<CycleRecord>,
    metrics: Metrics,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimulationConfig) -> Self {
        let network = BufferNetwork::new(config.first_group, config.second_group);
        let (placement, extraction) = config.strategy.build(config.saturation_threshold);
        let source = ColorSource::new(&config.distribution);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            network,
            placement,
            extraction,
            source,
            rng,
            state: DriverState::Idle,
            phase: Phase::Generate,
            cycle: 0,
            next_sequence: 1,
            pending: None,
            current: CycleRecord::new(1),
            history: Vec::new(),
            metrics: Metrics::new(),
        }
    }

    /// Rebuilds the whole simulation from `config` and returns to `Idle`.
    ///
    /// An invalid config is rejected and the current state is kept as is.
    pub fn reset(&mut self, config: SimulationConfig) -> Result<(), SimulationError> {
        config.validate()?;
        info!(
            "Resetting simulation ({:?} strategy, {}+{} lines)",
            config.strategy, config.first_group.lines, config.second_group.lines
        );
        *self = Self::build(config);
        Ok(())
    }

    /// Resets with the current configuration.
    pub fn restart(&mut self) -> Result<(), SimulationError> {
        self.reset(self.config.clone())
    }

    pub fn start(&mut self) -> Result<(), SimulationError> {
        self.transition(DriverState::Idle, DriverState::Running, "start")
    }

    /// Takes effect between cycles: a tick is never interrupted.
    pub fn pause(&mut self) -> Result<(), SimulationError> {
        self.transition(DriverState::Running, DriverState::Paused, "pause")
    }

    pub fn resume(&mut self) -> Result<(), SimulationError> {
        self.transition(DriverState::Paused, DriverState::Running, "resume")
    }

    fn transition(
        &mut self,
        from: DriverState,
        to: DriverState,
        action: &'static str,
    ) -> Result<(), SimulationError> {
        if self.state != from {
            return Err(SimulationError::InvalidTransition {
                from: self.state.as_str(),
                action,
            });
        }
        info!("Simulation {} at cycle {}", to.as_str(), self.cycle);
        self.state = to;
        Ok(())
    }

    /// Runs one full cycle if the driver is `Running`; otherwise does nothing.
    pub fn tick(&mut self) -> Result<Option<&CycleRecord>, SimulationError> {
        if self.state != DriverState::Running {
            return Ok(None);
        }
        self.step(StepMode::FullCycle)
    }

    /// Advances one unit of work. Returns the record when a cycle closes.
    pub fn step(&mut self, mode: StepMode) -> Result<Option<&CycleRecord>, SimulationError> {
        match (mode, self.phase) {
            (StepMode::FullCycle, _) => {
                self.full_cycle();
                Ok(self.history.last())
            }
            (StepMode::Generate, Phase::Generate) => {
                self.generate();
                Ok(None)
            }
            (StepMode::Place, Phase::Place) => {
                self.place();
                Ok(None)
            }
            (StepMode::Extract, Phase::Extract) => {
                self.extract();
                Ok(self.history.last())
            }
            (requested, phase) => Err(SimulationError::StepOutOfOrder {
                expected: phase.mode().as_str(),
                requested: requested.as_str(),
            }),
        }
    }

    /// Same as [`Simulation::step`], parsing the mode from its name.
    pub fn step_named(&mut self, mode: &str) -> Result<Option<&CycleRecord>, SimulationError> {
        let mode: StepMode = mode.parse()?;
        self.step(mode)
    }

    /// Generate sub-step with caller-supplied colors instead of sampling.
    pub fn generate_with(&mut self, arrivals: Arrivals) -> Result<(), SimulationError> {
        if self.phase != Phase::Generate {
            return Err(SimulationError::StepOutOfOrder {
                expected: self.phase.mode().as_str(),
                requested: StepMode::Generate.as_str(),
            });
        }
        self.inject(arrivals);
        Ok(())
    }

    /// Runs a whole cycle on caller-supplied colors.
    pub fn run_cycle_with(&mut self, arrivals: Arrivals) -> Result<&CycleRecord, SimulationError> {
        self.generate_with(arrivals)?;
        self.place();
        self.extract();
        Ok(&self.history[self.history.len() - 1])
    }

    /// Runs `cycles` full cycles regardless of the driver state.
    pub fn run(&mut self, cycles: usize) {
        for _ in 0..cycles {
            self.full_cycle();
        }
    }

    /// Runs whatever phases remain in the current cycle.
    fn full_cycle(&mut self) {
        if self.phase == Phase::Generate {
            self.generate();
        }
        if self.phase == Phase::Place {
            self.place();
        }
        self.extract();
    }

    fn generate(&mut self) {
        let arrivals = Arrivals {
            first: self.source.sample(&mut self.rng),
            second: self.source.sample(&mut self.rng),
        };
        self.inject(arrivals);
    }

    fn inject(&mut self, arrivals: Arrivals) {
        let first = Vehicle::new(self.next_sequence, arrivals.first, Group::First);
        let second = Vehicle::new(self.next_sequence + 1, arrivals.second, Group::Second);
        self.next_sequence += 2;

        self.metrics.record_generated(first.color);
        self.metrics.record_generated(second.color);
        self.current.arrivals = Some(arrivals);
        self.pending = Some((first, second));
        self.phase = Phase::Place;
    }

    fn place(&mut self) {
        if let Some((first, second)) = self.pending.take() {
            let outcome = self.placement.place(&mut self.network, first);
            self.record_placement(&outcome);
            self.current.first = Some(PlacementRecord {
                vehicle: first,
                outcome,
            });

            if !self.network.second_group_stopped() && !self.network.temporary().is_empty() {
                let drained = self
                    .placement
                    .drain(&mut self.network, self.config.temp_drain_per_cycle);
                self.metrics.record_drained(drained.len());
                self.current.drained.extend(drained);
            }

            let outcome = self.placement.place(&mut self.network, second);
            self.record_placement(&outcome);
            self.current.second = Some(PlacementRecord {
                vehicle: second,
                outcome,
            });
        }
        self.phase = Phase::Extract;
    }

    fn record_placement(&mut self, outcome: &PlacementOutcome) {
        self.metrics.record_placement(outcome, self.config.spill_penalty);
        if outcome.is_spill() {
            self.current.penalty_time += self.config.spill_penalty;
        }
    }

    fn extract(&mut self) {
        if let ExtractionOutcome::Extracted {
            line,
            vehicle,
            changeover,
        } = self.extraction.extract(&mut self.network)
        {
            self.metrics.record_extraction(
                ConveyorEntry {
                    sequence: vehicle.sequence,
                    color: vehicle.color,
                    line,
                    changeover,
                },
                self.config.changeover_penalty,
            );
            if changeover {
                self.current.penalty_time += self.config.changeover_penalty;
            }
            self.current.extraction = Some(ExtractionRecord {
                line,
                vehicle,
                changeover,
            });
        }
        self.finish_cycle();
    }

    fn finish_cycle(&mut self) {
        self.cycle += 1;
        self.metrics.sample_utilization(&self.network);

        let mut record = std::mem::replace(&mut self.current, CycleRecord::new(self.cycle + 1));
        record.temporary_len = self.network.temporary().len();

        debug!(
            "=== Cycle {} === O1 {} | O2 {} | drained {} | conveyor {}",
            record.cycle,
            placement_label(&record.first),
            placement_label(&record.second),
            record.drained.len(),
            match &record.extraction {
                Some(e) => format!(
                    "{} from {}{}",
                    e.vehicle.color,
                    e.line,
                    if e.changeover { " (changeover)" } else { "" }
                ),
                None => "idle".to_string(),
            }
        );

        self.history.push(record);
        self.phase = Phase::Generate;
    }

    /// Moves every held body that fits back onto second-group lines.
    pub fn drain_temporary(&mut self) -> Vec<DrainedVehicle> {
        let drained = self.placement.drain(&mut self.network, usize::MAX);
        self.metrics.record_drained(drained.len());
        self.current.drained.extend(drained.iter().copied());
        drained
    }

    pub fn set_block(
        &mut self,
        line: LineId,
        kind: BlockKind,
        value: bool,
    ) -> Result<(), SimulationError> {
        self.network.set_block(line, kind, value)
    }

    /// [`Simulation::set_block`] addressed by label, e.g. `"L7"`.
    pub fn set_block_named(
        &mut self,
        line: &str,
        kind: BlockKind,
        value: bool,
    ) -> Result<(), SimulationError> {
        let id = LineId::parse(line)
            .ok_or_else(|| SimulationError::UnknownLine(line.to_string()))?;
        self.network.set_block(id, kind, value)
    }

    /// Manual override of the second group's stop flag.
    pub fn set_second_group_stopped(&mut self, value: bool) {
        self.network.set_second_group_stopped(value);
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.network.snapshot()
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics
            .report(&self.network, self.config.processing_time, self.cycle)
    }

    /// Aggregates over the last `cycles` completed cycles.
    pub fn window(&self, cycles: usize) -> WindowReport {
        WindowReport::from_history(&self.history, cycles, self.config.processing_time)
    }

    pub fn counters(&self) -> &Metrics {
        &self.metrics
    }

    pub fn conveyor_sequence(&self) -> &[ConveyorEntry] {
        self.metrics.sequence()
    }

    pub fn history(&self) -> &[CycleRecord] {
        &self.history
    }

    pub fn network(&self) -> &BufferNetwork {
        &self.network
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Completed cycles.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Bodies generated but not yet placed (only between sub-steps).
    pub fn pending(&self) -> Option<(Vehicle, Vehicle)> {
        self.pending
    }

    pub fn policy_names(&self) -> (&'static str, &'static str) {
        (self.placement.name(), self.extraction.name())
    }
}
