// src/lib.rs

//! Cycle-stepped simulation of a two-oven paint shop feeding a single
//! assembly conveyor through a network of FIFO buffer lines.

pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use model::buffer::{BlockKind, LineId};
pub use model::color::{Color, ColorDistribution};
pub use model::network::{BufferNetwork, NetworkSnapshot, PlacementOutcome};
pub use model::vehicle::{Group, Vehicle};
pub use simulation::comparison::{Comparison, ComparisonReport};
pub use simulation::config::{GroupConfig, SimulationConfig, Strategy};
pub use simulation::engine::{Arrivals, CycleRecord, DriverState, Simulation, StepMode};
pub use simulation::error::{ConfigError, SimulationError};
pub use simulation::metrics::{MetricsReport, WindowReport};
