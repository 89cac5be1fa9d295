// src/simulation/error.rs

use crate::model::color::Color;
use crate::model::vehicle::Group;

/// A configuration bundle that cannot describe a valid plant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A group was configured with zero lines.
    EmptyGroup(Group),
    /// Line capacity must be at least 1.
    NonPositiveCapacity(Group),
    /// A color weight is negative, NaN or infinite.
    InvalidWeight { color: Color, weight: f64 },
    /// Every color weight is zero.
    ZeroDistribution,
    /// Saturation threshold must lie in `(0, 1]`.
    InvalidThreshold(f64),
    /// Penalties must be finite and non-negative.
    InvalidPenalty { name: &'static str, value: f64 },
    /// Processing time per body must be finite and positive.
    InvalidProcessingTime(f64),
    /// The temporary queue must drain at least one body per cycle.
    ZeroDrainRate,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyGroup(group) => write!(f, "Group {} has no buffer lines", group),
            ConfigError::NonPositiveCapacity(group) => {
                write!(f, "Group {} line capacity must be positive", group)
            }
            ConfigError::InvalidWeight { color, weight } => {
                write!(f, "Invalid weight {} for color {}", weight, color)
            }
            ConfigError::ZeroDistribution => write!(f, "Color weights sum to zero"),
            ConfigError::InvalidThreshold(value) => {
                write!(f, "Saturation threshold {} is outside (0, 1]", value)
            }
            ConfigError::InvalidPenalty { name, value } => {
                write!(f, "Penalty '{}' has invalid value {}", name, value)
            }
            ConfigError::InvalidProcessingTime(value) => {
                write!(f, "Processing time {} must be positive", value)
            }
            ConfigError::ZeroDrainRate => write!(f, "Temporary queue drain rate must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors returned by the simulation's public operations.
///
/// None of these are fatal and none leave the simulation half-updated:
/// the rejected call simply did not happen.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// The configuration bundle was rejected.
    InvalidConfig(ConfigError),
    /// No line with this identifier exists.
    UnknownLine(String),
    /// The step mode string was not recognized.
    InvalidStepMode(String),
    /// A manual sub-step was requested before the phase it depends on.
    StepOutOfOrder {
        expected: &'static str,
        requested: &'static str,
    },
    /// The driver cannot perform `action` from its current state.
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidConfig(err) => write!(f, "Invalid configuration: {}", err),
            SimulationError::UnknownLine(id) => write!(f, "Unknown buffer line: {}", id),
            SimulationError::InvalidStepMode(mode) => write!(f, "Invalid step mode: {}", mode),
            SimulationError::StepOutOfOrder {
                expected,
                requested,
            } => write!(
                f,
                "Step '{}' requested while waiting for '{}'",
                requested, expected
            ),
            SimulationError::InvalidTransition { from, action } => {
                write!(f, "Cannot {} while {}", action, from)
            }
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::InvalidConfig(err)
    }
}
