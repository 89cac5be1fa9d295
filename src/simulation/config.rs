// src/simulation/config.rs

use crate::model::color::ColorDistribution;
use crate::model::vehicle::Group;
use crate::simulation::error::ConfigError;
use crate::strategy::extraction::{OptimizedExtraction, RoundRobinExtraction};
use crate::strategy::placement::{OptimizedPlacement, RoundRobinPlacement};
use crate::strategy::traits::{ExtractionPolicy, PlacementPolicy};
use serde::Serialize;

/// Size and per-line capacity of one ownership group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupConfig {
    pub lines: usize,
    pub capacity: usize,
}

/// Which pair of placement/extraction policies drives the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    Optimized,
    RoundRobin,
}

impl Strategy {
    /// Builds the policy pair for this strategy.
    pub fn build(
        self,
        saturation_threshold: f64,
    ) -> (Box<dyn PlacementPolicy>, Box<dyn ExtractionPolicy>) {
        match self {
            Strategy::Optimized => (
                Box::new(OptimizedPlacement::new()),
                Box::new(OptimizedExtraction::new(saturation_threshold)),
            ),
            Strategy::RoundRobin => (
                Box::new(RoundRobinPlacement::new()),
                Box::new(RoundRobinExtraction::new()),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub distribution: ColorDistribution,
    pub first_group: GroupConfig,
    pub second_group: GroupConfig,
    /// Seconds of conveyor time per extracted body.
    pub processing_time: f64,
    /// Seconds charged when a first-group body spills onto a second-group line.
    pub spill_penalty: f64,
    /// Seconds charged when the extracted color changes.
    pub changeover_penalty: f64,
    /// Second-group fill ratio at which extraction switches to draining
    /// the longest head-run color.
    pub saturation_threshold: f64,
    /// Held bodies moved back onto lines per cycle once the second group reopens.
    pub temp_drain_per_cycle: usize,
    pub strategy: Strategy,
    /// `Some` makes the color stream reproducible.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            distribution: ColorDistribution::default(),
            first_group: GroupConfig {
                lines: 4,
                capacity: 14,
            },
            second_group: GroupConfig {
                lines: 5,
                capacity: 16,
            },
            processing_time: 1.0,
            spill_penalty: 1.0,
            changeover_penalty: 1.0,
            saturation_threshold: 1.0,
            temp_drain_per_cycle: 1,
            strategy: Strategy::Optimized,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_distribution(mut self, distribution: ColorDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_saturation_threshold(mut self, threshold: f64) -> Self {
        self.saturation_threshold = threshold;
        self
    }

    pub fn with_temp_drain_per_cycle(mut self, per_cycle: usize) -> Self {
        self.temp_drain_per_cycle = per_cycle;
        self
    }

    pub fn with_groups(mut self, first: GroupConfig, second: GroupConfig) -> Self {
        self.first_group = first;
        self.second_group = second;
        self
    }

    pub fn group(&self, group: Group) -> GroupConfig {
        match group {
            Group::First => self.first_group,
            Group::Second => self.second_group,
        }
    }

    /// Checks every field. The color table is validated when it is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for group in [Group::First, Group::Second] {
            let cfg = self.group(group);
            if cfg.lines == 0 {
                return Err(ConfigError::EmptyGroup(group));
            }
            if cfg.capacity == 0 {
                return Err(ConfigError::NonPositiveCapacity(group));
            }
        }

        if !self.processing_time.is_finite() || self.processing_time <= 0.0 {
            return Err(ConfigError::InvalidProcessingTime(self.processing_time));
        }
        for (name, value) in [
            ("spill", self.spill_penalty),
            ("changeover", self.changeover_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidPenalty { name, value });
            }
        }

        let t = self.saturation_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ConfigError::InvalidThreshold(t));
        }
        if self.temp_drain_per_cycle == 0 {
            return Err(ConfigError::ZeroDrainRate);
        }
        Ok(())
    }
}
