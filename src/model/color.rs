// src/model/color.rs

use crate::simulation::error::ConfigError;
use log::warn;
use serde::Serialize;
use std::fmt;

/// The twelve paint colors a body can leave the ovens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Color {
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
    C7,
    C8,
    C9,
    C10,
    C11,
    C12,
}

impl Color {
    pub const COUNT: usize = 12;

    pub const ALL: [Color; Color::COUNT] = [
        Color::C1,
        Color::C2,
        Color::C3,
        Color::C4,
        Color::C5,
        Color::C6,
        Color::C7,
        Color::C8,
        Color::C9,
        Color::C10,
        Color::C11,
        Color::C12,
    ];

    /// Position of this color in [`Color::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.index() + 1)
    }
}

/// A stationary probability table over [`Color::ALL`].
///
/// Raw weights do not have to sum to 1.0. They are normalized when the
/// distribution is built; negative or non-finite weights are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorDistribution {
    probabilities: [f64; Color::COUNT],
}

impl ColorDistribution {
    /// Tolerance under which a weight sum counts as exactly 1.0.
    const SUM_TOLERANCE: f64 = 1e-9;

    pub fn new(weights: [f64; Color::COUNT]) -> Result<Self, ConfigError> {
        for (color, &weight) in Color::ALL.iter().zip(weights.iter()) {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    color: *color,
                    weight,
                });
            }
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(ConfigError::ZeroDistribution);
        }
        if (total - 1.0).abs() > Self::SUM_TOLERANCE {
            warn!(
                "Color weights sum to {:.4}, normalizing to a probability distribution",
                total
            );
        }

        let mut probabilities = [0.0; Color::COUNT];
        for (p, w) in probabilities.iter_mut().zip(weights.iter()) {
            *p = w / total;
        }
        Ok(Self { probabilities })
    }

    /// Builds a distribution from `(color, weight)` pairs; unlisted colors get 0.
    pub fn from_pairs(pairs: &[(Color, f64)]) -> Result<Self, ConfigError> {
        let mut weights = [0.0; Color::COUNT];
        for &(color, weight) in pairs {
            weights[color.index()] += weight;
        }
        Self::new(weights)
    }

    /// A table that always yields `color`. Handy for scripted scenarios.
    pub fn single(color: Color) -> Self {
        let mut probabilities = [0.0; Color::COUNT];
        probabilities[color.index()] = 1.0;
        Self { probabilities }
    }

    pub fn probability(&self, color: Color) -> f64 {
        self.probabilities[color.index()]
    }

    pub fn probabilities(&self) -> &[f64; Color::COUNT] {
        &self.probabilities
    }
}

impl Default for ColorDistribution {
    /// The plant's observed color mix. The listing sums to 1.01.
    fn default() -> Self {
        let raw = [
            0.20, 0.25, 0.12, 0.20, 0.03, 0.02, 0.02, 0.02, 0.10, 0.02, 0.02, 0.01,
        ];
        let total: f64 = raw.iter().sum();
        let mut probabilities = [0.0; Color::COUNT];
        for (p, w) in probabilities.iter_mut().zip(raw.iter()) {
            *p = w / total;
        }
        Self { probabilities }
    }
}
