// src/io/color_source.rs

use crate::model::color::{Color, ColorDistribution};
use rand::Rng;
use rand_distr::{Distribution, WeightedAliasIndex};

/// Draws oven output colors from a [`ColorDistribution`].
///
/// The random source is passed in on every call, so a seeded `StdRng`
/// gives a reproducible color stream.
#[derive(Debug, Clone)]
pub struct ColorSource {
    table: Option<WeightedAliasIndex<f64>>,
    fallback: Color,
}

impl ColorSource {
    pub fn new(distribution: &ColorDistribution) -> Self {
        let weights = distribution.probabilities().to_vec();
        // Only fails on an all-zero or invalid table, which a validated
        // distribution never is. Keep a fixed color as a last resort.
        let fallback = Color::ALL
            .iter()
            .copied()
            .max_by(|a, b| {
                distribution
                    .probability(*a)
                    .total_cmp(&distribution.probability(*b))
            })
            .unwrap_or(Color::C1);
        Self {
            table: WeightedAliasIndex::new(weights).ok(),
            fallback,
        }
    }

    /// Samples one color.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        match &self.table {
            Some(table) => Color::ALL[table.sample(rng)],
            None => self.fallback,
        }
    }
}
