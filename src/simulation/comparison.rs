// src/simulation/comparison.rs

use crate::io::color_source::ColorSource;
use crate::model::buffer::{BlockKind, LineId};
use crate::simulation::config::{SimulationConfig, Strategy};
use crate::simulation::engine::{Arrivals, Simulation};
use crate::simulation::error::SimulationError;
use crate::simulation::metrics::MetricsReport;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// Runs the color-aware scheduler and the round-robin baseline side by side.
///
/// Both simulations see exactly the same oven output every cycle, so any
/// difference in the metrics comes from the policies alone.
#[derive(Debug)]
pub struct Comparison {
    optimized: Simulation,
    baseline: Simulation,
    source: ColorSource,
    rng: StdRng,
}

impl Comparison {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            source: ColorSource::new(&config.distribution),
            optimized: Simulation::new(config.clone().with_strategy(Strategy::Optimized))?,
            baseline: Simulation::new(config.with_strategy(Strategy::RoundRobin))?,
            rng,
        })
    }

    /// Draws one pair of colors and runs a full cycle on both simulations.
    pub fn step(&mut self) -> Result<Arrivals, SimulationError> {
        let arrivals = Arrivals {
            first: self.source.sample(&mut self.rng),
            second: self.source.sample(&mut self.rng),
        };
        self.optimized.run_cycle_with(arrivals)?;
        self.baseline.run_cycle_with(arrivals)?;
        Ok(arrivals)
    }

    pub fn run(&mut self, cycles: usize) -> Result<(), SimulationError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Applies the same block change to both simulations.
    pub fn set_block(
        &mut self,
        line: LineId,
        kind: BlockKind,
        value: bool,
    ) -> Result<(), SimulationError> {
        self.optimized.set_block(line, kind, value)?;
        self.baseline.set_block(line, kind, value)
    }

    pub fn optimized(&self) -> &Simulation {
        &self.optimized
    }

    pub fn baseline(&self) -> &Simulation {
        &self.baseline
    }

    pub fn report(&self) -> ComparisonReport {
        let optimized = self.optimized.metrics();
        let baseline = self.baseline.metrics();

        let changeover_reduction = if baseline.changeovers > 0 {
            (baseline.changeovers as f64 - optimized.changeovers as f64)
                / baseline.changeovers as f64
                * 100.0
        } else {
            0.0
        };

        ComparisonReport {
            jph_gain: optimized.jph - baseline.jph,
            changeover_reduction,
            optimized,
            baseline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub optimized: MetricsReport,
    pub baseline: MetricsReport,
    /// Optimized JPH minus baseline JPH.
    pub jph_gain: f64,
    /// Percent fewer changeovers than the baseline (negative if more).
    pub changeover_reduction: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_sides_see_the_same_colors() {
        let mut cmp = Comparison::new(SimulationConfig::default().with_seed(5)).unwrap();
        cmp.run(50).unwrap();
        let a: Vec<_> = cmp.optimized().history().iter().map(|r| r.arrivals).collect();
        let b: Vec<_> = cmp.baseline().history().iter().map(|r| r.arrivals).collect();
        assert_eq!(a, b);
        assert_eq!(cmp.optimized().policy_names().0, "optimized");
        assert_eq!(cmp.baseline().policy_names().0, "round-robin");
    }

    #[test]
    fn optimized_changes_color_less_often() {
        let mut cmp = Comparison::new(SimulationConfig::default().with_seed(2024)).unwrap();
        cmp.run(500).unwrap();
        let report = cmp.report();
        assert!(report.optimized.changeovers < report.baseline.changeovers);
        assert!(report.changeover_reduction > 0.0);
    }

    #[test]
    fn set_block_applies_to_both_sides() {
        let mut cmp = Comparison::new(SimulationConfig::default().with_seed(11)).unwrap();
        cmp.set_block(LineId(0), BlockKind::Input, true).unwrap();
        cmp.set_block(LineId(5), BlockKind::Output, true).unwrap();
        cmp.run(200).unwrap();

        for sim in [cmp.optimized(), cmp.baseline()] {
            let snapshot = sim.snapshot();
            assert!(snapshot.lines[0].input_blocked);
            assert!(snapshot.lines[0].colors.is_empty());
            assert!(snapshot.lines[5].output_blocked);
            assert!(sim.conveyor_sequence().iter().all(|e| e.line != LineId(5)));
        }
    }

    #[test]
    fn set_block_rejects_unknown_line() {
        let mut cmp = Comparison::new(SimulationConfig::default().with_seed(11)).unwrap();
        assert!(matches!(
            cmp.set_block(LineId(9), BlockKind::Input, true),
            Err(SimulationError::UnknownLine(_))
        ));
        assert!(cmp.optimized().snapshot().lines.iter().all(|l| !l.input_blocked));
        assert!(cmp.baseline().snapshot().lines.iter().all(|l| !l.input_blocked));
    }
}
