// src/simulation/metrics.rs

use crate::model::buffer::LineId;
use crate::model::color::Color;
use crate::model::network::{BufferNetwork, PlacementOutcome};
use crate::simulation::engine::CycleRecord;
use serde::Serialize;

/// Seconds in an hour, for jobs-per-hour.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Jobs per hour: extracted bodies over effective conveyor time.
///
/// Effective time = `extracted * processing_time + penalty_time`.
/// Returns 0 when no time has elapsed.
pub fn jobs_per_hour(extracted: u64, processing_time: f64, penalty_time: f64) -> f64 {
    let effective = extracted as f64 * processing_time + penalty_time;
    if effective > 0.0 {
        extracted as f64 / effective * SECONDS_PER_HOUR
    } else {
        0.0
    }
}

/// One body leaving on the main conveyor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConveyorEntry {
    pub sequence: u64,
    pub color: Color,
    pub line: LineId,
    pub changeover: bool,
}

/// Running totals, updated as events happen (not only at cycle end).
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub generated: u64,
    /// Bodies stored directly on a line by a placement request.
    pub placed: u64,
    /// Bodies pushed into the temporary queue.
    pub held: u64,
    /// Bodies moved from the temporary queue onto a line.
    pub drained: u64,
    pub overflows: u64,
    pub extracted: u64,
    pub changeovers: u64,
    /// First-group spills onto second-group lines.
    pub violations: u64,
    pub spill_penalty_time: f64,
    pub changeover_penalty_time: f64,
    generated_by_color: [u64; Color::COUNT],
    extracted_by_color: [u64; Color::COUNT],
    utilization_sum: f64,
    utilization_samples: u64,
    sequence: Vec<ConveyorEntry>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_generated(&mut self, color: Color) {
        self.generated += 1;
        self.generated_by_color[color.index()] += 1;
    }

    pub fn record_placement(&mut self, outcome: &PlacementOutcome, spill_penalty: f64) {
        match outcome {
            PlacementOutcome::Placed { spilled, .. } => {
                self.placed += 1;
                if *spilled {
                    self.violations += 1;
                    self.spill_penalty_time += spill_penalty;
                }
            }
            PlacementOutcome::PlacedTemporary => self.held += 1,
            PlacementOutcome::Overflow => self.overflows += 1,
        }
    }

    pub fn record_drained(&mut self, count: usize) {
        self.drained += count as u64;
    }

    pub fn record_extraction(&mut self, entry: ConveyorEntry, changeover_penalty: f64) {
        self.extracted += 1;
        self.extracted_by_color[entry.color.index()] += 1;
        if entry.changeover {
            self.changeovers += 1;
            self.changeover_penalty_time += changeover_penalty;
        }
        self.sequence.push(entry);
    }

    /// Samples mean line utilization; called once per completed cycle.
    pub fn sample_utilization(&mut self, network: &BufferNetwork) {
        self.utilization_sum += mean_utilization(network);
        self.utilization_samples += 1;
    }

    pub fn penalty_time(&self) -> f64 {
        self.spill_penalty_time + self.changeover_penalty_time
    }

    /// Bodies that reached a line, directly or via the temporary queue.
    pub fn on_lines(&self) -> u64 {
        self.placed + self.drained
    }

    /// Bodies currently held in the temporary queue, by the counters.
    pub fn in_temporary(&self) -> u64 {
        self.held.saturating_sub(self.drained)
    }

    /// The main-conveyor sequence, oldest first.
    pub fn sequence(&self) -> &[ConveyorEntry] {
        &self.sequence
    }

    pub fn report(&self, network: &BufferNetwork, processing_time: f64, cycles: u64) -> MetricsReport {
        let base = self.extracted as f64 * processing_time;
        let penalty = self.penalty_time();

        let changeover_rate = if self.extracted > 0 {
            self.changeovers as f64 / self.extracted as f64 * 100.0
        } else {
            0.0
        };
        let avg_between_changeovers = if self.changeovers > 0 {
            self.extracted as f64 / self.changeovers as f64
        } else {
            self.extracted as f64
        };
        let mean_cycle_utilization = if self.utilization_samples > 0 {
            self.utilization_sum / self.utilization_samples as f64
        } else {
            0.0
        };

        MetricsReport {
            cycles,
            generated: self.generated,
            placed: self.on_lines(),
            held: network.temporary().len() as u64,
            drained: self.drained,
            overflows: self.overflows,
            extracted: self.extracted,
            changeovers: self.changeovers,
            violations: self.violations,
            jph: jobs_per_hour(self.extracted, processing_time, penalty),
            changeover_rate,
            avg_between_changeovers,
            time: TimeBreakdown {
                base_processing: base,
                penalty,
                effective: base + penalty,
            },
            line_utilization: line_utilization(network),
            average_utilization: mean_utilization(network),
            mean_cycle_utilization,
            generated_by_color: by_color(&self.generated_by_color),
            extracted_by_color: by_color(&self.extracted_by_color),
        }
    }
}

fn by_color(counts: &[u64; Color::COUNT]) -> Vec<(Color, u64)> {
    Color::ALL
        .iter()
        .map(|&c| (c, counts[c.index()]))
        .collect()
}

fn mean_utilization(network: &BufferNetwork) -> f64 {
    let lines = network.lines();
    if lines.is_empty() {
        return 0.0;
    }
    lines.iter().map(|l| l.utilization()).sum::<f64>() / lines.len() as f64
}

fn line_utilization(network: &BufferNetwork) -> Vec<LineUtilization> {
    network
        .lines()
        .iter()
        .map(|line| LineUtilization {
            line: line.id(),
            name: line.id().to_string(),
            filled: line.len(),
            capacity: line.capacity(),
            percent: line.utilization(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineUtilization {
    pub line: LineId,
    pub name: String,
    pub filled: usize,
    pub capacity: usize,
    pub percent: f64,
}

/// Seconds of conveyor time, split by cause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeBreakdown {
    pub base_processing: f64,
    pub penalty: f64,
    pub effective: f64,
}

/// Cumulative aggregates handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub cycles: u64,
    pub generated: u64,
    /// Bodies that reached a line, including drained ones.
    pub placed: u64,
    /// Bodies in the temporary queue right now.
    pub held: u64,
    pub drained: u64,
    pub overflows: u64,
    pub extracted: u64,
    pub changeovers: u64,
    pub violations: u64,
    pub jph: f64,
    /// Changeovers per hundred extracted bodies.
    pub changeover_rate: f64,
    pub avg_between_changeovers: f64,
    pub time: TimeBreakdown,
    pub line_utilization: Vec<LineUtilization>,
    /// Mean fill of all lines right now, in percent.
    pub average_utilization: f64,
    /// Mean fill of all lines averaged over completed cycles, in percent.
    pub mean_cycle_utilization: f64,
    pub generated_by_color: Vec<(Color, u64)>,
    pub extracted_by_color: Vec<(Color, u64)>,
}

/// Aggregates over the most recent completed cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowReport {
    pub cycles: usize,
    pub extracted: u64,
    pub changeovers: u64,
    pub violations: u64,
    pub overflows: u64,
    pub penalty_time: f64,
    pub jph: f64,
}

impl WindowReport {
    /// Folds the last `window` records (all of them if fewer exist).
    pub fn from_history(history: &[CycleRecord], window: usize, processing_time: f64) -> Self {
        let start = history.len().saturating_sub(window);
        let recent = &history[start..];

        let mut report = WindowReport {
            cycles: recent.len(),
            extracted: 0,
            changeovers: 0,
            violations: 0,
            overflows: 0,
            penalty_time: 0.0,
            jph: 0.0,
        };
        for record in recent {
            if let Some(extraction) = &record.extraction {
                report.extracted += 1;
                if extraction.changeover {
                    report.changeovers += 1;
                }
            }
            for placement in record.placements() {
                match placement.outcome {
                    PlacementOutcome::Placed { spilled: true, .. } => report.violations += 1,
                    PlacementOutcome::Overflow => report.overflows += 1,
                    _ => {}
                }
            }
            report.penalty_time += record.penalty_time;
        }
        report.jph = jobs_per_hour(report.extracted, processing_time, report.penalty_time);
        report
    }
}
