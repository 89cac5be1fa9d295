// src/io/reporting.rs

use crate::simulation::engine::CycleRecord;
use crate::simulation::metrics::{LineUtilization, MetricsReport};
use serde::Serialize;
use std::error::Error;
use std::path::Path;

/// Flat, CSV-friendly view of a [`CycleRecord`].
#[derive(Debug, Clone, Serialize)]
pub struct CycleRow {
    pub cycle: u64,
    pub o1_color: String,
    pub o1_destination: String,
    pub o2_color: String,
    pub o2_destination: String,
    pub drained: usize,
    pub conveyor_color: String,
    pub conveyor_line: String,
    pub vehicle_id: Option<u64>,
    pub changeover: bool,
    pub spill: bool,
    pub overflows: usize,
    pub penalty_time: f64,
    pub temporary_len: usize,
}

impl From<&CycleRecord> for CycleRow {
    fn from(record: &CycleRecord) -> Self {
        let (o1_color, o1_destination) = match &record.first {
            Some(p) => (p.vehicle.color.to_string(), p.outcome.label()),
            None => (String::new(), String::new()),
        };
        let (o2_color, o2_destination) = match &record.second {
            Some(p) => (p.vehicle.color.to_string(), p.outcome.label()),
            None => (String::new(), String::new()),
        };
        let (conveyor_color, conveyor_line, vehicle_id, changeover) = match &record.extraction {
            Some(e) => (
                e.vehicle.color.to_string(),
                e.line.to_string(),
                Some(e.vehicle.sequence),
                e.changeover,
            ),
            None => (String::new(), String::new(), None, false),
        };

        Self {
            cycle: record.cycle,
            o1_color,
            o1_destination,
            o2_color,
            o2_destination,
            drained: record.drained.len(),
            conveyor_color,
            conveyor_line,
            vehicle_id,
            changeover,
            spill: record.placements().any(|p| p.outcome.is_spill()),
            overflows: record.overflows(),
            penalty_time: record.penalty_time,
            temporary_len: record.temporary_len,
        }
    }
}

/// Writes the simulation history to a CSV file.
///
/// # Arguments
/// * `file_path` - The path to save the file (e.g., "results/optimized.csv").
/// * `history` - The completed cycles, oldest first.
pub fn write_cycle_log(file_path: &str, history: &[CycleRecord]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(Path::new(file_path))?;
    for record in history {
        wtr.serialize(CycleRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes per-line utilization from a metrics report.
pub fn write_utilization(file_path: &str, report: &MetricsReport) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(Path::new(file_path))?;
    for line in &report.line_utilization {
        wtr.serialize(UtilizationRow::from(line))?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
struct UtilizationRow {
    line: String,
    filled: usize,
    capacity: usize,
    percent: f64,
}

impl From<&LineUtilization> for UtilizationRow {
    fn from(u: &LineUtilization) -> Self {
        Self {
            line: u.name.clone(),
            filled: u.filled,
            capacity: u.capacity,
            percent: u.percent,
        }
    }
}
