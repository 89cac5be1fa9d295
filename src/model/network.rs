// src/model/network.rs

use crate::model::buffer::{BlockKind, BufferLine, LineId};
use crate::model::color::Color;
use crate::model::vehicle::{Group, Vehicle};
use crate::simulation::config::GroupConfig;
use crate::simulation::error::SimulationError;
use serde::Serialize;
use std::collections::VecDeque;
use std::ops::Range;

/// Where a single placement request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlacementOutcome {
    /// Stored on a buffer line. `spilled` is set when a first-group body
    /// was forced onto a second-group line.
    Placed { line: LineId, spilled: bool },
    /// Parked in the temporary queue behind any earlier held bodies.
    PlacedTemporary,
    /// No legal destination; the body left the simulation.
    Overflow,
}

impl PlacementOutcome {
    pub fn line(&self) -> Option<LineId> {
        match self {
            PlacementOutcome::Placed { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn is_spill(&self) -> bool {
        matches!(self, PlacementOutcome::Placed { spilled: true, .. })
    }

    /// Short label used in logs and CSV output.
    pub fn label(&self) -> String {
        match self {
            PlacementOutcome::Placed { line, .. } => line.to_string(),
            PlacementOutcome::PlacedTemporary => "TMP".to_string(),
            PlacementOutcome::Overflow => "OVERFLOW".to_string(),
        }
    }
}

/// Result of one main-conveyor pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Extracted {
        line: LineId,
        vehicle: Vehicle,
        /// The color differs from the previously extracted one.
        changeover: bool,
    },
    Empty,
}

/// A body moved out of the temporary queue onto a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrainedVehicle {
    pub vehicle: Vehicle,
    pub line: LineId,
}

/// The nine-lane buffer between the ovens and the main conveyor.
///
/// Capacity and block checks live here and nowhere else: policies only
/// propose lines, and [`BufferNetwork::accept`] / [`BufferNetwork::release`]
/// refuse anything that would break a line's invariants.
#[derive(Debug, Clone)]
pub struct BufferNetwork {
    lines: Vec<BufferLine>,
    first_group_len: usize,
    temporary: VecDeque<Vehicle>,
    // Set by first-group spill placements; blocks the second group's own
    // entry so its arrivals queue in `temporary` instead.
    second_group_stopped: bool,
    last_color: Option<Color>,
}

impl BufferNetwork {
    pub fn new(first: GroupConfig, second: GroupConfig) -> Self {
        let mut lines = Vec::with_capacity(first.lines + second.lines);
        for i in 0..first.lines {
            lines.push(BufferLine::new(LineId(i), Group::First, first.capacity));
        }
        for i in 0..second.lines {
            lines.push(BufferLine::new(
                LineId(first.lines + i),
                Group::Second,
                second.capacity,
            ));
        }

        Self {
            lines,
            first_group_len: first.lines,
            temporary: VecDeque::new(),
            second_group_stopped: false,
            last_color: None,
        }
    }

    pub fn lines(&self) -> &[BufferLine] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&BufferLine> {
        self.lines.get(id.index())
    }

    pub fn group_range(&self, group: Group) -> Range<usize> {
        match group {
            Group::First => 0..self.first_group_len,
            Group::Second => self.first_group_len..self.lines.len(),
        }
    }

    pub fn group_lines(&self, group: Group) -> &[BufferLine] {
        &self.lines[self.group_range(group)]
    }

    pub fn temporary(&self) -> &VecDeque<Vehicle> {
        &self.temporary
    }

    pub fn second_group_stopped(&self) -> bool {
        self.second_group_stopped
    }

    pub fn last_color(&self) -> Option<Color> {
        self.last_color
    }

    /// Bodies currently stored on lines (the temporary queue excluded).
    pub fn occupancy(&self) -> usize {
        self.lines.iter().map(BufferLine::len).sum()
    }

    /// Authoritative placement check. Returns the vehicle if `id` is unknown,
    /// input-blocked or full.
    pub fn accept(&mut self, id: LineId, vehicle: Vehicle) -> Result<LineId, Vehicle> {
        match self.lines.get_mut(id.index()) {
            Some(line) => line.push(vehicle).map(|_| id),
            None => Err(vehicle),
        }
    }

    /// Authoritative extraction. Pulls the head of `id` onto the main conveyor
    /// and records whether the color changed.
    pub fn release(&mut self, id: LineId) -> ExtractionOutcome {
        let Some(line) = self.lines.get_mut(id.index()) else {
            return ExtractionOutcome::Empty;
        };
        let Some(vehicle) = line.pop() else {
            return ExtractionOutcome::Empty;
        };

        let changeover = matches!(self.last_color, Some(prev) if prev != vehicle.color);
        self.last_color = Some(vehicle.color);
        ExtractionOutcome::Extracted {
            line: id,
            vehicle,
            changeover,
        }
    }

    /// Toggles a block flag. Existing contents stay where they are.
    pub fn set_block(
        &mut self,
        id: LineId,
        kind: BlockKind,
        value: bool,
    ) -> Result<(), SimulationError> {
        let line = self
            .lines
            .get_mut(id.index())
            .ok_or_else(|| SimulationError::UnknownLine(id.to_string()))?;
        line.set_blocked(kind, value);
        Ok(())
    }

    /// Normally only driven by placement. Exposed for manual control.
    pub fn set_second_group_stopped(&mut self, value: bool) {
        self.second_group_stopped = value;
    }

    pub(crate) fn hold(&mut self, vehicle: Vehicle) {
        self.temporary.push_back(vehicle);
    }

    pub(crate) fn take_held(&mut self) -> Option<Vehicle> {
        self.temporary.pop_front()
    }

    pub(crate) fn return_held(&mut self, vehicle: Vehicle) {
        self.temporary.push_front(vehicle);
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            lines: self
                .lines
                .iter()
                .map(|line| LineSnapshot {
                    id: line.id(),
                    name: line.id().to_string(),
                    group: line.group(),
                    capacity: line.capacity(),
                    colors: line.colors(),
                    input_blocked: line.is_input_blocked(),
                    output_blocked: line.is_output_blocked(),
                })
                .collect(),
            temporary: self.temporary.iter().map(|v| v.color).collect(),
            last_color: self.last_color,
            second_group_stopped: self.second_group_stopped,
        }
    }
}

/// Read-only copy of one line, taken between cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSnapshot {
    pub id: LineId,
    pub name: String,
    pub group: Group,
    pub capacity: usize,
    /// Head first.
    pub colors: Vec<Color>,
    pub input_blocked: bool,
    pub output_blocked: bool,
}

/// Owned view of the whole network. Never aliases live state, so a reader
/// can hold it while the driver keeps stepping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub lines: Vec<LineSnapshot>,
    pub temporary: Vec<Color>,
    pub last_color: Option<Color>,
    pub second_group_stopped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> BufferNetwork {
        BufferNetwork::new(
            GroupConfig {
                lines: 4,
                capacity: 14,
            },
            GroupConfig {
                lines: 5,
                capacity: 16,
            },
        )
    }

    #[test]
    fn layout_matches_group_sizes() {
        let net = network();
        assert_eq!(net.lines().len(), 9);
        assert_eq!(net.group_lines(Group::First).len(), 4);
        assert_eq!(net.group_lines(Group::Second)[0].id(), LineId(4));
        assert!(net.group_lines(Group::Second).iter().all(|l| l.capacity() == 16));
    }

    #[test]
    fn accept_rejects_blocked_line() {
        let mut net = network();
        net.set_block(LineId(1), BlockKind::Input, true).unwrap();
        let v = Vehicle::new(1, Color::C1, Group::First);
        assert!(net.accept(LineId(1), v).is_err());
        assert_eq!(net.accept(LineId(2), v), Ok(LineId(2)));
    }

    #[test]
    fn unknown_line_is_an_error() {
        let mut net = network();
        let err = net.set_block(LineId(42), BlockKind::Output, true).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownLine(_)));
    }

    #[test]
    fn release_tracks_changeovers() {
        let mut net = network();
        for (seq, color) in [(1, Color::C1), (2, Color::C1), (3, Color::C2)] {
            net.accept(LineId(0), Vehicle::new(seq, color, Group::First))
                .unwrap();
        }
        let flags: Vec<bool> = (0..3)
            .map(|_| match net.release(LineId(0)) {
                ExtractionOutcome::Extracted { changeover, .. } => changeover,
                ExtractionOutcome::Empty => panic!("line drained early"),
            })
            .collect();
        assert_eq!(flags, vec![false, false, true]);
        assert_eq!(net.last_color(), Some(Color::C2));
        assert_eq!(net.release(LineId(0)), ExtractionOutcome::Empty);
    }

    #[test]
    fn snapshot_is_detached_from_live_state() {
        let mut net = network();
        net.accept(LineId(4), Vehicle::new(1, Color::C9, Group::Second))
            .unwrap();
        let snap = net.snapshot();
        net.release(LineId(4));
        assert_eq!(snap.lines[4].colors, vec![Color::C9]);
        assert!(net.line(LineId(4)).unwrap().is_empty());
    }
}
