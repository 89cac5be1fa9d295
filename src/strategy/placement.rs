// src/strategy/placement.rs

use crate::model::buffer::{BufferLine, LineId};
use crate::model::color::Color;
use crate::model::network::{BufferNetwork, PlacementOutcome};
use crate::model::vehicle::{Group, Vehicle};
use crate::strategy::scoring::{is_pure, tail_run};
use crate::strategy::traits::PlacementPolicy;
use log::{debug, warn};
use std::cmp::Reverse;

/// Offers `vehicle` to each candidate in order until the network accepts it.
fn try_lines(
    network: &mut BufferNetwork,
    candidates: &[LineId],
    vehicle: Vehicle,
) -> Result<LineId, Vehicle> {
    let mut vehicle = vehicle;
    for &id in candidates {
        match network.accept(id, vehicle) {
            Ok(line) => return Ok(line),
            Err(rejected) => vehicle = rejected,
        }
    }
    Err(vehicle)
}

fn log_overflow(vehicle: &Vehicle) {
    warn!(
        "Overflow: {} body #{} ({}) has no line that accepts it, dropping",
        vehicle.source, vehicle.sequence, vehicle.color
    );
}

// =========================================================================
// 1. Optimized Placement (color-aware)
// =========================================================================

/// Color-aware placement.
///
/// For a body of color `c` the candidate tiers, best first, are:
/// 1. pure-`c` lines with room, tightest first (fewest free slots), then by index;
/// 2. empty lines, by index;
/// 3. the least harmful open line: shortest tail-run, most free slots, index.
///
/// First-group bodies try tiers 1-2 on their own lines, then tiers 1-2 on the
/// second group (a spill), then tier 3 on their own lines, then tier 3 on the
/// second group (a spill). A spill stops the second group's own entry.
///
/// Second-group bodies go straight to the temporary queue while the group is
/// stopped or earlier bodies are still held, so arrival order is preserved.
#[derive(Debug, Clone, Default)]
pub struct OptimizedPlacement;

impl OptimizedPlacement {
    pub fn new() -> Self {
        Self
    }

    fn preferred(network: &BufferNetwork, group: Group, color: Color) -> Vec<LineId> {
        let lines = network.group_lines(group);

        let mut pure: Vec<&BufferLine> = lines
            .iter()
            .filter(|line| line.accepts() && is_pure(line, color))
            .collect();
        pure.sort_by_key(|line| (line.remaining(), line.id()));

        let empty = lines
            .iter()
            .filter(|line| line.accepts() && line.is_empty());

        pure.iter()
            .map(|line| line.id())
            .chain(empty.map(BufferLine::id))
            .collect()
    }

    fn least_harmful(network: &BufferNetwork, group: Group) -> Vec<LineId> {
        let mut open: Vec<&BufferLine> = network
            .group_lines(group)
            .iter()
            .filter(|line| line.accepts())
            .collect();
        open.sort_by_key(|line| (tail_run(line), Reverse(line.remaining()), line.id()));
        open.iter().map(|line| line.id()).collect()
    }

    fn place_first(&mut self, network: &mut BufferNetwork, vehicle: Vehicle) -> PlacementOutcome {
        // The flag reflects this cycle's spill only.
        network.set_second_group_stopped(false);

        let color = vehicle.color;
        let tiers = [
            (Group::First, Self::preferred(network, Group::First, color)),
            (Group::Second, Self::preferred(network, Group::Second, color)),
            (Group::First, Self::least_harmful(network, Group::First)),
            (Group::Second, Self::least_harmful(network, Group::Second)),
        ];

        let mut vehicle = vehicle;
        for (group, candidates) in tiers.iter() {
            match try_lines(network, candidates, vehicle) {
                Ok(line) => {
                    let spilled = *group == Group::Second;
                    if spilled {
                        network.set_second_group_stopped(true);
                        debug!(
                            "O1 body #{} ({}) spilled onto {}; O2 entry stopped",
                            vehicle.sequence, color, line
                        );
                    }
                    return PlacementOutcome::Placed { line, spilled };
                }
                Err(rejected) => vehicle = rejected,
            }
        }

        log_overflow(&vehicle);
        PlacementOutcome::Overflow
    }

    fn place_second(&mut self, network: &mut BufferNetwork, vehicle: Vehicle) -> PlacementOutcome {
        if network.second_group_stopped() || !network.temporary().is_empty() {
            network.hold(vehicle);
            return PlacementOutcome::PlacedTemporary;
        }

        match self.place_in_group(network, Group::Second, vehicle) {
            Ok(line) => PlacementOutcome::Placed {
                line,
                spilled: false,
            },
            Err(vehicle) => {
                log_overflow(&vehicle);
                PlacementOutcome::Overflow
            }
        }
    }
}

impl PlacementPolicy for OptimizedPlacement {
    fn name(&self) -> &'static str {
        "optimized"
    }

    fn place(&mut self, network: &mut BufferNetwork, vehicle: Vehicle) -> PlacementOutcome {
        match vehicle.source {
            Group::First => self.place_first(network, vehicle),
            Group::Second => self.place_second(network, vehicle),
        }
    }

    fn place_in_group(
        &mut self,
        network: &mut BufferNetwork,
        group: Group,
        vehicle: Vehicle,
    ) -> Result<LineId, Vehicle> {
        let preferred = Self::preferred(network, group, vehicle.color);
        let vehicle = match try_lines(network, &preferred, vehicle) {
            Ok(line) => return Ok(line),
            Err(rejected) => rejected,
        };
        let fallback = Self::least_harmful(network, group);
        try_lines(network, &fallback, vehicle)
    }
}

// =========================================================================
// 2. Round-Robin Placement (baseline)
// =========================================================================

/// Color-blind baseline. Each group keeps a rotation cursor and bodies go to
/// the next line after the cursor that accepts them.
///
/// Never spills into the other group. A first-group body with no open line
/// overflows; a second-group body with no open line waits in the temporary
/// queue.
#[derive(Debug, Clone, Default)]
pub struct RoundRobinPlacement {
    first_cursor: usize,
    second_cursor: usize,
}

impl RoundRobinPlacement {
    pub fn new() -> Self {
        Self::default()
    }

    fn cursor_mut(&mut self, group: Group) -> &mut usize {
        match group {
            Group::First => &mut self.first_cursor,
            Group::Second => &mut self.second_cursor,
        }
    }
}

impl PlacementPolicy for RoundRobinPlacement {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn place(&mut self, network: &mut BufferNetwork, vehicle: Vehicle) -> PlacementOutcome {
        match vehicle.source {
            Group::First => match self.place_in_group(network, Group::First, vehicle) {
                Ok(line) => PlacementOutcome::Placed {
                    line,
                    spilled: false,
                },
                Err(vehicle) => {
                    log_overflow(&vehicle);
                    PlacementOutcome::Overflow
                }
            },
            Group::Second => {
                if !network.temporary().is_empty() {
                    network.hold(vehicle);
                    return PlacementOutcome::PlacedTemporary;
                }
                match self.place_in_group(network, Group::Second, vehicle) {
                    Ok(line) => PlacementOutcome::Placed {
                        line,
                        spilled: false,
                    },
                    Err(vehicle) => {
                        network.hold(vehicle);
                        PlacementOutcome::PlacedTemporary
                    }
                }
            }
        }
    }

    fn place_in_group(
        &mut self,
        network: &mut BufferNetwork,
        group: Group,
        vehicle: Vehicle,
    ) -> Result<LineId, Vehicle> {
        let range = network.group_range(group);
        let size = range.len();
        if size == 0 {
            return Err(vehicle);
        }

        let start = *self.cursor_mut(group) % size;
        let mut vehicle = vehicle;
        for offset in 0..size {
            let pos = (start + offset) % size;
            let id = LineId(range.start + pos);
            match network.accept(id, vehicle) {
                Ok(line) => {
                    *self.cursor_mut(group) = (pos + 1) % size;
                    return Ok(line);
                }
                Err(rejected) => vehicle = rejected,
            }
        }
        Err(vehicle)
    }
}
