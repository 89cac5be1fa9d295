// src/strategy/traits.rs

use crate::model::buffer::LineId;
use crate::model::network::{BufferNetwork, DrainedVehicle, ExtractionOutcome, PlacementOutcome};
use crate::model::vehicle::{Group, Vehicle};
use std::fmt::Debug;

/// Decides which buffer line receives a body coming out of an oven.
///
/// Implementations only propose lines; every proposal goes through
/// [`BufferNetwork::accept`], which has the final say on capacity and blocking.
pub trait PlacementPolicy: Debug + Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Places one body from `vehicle.source`.
    ///
    /// # Arguments
    /// * `network` - The shared buffer state. May be mutated (contents, the
    ///   temporary queue, and the second-group stop flag).
    /// * `vehicle` - The freshly generated body.
    fn place(&mut self, network: &mut BufferNetwork, vehicle: Vehicle) -> PlacementOutcome;

    /// Tries to store `vehicle` on one of `group`'s lines, ignoring the
    /// temporary queue. Hands the vehicle back if no line takes it.
    fn place_in_group(
        &mut self,
        network: &mut BufferNetwork,
        group: Group,
        vehicle: Vehicle,
    ) -> Result<LineId, Vehicle>;

    /// Moves up to `limit` held bodies, oldest first, from the temporary queue
    /// onto second-group lines. Stops early while the second group is stopped
    /// or when the head of the queue cannot be placed (it stays at the head).
    fn drain(&mut self, network: &mut BufferNetwork, limit: usize) -> Vec<DrainedVehicle> {
        let mut drained = Vec::new();
        while drained.len() < limit && !network.second_group_stopped() {
            let Some(vehicle) = network.take_held() else {
                break;
            };
            match self.place_in_group(network, Group::Second, vehicle) {
                Ok(line) => drained.push(DrainedVehicle { vehicle, line }),
                Err(vehicle) => {
                    network.return_held(vehicle);
                    break;
                }
            }
        }
        drained
    }
}

/// Decides which buffer line feeds the main conveyor this cycle.
pub trait ExtractionPolicy: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Proposes a line to drain, or `None` when nothing is eligible.
    fn select(&mut self, network: &BufferNetwork) -> Option<LineId>;

    /// Selects and pulls one body. The network rejects a proposal that is
    /// empty or output-blocked, which shows up as [`ExtractionOutcome::Empty`].
    fn extract(&mut self, network: &mut BufferNetwork) -> ExtractionOutcome {
        match self.select(network) {
            Some(line) => network.release(line),
            None => ExtractionOutcome::Empty,
        }
    }
}
