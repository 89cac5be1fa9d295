// src/model/buffer.rs

use crate::model::color::Color;
use crate::model::vehicle::{Group, Vehicle};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Stable index of a buffer line inside the network. Displayed one-based as `L1..Ln`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LineId(pub usize);

impl LineId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Parses a `L<n>` label back into an id.
    pub fn parse(label: &str) -> Option<LineId> {
        let digits = label.strip_prefix('L').or_else(|| label.strip_prefix('l'))?;
        let n: usize = digits.parse().ok()?;
        n.checked_sub(1).map(LineId)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0 + 1)
    }
}

/// Which side of a line a block flag applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    Input,
    Output,
}

/// A bounded FIFO lane: bodies enter at the tail and leave from the head.
#[derive(Debug, Clone)]
pub struct BufferLine {
    id: LineId,
    group: Group,
    capacity: usize,
    queue: VecDeque<Vehicle>,
    input_blocked: bool,
    output_blocked: bool,
}

impl BufferLine {
    pub fn new(id: LineId, group: Group, capacity: usize) -> Self {
        Self {
            id,
            group,
            capacity,
            queue: VecDeque::with_capacity(capacity),
            input_blocked: false,
            output_blocked: false,
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.queue.len())
    }

    pub fn is_input_blocked(&self) -> bool {
        self.input_blocked
    }

    pub fn is_output_blocked(&self) -> bool {
        self.output_blocked
    }

    pub fn set_blocked(&mut self, kind: BlockKind, value: bool) {
        match kind {
            BlockKind::Input => self.input_blocked = value,
            BlockKind::Output => self.output_blocked = value,
        }
    }

    /// True when a placement onto this line would be legal right now.
    pub fn accepts(&self) -> bool {
        !self.input_blocked && !self.is_full()
    }

    /// True when this line may be drained by the main conveyor right now.
    pub fn can_release(&self) -> bool {
        !self.output_blocked && !self.queue.is_empty()
    }

    /// Appends `vehicle` at the tail, handing it back if the line refuses it.
    pub fn push(&mut self, vehicle: Vehicle) -> Result<(), Vehicle> {
        if !self.accepts() {
            return Err(vehicle);
        }
        self.queue.push_back(vehicle);
        Ok(())
    }

    /// Removes the head vehicle unless the output side is blocked.
    pub fn pop(&mut self) -> Option<Vehicle> {
        if self.output_blocked {
            return None;
        }
        self.queue.pop_front()
    }

    pub fn head_color(&self) -> Option<Color> {
        self.queue.front().map(|v| v.color)
    }

    pub fn tail_color(&self) -> Option<Color> {
        self.queue.back().map(|v| v.color)
    }

    pub fn vehicles(&self) -> impl DoubleEndedIterator<Item = &Vehicle> + '_ {
        self.queue.iter()
    }

    pub fn colors(&self) -> Vec<Color> {
        self.queue.iter().map(|v| v.color).collect()
    }

    /// Fill level in percent of capacity.
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.queue.len() as f64 / self.capacity as f64 * 100.0
    }
}
