// src/model/vehicle.rs

use crate::model::color::Color;
use serde::Serialize;
use std::fmt;

/// The two ownership groups of buffer lines, each fed by its own oven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Group {
    /// The smaller group (four lines in the plant layout).
    First,
    /// The larger group (five lines); owns the temporary queue.
    Second,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::First => write!(f, "O1"),
            Group::Second => write!(f, "O2"),
        }
    }
}

/// A painted body travelling through the buffer network.
///
/// Only `color` matters to the scheduling decisions. `sequence` is the
/// body id handed out at generation time and is kept for traceability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub sequence: u64,
    pub color: Color,
    pub source: Group,
}

impl Vehicle {
    pub fn new(sequence: u64, color: Color, source: Group) -> Self {
        Self {
            sequence,
            color,
            source,
        }
    }
}
