// src/strategy/scoring.rs

//! Line-level measures shared by the color-aware policies.
//!
//! These are pure functions over a [`BufferLine`]; none of them mutate state,
//! so both the placement and the extraction side can score the same network.

use crate::model::buffer::BufferLine;
use crate::model::color::Color;

/// Head-run: consecutive bodies of the head color, counted from the front.
///
/// An empty line has a head-run of 0.
pub fn head_run(line: &BufferLine) -> usize {
    let Some(head) = line.head_color() else {
        return 0;
    };
    line.vehicles().take_while(|v| v.color == head).count()
}

/// Tail-run: consecutive bodies of the tail color, counted from the back.
///
/// A short tail-run means appending a different color breaks little.
pub fn tail_run(line: &BufferLine) -> usize {
    let Some(tail) = line.tail_color() else {
        return 0;
    };
    line.vehicles()
        .rev()
        .take_while(|v| v.color == tail)
        .count()
}

/// A pure-color line holds at least one body and every body has `color`.
pub fn is_pure(line: &BufferLine, color: Color) -> bool {
    !line.is_empty() && line.vehicles().all(|v| v.color == color)
}

/// Aggregate fill ratio of a set of lines, in `0.0..=1.0`.
///
/// Input-blocked lines count as full: they cannot absorb any more traffic,
/// which is what the ratio is meant to signal.
pub fn fill_ratio(lines: &[BufferLine]) -> f64 {
    let capacity: usize = lines.iter().map(BufferLine::capacity).sum();
    if capacity == 0 {
        return 1.0;
    }
    let filled: usize = lines
        .iter()
        .map(|line| {
            if line.is_input_blocked() {
                line.capacity()
            } else {
                line.len()
            }
        })
        .sum();
    filled as f64 / capacity as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::buffer::{BlockKind, LineId};
    use crate::model::vehicle::{Group, Vehicle};

    fn line_with(colors: &[Color]) -> BufferLine {
        let mut line = BufferLine::new(LineId(0), Group::First, 14);
        for (i, &c) in colors.iter().enumerate() {
            line.push(Vehicle::new(i as u64, c, Group::First)).unwrap();
        }
        line
    }

    #[test]
    fn runs_on_empty_line_are_zero() {
        let line = line_with(&[]);
        assert_eq!(head_run(&line), 0);
        assert_eq!(tail_run(&line), 0);
        assert!(!is_pure(&line, Color::C1));
    }

    #[test]
    fn head_and_tail_runs() {
        use Color::*;
        let line = line_with(&[C1, C1, C1, C2, C3, C3]);
        assert_eq!(head_run(&line), 3);
        assert_eq!(tail_run(&line), 2);
        assert!(!is_pure(&line, C1));
    }

    #[test]
    fn pure_line_detection() {
        let line = line_with(&[Color::C4; 5]);
        assert!(is_pure(&line, Color::C4));
        assert!(!is_pure(&line, Color::C5));
        assert_eq!(head_run(&line), 5);
    }

    #[test]
    fn blocked_lines_count_as_full() {
        let a = line_with(&[Color::C1; 7]);
        let mut b = line_with(&[]);
        assert!((fill_ratio(&[a.clone(), b.clone()]) - 0.25).abs() < 1e-12);
        b.set_blocked(BlockKind::Input, true);
        assert!((fill_ratio(&[a, b]) - 0.75).abs() < 1e-12);
    }
}
