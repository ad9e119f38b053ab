//! Backward walk through recorded source directions.

use super::matrix::{Direction, DirectionMatrix};
use super::mode::AlignmentMode;
use crate::sequence::{Sequence, GAP};
use crate::{AlignError, Result};

/// Raw output of one traceback walk. Buffers are collected in reverse and
/// flipped by the result assembler.
#[derive(Debug)]
pub(crate) struct Walk {
    pub first_rev: Vec<u8>,
    pub second_rev: Vec<u8>,
    /// Cell the walk started from: end coordinates of the aligned window.
    pub end: (usize, usize),
    /// Cell the walk terminated at: start coordinates of the aligned window.
    pub start: (usize, usize),
}

impl Walk {
    pub fn empty() -> Self {
        Self {
            first_rev: Vec::new(),
            second_rev: Vec::new(),
            end: (0, 0),
            start: (0, 0),
        }
    }
}

/// Walk source codes from `from` back to the mode's terminal condition,
/// consuming one symbol (or a gap) per step.
pub(crate) fn walk(
    dirs: &DirectionMatrix,
    first: &Sequence,
    second: &Sequence,
    mode: AlignmentMode,
    from: (usize, usize),
) -> Result<Walk> {
    let (mut row, mut col) = from;
    let mut first_rev = Vec::new();
    let mut second_rev = Vec::new();

    loop {
        let direction = dirs.get(row, col).ok_or_else(|| {
            AlignError::InternalConsistency(format!(
                "traceback read an unset source code at cell ({}, {})",
                row, col
            ))
        })?;

        if mode.traceback_done(row, col, direction) {
            break;
        }

        match direction {
            Direction::Diagonal => {
                first_rev.push(first.symbol(row - 1));
                second_rev.push(second.symbol(col - 1));
                row -= 1;
                col -= 1;
            }
            Direction::Up => {
                first_rev.push(first.symbol(row - 1));
                second_rev.push(GAP);
                row -= 1;
            }
            Direction::Left => {
                first_rev.push(GAP);
                second_rev.push(second.symbol(col - 1));
                col -= 1;
            }
            Direction::Stop | Direction::Invalid => {
                // A Stop outside the mode's terminal condition means the
                // fill never produced a coherent path to this cell.
                return Err(AlignError::InternalConsistency(format!(
                    "traceback hit {:?} at cell ({}, {}) before termination",
                    direction, row, col
                )));
            }
        }
    }

    Ok(Walk {
        first_rev,
        second_rev,
        end: from,
        start: (row, col),
    })
}
