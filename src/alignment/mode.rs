//! Per-algorithm boundary conditions, cell rules, optimum eligibility, and
//! traceback termination, dispatched exhaustively over a closed enum.

use super::matrix::Direction;
use super::scoring::GapModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignmentMode {
    /// Needleman-Wunsch: end-to-end alignment of both sequences.
    Global,
    /// Smith-Waterman: best-scoring subsequence pair.
    Local,
    /// Pairwise overlap: one sequence overlaps the end of the other, with
    /// free leading and trailing overhangs.
    Overlap,
}

impl AlignmentMode {
    /// Score charged to the k-th cell of row 0 / column 0.
    pub fn boundary_score(self, k: usize, gaps: &GapModel) -> i32 {
        if k == 0 {
            return 0;
        }
        match self {
            AlignmentMode::Global => match *gaps {
                GapModel::Linear { open } => open * k as i32,
                GapModel::Affine { open, extend } => open + extend * (k as i32 - 1),
            },
            AlignmentMode::Local | AlignmentMode::Overlap => 0,
        }
    }

    /// Source recorded along row 0 (k > 0). Local alignments cannot extend
    /// through the boundary, so it is a wall of `Stop` cells.
    pub fn boundary_row_direction(self) -> Direction {
        match self {
            AlignmentMode::Global | AlignmentMode::Overlap => Direction::Left,
            AlignmentMode::Local => Direction::Stop,
        }
    }

    /// Source recorded down column 0 (k > 0).
    pub fn boundary_col_direction(self) -> Direction {
        match self {
            AlignmentMode::Global | AlignmentMode::Overlap => Direction::Up,
            AlignmentMode::Local => Direction::Stop,
        }
    }

    /// Per-cell admission rule applied to the recurrence optimum. Local
    /// alignment clamps non-positive scores to zero and severs the path, so
    /// every zero-score cell is a `Stop` cell.
    #[inline]
    pub fn admit(self, score: i32, direction: Direction) -> (i32, Direction) {
        match self {
            AlignmentMode::Local if score <= 0 => (0, Direction::Stop),
            _ => (score, direction),
        }
    }

    /// Whether cell `(row, col)` of a `(first_len+1) x (second_len+1)`
    /// matrix may hold the optimum under this mode.
    #[inline]
    pub fn eligible(self, row: usize, col: usize, first_len: usize, second_len: usize) -> bool {
        match self {
            AlignmentMode::Global => row == first_len && col == second_len,
            AlignmentMode::Local => row > 0 && col > 0,
            AlignmentMode::Overlap => row == first_len || col == second_len,
        }
    }

    /// Scores at or below this floor are never tracked as optima.
    #[inline]
    pub fn score_floor(self) -> i32 {
        match self {
            AlignmentMode::Local => 0,
            AlignmentMode::Global | AlignmentMode::Overlap => super::matrix::NEG_INF,
        }
    }

    /// Traceback termination test, evaluated before following the source.
    #[inline]
    pub fn traceback_done(self, row: usize, col: usize, direction: Direction) -> bool {
        match self {
            AlignmentMode::Global => row == 0 && col == 0,
            AlignmentMode::Local => direction == Direction::Stop,
            AlignmentMode::Overlap => row == 0 || col == 0,
        }
    }
}
