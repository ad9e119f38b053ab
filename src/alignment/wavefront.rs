//! Tiled anti-diagonal block-parallel fill.
//!
//! The interior of the DP matrix is partitioned into a tile grid sized from
//! the core count. Tiles on the same anti-diagonal wave have no data
//! dependency on each other: each tile depends only on tiles strictly above,
//! left, or diagonal of it, all finalized in earlier waves. Every wave is a
//! structured fork-join on the rayon pool; tile inputs are snapshotted
//! before the fork and outputs written back after the join, so no cell is
//! ever written by two tasks.
//!
//! This mode materializes full score grids (no rolling-row optimization),
//! trading memory for parallelism.

use super::engine::{choose, FillContext};
use super::matrix::{Direction, ScoreGrid, NEG_INF};
use super::mode::AlignmentMode;
use super::scoring::{GapModel, ScoringMatrix};
use crate::sequence::Sequence;
use rayon::prelude::*;

pub(crate) fn fill<S: ScoringMatrix + ?Sized>(
    first: &Sequence,
    second: &Sequence,
    scoring: &S,
    gaps: &GapModel,
    mode: AlignmentMode,
    tiles: Option<usize>,
) -> FillContext {
    let grid = TileGrid::new(first.len(), second.len(), tiles);
    match *gaps {
        GapModel::Linear { open } => fill_linear(first, second, scoring, open, mode, &grid),
        GapModel::Affine { open, extend } => {
            fill_affine(first, second, scoring, open, extend, mode, &grid)
        }
    }
}

/// Tile decomposition of the interior cells `(1..=first_len, 1..=second_len)`.
#[derive(Debug)]
struct TileGrid {
    tile_height: usize,
    tile_width: usize,
    tile_rows: usize,
    tile_cols: usize,
}

#[derive(Debug, Clone, Copy)]
struct TileBounds {
    i0: usize,
    i1: usize,
    j0: usize,
    j1: usize,
}

impl TileGrid {
    fn new(first_len: usize, second_len: usize, tiles: Option<usize>) -> Self {
        let per_side = tiles.unwrap_or_else(num_cpus::get).max(1);
        let tile_height = first_len.div_ceil(per_side).max(1);
        let tile_width = second_len.div_ceil(per_side).max(1);
        Self {
            tile_height,
            tile_width,
            tile_rows: first_len.div_ceil(tile_height),
            tile_cols: second_len.div_ceil(tile_width),
        }
    }

    fn waves(&self) -> usize {
        self.tile_rows + self.tile_cols - 1
    }

    /// Tiles lying on one anti-diagonal wave, top-right to bottom-left.
    fn wave_tiles(&self, wave: usize, first_len: usize, second_len: usize) -> Vec<TileBounds> {
        (0..self.tile_rows)
            .filter_map(|ti| {
                let tj = wave.checked_sub(ti)?;
                if tj >= self.tile_cols {
                    return None;
                }
                let i0 = 1 + ti * self.tile_height;
                let j0 = 1 + tj * self.tile_width;
                Some(TileBounds {
                    i0,
                    i1: (i0 + self.tile_height - 1).min(first_len),
                    j0,
                    j1: (j0 + self.tile_width - 1).min(second_len),
                })
            })
            .collect()
    }
}

struct LinearTask {
    bounds: TileBounds,
    /// H[i0-1][j0-1..=j1]
    top: Vec<i32>,
    /// H[i0..=i1][j0-1]
    left: Vec<i32>,
}

struct LinearBlock {
    bounds: TileBounds,
    scores: Vec<i32>,
    dirs: Vec<Direction>,
}

fn fill_linear<S: ScoringMatrix + ?Sized>(
    first: &Sequence,
    second: &Sequence,
    scoring: &S,
    open: i32,
    mode: AlignmentMode,
    grid: &TileGrid,
) -> FillContext {
    let first_len = first.len();
    let second_len = second.len();
    let gaps = GapModel::Linear { open };
    let mut ctx = FillContext::new(mode, first_len, second_len);
    let mut h = ScoreGrid::new(first_len + 1, second_len + 1);

    set_boundaries(&mut ctx, &mut h, mode, &gaps, first_len, second_len);

    for wave in 0..grid.waves() {
        let tasks: Vec<LinearTask> = grid
            .wave_tiles(wave, first_len, second_len)
            .into_iter()
            .map(|bounds| LinearTask {
                bounds,
                top: (bounds.j0 - 1..=bounds.j1)
                    .map(|j| h.get(bounds.i0 - 1, j))
                    .collect(),
                left: (bounds.i0..=bounds.i1).map(|i| h.get(i, bounds.j0 - 1)).collect(),
            })
            .collect();

        let blocks: Vec<LinearBlock> = tasks
            .into_par_iter()
            .map(|task| fill_tile_linear(task, first, second, scoring, open, mode))
            .collect();

        // Wave barrier: all tiles joined before their cells become inputs
        for block in blocks {
            let width = block.bounds.j1 - block.bounds.j0 + 1;
            for (index, (&score, &dir)) in block.scores.iter().zip(block.dirs.iter()).enumerate() {
                let row = block.bounds.i0 + index / width;
                let col = block.bounds.j0 + index % width;
                h.set(row, col, score);
                ctx.dirs.set(row, col, dir);
            }
        }
    }

    scan_optima(&mut ctx, &h, first_len, second_len);
    ctx
}

fn fill_tile_linear<S: ScoringMatrix + ?Sized>(
    task: LinearTask,
    first: &Sequence,
    second: &Sequence,
    scoring: &S,
    open: i32,
    mode: AlignmentMode,
) -> LinearBlock {
    let TileBounds { i0, i1, j0, j1 } = task.bounds;
    let width = j1 - j0 + 1;
    let height = i1 - i0 + 1;
    let mut scores = vec![0i32; width * height];
    let mut dirs = vec![Direction::Invalid; width * height];

    let mut row = task.top;
    for r in 0..height {
        let a = first.symbol(i0 + r - 1);
        let mut diag = row[0];
        row[0] = task.left[r];
        for c in 0..width {
            let similarity = scoring.score(a, second.symbol(j0 + c - 1));
            let (score, direction) = choose(diag + similarity, row[c] + open, row[c + 1] + open);
            let (score, direction) = mode.admit(score, direction);

            diag = row[c + 1];
            row[c + 1] = score;
            scores[r * width + c] = score;
            dirs[r * width + c] = direction;
        }
    }

    LinearBlock {
        bounds: task.bounds,
        scores,
        dirs,
    }
}

struct AffineTask {
    bounds: TileBounds,
    top: Vec<i32>,
    left: Vec<i32>,
    /// F[i0-1][j0..=j1]
    top_up_gap: Vec<i32>,
    /// E[i0..=i1][j0-1]
    left_gap: Vec<i32>,
}

struct AffineBlock {
    bounds: TileBounds,
    scores: Vec<i32>,
    dirs: Vec<Direction>,
    left_gap: Vec<i32>,
    up_gap: Vec<i32>,
}

fn fill_affine<S: ScoringMatrix + ?Sized>(
    first: &Sequence,
    second: &Sequence,
    scoring: &S,
    open: i32,
    extend: i32,
    mode: AlignmentMode,
    grid: &TileGrid,
) -> FillContext {
    let first_len = first.len();
    let second_len = second.len();
    let gaps = GapModel::Affine { open, extend };
    let mut ctx = FillContext::new(mode, first_len, second_len);
    let mut h = ScoreGrid::new(first_len + 1, second_len + 1);
    let mut left_gap_grid = ScoreGrid::filled(first_len + 1, second_len + 1, NEG_INF);
    let mut up_gap_grid = ScoreGrid::filled(first_len + 1, second_len + 1, NEG_INF);

    set_boundaries(&mut ctx, &mut h, mode, &gaps, first_len, second_len);

    for wave in 0..grid.waves() {
        let tasks: Vec<AffineTask> = grid
            .wave_tiles(wave, first_len, second_len)
            .into_iter()
            .map(|bounds| AffineTask {
                bounds,
                top: (bounds.j0 - 1..=bounds.j1)
                    .map(|j| h.get(bounds.i0 - 1, j))
                    .collect(),
                left: (bounds.i0..=bounds.i1).map(|i| h.get(i, bounds.j0 - 1)).collect(),
                top_up_gap: (bounds.j0..=bounds.j1)
                    .map(|j| up_gap_grid.get(bounds.i0 - 1, j))
                    .collect(),
                left_gap: (bounds.i0..=bounds.i1)
                    .map(|i| left_gap_grid.get(i, bounds.j0 - 1))
                    .collect(),
            })
            .collect();

        let blocks: Vec<AffineBlock> = tasks
            .into_par_iter()
            .map(|task| fill_tile_affine(task, first, second, scoring, open, extend, mode))
            .collect();

        for block in blocks {
            let width = block.bounds.j1 - block.bounds.j0 + 1;
            for index in 0..block.scores.len() {
                let row = block.bounds.i0 + index / width;
                let col = block.bounds.j0 + index % width;
                h.set(row, col, block.scores[index]);
                left_gap_grid.set(row, col, block.left_gap[index]);
                up_gap_grid.set(row, col, block.up_gap[index]);
                ctx.dirs.set(row, col, block.dirs[index]);
            }
        }
    }

    scan_optima(&mut ctx, &h, first_len, second_len);
    ctx
}

fn fill_tile_affine<S: ScoringMatrix + ?Sized>(
    task: AffineTask,
    first: &Sequence,
    second: &Sequence,
    scoring: &S,
    open: i32,
    extend: i32,
    mode: AlignmentMode,
) -> AffineBlock {
    let TileBounds { i0, i1, j0, j1 } = task.bounds;
    let width = j1 - j0 + 1;
    let height = i1 - i0 + 1;
    let mut scores = vec![0i32; width * height];
    let mut dirs = vec![Direction::Invalid; width * height];
    let mut left_gap_out = vec![NEG_INF; width * height];
    let mut up_gap_out = vec![NEG_INF; width * height];

    let mut row = task.top;
    let mut up_gap = task.top_up_gap;
    for r in 0..height {
        let a = first.symbol(i0 + r - 1);
        let mut diag = row[0];
        row[0] = task.left[r];
        let mut left_gap = task.left_gap[r];
        for c in 0..width {
            left_gap = (row[c] + open).max(left_gap + extend);
            up_gap[c] = (row[c + 1] + open).max(up_gap[c] + extend);

            let similarity = scoring.score(a, second.symbol(j0 + c - 1));
            let (score, direction) = choose(diag + similarity, left_gap, up_gap[c]);
            let (score, direction) = mode.admit(score, direction);

            diag = row[c + 1];
            row[c + 1] = score;
            let index = r * width + c;
            scores[index] = score;
            dirs[index] = direction;
            left_gap_out[index] = left_gap;
            up_gap_out[index] = up_gap[c];
        }
    }

    AffineBlock {
        bounds: task.bounds,
        scores,
        dirs,
        left_gap: left_gap_out,
        up_gap: up_gap_out,
    }
}

fn set_boundaries(
    ctx: &mut FillContext,
    h: &mut ScoreGrid,
    mode: AlignmentMode,
    gaps: &GapModel,
    first_len: usize,
    second_len: usize,
) {
    ctx.dirs.set(0, 0, Direction::Stop);
    h.set(0, 0, 0);
    for col in 1..=second_len {
        h.set(0, col, mode.boundary_score(col, gaps));
        ctx.dirs.set(0, col, mode.boundary_row_direction());
    }
    for row in 1..=first_len {
        h.set(row, 0, mode.boundary_score(row, gaps));
        ctx.dirs.set(row, 0, mode.boundary_col_direction());
    }
}

/// Row-major scan of the finished grid; recovers the identical optimal cell
/// set the sequential fill tracks incrementally.
fn scan_optima(ctx: &mut FillContext, h: &ScoreGrid, first_len: usize, second_len: usize) {
    for row in 0..=first_len {
        for col in 0..=second_len {
            ctx.tracker.observe(row, col, h.get(row, col));
        }
    }
}
