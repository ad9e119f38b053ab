//! Shared DP engine: validation, per-call fill context, sequential
//! rolling-row fill, and the public alignment entry points.

use super::matrix::{
    estimate_bytes, Direction, DirectionMatrix, AFFINE_BYTES_PER_CELL, LINEAR_BYTES_PER_CELL,
    NEG_INF,
};
use super::mode::AlignmentMode;
use super::result::{self, AlignmentResult};
use super::scoring::{Blosum62, GapModel, NucleotideMatrix, ScoringMatrix};
use super::traceback;
use super::wavefront;
use crate::consensus::{resolver_for, ConsensusResolver};
use crate::sequence::{Sequence, SequenceType};
use crate::{AlignError, Result};
use smallvec::SmallVec;

/// How the DP matrix is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillStrategy {
    /// Row-major fill with Gotoh's rolling-row memory optimization.
    #[default]
    Sequential,
    /// Tiled anti-diagonal fill on the rayon pool; materializes full score
    /// grids. `tiles` overrides the per-side tile count (default: core count).
    Wavefront { tiles: Option<usize> },
}

/// Accumulator for the optimal cell set. Ties are retained in row-major
/// discovery order, never arbitrarily broken.
#[derive(Debug)]
pub(crate) struct OptimumTracker {
    mode: AlignmentMode,
    first_len: usize,
    second_len: usize,
    pub best: i32,
    pub cells: SmallVec<[(usize, usize); 4]>,
}

impl OptimumTracker {
    pub fn new(mode: AlignmentMode, first_len: usize, second_len: usize) -> Self {
        Self {
            mode,
            first_len,
            second_len,
            best: mode.score_floor(),
            cells: SmallVec::new(),
        }
    }

    #[inline]
    pub fn observe(&mut self, row: usize, col: usize, score: i32) {
        if !self.mode.eligible(row, col, self.first_len, self.second_len) {
            return;
        }
        if score <= self.mode.score_floor() {
            return;
        }
        if score > self.best {
            self.best = score;
            self.cells.clear();
            self.cells.push((row, col));
        } else if score == self.best {
            self.cells.push((row, col));
        }
    }
}

/// Per-invocation DP state. Built fresh for every call so the aligner value
/// itself stays immutable and shareable across threads.
#[derive(Debug)]
pub(crate) struct FillContext {
    pub dirs: DirectionMatrix,
    pub tracker: OptimumTracker,
}

impl FillContext {
    pub fn new(mode: AlignmentMode, first_len: usize, second_len: usize) -> Self {
        Self {
            dirs: DirectionMatrix::new(first_len + 1, second_len + 1),
            tracker: OptimumTracker::new(mode, first_len, second_len),
        }
    }
}

/// Tie order is fixed: Diagonal > Left > Up.
#[inline]
pub(crate) fn choose(diagonal: i32, left: i32, up: i32) -> (i32, Direction) {
    if diagonal >= left && diagonal >= up {
        (diagonal, Direction::Diagonal)
    } else if left >= up {
        (left, Direction::Left)
    } else {
        (up, Direction::Up)
    }
}

/// Linear-gap sequential fill: one rolling score row plus a diagonal scalar.
pub(crate) fn fill_sequential_linear<S: ScoringMatrix + ?Sized>(
    first: &Sequence,
    second: &Sequence,
    scoring: &S,
    open: i32,
    mode: AlignmentMode,
) -> FillContext {
    let first_len = first.len();
    let second_len = second.len();
    let gaps = GapModel::Linear { open };
    let mut ctx = FillContext::new(mode, first_len, second_len);

    let mut row = vec![0i32; second_len + 1];
    ctx.dirs.set(0, 0, Direction::Stop);
    for col in 1..=second_len {
        row[col] = mode.boundary_score(col, &gaps);
        ctx.dirs.set(0, col, mode.boundary_row_direction());
        ctx.tracker.observe(0, col, row[col]);
    }

    for i in 1..=first_len {
        let mut diag = row[0];
        row[0] = mode.boundary_score(i, &gaps);
        ctx.dirs.set(i, 0, mode.boundary_col_direction());
        ctx.tracker.observe(i, 0, row[0]);

        let a = first.symbol(i - 1);
        for j in 1..=second_len {
            let similarity = scoring.score(a, second.symbol(j - 1));
            let (score, direction) = choose(diag + similarity, row[j - 1] + open, row[j] + open);
            let (score, direction) = mode.admit(score, direction);

            diag = row[j];
            row[j] = score;
            ctx.dirs.set(i, j, direction);
            ctx.tracker.observe(i, j, score);
        }
    }

    ctx
}

/// Affine-gap sequential fill (Gotoh). The cell optimum row rolls like the
/// linear case; the up-gap channel keeps one row, the left-gap channel a
/// single scalar.
pub(crate) fn fill_sequential_affine<S: ScoringMatrix + ?Sized>(
    first: &Sequence,
    second: &Sequence,
    scoring: &S,
    open: i32,
    extend: i32,
    mode: AlignmentMode,
) -> FillContext {
    let first_len = first.len();
    let second_len = second.len();
    let gaps = GapModel::Affine { open, extend };
    let mut ctx = FillContext::new(mode, first_len, second_len);

    let mut h = vec![0i32; second_len + 1];
    let mut up_gap = vec![NEG_INF; second_len + 1];
    ctx.dirs.set(0, 0, Direction::Stop);
    for col in 1..=second_len {
        h[col] = mode.boundary_score(col, &gaps);
        ctx.dirs.set(0, col, mode.boundary_row_direction());
        ctx.tracker.observe(0, col, h[col]);
    }

    for i in 1..=first_len {
        let mut diag = h[0];
        h[0] = mode.boundary_score(i, &gaps);
        ctx.dirs.set(i, 0, mode.boundary_col_direction());
        ctx.tracker.observe(i, 0, h[0]);

        let a = first.symbol(i - 1);
        let mut left_gap = NEG_INF;
        for j in 1..=second_len {
            left_gap = (h[j - 1] + open).max(left_gap + extend);
            up_gap[j] = (h[j] + open).max(up_gap[j] + extend);

            let similarity = scoring.score(a, second.symbol(j - 1));
            let (score, direction) = choose(diag + similarity, left_gap, up_gap[j]);
            let (score, direction) = mode.admit(score, direction);

            diag = h[j];
            h[j] = score;
            ctx.dirs.set(i, j, direction);
            ctx.tracker.observe(i, j, score);
        }
    }

    ctx
}

/// Pairwise aligner over a scoring matrix, configured with an algorithm and
/// a fill strategy. All alignment state lives in a per-call context, so a
/// single aligner value can serve concurrent callers.
pub struct PairwiseAligner<S: ScoringMatrix> {
    scoring: S,
    mode: AlignmentMode,
    fill: FillStrategy,
    max_matrix_bytes: Option<u128>,
    consensus: Option<Box<dyn ConsensusResolver>>,
}

impl<S: ScoringMatrix> PairwiseAligner<S> {
    pub fn new(mode: AlignmentMode, scoring: S) -> Self {
        Self {
            scoring,
            mode,
            fill: FillStrategy::Sequential,
            max_matrix_bytes: None,
            consensus: None,
        }
    }

    pub fn with_fill_strategy(mut self, fill: FillStrategy) -> Self {
        self.fill = fill;
        self
    }

    /// Cap the estimated DP allocation; larger inputs fail with
    /// `ResourceExhausted` instead of attempting the allocation.
    pub fn with_max_matrix_bytes(mut self, limit: u128) -> Self {
        self.max_matrix_bytes = Some(limit);
        self
    }

    /// Override the alphabet-derived consensus policy.
    pub fn with_consensus(mut self, resolver: Box<dyn ConsensusResolver>) -> Self {
        self.consensus = Some(resolver);
        self
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    /// Linear gap mode: `open` is charged per gap character.
    pub fn align_simple(
        &self,
        first: &Sequence,
        second: &Sequence,
        open: i32,
    ) -> Result<Vec<AlignmentResult>> {
        self.run(first, second, GapModel::Linear { open })
    }

    /// Affine gap mode: `open` once per gap run, `extend` per additional
    /// character of the run.
    pub fn align_affine(
        &self,
        first: &Sequence,
        second: &Sequence,
        open: i32,
        extend: i32,
    ) -> Result<Vec<AlignmentResult>> {
        self.run(first, second, GapModel::Affine { open, extend })
    }

    /// Linear alignment using the scoring matrix's default open cost.
    pub fn align_linear(&self, first: &Sequence, second: &Sequence) -> Result<Vec<AlignmentResult>> {
        self.align_simple(first, second, self.scoring.gap_open())
    }

    /// Affine alignment using the scoring matrix's default gap costs.
    pub fn align(&self, first: &Sequence, second: &Sequence) -> Result<Vec<AlignmentResult>> {
        self.align_affine(first, second, self.scoring.gap_open(), self.scoring.gap_extend())
    }

    /// Uniform entry point over a pre-collected pair.
    pub fn align_pair(&self, sequences: &[Sequence]) -> Result<Vec<AlignmentResult>> {
        if sequences.len() != 2 {
            return Err(AlignError::InvalidInput(format!(
                "pairwise alignment requires exactly 2 sequences, got {}",
                sequences.len()
            )));
        }
        self.align(&sequences[0], &sequences[1])
    }

    fn run(
        &self,
        first: &Sequence,
        second: &Sequence,
        gaps: GapModel,
    ) -> Result<Vec<AlignmentResult>> {
        self.validate(first, second)?;
        gaps.warn_if_positive();
        self.check_dimensions(first, second, &gaps)?;

        let ctx = match self.fill {
            FillStrategy::Sequential => match gaps {
                GapModel::Linear { open } => {
                    fill_sequential_linear(first, second, &self.scoring, open, self.mode)
                }
                GapModel::Affine { open, extend } => {
                    fill_sequential_affine(first, second, &self.scoring, open, extend, self.mode)
                }
            },
            FillStrategy::Wavefront { tiles } => {
                wavefront::fill(first, second, &self.scoring, &gaps, self.mode, tiles)
            }
        };

        tracing::debug!(
            rows = first.len() + 1,
            cols = second.len() + 1,
            best = ctx.tracker.best,
            optima = ctx.tracker.cells.len(),
            "alignment matrix filled"
        );

        let default_resolver;
        let resolver: &dyn ConsensusResolver = match &self.consensus {
            Some(resolver) => resolver.as_ref(),
            None => {
                default_resolver = resolver_for(first.alphabet());
                default_resolver.as_ref()
            }
        };

        if ctx.tracker.cells.is_empty() {
            // Local mode with nothing above the clamp floor: a single empty
            // alignment with score 0.
            return Ok(vec![result::empty(resolver)]);
        }

        let mut results = Vec::with_capacity(ctx.tracker.cells.len());
        for &(row, col) in &ctx.tracker.cells {
            let walk = traceback::walk(&ctx.dirs, first, second, self.mode, (row, col))?;
            results.push(result::assemble(walk, ctx.tracker.best, resolver));
        }
        Ok(results)
    }

    fn validate(&self, first: &Sequence, second: &Sequence) -> Result<()> {
        for seq in [first, second] {
            if seq.is_empty() {
                return Err(AlignError::InvalidInput(format!(
                    "sequence '{}' is empty",
                    seq.id
                )));
            }
        }
        if !first.alphabet().same_base(second.alphabet()) {
            return Err(AlignError::InvalidInput(format!(
                "alphabet mismatch: '{}' is {:?} but '{}' is {:?}",
                first.id,
                first.alphabet(),
                second.id,
                second.alphabet()
            )));
        }
        for seq in [first, second] {
            if let Some(&symbol) = seq.symbols().iter().find(|&&s| !self.scoring.supports(s)) {
                return Err(AlignError::InvalidInput(format!(
                    "scoring matrix has no entry for symbol '{}' in sequence '{}'",
                    symbol as char, seq.id
                )));
            }
        }
        Ok(())
    }

    fn check_dimensions(&self, first: &Sequence, second: &Sequence, gaps: &GapModel) -> Result<()> {
        let bytes_per_cell = if gaps.is_affine() {
            AFFINE_BYTES_PER_CELL
        } else {
            LINEAR_BYTES_PER_CELL
        };
        let estimated = estimate_bytes(first.len(), second.len(), bytes_per_cell);

        let addressable = (first.len() + 1)
            .checked_mul(second.len() + 1)
            .map(|cells| cells <= usize::MAX / bytes_per_cell as usize)
            .unwrap_or(false);
        let within_limit = match (self.max_matrix_bytes, estimated) {
            (Some(limit), Some(bytes)) => bytes <= limit,
            (None, Some(_)) => true,
            (_, None) => false,
        };

        if !addressable || !within_limit {
            return Err(AlignError::ResourceExhausted {
                first_len: first.len(),
                second_len: second.len(),
                estimated_bytes: estimated.unwrap_or(u128::MAX),
            });
        }
        Ok(())
    }
}

/// Convenience entry points that pick a scoring matrix from the sequence
/// alphabet: BLOSUM62 for proteins, the nucleotide matrix otherwise.
pub struct Pairwise;

impl Pairwise {
    pub fn global(first: &Sequence, second: &Sequence) -> Result<Vec<AlignmentResult>> {
        Self::run(AlignmentMode::Global, first, second)
    }

    pub fn local(first: &Sequence, second: &Sequence) -> Result<Vec<AlignmentResult>> {
        Self::run(AlignmentMode::Local, first, second)
    }

    pub fn overlap(first: &Sequence, second: &Sequence) -> Result<Vec<AlignmentResult>> {
        Self::run(AlignmentMode::Overlap, first, second)
    }

    fn run(
        mode: AlignmentMode,
        first: &Sequence,
        second: &Sequence,
    ) -> Result<Vec<AlignmentResult>> {
        if first.alphabet() == SequenceType::Protein {
            PairwiseAligner::new(mode, Blosum62::new()).align(first, second)
        } else {
            PairwiseAligner::new(mode, NucleotideMatrix::new()).align(first, second)
        }
    }
}
