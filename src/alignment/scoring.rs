//! Scoring matrices and gap cost models for sequence alignment.

use crate::sequence::Sequence;
use once_cell::sync::Lazy;

/// Pairwise symbol scoring plus default gap costs.
///
/// Gap costs follow the convention that penalties are negative values added
/// to the running score; a positive cost is almost certainly a caller
/// mistake and is warned about (but accepted) by the engine.
pub trait ScoringMatrix: Send + Sync {
    fn score(&self, a: u8, b: u8) -> i32;
    fn gap_open(&self) -> i32;
    fn gap_extend(&self) -> i32;

    /// Whether this matrix carries a score row for the given symbol.
    fn supports(&self, symbol: u8) -> bool;

    /// Every residue of the sequence must be covered by the matrix.
    fn validate(&self, seq: &Sequence) -> bool {
        seq.symbols().iter().all(|&s| self.supports(s))
    }
}

/// Gap cost model for one alignment invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapModel {
    Linear { open: i32 },
    Affine { open: i32, extend: i32 },
}

impl GapModel {
    pub fn open(&self) -> i32 {
        match *self {
            GapModel::Linear { open } => open,
            GapModel::Affine { open, .. } => open,
        }
    }

    pub fn extend(&self) -> i32 {
        match *self {
            GapModel::Linear { open } => open,
            GapModel::Affine { extend, .. } => extend,
        }
    }

    pub fn is_affine(&self) -> bool {
        matches!(self, GapModel::Affine { .. })
    }

    /// Sign-convention check: costs are expected to be <= 0. Positive costs
    /// proceed unchanged but are logged as a likely user error.
    pub fn warn_if_positive(&self) {
        match *self {
            GapModel::Linear { open } => {
                if open > 0 {
                    tracing::warn!(open, "gap open cost is positive; penalties are conventionally <= 0");
                }
            }
            GapModel::Affine { open, extend } => {
                if open > 0 {
                    tracing::warn!(open, "gap open cost is positive; penalties are conventionally <= 0");
                }
                if extend > 0 {
                    tracing::warn!(extend, "gap extension cost is positive; penalties are conventionally <= 0");
                }
            }
        }
    }
}

/// Nucleotide scoring matrix.
///
/// Defaults give a plain diagonal matrix (match positive, any mismatch the
/// same negative score); transition/transversion scores can be split for
/// biologically weighted alignments.
#[derive(Debug, Clone, Copy)]
pub struct NucleotideMatrix {
    match_score: i32,
    transition_score: i32,   // purine-purine or pyrimidine-pyrimidine
    transversion_score: i32, // purine-pyrimidine
    gap_open: i32,
    gap_extend: i32,
}

impl NucleotideMatrix {
    pub fn new() -> Self {
        Self {
            match_score: 2,
            transition_score: -2,
            transversion_score: -2,
            gap_open: -2,
            gap_extend: -1,
        }
    }

    pub fn with_scores(mut self, match_score: i32, mismatch_score: i32) -> Self {
        self.match_score = match_score;
        self.transition_score = mismatch_score;
        self.transversion_score = mismatch_score;
        self
    }

    pub fn with_transition_scores(mut self, transition: i32, transversion: i32) -> Self {
        self.transition_score = transition;
        self.transversion_score = transversion;
        self
    }

    pub fn with_gap_penalties(mut self, gap_open: i32, gap_extend: i32) -> Self {
        self.gap_open = gap_open;
        self.gap_extend = gap_extend;
        self
    }

    fn is_purine(base: u8) -> bool {
        matches!(base.to_ascii_uppercase(), b'A' | b'G' | b'R')
    }

    fn is_pyrimidine(base: u8) -> bool {
        matches!(base.to_ascii_uppercase(), b'C' | b'T' | b'U' | b'Y')
    }
}

impl Default for NucleotideMatrix {
    fn default() -> Self {
        Self::new()
    }
}

const NUCLEOTIDE_SYMBOLS: &[u8] = b"ACGTURYSWKMBDHVN";

impl ScoringMatrix for NucleotideMatrix {
    fn score(&self, a: u8, b: u8) -> i32 {
        let a = a.to_ascii_uppercase();
        let b = b.to_ascii_uppercase();

        if a == b {
            self.match_score
        } else if (Self::is_purine(a) && Self::is_purine(b))
            || (Self::is_pyrimidine(a) && Self::is_pyrimidine(b))
        {
            self.transition_score
        } else {
            self.transversion_score
        }
    }

    fn gap_open(&self) -> i32 {
        self.gap_open
    }

    fn gap_extend(&self) -> i32 {
        self.gap_extend
    }

    fn supports(&self, symbol: u8) -> bool {
        NUCLEOTIDE_SYMBOLS.contains(&symbol.to_ascii_uppercase())
    }
}

/// BLOSUM62 scoring matrix for protein sequences.
#[derive(Debug, Clone, Copy)]
pub struct Blosum62 {
    gap_open: i32,
    gap_extend: i32,
}

const AMINO_ACIDS: &[u8] = b"ARNDCQEGHILKMFPSTWYVBZX*";

static AMINO_INDEX: Lazy<[Option<u8>; 256]> = Lazy::new(|| {
    let mut index = [None; 256];
    for (i, &aa) in AMINO_ACIDS.iter().enumerate() {
        index[aa as usize] = Some(i as u8);
        index[aa.to_ascii_lowercase() as usize] = Some(i as u8);
    }
    index
});

#[rustfmt::skip]
const BLOSUM62: [[i32; 24]; 24] = [
    [ 4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0, -2, -1,  0, -4],
    [-1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3, -1,  0, -1, -4],
    [-2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3,  3,  0, -1, -4],
    [-2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3,  4,  1, -1, -4],
    [ 0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1, -3, -3, -2, -4],
    [-1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2,  0,  3, -1, -4],
    [-1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1, -4],
    [ 0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3, -1, -2, -1, -4],
    [-2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3,  0,  0, -1, -4],
    [-1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3, -3, -3, -1, -4],
    [-1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1, -4, -3, -1, -4],
    [-1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2,  0,  1, -1, -4],
    [-1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1, -3, -1, -1, -4],
    [-2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1, -3, -3, -1, -4],
    [-1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2, -2, -1, -2, -4],
    [ 1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2,  0,  0,  0, -4],
    [ 0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0, -1, -1,  0, -4],
    [-3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3, -4, -3, -2, -4],
    [-2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1, -3, -2, -1, -4],
    [ 0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4, -3, -2, -1, -4],
    [-2, -1,  3,  4, -3,  0,  1, -1,  0, -3, -4,  0, -3, -3, -2,  0, -1, -4, -3, -3,  4,  1, -1, -4],
    [-1,  0,  0,  1, -3,  3,  4, -2,  0, -3, -3,  1, -1, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1, -4],
    [ 0, -1, -1, -1, -2, -1, -1, -1, -1, -1, -1, -1, -1, -1, -2,  0,  0, -2, -1, -1, -1, -1, -1, -4],
    [-4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4,  1],
];

impl Blosum62 {
    pub fn new() -> Self {
        Self {
            gap_open: -10,
            gap_extend: -1,
        }
    }

    pub fn with_gap_penalties(mut self, gap_open: i32, gap_extend: i32) -> Self {
        self.gap_open = gap_open;
        self.gap_extend = gap_extend;
        self
    }
}

impl Default for Blosum62 {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringMatrix for Blosum62 {
    fn score(&self, a: u8, b: u8) -> i32 {
        // Unknown residues fall back to the X row; validate() rejects them
        // up front so this only matters for callers skipping validation.
        let i = AMINO_INDEX[a as usize].unwrap_or(22) as usize;
        let j = AMINO_INDEX[b as usize].unwrap_or(22) as usize;

        BLOSUM62[i][j]
    }

    fn gap_open(&self) -> i32 {
        self.gap_open
    }

    fn gap_extend(&self) -> i32 {
        self.gap_extend
    }

    fn supports(&self, symbol: u8) -> bool {
        AMINO_INDEX[symbol as usize].is_some()
    }
}
