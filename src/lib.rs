//! Pairwise sequence alignment engine.
//!
//! Implements global (Needleman-Wunsch), local (Smith-Waterman), and
//! semi-global overlap alignment over a shared dynamic-programming core,
//! with linear or affine (Gotoh) gap penalties and an opt-in wavefront
//! block-parallel fill for large inputs.

pub mod alignment;
pub mod consensus;
pub mod sequence;

// Re-export the primary API surface
pub use alignment::{
    AlignmentMode, AlignmentResult, Blosum62, FillStrategy, GapModel, NucleotideMatrix, Pairwise,
    PairwiseAligner, ScoringMatrix,
};
pub use consensus::ConsensusResolver;
pub use sequence::{Sequence, SequenceType};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Alignment of {first_len} x {second_len} residues needs an estimated {estimated_bytes} bytes of matrix storage")]
    ResourceExhausted {
        first_len: usize,
        second_len: usize,
        estimated_bytes: u128,
    },

    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),
}

pub type Result<T> = std::result::Result<T, AlignError>;
