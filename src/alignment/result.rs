//! Typed alignment results assembled from raw traceback output.

use super::traceback::Walk;
use crate::consensus::ConsensusResolver;
use crate::sequence::GAP;
use serde::{Deserialize, Serialize};

/// One optimal pairwise alignment.
///
/// Constructed once per optimal cell discovered during traceback and
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub score: i32,
    /// First sequence with embedded gap symbols.
    pub first_aligned: Vec<u8>,
    /// Second sequence with embedded gap symbols.
    pub second_aligned: Vec<u8>,
    /// Columns by which the first sequence is shifted for display.
    pub first_offset: usize,
    pub second_offset: usize,
    /// Zero-based coordinates where the aligned window starts in each input.
    pub start_offsets: [usize; 2],
    /// Zero-based coordinates one past the last aligned residue of each input.
    pub end_offsets: [usize; 2],
    /// Gap symbols embedded in each aligned stream.
    pub insertion_counts: [usize; 2],
    /// Column-wise consensus of the aligned window.
    pub consensus: Vec<u8>,
    /// Fraction of columns that are exact matches.
    pub identity: f64,
    /// '|' for match, 'X' for mismatch, ' ' at gap columns.
    pub alignment_string: Vec<u8>,
}

impl AlignmentResult {
    pub fn len(&self) -> usize {
        self.first_aligned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_aligned.is_empty()
    }
}

/// Eq is fine here: identity is a derived ratio of two small integers, so
/// equal alignments produce bit-identical values.
impl Eq for AlignmentResult {}

/// Convert one traceback walk into a typed result.
pub(crate) fn assemble(
    walk: Walk,
    score: i32,
    resolver: &dyn ConsensusResolver,
) -> AlignmentResult {
    let mut first_aligned = walk.first_rev;
    let mut second_aligned = walk.second_rev;
    first_aligned.reverse();
    second_aligned.reverse();

    let insertion_counts = [
        first_aligned.iter().filter(|&&c| c == GAP).count(),
        second_aligned.iter().filter(|&&c| c == GAP).count(),
    ];

    let start_offsets = [walk.start.0, walk.start.1];
    let end_offsets = [walk.end.0, walk.end.1];

    // Display offset: leading gap columns plus the other stream's window
    // start, both measured against the earlier of the two window starts.
    // Collapses to the leading-gap count for global alignments and to the
    // overhang length for overlap alignments.
    let leading = |s: &[u8]| s.iter().take_while(|&&c| c == GAP).count();
    let min_start = start_offsets[0].min(start_offsets[1]);
    let first_offset = leading(&first_aligned) + (start_offsets[1] - min_start);
    let second_offset = leading(&second_aligned) + (start_offsets[0] - min_start);

    let alignment_string: Vec<u8> = first_aligned
        .iter()
        .zip(second_aligned.iter())
        .map(|(&f, &s)| {
            if f == GAP || s == GAP {
                b' '
            } else if f.eq_ignore_ascii_case(&s) {
                b'|'
            } else {
                b'X'
            }
        })
        .collect();

    let matches = alignment_string.iter().filter(|&&c| c == b'|').count();
    let identity = matches as f64 / alignment_string.len().max(1) as f64;

    let consensus: Vec<u8> = first_aligned
        .iter()
        .zip(second_aligned.iter())
        .map(|(&f, &s)| resolver.resolve(f, s))
        .collect();

    AlignmentResult {
        score,
        first_aligned,
        second_aligned,
        first_offset,
        second_offset,
        start_offsets,
        end_offsets,
        insertion_counts,
        consensus,
        identity,
        alignment_string,
    }
}

/// The score-zero result returned when local alignment finds no cell above
/// the clamp floor (e.g. an all-negative similarity matrix).
pub(crate) fn empty(resolver: &dyn ConsensusResolver) -> AlignmentResult {
    assemble(Walk::empty(), 0, resolver)
}
