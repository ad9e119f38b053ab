//! Sequence container and alphabet identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbol used for gap positions in aligned output.
pub const GAP: u8 = b'-';

/// Base alphabet of a sequence. Two sequences may only be aligned against
/// each other when their alphabets share the same base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceType {
    Nucleotide,
    Protein,
}

impl SequenceType {
    pub fn same_base(self, other: SequenceType) -> bool {
        self == other
    }

    pub fn gap_symbol(self) -> u8 {
        GAP
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub description: Option<String>,
    sequence: Vec<u8>,
    alphabet: SequenceType,
}

impl Sequence {
    /// Build a sequence, inferring the alphabet from its residues.
    pub fn new(id: String, sequence: Vec<u8>) -> Self {
        let alphabet = detect_type(&sequence);
        Self {
            id,
            description: None,
            sequence,
            alphabet,
        }
    }

    /// Build a sequence with an explicit alphabet, bypassing detection.
    pub fn with_alphabet(id: String, sequence: Vec<u8>, alphabet: SequenceType) -> Self {
        Self {
            id,
            description: None,
            sequence,
            alphabet,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn symbols(&self) -> &[u8] {
        &self.sequence
    }

    pub fn symbol(&self, index: usize) -> u8 {
        self.sequence[index]
    }

    pub fn alphabet(&self) -> SequenceType {
        self.alphabet
    }
}

/// Residues that only occur in protein sequences.
fn detect_type(sequence: &[u8]) -> SequenceType {
    let protein_chars = b"EFILPQXZ";
    let has_protein = sequence
        .iter()
        .any(|&c| protein_chars.contains(&c.to_ascii_uppercase()));

    if has_protein {
        SequenceType::Protein
    } else {
        SequenceType::Nucleotide
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.sequence))
    }
}
