/// Integration tests for the pairwise alignment engine
use chiasma::{
    AlignmentMode, FillStrategy, NucleotideMatrix, Pairwise, PairwiseAligner, Sequence,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn seq(id: &str, bytes: &[u8]) -> Sequence {
    Sequence::new(id.to_string(), bytes.to_vec())
}

fn nucleotide(mode: AlignmentMode) -> PairwiseAligner<NucleotideMatrix> {
    PairwiseAligner::new(mode, NucleotideMatrix::new())
}

#[test]
fn test_gattaca_global_alignment() {
    // The fixed reference case: match +2, mismatch -2, linear gap -1
    let a = seq("a", b"GATTACA");
    let b = seq("b", b"GCATGCU");
    let matrix = NucleotideMatrix::new().with_scores(2, -2);
    let results = PairwiseAligner::new(AlignmentMode::Global, matrix)
        .align_simple(&a, &b, -1)
        .unwrap();

    assert_eq!(results.len(), 1);
    let r = &results[0];
    assert_eq!(r.score, 2);
    assert_eq!(r.first_aligned.len(), r.second_aligned.len());

    // Canonical path under the Diagonal > Left > Up tie order
    assert_eq!(r.first_aligned, b"G-ATTACA".to_vec());
    assert_eq!(r.second_aligned, b"GCA-TGCU".to_vec());

    // Aligned streams contain only input symbols plus the gap symbol
    for &c in r.first_aligned.iter() {
        assert!(c == b'-' || a.symbols().contains(&c));
    }
    for &c in r.second_aligned.iter() {
        assert!(c == b'-' || b.symbols().contains(&c));
    }
}

#[test]
fn test_exact_match_alignment() {
    // Perfect alignment
    let a = seq("ref", b"ATGCATGCATGC");
    let b = seq("query", b"ATGCATGCATGC");

    let results = Pairwise::global(&a, &b).unwrap();
    let r = &results[0];

    assert_eq!(r.identity, 1.0);
    assert_eq!(r.first_aligned, b"ATGCATGCATGC".to_vec());
    assert_eq!(r.second_aligned, b"ATGCATGCATGC".to_vec());
    assert_eq!(r.insertion_counts, [0, 0]);
    assert_eq!(r.consensus, b"ATGCATGCATGC".to_vec());
}

#[test]
fn test_single_mismatch_alignment() {
    let a = seq("ref", b"ATGCATGC");
    let b = seq("query", b"ATGGATGC");

    let results = Pairwise::global(&a, &b).unwrap();
    let r = &results[0];

    assert!(r.identity > 0.8);
    assert_eq!(r.alignment_string, b"|||X||||".to_vec());
    // Mismatched column resolves to an ambiguity code, not a base
    assert_eq!(r.consensus[3], b'S');
}

#[test]
fn test_symmetry_of_score() {
    // A symmetric similarity matrix must give the same score both ways
    let a = seq("a", b"ACGTACGTTGCA");
    let b = seq("b", b"ACTTACGAGC");
    let aligner = nucleotide(AlignmentMode::Global);

    let forward = aligner.align_simple(&a, &b, -1).unwrap();
    let backward = aligner.align_simple(&b, &a, -1).unwrap();
    assert_eq!(forward[0].score, backward[0].score);

    // Roles swap: gaps charged against one stream appear in the other
    assert_eq!(
        forward[0].insertion_counts,
        [backward[0].insertion_counts[1], backward[0].insertion_counts[0]]
    );
}

#[test]
fn test_determinism_across_calls() {
    let a = seq("a", b"ACGTACGTTGCATCG");
    let b = seq("b", b"ACTTACGTAGCAG");
    let aligner = nucleotide(AlignmentMode::Local);

    let x = aligner.align_affine(&a, &b, -4, -1).unwrap();
    let y = aligner.align_affine(&a, &b, -4, -1).unwrap();
    assert_eq!(x, y);
}

#[test]
fn test_affine_equals_linear_when_extension_equals_open() {
    let a = seq("a", b"ACGTACGTTGCATCGAA");
    let b = seq("b", b"ACTTACGTAGCAGTT");

    for mode in [
        AlignmentMode::Global,
        AlignmentMode::Local,
        AlignmentMode::Overlap,
    ] {
        let aligner = nucleotide(mode);
        let linear = aligner.align_simple(&a, &b, -2).unwrap();
        let affine = aligner.align_affine(&a, &b, -2, -2).unwrap();
        assert_eq!(linear, affine, "mode {mode:?}");
    }
}

#[test]
fn test_round_trip_reconstruction_global() {
    let a = seq("a", b"ATGCAAATGCTTGC");
    let b = seq("b", b"ATGCATGCTAGC");

    let results = Pairwise::global(&a, &b).unwrap();
    let r = &results[0];

    let stripped_first: Vec<u8> = r
        .first_aligned
        .iter()
        .copied()
        .filter(|&c| c != b'-')
        .collect();
    let stripped_second: Vec<u8> = r
        .second_aligned
        .iter()
        .copied()
        .filter(|&c| c != b'-')
        .collect();

    assert_eq!(stripped_first, a.symbols());
    assert_eq!(stripped_second, b.symbols());
}

#[test]
fn test_round_trip_reconstruction_local() {
    let a = seq("a", b"TTTTACGTACGTTTTT");
    let b = seq("b", b"CCACGTACGTCC");

    let results = nucleotide(AlignmentMode::Local)
        .align_simple(&a, &b, -2)
        .unwrap();

    for r in &results {
        let stripped: Vec<u8> = r
            .first_aligned
            .iter()
            .copied()
            .filter(|&c| c != b'-')
            .collect();
        // The aligned window reproduces the input between start and end
        assert_eq!(stripped, &a.symbols()[r.start_offsets[0]..r.end_offsets[0]]);

        let stripped: Vec<u8> = r
            .second_aligned
            .iter()
            .copied()
            .filter(|&c| c != b'-')
            .collect();
        assert_eq!(stripped, &b.symbols()[r.start_offsets[1]..r.end_offsets[1]]);
    }
}

#[test]
fn test_local_scores_never_negative() {
    let a = seq("a", b"AAAATTTT");
    let b = seq("b", b"GGGGCCCC");

    // Nothing aligns: the empty alignment with score 0 comes back
    let results = nucleotide(AlignmentMode::Local)
        .align_simple(&a, &b, -2)
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 0);
    assert!(results[0].is_empty());
}

#[rstest]
#[case::suffix_prefix(b"TTTTACGT".as_slice(), b"ACGTCCCC".as_slice(), 8, [4, 0])]
#[case::prefix_suffix(b"ACGTTTTT".as_slice(), b"CCCCACGT".as_slice(), 8, [0, 4])]
#[case::contained(b"ACGTACGT".as_slice(), b"GTAC".as_slice(), 8, [2, 0])]
fn test_overlap_alignments(
    #[case] first: &[u8],
    #[case] second: &[u8],
    #[case] expected_score: i32,
    #[case] expected_starts: [usize; 2],
) {
    let a = seq("a", first);
    let b = seq("b", second);
    let results = nucleotide(AlignmentMode::Overlap)
        .align_simple(&a, &b, -2)
        .unwrap();

    let r = &results[0];
    assert_eq!(r.score, expected_score);
    assert_eq!(r.start_offsets, expected_starts);

    // The optimal cell lies in the last row or last column
    assert!(
        r.end_offsets[0] == a.len() || r.end_offsets[1] == b.len(),
        "optimum not on the final row/column: {:?}",
        r.end_offsets
    );

    // Overhangs are reported through offsets, never materialized
    assert!(!r.first_aligned.starts_with(b"-"));
    assert!(!r.second_aligned.starts_with(b"-"));
}

#[test]
fn test_overlap_no_penalty_for_overhangs() {
    // A long non-matching prefix must not reduce the overlap score
    let short = seq("short", b"TACGT");
    let long = seq("long", b"GGGGGGGGGGTACGT");

    let from_short = nucleotide(AlignmentMode::Overlap)
        .align_simple(&short, &seq("b", b"TACGTAAAA"), -2)
        .unwrap();
    let from_long = nucleotide(AlignmentMode::Overlap)
        .align_simple(&long, &seq("b", b"TACGTAAAA"), -2)
        .unwrap();

    assert_eq!(from_short[0].score, from_long[0].score);
}

#[test]
fn test_parallel_matches_sequential_over_public_api() {
    let a = seq("a", &b"ACGTACGTTGCATGCA".repeat(4));
    let b = seq("b", &b"ACTTACGTAGCATGCC".repeat(3));

    for mode in [
        AlignmentMode::Global,
        AlignmentMode::Local,
        AlignmentMode::Overlap,
    ] {
        let sequential = nucleotide(mode).align_affine(&a, &b, -4, -1).unwrap();
        for tiles in [1, 2, 4, 16] {
            let parallel = nucleotide(mode)
                .with_fill_strategy(FillStrategy::Wavefront { tiles: Some(tiles) })
                .align_affine(&a, &b, -4, -1)
                .unwrap();
            assert_eq!(sequential, parallel, "mode {mode:?}, tiles {tiles}");
        }
    }
}

#[test]
fn test_parallel_matches_sequential_on_random_input() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0xC1A5);
    let bases = b"ACGT";
    for _ in 0..5 {
        let len_a = rng.gen_range(3..120);
        let len_b = rng.gen_range(3..120);
        let a: Vec<u8> = (0..len_a).map(|_| bases[rng.gen_range(0..4)]).collect();
        let b: Vec<u8> = (0..len_b).map(|_| bases[rng.gen_range(0..4)]).collect();
        let a = seq("a", &a);
        let b = seq("b", &b);
        let tiles = rng.gen_range(1..9);

        let sequential = nucleotide(AlignmentMode::Local)
            .align_simple(&a, &b, -1)
            .unwrap();
        let parallel = nucleotide(AlignmentMode::Local)
            .with_fill_strategy(FillStrategy::Wavefront { tiles: Some(tiles) })
            .align_simple(&a, &b, -1)
            .unwrap();
        assert_eq!(sequential, parallel, "tiles {tiles}");
    }
}

#[test]
fn test_protein_alignment_with_blosum62() {
    let a = seq("ref", b"ACDEFGHIKLMNPQRSTVWY");
    let b = seq("query", b"ACDEFGHIKLMNPQRSTVWY");

    let results = Pairwise::global(&a, &b).unwrap();
    assert_eq!(results[0].identity, 1.0);

    // A substitution keeps the alignment but drops identity
    let c = seq("query", b"ACDEFGHLKLMNPQRSTVWY");
    let results = Pairwise::global(&a, &c).unwrap();
    assert!(results[0].identity < 1.0);
    assert!(results[0].score > 0);
}

#[test]
fn test_result_serialization_round_trip() {
    let a = seq("a", b"ACGTACGT");
    let b = seq("b", b"ACGAACGT");

    let results = Pairwise::global(&a, &b).unwrap();
    let json = serde_json::to_string(&results).unwrap();
    let back: Vec<chiasma::AlignmentResult> = serde_json::from_str(&json).unwrap();
    assert_eq!(results, back);
}

#[test]
fn test_large_alignment_under_wavefront() {
    // Wavefront fill on a larger matrix still reproduces a clean global
    // alignment of a mutated copy
    let reference = b"ACGT".repeat(100);
    let mut mutated = reference.clone();
    mutated[50] = b'A';
    mutated[150] = b'G';
    mutated[250] = b'T';

    let a = seq("ref", &reference);
    let b = seq("query", &mutated);
    let results = nucleotide(AlignmentMode::Global)
        .with_fill_strategy(FillStrategy::Wavefront { tiles: None })
        .align_simple(&a, &b, -1)
        .unwrap();

    let r = &results[0];
    assert!(r.identity > 0.99);
    assert_eq!(r.insertion_counts, [0, 0]);
    assert_eq!(r.first_aligned.len(), 400);
}
