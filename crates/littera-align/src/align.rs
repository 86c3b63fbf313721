//! Block alignment engine.
//!
//! Aligns two sequences of Blocks — typically the leaf Blocks of two
//! Documents in different languages covering the same underlying work —
//! using a multi-pass strategy adapted from token-based document diffing to
//! operate on **Entity mention overlap** instead, since text across two
//! languages is not directly comparable by token identity:
//!
//! 1. **Exact mention-set match** — blocks whose mentioned Entity sets are
//!    identical (and non-empty) are paired first.
//! 2. **Similarity scoring** — remaining blocks are scored pairwise using the
//!    Jaccard index over their mentioned Entity id sets; pairs above the
//!    similarity threshold are matched greedily, best score first.
//! 3. **Position fallback** — any blocks still unmatched after scoring (most
//!    often blocks that mention no Entity at all) are paired by an LCS over
//!    `order_index` equality, the closest analogue to shared position.
//!
//! Every surviving pair is classified into an [`AlignmentType`] by its
//! mention-overlap score; pairs that never reach the minimum threshold are
//! dropped rather than recorded, since `BlockAlignment` rows are a derived,
//! rebuildable relation — unlike a diff, there is no requirement to account
//! for every block.

use std::collections::{HashMap, HashSet};

use littera_core::{AlignmentType, Block, BlockAlignment};
use rayon::prelude::*;
use uuid::Uuid;

/// Minimum Jaccard overlap for two blocks to be recorded as aligned at all.
const PARTIAL_THRESHOLD: f64 = 0.2;
/// Overlap at or above which an alignment is `Similar` rather than `Partial`.
const SIMILAR_THRESHOLD: f64 = 0.5;
/// Overlap at or above which an alignment is `Exact` rather than `Similar`.
const EXACT_THRESHOLD: f64 = 0.85;

/// A Block paired with the set of Entity ids mentioned anywhere within it.
pub struct MentionedBlock<'a> {
    pub block: &'a Block,
    pub entity_ids: HashSet<Uuid>,
}

impl<'a> MentionedBlock<'a> {
    pub fn new(block: &'a Block, entity_ids: HashSet<Uuid>) -> Self {
        Self { block, entity_ids }
    }
}

/// Align two Block lists and return the [`BlockAlignment`] rows that should
/// replace whatever previously existed for these blocks.
pub fn align_blocks(left: &[MentionedBlock<'_>], right: &[MentionedBlock<'_>]) -> Vec<BlockAlignment> {
    let mut left_matched: HashSet<usize> = HashSet::new();
    let mut right_matched: HashSet<usize> = HashSet::new();
    let mut pairs: Vec<(usize, usize, f64)> = Vec::new();

    // -----------------------------------------------------------------------
    // Pass 1: exact mention-set match
    // -----------------------------------------------------------------------
    let mut right_by_set: HashMap<Vec<Uuid>, usize> = HashMap::new();
    for (ri, rb) in right.iter().enumerate() {
        if rb.entity_ids.is_empty() {
            continue;
        }
        right_by_set.entry(sorted_ids(&rb.entity_ids)).or_insert(ri);
    }

    for (li, lb) in left.iter().enumerate() {
        if lb.entity_ids.is_empty() {
            continue;
        }
        if let Some(&ri) = right_by_set.get(&sorted_ids(&lb.entity_ids)) {
            if !right_matched.contains(&ri) {
                pairs.push((li, ri, 1.0));
                left_matched.insert(li);
                right_matched.insert(ri);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pass 2: similarity scoring for remaining unmatched blocks
    // -----------------------------------------------------------------------
    let unmatched_left: Vec<usize> = (0..left.len()).filter(|i| !left_matched.contains(i)).collect();
    let unmatched_right: Vec<usize> = (0..right.len()).filter(|i| !right_matched.contains(i)).collect();

    let mut candidates: Vec<(usize, usize, f64)> = unmatched_left
        .par_iter()
        .flat_map(|&li| {
            unmatched_right
                .iter()
                .filter_map(|&ri| {
                    let sim = mention_similarity(&left[li].entity_ids, &right[ri].entity_ids);
                    (sim >= PARTIAL_THRESHOLD).then_some((li, ri, sim))
                })
                .collect::<Vec<_>>()
        })
        .collect();

    candidates.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

    for (li, ri, sim) in candidates {
        if left_matched.contains(&li) || right_matched.contains(&ri) {
            continue;
        }
        pairs.push((li, ri, sim));
        left_matched.insert(li);
        right_matched.insert(ri);
    }

    // -----------------------------------------------------------------------
    // Pass 3: position fallback via LCS over order_index equality
    // -----------------------------------------------------------------------
    let remaining_left: Vec<usize> = (0..left.len()).filter(|i| !left_matched.contains(i)).collect();
    let remaining_right: Vec<usize> = (0..right.len()).filter(|i| !right_matched.contains(i)).collect();

    for (li, ri) in lcs_by_position(&remaining_left, &remaining_right, left, right) {
        let sim = mention_similarity(&left[li].entity_ids, &right[ri].entity_ids);
        pairs.push((li, ri, sim));
    }

    // -----------------------------------------------------------------------
    // Classify and assemble
    // -----------------------------------------------------------------------
    pairs
        .into_iter()
        .map(|(li, ri, sim)| BlockAlignment {
            id: Uuid::new_v4(),
            block_a: left[li].block.id,
            block_b: right[ri].block.id,
            alignment_type: classify(sim),
            confidence: sim,
        })
        .collect()
}

fn classify(similarity: f64) -> AlignmentType {
    if similarity >= EXACT_THRESHOLD {
        AlignmentType::Exact
    } else if similarity >= SIMILAR_THRESHOLD {
        AlignmentType::Similar
    } else {
        AlignmentType::Partial
    }
}

/// Jaccard similarity between two Entity id sets. Two empty sets are
/// considered maximally dissimilar (0.0) rather than identical, since an
/// empty mention set carries no alignment signal either way.
pub fn mention_similarity(left: &HashSet<Uuid>, right: &HashSet<Uuid>) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(right).count();
    let union = left.union(right).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn sorted_ids(ids: &HashSet<Uuid>) -> Vec<Uuid> {
    let mut v: Vec<Uuid> = ids.iter().copied().collect();
    v.sort();
    v
}

/// Longest-common-subsequence pairing of remaining blocks by `order_index`
/// equality, the weakest available signal once mention overlap is exhausted.
fn lcs_by_position(
    left_indices: &[usize],
    right_indices: &[usize],
    left: &[MentionedBlock<'_>],
    right: &[MentionedBlock<'_>],
) -> Vec<(usize, usize)> {
    let n = left_indices.len();
    let m = right_indices.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            let li = left_indices[i - 1];
            let ri = right_indices[j - 1];
            if left[li].block.order_index == right[ri].block.order_index {
                dp[i][j] = dp[i - 1][j - 1] + 1;
            } else {
                dp[i][j] = dp[i - 1][j].max(dp[i][j - 1]);
            }
        }
    }

    let mut pairs = Vec::new();
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        let li = left_indices[i - 1];
        let ri = right_indices[j - 1];
        if left[li].block.order_index == right[ri].block.order_index {
            pairs.push((li, ri));
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] >= dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    pairs.reverse();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use littera_core::BlockKind;
    use uuid::Uuid;

    fn block(order: i32) -> Block {
        Block::new(Uuid::new_v4(), BlockKind::Paragraph, None, "en", order, "text")
    }

    fn entity_set(ids: &[Uuid]) -> HashSet<Uuid> {
        ids.iter().copied().collect()
    }

    #[test]
    fn identical_mention_sets_produce_exact_alignment() {
        let e1 = Uuid::new_v4();
        let e2 = Uuid::new_v4();
        let lb = block(0);
        let rb = block(0);
        let left = vec![MentionedBlock::new(&lb, entity_set(&[e1, e2]))];
        let right = vec![MentionedBlock::new(&rb, entity_set(&[e1, e2]))];
        let alignments = align_blocks(&left, &right);
        assert_eq!(alignments.len(), 1);
        assert_eq!(alignments[0].alignment_type, AlignmentType::Exact);
        assert_eq!(alignments[0].block_a, lb.id);
        assert_eq!(alignments[0].block_b, rb.id);
    }

    #[test]
    fn partial_overlap_produces_similar_or_partial() {
        let e1 = Uuid::new_v4();
        let e2 = Uuid::new_v4();
        let e3 = Uuid::new_v4();
        let lb = block(0);
        let rb = block(1);
        let left = vec![MentionedBlock::new(&lb, entity_set(&[e1, e2]))];
        let right = vec![MentionedBlock::new(&rb, entity_set(&[e1, e3]))];
        let alignments = align_blocks(&left, &right);
        assert_eq!(alignments.len(), 1);
        assert!(matches!(
            alignments[0].alignment_type,
            AlignmentType::Similar | AlignmentType::Partial
        ));
    }

    #[test]
    fn disjoint_mention_sets_below_threshold_are_dropped() {
        let lb = block(0);
        let rb = block(5);
        let left = vec![MentionedBlock::new(&lb, entity_set(&[Uuid::new_v4()]))];
        let right = vec![MentionedBlock::new(&rb, entity_set(&[Uuid::new_v4()]))];
        let alignments = align_blocks(&left, &right);
        assert!(alignments.is_empty());
    }

    #[test]
    fn blocks_with_no_mentions_fall_back_to_position() {
        let lb = block(2);
        let rb = block(2);
        let left = vec![MentionedBlock::new(&lb, HashSet::new())];
        let right = vec![MentionedBlock::new(&rb, HashSet::new())];
        let alignments = align_blocks(&left, &right);
        assert_eq!(alignments.len(), 1);
        assert_eq!(alignments[0].block_a, lb.id);
        assert_eq!(alignments[0].block_b, rb.id);
    }

    #[test]
    fn mention_similarity_identical_sets_is_one() {
        let e1 = Uuid::new_v4();
        let set = entity_set(&[e1]);
        assert!((mention_similarity(&set, &set) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mention_similarity_empty_sets_is_zero() {
        assert_eq!(mention_similarity(&HashSet::new(), &HashSet::new()), 0.0);
    }
}
