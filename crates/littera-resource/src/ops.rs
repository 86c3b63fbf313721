//! Free functions that don't fit a single noun's `Resource<T>` surface:
//! cross-repository reads and the one genuinely multi-Block write.

use std::collections::HashMap;
use std::sync::Arc;

use littera_align::{alignment_gaps_report as compute_gaps, AlignmentGap};
use littera_core::{Block, BlockAlignment, Mention, Result};
use littera_data::{BlockRepository, EntityLabelRepository, MentionRepository, WorkRepository};
use uuid::Uuid;

use crate::resource::StatusProbe;

/// Applies a whole editor save — creates, updates, and deletes — in one
/// transaction via `BlockRepository::apply_batch`.
pub async fn batch_update_blocks(
    repo: &dyn BlockRepository,
    creates: &[Block],
    updates: &[Block],
    deletes: &[Uuid],
) -> Result<()> {
    repo.apply_batch(creates, updates, deletes).await
}

/// Recomputes the translation-gap report for a set of existing alignments.
///
/// The language a gap is measured against comes from each Block's own
/// `language` field — not from whatever its Mentions happen to be in, since
/// a Block can be a legitimate translation target while mentioning no
/// Entity at all. Whether an Entity is "labelled" in that language is
/// likewise read from `EntityLabelRepository`, the actual source of labels,
/// rather than inferred from Mention languages.
pub async fn alignment_gaps_report(
    alignments: &[BlockAlignment],
    block_repo: &dyn BlockRepository,
    mention_repo: &dyn MentionRepository,
    label_repo: &dyn EntityLabelRepository,
) -> Result<Vec<AlignmentGap>> {
    let mut mentions_by_block: HashMap<Uuid, Vec<Mention>> = HashMap::new();
    let mut block_languages: HashMap<Uuid, String> = HashMap::new();
    let mut labelled_languages: HashMap<Uuid, std::collections::HashSet<String>> = HashMap::new();

    for alignment in alignments {
        for block_id in [alignment.block_a, alignment.block_b] {
            if mentions_by_block.contains_key(&block_id) {
                continue;
            }
            let block = block_repo.get(block_id).await?;
            block_languages.insert(block_id, block.language.clone());

            let mentions = mention_repo.list_by_block(block_id).await?;
            for mention in &mentions {
                if !labelled_languages.contains_key(&mention.entity_id) {
                    let languages: std::collections::HashSet<String> = label_repo
                        .list_by_entity(mention.entity_id)
                        .await?
                        .into_iter()
                        .map(|label| label.language)
                        .collect();
                    labelled_languages.insert(mention.entity_id, languages);
                }
            }
            mentions_by_block.insert(block_id, mentions);
        }
    }

    Ok(compute_gaps(alignments, &mentions_by_block, &block_languages, &labelled_languages))
}

/// A lightweight reachability/health check for a single Work's storage
/// cluster, used by front ends to show a status indicator without forcing a
/// full page of data through.
pub async fn status_probe(work_repo: Arc<dyn WorkRepository>, work_id: Uuid) -> StatusProbe {
    match work_repo.document_count(work_id).await {
        Ok(count) => StatusProbe {
            work_id,
            document_count: count,
            reachable: true,
        },
        Err(_) => StatusProbe {
            work_id,
            document_count: 0,
            reachable: false,
        },
    }
}
