//! Translation-gap detection over an already-computed alignment set.
//!
//! For each aligned Block pair, an Entity mentioned on one side but never
//! labelled in the other side's language is a translation gap: a reader of
//! the target language would see a mention with nothing to call it.

use std::collections::HashMap;

use littera_core::{BlockAlignment, Mention};
use uuid::Uuid;

/// One missing translation surfaced by [`alignment_gaps_report`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AlignmentGap {
    pub alignment_id: Uuid,
    pub entity_id: Uuid,
    /// The language the Entity is mentioned in but has no label for.
    pub missing_language: String,
}

/// Walk `alignments`, and for each pair find Entities mentioned on one Block
/// that lack an `EntityLabel` in the other Block's language.
///
/// `mentions_by_block` maps a Block id to every Mention recorded on it.
/// `block_languages` maps a Block id to its own `language` field — the
/// target language a gap is measured against, independent of whether that
/// Block happens to carry any Mentions itself.
/// `labelled_languages` maps an Entity id to the set of languages it has a
/// real `EntityLabel` in.
pub fn alignment_gaps_report(
    alignments: &[BlockAlignment],
    mentions_by_block: &HashMap<Uuid, Vec<Mention>>,
    block_languages: &HashMap<Uuid, String>,
    labelled_languages: &HashMap<Uuid, std::collections::HashSet<String>>,
) -> Vec<AlignmentGap> {
    let mut gaps = Vec::new();
    let empty = Vec::new();
    let no_labels = std::collections::HashSet::new();

    for alignment in alignments {
        let a_mentions = mentions_by_block.get(&alignment.block_a).unwrap_or(&empty);
        let b_mentions = mentions_by_block.get(&alignment.block_b).unwrap_or(&empty);
        let b_language = block_languages.get(&alignment.block_b);
        let a_language = block_languages.get(&alignment.block_a);

        if let Some(target_language) = b_language {
            for mention in a_mentions {
                let labels = labelled_languages.get(&mention.entity_id).unwrap_or(&no_labels);
                if !labels.contains(target_language) {
                    gaps.push(AlignmentGap {
                        alignment_id: alignment.id,
                        entity_id: mention.entity_id,
                        missing_language: target_language.clone(),
                    });
                }
            }
        }

        if let Some(target_language) = a_language {
            for mention in b_mentions {
                let labels = labelled_languages.get(&mention.entity_id).unwrap_or(&no_labels);
                if !labels.contains(target_language) {
                    gaps.push(AlignmentGap {
                        alignment_id: alignment.id,
                        entity_id: mention.entity_id,
                        missing_language: target_language.clone(),
                    });
                }
            }
        }
    }

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use littera_core::AlignmentType;
    use serde_json::json;
    use std::collections::HashSet;

    fn mention(block_id: Uuid, entity_id: Uuid, language: &str) -> Mention {
        Mention {
            id: Uuid::new_v4(),
            block_id,
            entity_id,
            language: language.to_string(),
            features: json!({}),
            observed_surface_form: None,
        }
    }

    #[test]
    fn finds_entity_missing_target_label() {
        let block_a = Uuid::new_v4();
        let block_b = Uuid::new_v4();
        let entity = Uuid::new_v4();

        let alignment = BlockAlignment {
            id: Uuid::new_v4(),
            block_a,
            block_b,
            alignment_type: AlignmentType::Exact,
            confidence: 1.0,
        };

        let mut mentions_by_block = HashMap::new();
        mentions_by_block.insert(block_a, vec![mention(block_a, entity, "en")]);
        mentions_by_block.insert(block_b, vec![mention(block_b, Uuid::new_v4(), "fr")]);

        let mut block_languages = HashMap::new();
        block_languages.insert(block_a, "en".to_string());
        block_languages.insert(block_b, "fr".to_string());

        let labelled = HashMap::new(); // entity has no labels anywhere

        let gaps = alignment_gaps_report(&[alignment], &mentions_by_block, &block_languages, &labelled);
        assert!(gaps.iter().any(|g| g.entity_id == entity && g.missing_language == "fr"));
    }

    #[test]
    fn no_gap_when_entity_is_labelled_in_target_language() {
        let block_a = Uuid::new_v4();
        let block_b = Uuid::new_v4();
        let entity = Uuid::new_v4();

        let alignment = BlockAlignment {
            id: Uuid::new_v4(),
            block_a,
            block_b,
            alignment_type: AlignmentType::Exact,
            confidence: 1.0,
        };

        let mut mentions_by_block = HashMap::new();
        mentions_by_block.insert(block_a, vec![mention(block_a, entity, "en")]);
        mentions_by_block.insert(block_b, vec![mention(block_b, entity, "fr")]);

        let mut block_languages = HashMap::new();
        block_languages.insert(block_a, "en".to_string());
        block_languages.insert(block_b, "fr".to_string());

        let mut labelled = HashMap::new();
        labelled.insert(entity, HashSet::from(["en".to_string(), "fr".to_string()]));

        let gaps = alignment_gaps_report(&[alignment], &mentions_by_block, &block_languages, &labelled);
        assert!(gaps.is_empty());
    }
}
