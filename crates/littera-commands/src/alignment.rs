use std::collections::{HashMap, HashSet};

use littera_align::{align_blocks, alignment_gaps_report, MentionedBlock};
use littera_core::{AlignmentType, BlockAlignment, Result};
use uuid::Uuid;

use crate::output::CommandOutput;
use crate::workspace::Workspace;

pub struct AlignmentCommands;

impl AlignmentCommands {
    pub async fn create(
        ws: &Workspace,
        id: Uuid,
        block_a: Uuid,
        block_b: Uuid,
        alignment_type: AlignmentType,
        confidence: f64,
    ) -> Result<CommandOutput> {
        let alignment = BlockAlignment {
            id,
            block_a,
            block_b,
            alignment_type,
            confidence,
        };
        ws.alignments.create(&alignment).await?;
        Ok(CommandOutput::from_value(format!("created alignment {id}"), &alignment))
    }

    pub async fn list_for_block(ws: &Workspace, block_id: Uuid) -> Result<CommandOutput> {
        let alignments = ws.alignments.list_for_block(block_id).await?;
        let human = alignments
            .iter()
            .map(|a| format!("{}\t{:.2}\t{}<->{}", a.alignment_type.as_str(), a.confidence, a.block_a, a.block_b))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CommandOutput::from_value(human, &alignments))
    }

    pub async fn delete(ws: &Workspace, id: Uuid) -> Result<CommandOutput> {
        ws.alignments.delete(id).await?;
        Ok(CommandOutput::message(format!("deleted alignment {id}")))
    }

    /// Recomputes alignments between two Block sequences — typically the
    /// leaf Blocks of two Documents in different languages covering the same
    /// underlying work — and replaces whatever was stored for either side.
    pub async fn recompute(ws: &Workspace, left_ids: &[Uuid], right_ids: &[Uuid]) -> Result<CommandOutput> {
        let left_blocks = fetch_blocks(ws, left_ids).await?;
        let right_blocks = fetch_blocks(ws, right_ids).await?;

        let mut left_mentioned = Vec::with_capacity(left_blocks.len());
        for block in &left_blocks {
            left_mentioned.push(MentionedBlock::new(block, entity_ids(ws, block.id).await?));
        }
        let mut right_mentioned = Vec::with_capacity(right_blocks.len());
        for block in &right_blocks {
            right_mentioned.push(MentionedBlock::new(block, entity_ids(ws, block.id).await?));
        }

        let fresh = align_blocks(&left_mentioned, &right_mentioned);
        let count = fresh.len();
        let touched: Vec<Uuid> = left_ids.iter().chain(right_ids.iter()).copied().collect();
        ws.alignments.replace_for_blocks(&touched, &fresh).await?;
        Ok(CommandOutput::from_value(format!("recomputed {count} alignment(s)"), &fresh))
    }

    /// Reports translation gaps across every alignment touching `block_id`:
    /// Entities mentioned on one side with no label in the other side's
    /// language.
    pub async fn gaps(ws: &Workspace, block_id: Uuid) -> Result<CommandOutput> {
        let alignments = ws.alignments.list_for_block(block_id).await?;

        let mut mentions_by_block: HashMap<Uuid, Vec<littera_core::Mention>> = HashMap::new();
        let mut block_languages: HashMap<Uuid, String> = HashMap::new();
        let mut labelled_languages: HashMap<Uuid, HashSet<String>> = HashMap::new();

        for alignment in &alignments {
            for id in [alignment.block_a, alignment.block_b] {
                if mentions_by_block.contains_key(&id) {
                    continue;
                }
                let block = ws.blocks.get(id).await?;
                block_languages.insert(id, block.language.clone());

                let mentions = ws.mentions.list_by_block(id).await?;
                for mention in &mentions {
                    if !labelled_languages.contains_key(&mention.entity_id) {
                        let languages: HashSet<String> = ws
                            .labels
                            .list_by_entity(mention.entity_id)
                            .await?
                            .into_iter()
                            .map(|label| label.language)
                            .collect();
                        labelled_languages.insert(mention.entity_id, languages);
                    }
                }
                mentions_by_block.insert(id, mentions);
            }
        }

        let gaps = alignment_gaps_report(&alignments, &mentions_by_block, &block_languages, &labelled_languages);
        let human = gaps
            .iter()
            .map(|g| format!("{}\tentity {} missing {}", g.alignment_id, g.entity_id, g.missing_language))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CommandOutput::from_value(human, &gaps))
    }
}

async fn fetch_blocks(ws: &Workspace, ids: &[Uuid]) -> Result<Vec<littera_core::Block>> {
    let mut blocks = Vec::with_capacity(ids.len());
    for &id in ids {
        blocks.push(ws.blocks.get(id).await?);
    }
    Ok(blocks)
}

async fn entity_ids(ws: &Workspace, block_id: Uuid) -> Result<HashSet<Uuid>> {
    Ok(ws.mentions.list_by_block(block_id).await?.into_iter().map(|m| m.entity_id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tests::in_memory_workspace;

    #[tokio::test]
    async fn create_then_list_for_block() {
        let ws = in_memory_workspace();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        AlignmentCommands::create(&ws, Uuid::new_v4(), a, b, AlignmentType::Exact, 0.9)
            .await
            .unwrap();
        let out = AlignmentCommands::list_for_block(&ws, a).await.unwrap();
        assert!(out.human.contains("exact"));
    }

    #[tokio::test]
    async fn recompute_with_disjoint_mentions_produces_no_alignments() {
        use littera_core::{Block, BlockKind};

        let ws = in_memory_workspace();
        let left_block = Block::new(Uuid::new_v4(), BlockKind::Paragraph, None, "en", 0, "text");
        let right_block = Block::new(Uuid::new_v4(), BlockKind::Paragraph, None, "fr", 5, "texte");
        ws.blocks.create(&left_block).await.unwrap();
        ws.blocks.create(&right_block).await.unwrap();

        let out = AlignmentCommands::recompute(&ws, &[left_block.id], &[right_block.id]).await.unwrap();
        assert_eq!(out.structured.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn gaps_reports_entity_unlabelled_in_target_language() {
        use littera_core::{Block, BlockKind, EntityLabel, Mention};

        let ws = in_memory_workspace();
        let entity = Uuid::new_v4();
        let block_a = Block::new(Uuid::new_v4(), BlockKind::Paragraph, None, "en", 0, "text");
        let block_b = Block::new(Uuid::new_v4(), BlockKind::Paragraph, None, "pl", 0, "tekst");
        ws.blocks.create(&block_a).await.unwrap();
        ws.blocks.create(&block_b).await.unwrap();

        ws.mentions
            .create(&Mention {
                id: Uuid::new_v4(),
                block_id: block_a.id,
                entity_id: entity,
                language: "en".to_string(),
                features: serde_json::json!({}),
                observed_surface_form: None,
            })
            .await
            .unwrap();
        ws.labels
            .upsert(&EntityLabel { entity_id: entity, language: "en".to_string(), text: "Name".to_string(), aliases: vec![] })
            .await
            .unwrap();

        AlignmentCommands::create(&ws, Uuid::new_v4(), block_a.id, block_b.id, AlignmentType::Partial, 0.5)
            .await
            .unwrap();

        let out = AlignmentCommands::gaps(&ws, block_a.id).await.unwrap();
        assert!(out.human.contains("pl"));
    }
}
