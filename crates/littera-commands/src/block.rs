use chrono::Utc;
use littera_core::{Block, BlockKind, Result};
use uuid::Uuid;

use crate::output::CommandOutput;
use crate::workspace::Workspace;

pub struct BlockCommands;

impl BlockCommands {
    pub async fn create(
        ws: &Workspace,
        id: Uuid,
        section_id: Uuid,
        kind: BlockKind,
        heading_level: Option<i16>,
        language: &str,
        order_index: Option<i32>,
        source_text: &str,
    ) -> Result<CommandOutput> {
        let order_index = match order_index {
            Some(i) => i,
            None => next_order_index(ws, section_id).await?,
        };
        let now = Utc::now();
        let block = Block {
            id,
            section_id,
            kind,
            heading_level,
            language: language.to_string(),
            order_index,
            source_text: source_text.to_string(),
            created_at: now,
            updated_at: now,
        };
        ws.blocks.create(&block).await?;
        Ok(CommandOutput::from_value(format!("created block {id}"), &block))
    }

    pub async fn get(ws: &Workspace, id: Uuid) -> Result<CommandOutput> {
        let block = ws.blocks.get(id).await?;
        Ok(CommandOutput::from_value(block.source_text.clone(), &block))
    }

    pub async fn list(ws: &Workspace, section_id: Uuid) -> Result<CommandOutput> {
        let blocks = ws.blocks.list_by_section(section_id).await?;
        let human = blocks
            .iter()
            .map(|b| format!("{}\t{}\t{}", b.order_index, b.id, b.kind.as_str()))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CommandOutput::from_value(human, &blocks))
    }

    pub async fn set_text(ws: &Workspace, id: Uuid, source_text: &str) -> Result<CommandOutput> {
        let mut block = ws.blocks.get(id).await?;
        block.source_text = source_text.to_string();
        block.updated_at = Utc::now();
        ws.blocks.update(&block).await?;
        Ok(CommandOutput::message(format!("updated block {id}")))
    }

    pub async fn reorder(ws: &Workspace, id: Uuid, order_index: i32) -> Result<CommandOutput> {
        let mut block = ws.blocks.get(id).await?;
        block.order_index = order_index;
        ws.blocks.update(&block).await?;
        Ok(CommandOutput::message(format!("moved block {id} to position {order_index}")))
    }

    pub async fn delete(ws: &Workspace, id: Uuid, dry_run: bool) -> Result<CommandOutput> {
        if dry_run {
            ws.blocks.get(id).await?;
            return Ok(CommandOutput::message(format!("would delete block {id}")));
        }
        ws.blocks.delete(id).await?;
        Ok(CommandOutput::message(format!("deleted block {id}")))
    }
}

async fn next_order_index(ws: &Workspace, section_id: Uuid) -> Result<i32> {
    let existing = ws.blocks.list_by_section(section_id).await?;
    Ok(existing.iter().map(|b| b.order_index).max().map(|m| m + 1).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tests::in_memory_workspace;

    #[tokio::test]
    async fn create_and_set_text_round_trips() {
        let ws = in_memory_workspace();
        let id = Uuid::new_v4();
        BlockCommands::create(&ws, id, Uuid::new_v4(), BlockKind::Paragraph, None, "en", None, "hello")
            .await
            .unwrap();
        BlockCommands::set_text(&ws, id, "goodbye").await.unwrap();
        let out = BlockCommands::get(&ws, id).await.unwrap();
        assert_eq!(out.human, "goodbye");
    }

    #[tokio::test]
    async fn dry_run_delete_does_not_remove_block() {
        let ws = in_memory_workspace();
        let id = Uuid::new_v4();
        BlockCommands::create(&ws, id, Uuid::new_v4(), BlockKind::Paragraph, None, "en", None, "hello")
            .await
            .unwrap();
        BlockCommands::delete(&ws, id, true).await.unwrap();
        assert!(BlockCommands::get(&ws, id).await.is_ok());
    }
}
