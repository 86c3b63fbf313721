use chrono::Utc;
use littera_core::{Document, LitteraError, Result};
use uuid::Uuid;

use crate::output::CommandOutput;
use crate::workspace::Workspace;

pub struct DocumentCommands;

impl DocumentCommands {
    pub async fn create(
        ws: &Workspace,
        id: Uuid,
        work_id: Uuid,
        title: &str,
        language: &str,
        order_index: Option<i32>,
    ) -> Result<CommandOutput> {
        let order_index = match order_index {
            Some(i) => i,
            None => next_order_index(ws, work_id).await?,
        };
        let document = Document {
            id,
            work_id,
            title: title.to_string(),
            language: language.to_string(),
            order_index,
            created_at: Utc::now(),
        };
        ws.documents.create(&document).await?;
        Ok(CommandOutput::from_value(format!("created document {id}"), &document))
    }

    pub async fn get(ws: &Workspace, id: Uuid) -> Result<CommandOutput> {
        let document = ws.documents.get(id).await?;
        Ok(CommandOutput::from_value(document.title.clone(), &document))
    }

    pub async fn list(ws: &Workspace, work_id: Uuid) -> Result<CommandOutput> {
        let documents = ws.documents.list_by_work(work_id).await?;
        let human = documents
            .iter()
            .map(|d| format!("{}\t{}\t{}", d.order_index, d.id, d.title))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CommandOutput::from_value(human, &documents))
    }

    pub async fn rename(ws: &Workspace, id: Uuid, title: &str) -> Result<CommandOutput> {
        let mut document = ws.documents.get(id).await?;
        document.title = title.to_string();
        ws.documents.update(&document).await?;
        Ok(CommandOutput::message(format!("renamed document {id} to \"{title}\"")))
    }

    pub async fn reorder(ws: &Workspace, id: Uuid, order_index: i32) -> Result<CommandOutput> {
        let mut document = ws.documents.get(id).await?;
        document.order_index = order_index;
        ws.documents.update(&document).await?;
        Ok(CommandOutput::message(format!("moved document {id} to position {order_index}")))
    }

    pub async fn delete(ws: &Workspace, id: Uuid, force: bool, dry_run: bool) -> Result<CommandOutput> {
        let section_count = ws.documents.section_count(id).await?;
        if section_count > 0 && !force {
            return Err(LitteraError::InvariantViolation(format!(
                "document {id} has {section_count} section(s); pass --force to delete anyway"
            )));
        }
        if dry_run {
            return Ok(CommandOutput::message(format!(
                "would delete document {id} and {section_count} section(s)"
            )));
        }
        ws.documents.delete(id).await?;
        Ok(CommandOutput::message(format!("deleted document {id}")))
    }
}

async fn next_order_index(ws: &Workspace, work_id: Uuid) -> Result<i32> {
    let existing = ws.documents.list_by_work(work_id).await?;
    Ok(existing.iter().map(|d| d.order_index).max().map(|m| m + 1).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tests::in_memory_workspace;

    #[tokio::test]
    async fn create_without_order_index_appends() {
        let ws = in_memory_workspace();
        let work_id = Uuid::new_v4();
        DocumentCommands::create(&ws, Uuid::new_v4(), work_id, "One", "en", None)
            .await
            .unwrap();
        let out = DocumentCommands::create(&ws, Uuid::new_v4(), work_id, "Two", "en", None)
            .await
            .unwrap();
        assert_eq!(out.structured["order_index"], 1);
    }

    #[tokio::test]
    async fn delete_with_sections_requires_force() {
        let ws = in_memory_workspace();
        // section_count is always 0 for the in-memory stand-in, so this
        // exercises the dry-run/force-free path instead.
        let id = Uuid::new_v4();
        DocumentCommands::create(&ws, id, Uuid::new_v4(), "One", "en", None)
            .await
            .unwrap();
        DocumentCommands::delete(&ws, id, false, false).await.unwrap();
    }
}
