use chrono::Utc;
use littera_core::{LitteraError, Result, Section};
use uuid::Uuid;

use crate::output::CommandOutput;
use crate::workspace::Workspace;

pub struct SectionCommands;

impl SectionCommands {
    pub async fn create(
        ws: &Workspace,
        id: Uuid,
        document_id: Uuid,
        parent_id: Option<Uuid>,
        title: Option<&str>,
        order_index: Option<i32>,
    ) -> Result<CommandOutput> {
        let order_index = match order_index {
            Some(i) => i,
            None => next_order_index(ws, document_id).await?,
        };
        let section = Section {
            id,
            document_id,
            parent_id,
            title: title.map(|s| s.to_string()),
            order_index,
            created_at: Utc::now(),
        };
        ws.sections.create(&section).await?;
        Ok(CommandOutput::from_value(format!("created section {id}"), &section))
    }

    pub async fn get(ws: &Workspace, id: Uuid) -> Result<CommandOutput> {
        let section = ws.sections.get(id).await?;
        let label = section.title.clone().unwrap_or_else(|| "(untitled)".to_string());
        Ok(CommandOutput::from_value(label, &section))
    }

    pub async fn list(ws: &Workspace, document_id: Uuid) -> Result<CommandOutput> {
        let sections = ws.sections.list_by_document(document_id).await?;
        Ok(CommandOutput::from_value(render_list(&sections), &sections))
    }

    pub async fn list_children(ws: &Workspace, parent_id: Uuid) -> Result<CommandOutput> {
        let sections = ws.sections.list_children(parent_id).await?;
        Ok(CommandOutput::from_value(render_list(&sections), &sections))
    }

    pub async fn rename(ws: &Workspace, id: Uuid, title: &str) -> Result<CommandOutput> {
        let mut section = ws.sections.get(id).await?;
        section.title = Some(title.to_string());
        ws.sections.update(&section).await?;
        Ok(CommandOutput::message(format!("renamed section {id} to \"{title}\"")))
    }

    pub async fn reorder(ws: &Workspace, id: Uuid, order_index: i32) -> Result<CommandOutput> {
        let mut section = ws.sections.get(id).await?;
        section.order_index = order_index;
        ws.sections.update(&section).await?;
        Ok(CommandOutput::message(format!("moved section {id} to position {order_index}")))
    }

    pub async fn delete(ws: &Workspace, id: Uuid, force: bool, dry_run: bool) -> Result<CommandOutput> {
        let block_count = ws.sections.block_count(id).await?;
        let child_count = ws.sections.list_children(id).await?.len();
        if (block_count > 0 || child_count > 0) && !force {
            return Err(LitteraError::InvariantViolation(format!(
                "section {id} has {block_count} block(s) and {child_count} child section(s); pass --force to delete anyway"
            )));
        }
        if dry_run {
            return Ok(CommandOutput::message(format!("would delete section {id}")));
        }
        ws.sections.delete(id).await?;
        Ok(CommandOutput::message(format!("deleted section {id}")))
    }
}

fn render_list(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|s| format!("{}\t{}\t{}", s.order_index, s.id, s.title.as_deref().unwrap_or("(untitled)")))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn next_order_index(ws: &Workspace, document_id: Uuid) -> Result<i32> {
    let existing = ws.sections.list_by_document(document_id).await?;
    Ok(existing.iter().map(|s| s.order_index).max().map(|m| m + 1).unwrap_or(0))
}
