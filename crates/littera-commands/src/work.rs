use chrono::Utc;
use littera_core::{LitteraError, Result, Work};
use uuid::Uuid;

use crate::output::CommandOutput;
use crate::workspace::Workspace;

pub struct WorkCommands;

impl WorkCommands {
    pub async fn create(ws: &Workspace, id: Uuid, title: &str) -> Result<CommandOutput> {
        let work = Work {
            id,
            title: title.to_string(),
            created_at: Utc::now(),
        };
        ws.works.create(&work).await?;
        Ok(CommandOutput::from_value(format!("created work {id}"), &work))
    }

    pub async fn get(ws: &Workspace, id: Uuid) -> Result<CommandOutput> {
        let work = ws.works.get(id).await?;
        Ok(CommandOutput::from_value(format!("{} ({})", work.title, work.id), &work))
    }

    pub async fn list(ws: &Workspace) -> Result<CommandOutput> {
        let works = ws.works.list().await?;
        let human = works
            .iter()
            .map(|w| format!("{}\t{}", w.id, w.title))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CommandOutput::from_value(human, &works))
    }

    pub async fn rename(ws: &Workspace, id: Uuid, title: &str) -> Result<CommandOutput> {
        ws.works.update_title(id, title).await?;
        Ok(CommandOutput::message(format!("renamed work {id} to \"{title}\"")))
    }

    /// Deletes a Work. Non-empty Works (any Documents) require `force`,
    /// matching the Command Surface's non-empty-parent discipline.
    pub async fn delete(ws: &Workspace, id: Uuid, force: bool, dry_run: bool) -> Result<CommandOutput> {
        let document_count = ws.works.document_count(id).await?;
        if document_count > 0 && !force {
            let documents = ws.documents.list_by_work(id).await?;
            let names = documents
                .iter()
                .map(|d| d.title.clone())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(LitteraError::InvariantViolation(format!(
                "work {id} has {document_count} document(s) ({names}); pass --force to delete anyway"
            )));
        }
        if dry_run {
            return Ok(CommandOutput::message(format!(
                "would delete work {id} and {document_count} document(s)"
            )));
        }
        ws.works.delete(id).await?;
        Ok(CommandOutput::message(format!("deleted work {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tests::in_memory_workspace;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let ws = in_memory_workspace();
        let id = Uuid::new_v4();
        WorkCommands::create(&ws, id, "My Novel").await.unwrap();
        let out = WorkCommands::get(&ws, id).await.unwrap();
        assert!(out.human.contains("My Novel"));
    }

    #[tokio::test]
    async fn delete_non_empty_work_without_force_is_invariant_violation() {
        let ws = in_memory_workspace();
        let id = Uuid::new_v4();
        WorkCommands::create(&ws, id, "My Novel").await.unwrap();
        let err = WorkCommands::delete(&ws, id, false, false).await.unwrap_err();
        assert_eq!(err.kind(), "invariant_violation");
    }

    #[tokio::test]
    async fn dry_run_delete_touches_no_state() {
        let ws = in_memory_workspace();
        let id = Uuid::new_v4();
        WorkCommands::create(&ws, id, "My Novel").await.unwrap();
        WorkCommands::delete(&ws, id, true, true).await.unwrap();
        assert!(WorkCommands::get(&ws, id).await.is_ok());
    }
}
