use chrono::Utc;
use littera_core::{Result, Review, ReviewScope, Severity};
use uuid::Uuid;

use crate::output::CommandOutput;
use crate::workspace::Workspace;

pub struct ReviewCommands;

impl ReviewCommands {
    pub async fn create(
        ws: &Workspace,
        id: Uuid,
        work_id: Uuid,
        scope: ReviewScope,
        scope_id: Uuid,
        issue_type: &str,
        severity: Severity,
        message: &str,
    ) -> Result<CommandOutput> {
        let review = Review {
            id,
            work_id,
            scope,
            scope_id,
            issue_type: issue_type.to_string(),
            severity,
            message: message.to_string(),
            created_at: Utc::now(),
        };
        ws.reviews.create(&review).await?;
        Ok(CommandOutput::from_value(format!("created review {id}"), &review))
    }

    pub async fn list_by_work(ws: &Workspace, work_id: Uuid) -> Result<CommandOutput> {
        let reviews = ws.reviews.list_by_work(work_id).await?;
        Ok(CommandOutput::from_value(render_list(&reviews), &reviews))
    }

    pub async fn list_by_scope(ws: &Workspace, work_id: Uuid, scope: ReviewScope, scope_id: Uuid) -> Result<CommandOutput> {
        let reviews = ws.reviews.list_by_scope(work_id, scope, scope_id).await?;
        Ok(CommandOutput::from_value(render_list(&reviews), &reviews))
    }

    pub async fn delete(ws: &Workspace, id: Uuid) -> Result<CommandOutput> {
        ws.reviews.delete(id).await?;
        Ok(CommandOutput::message(format!("deleted review {id}")))
    }
}

fn render_list(reviews: &[Review]) -> String {
    reviews
        .iter()
        .map(|r| format!("{}\t{}\t{}", r.severity.as_str(), r.issue_type, r.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tests::in_memory_workspace;

    #[tokio::test]
    async fn create_then_list_by_work() {
        let ws = in_memory_workspace();
        let work_id = Uuid::new_v4();
        ReviewCommands::create(
            &ws,
            Uuid::new_v4(),
            work_id,
            ReviewScope::Work,
            work_id,
            "missing_label",
            Severity::Warning,
            "no French label for this entity",
        )
        .await
        .unwrap();
        let out = ReviewCommands::list_by_work(&ws, work_id).await.unwrap();
        assert!(out.human.contains("missing_label"));
    }

    #[tokio::test]
    async fn list_by_scope_filters_to_one_block() {
        let ws = in_memory_workspace();
        let work_id = Uuid::new_v4();
        let block = Uuid::new_v4();
        let other_block = Uuid::new_v4();
        ReviewCommands::create(&ws, Uuid::new_v4(), work_id, ReviewScope::Block, block, "gap", Severity::Info, "m")
            .await
            .unwrap();
        ReviewCommands::create(&ws, Uuid::new_v4(), work_id, ReviewScope::Block, other_block, "gap", Severity::Info, "m")
            .await
            .unwrap();
        let out = ReviewCommands::list_by_scope(&ws, work_id, ReviewScope::Block, block).await.unwrap();
        assert_eq!(out.structured.as_array().unwrap().len(), 1);
    }
}
