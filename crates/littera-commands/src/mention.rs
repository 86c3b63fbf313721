use littera_core::{Mention, Result};
use serde_json::Value;
use uuid::Uuid;

use crate::output::CommandOutput;
use crate::workspace::Workspace;

pub struct MentionCommands;

impl MentionCommands {
    pub async fn create(
        ws: &Workspace,
        id: Uuid,
        block_id: Uuid,
        entity_id: Uuid,
        language: &str,
        observed_surface_form: Option<String>,
        features: Value,
    ) -> Result<CommandOutput> {
        let mention = Mention {
            id,
            block_id,
            entity_id,
            language: language.to_string(),
            features,
            observed_surface_form,
        };
        ws.mentions.create(&mention).await?;
        Ok(CommandOutput::from_value(format!("created mention {id}"), &mention))
    }

    pub async fn list_by_block(ws: &Workspace, block_id: Uuid) -> Result<CommandOutput> {
        let mentions = ws.mentions.list_by_block(block_id).await?;
        let human = mentions
            .iter()
            .map(|m| format!("{}\t{}\t{}", m.language, m.entity_id, m.observed_surface_form.as_deref().unwrap_or("")))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CommandOutput::from_value(human, &mentions))
    }

    pub async fn list_by_entity(ws: &Workspace, entity_id: Uuid) -> Result<CommandOutput> {
        let mentions = ws.mentions.list_by_entity(entity_id).await?;
        Ok(CommandOutput::from_value(format!("{} mention(s)", mentions.len()), &mentions))
    }

    pub async fn delete(ws: &Workspace, id: Uuid) -> Result<CommandOutput> {
        ws.mentions.delete(id).await?;
        Ok(CommandOutput::message(format!("deleted mention {id}")))
    }
}
