use chrono::Utc;
use littera_core::{Entity, EntityLabel, EntityWorkMetadata, Result};
use serde_json::Value;
use uuid::Uuid;

use crate::output::CommandOutput;
use crate::workspace::Workspace;

pub struct EntityCommands;

impl EntityCommands {
    pub async fn create(ws: &Workspace, id: Uuid, properties: Value) -> Result<CommandOutput> {
        let entity = Entity {
            id,
            properties,
            created_at: Utc::now(),
        };
        ws.entities.create(&entity).await?;
        Ok(CommandOutput::from_value(format!("created entity {id}"), &entity))
    }

    pub async fn get(ws: &Workspace, id: Uuid) -> Result<CommandOutput> {
        let entity = ws.entities.get(id).await?;
        Ok(CommandOutput::from_value(entity.id.to_string(), &entity))
    }

    pub async fn list(ws: &Workspace) -> Result<CommandOutput> {
        let entities = ws.entities.list().await?;
        let human = entities.iter().map(|e| e.id.to_string()).collect::<Vec<_>>().join("\n");
        Ok(CommandOutput::from_value(human, &entities))
    }

    pub async fn set_property(ws: &Workspace, id: Uuid, key: &str, value: Value) -> Result<CommandOutput> {
        let mut entity = ws.entities.get(id).await?;
        let object = entity.properties.as_object_mut().expect("properties is a JSON object");
        if object.get(key) == Some(&value) {
            return Ok(CommandOutput::message(format!("property \"{key}\" on entity {id} already set to that value")));
        }
        object.insert(key.to_string(), value);
        ws.entities.update_properties(id, entity.properties.clone()).await?;
        Ok(CommandOutput::message(format!("set property \"{key}\" on entity {id}")))
    }

    pub async fn delete(ws: &Workspace, id: Uuid, force: bool, dry_run: bool) -> Result<CommandOutput> {
        let mention_count = ws.mentions.list_by_entity(id).await?.len();
        if mention_count > 0 && !force {
            return Err(littera_core::LitteraError::InvariantViolation(format!(
                "entity {id} has {mention_count} mention(s); pass --force to delete anyway"
            )));
        }
        if dry_run {
            return Ok(CommandOutput::message(format!(
                "would delete entity {id} and cascade to {mention_count} mention(s)"
            )));
        }
        ws.entities.delete(id).await?;
        Ok(CommandOutput::message(format!("deleted entity {id}")))
    }
}

pub struct LabelCommands;

impl LabelCommands {
    pub async fn set(ws: &Workspace, entity_id: Uuid, language: &str, text: &str, aliases: Vec<String>) -> Result<CommandOutput> {
        let label = EntityLabel {
            entity_id,
            language: language.to_string(),
            text: text.to_string(),
            aliases,
        };
        ws.labels.upsert(&label).await?;
        Ok(CommandOutput::from_value(
            format!("set {language} label for entity {entity_id} to \"{text}\""),
            &label,
        ))
    }

    pub async fn get(ws: &Workspace, entity_id: Uuid, language: &str) -> Result<CommandOutput> {
        let label = ws.labels.get(entity_id, language).await?;
        Ok(CommandOutput::from_value(label.text.clone(), &label))
    }

    pub async fn list(ws: &Workspace, entity_id: Uuid) -> Result<CommandOutput> {
        let labels = ws.labels.list_by_entity(entity_id).await?;
        let human = labels
            .iter()
            .map(|l| format!("{}\t{}", l.language, l.text))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CommandOutput::from_value(human, &labels))
    }

    pub async fn delete(ws: &Workspace, entity_id: Uuid, language: &str) -> Result<CommandOutput> {
        ws.labels.delete(entity_id, language).await?;
        Ok(CommandOutput::message(format!("deleted {language} label for entity {entity_id}")))
    }
}

pub struct EntityWorkMetadataCommands;

impl EntityWorkMetadataCommands {
    pub async fn set(
        ws: &Workspace,
        entity_id: Uuid,
        work_id: Uuid,
        notes: Option<String>,
        metadata: Value,
    ) -> Result<CommandOutput> {
        let record = EntityWorkMetadata {
            entity_id,
            work_id,
            notes,
            metadata,
        };
        ws.work_metadata.upsert(&record).await?;
        Ok(CommandOutput::from_value(
            format!("set metadata for entity {entity_id} in work {work_id}"),
            &record,
        ))
    }

    pub async fn get(ws: &Workspace, entity_id: Uuid, work_id: Uuid) -> Result<CommandOutput> {
        let record = ws.work_metadata.get(entity_id, work_id).await?;
        Ok(CommandOutput::from_value(
            record.notes.clone().unwrap_or_default(),
            &record,
        ))
    }

    pub async fn clear(ws: &Workspace, entity_id: Uuid, work_id: Uuid) -> Result<CommandOutput> {
        ws.work_metadata.delete(entity_id, work_id).await?;
        Ok(CommandOutput::message(format!("cleared metadata for entity {entity_id} in work {work_id}")))
    }
}
