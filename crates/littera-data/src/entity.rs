use async_trait::async_trait;
use deadpool_postgres::Pool;
use littera_core::{Entity, EntityLabel, EntityWorkMetadata, LitteraError, Result};
use tokio_postgres::Row;
use uuid::Uuid;

#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn create(&self, entity: &Entity) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Entity>;
    async fn list(&self) -> Result<Vec<Entity>>;
    async fn update_properties(&self, id: Uuid, properties: serde_json::Value) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait EntityLabelRepository: Send + Sync {
    async fn upsert(&self, label: &EntityLabel) -> Result<()>;
    async fn get(&self, entity_id: Uuid, language: &str) -> Result<EntityLabel>;
    async fn list_by_entity(&self, entity_id: Uuid) -> Result<Vec<EntityLabel>>;
    async fn delete(&self, entity_id: Uuid, language: &str) -> Result<()>;
    /// All labels in `language`, for a mention-discovery session to fetch
    /// once and then filter locally on every keystroke.
    async fn search(&self, language: &str) -> Result<Vec<EntityLabel>>;
}

#[async_trait]
pub trait EntityWorkMetadataRepository: Send + Sync {
    async fn upsert(&self, metadata: &EntityWorkMetadata) -> Result<()>;
    async fn get(&self, entity_id: Uuid, work_id: Uuid) -> Result<EntityWorkMetadata>;
    async fn list_by_work(&self, work_id: Uuid) -> Result<Vec<EntityWorkMetadata>>;
    async fn delete(&self, entity_id: Uuid, work_id: Uuid) -> Result<()>;
}

pub struct PgEntityRepository {
    pool: Pool,
}

impl PgEntityRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_entity(row: &Row) -> Entity {
    Entity {
        id: row.get("id"),
        properties: row.get("properties"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl EntityRepository for PgEntityRepository {
    async fn create(&self, entity: &Entity) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO entities (id, properties, created_at) VALUES ($1, $2, $3)",
                &[&entity.id, &entity.properties, &entity.created_at],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Entity> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, properties, created_at FROM entities WHERE id = $1", &[&id])
            .await?
            .ok_or_else(|| LitteraError::NotFound(format!("entity {id}")))?;
        Ok(row_to_entity(&row))
    }

    async fn list(&self) -> Result<Vec<Entity>> {
        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT id, properties, created_at FROM entities ORDER BY created_at", &[])
            .await?;
        Ok(rows.iter().map(row_to_entity).collect())
    }

    async fn update_properties(&self, id: Uuid, properties: serde_json::Value) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client
            .execute("UPDATE entities SET properties = $1 WHERE id = $2", &[&properties, &id])
            .await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("entity {id}")));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client.execute("DELETE FROM entities WHERE id = $1", &[&id]).await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("entity {id}")));
        }
        Ok(())
    }
}

pub struct PgEntityLabelRepository {
    pool: Pool,
}

impl PgEntityLabelRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_label(row: &Row) -> EntityLabel {
    EntityLabel {
        entity_id: row.get("entity_id"),
        language: row.get("language"),
        text: row.get("text"),
        aliases: row.get("aliases"),
    }
}

#[async_trait]
impl EntityLabelRepository for PgEntityLabelRepository {
    async fn upsert(&self, label: &EntityLabel) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO entity_labels (entity_id, language, text, aliases)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (entity_id, language)
                 DO UPDATE SET text = EXCLUDED.text, aliases = EXCLUDED.aliases",
                &[&label.entity_id, &label.language, &label.text, &label.aliases],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, entity_id: Uuid, language: &str) -> Result<EntityLabel> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT entity_id, language, text, aliases FROM entity_labels
                 WHERE entity_id = $1 AND language = $2",
                &[&entity_id, &language],
            )
            .await?
            .ok_or_else(|| LitteraError::NotFound(format!("label for entity {entity_id} in {language}")))?;
        Ok(row_to_label(&row))
    }

    async fn list_by_entity(&self, entity_id: Uuid) -> Result<Vec<EntityLabel>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT entity_id, language, text, aliases FROM entity_labels WHERE entity_id = $1",
                &[&entity_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_label).collect())
    }

    async fn delete(&self, entity_id: Uuid, language: &str) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client
            .execute(
                "DELETE FROM entity_labels WHERE entity_id = $1 AND language = $2",
                &[&entity_id, &language],
            )
            .await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("label for entity {entity_id} in {language}")));
        }
        Ok(())
    }

    async fn search(&self, language: &str) -> Result<Vec<EntityLabel>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT entity_id, language, text, aliases FROM entity_labels WHERE language = $1 ORDER BY text",
                &[&language],
            )
            .await?;
        Ok(rows.iter().map(row_to_label).collect())
    }
}

pub struct PgEntityWorkMetadataRepository {
    pool: Pool,
}

impl PgEntityWorkMetadataRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_work_metadata(row: &Row) -> EntityWorkMetadata {
    EntityWorkMetadata {
        entity_id: row.get("entity_id"),
        work_id: row.get("work_id"),
        notes: row.get("notes"),
        metadata: row.get("metadata"),
    }
}

#[async_trait]
impl EntityWorkMetadataRepository for PgEntityWorkMetadataRepository {
    async fn upsert(&self, metadata: &EntityWorkMetadata) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO entity_work_metadata (entity_id, work_id, notes, metadata)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (entity_id, work_id)
                 DO UPDATE SET notes = EXCLUDED.notes, metadata = EXCLUDED.metadata",
                &[&metadata.entity_id, &metadata.work_id, &metadata.notes, &metadata.metadata],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, entity_id: Uuid, work_id: Uuid) -> Result<EntityWorkMetadata> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT entity_id, work_id, notes, metadata FROM entity_work_metadata
                 WHERE entity_id = $1 AND work_id = $2",
                &[&entity_id, &work_id],
            )
            .await?
            .ok_or_else(|| LitteraError::NotFound(format!("metadata for entity {entity_id} in work {work_id}")))?;
        Ok(row_to_work_metadata(&row))
    }

    async fn list_by_work(&self, work_id: Uuid) -> Result<Vec<EntityWorkMetadata>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT entity_id, work_id, notes, metadata FROM entity_work_metadata WHERE work_id = $1",
                &[&work_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_work_metadata).collect())
    }

    async fn delete(&self, entity_id: Uuid, work_id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client
            .execute(
                "DELETE FROM entity_work_metadata WHERE entity_id = $1 AND work_id = $2",
                &[&entity_id, &work_id],
            )
            .await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("metadata for entity {entity_id} in work {work_id}")));
        }
        Ok(())
    }
}

/// In-memory stand-ins for unit tests that don't need a live cluster.
#[derive(Default)]
pub struct InMemoryEntityRepository {
    inner: std::sync::Mutex<Vec<Entity>>,
}

#[async_trait]
impl EntityRepository for InMemoryEntityRepository {
    async fn create(&self, entity: &Entity) -> Result<()> {
        self.inner.lock().unwrap().push(entity.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Entity> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| LitteraError::NotFound(format!("entity {id}")))
    }

    async fn list(&self) -> Result<Vec<Entity>> {
        Ok(self.inner.lock().unwrap().clone())
    }

    async fn update_properties(&self, id: Uuid, properties: serde_json::Value) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let entity = guard
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| LitteraError::NotFound(format!("entity {id}")))?;
        entity.properties = properties;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.len();
        guard.retain(|e| e.id != id);
        if guard.len() == before {
            return Err(LitteraError::NotFound(format!("entity {id}")));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryEntityLabelRepository {
    inner: std::sync::Mutex<Vec<EntityLabel>>,
}

#[async_trait]
impl EntityLabelRepository for InMemoryEntityLabelRepository {
    async fn upsert(&self, label: &EntityLabel) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        if let Some(existing) = guard
            .iter_mut()
            .find(|l| l.entity_id == label.entity_id && l.language == label.language)
        {
            *existing = label.clone();
        } else {
            guard.push(label.clone());
        }
        Ok(())
    }

    async fn get(&self, entity_id: Uuid, language: &str) -> Result<EntityLabel> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.entity_id == entity_id && l.language == language)
            .cloned()
            .ok_or_else(|| LitteraError::NotFound(format!("label for entity {entity_id} in {language}")))
    }

    async fn list_by_entity(&self, entity_id: Uuid) -> Result<Vec<EntityLabel>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, entity_id: Uuid, language: &str) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.len();
        guard.retain(|l| !(l.entity_id == entity_id && l.language == language));
        if guard.len() == before {
            return Err(LitteraError::NotFound(format!("label for entity {entity_id} in {language}")));
        }
        Ok(())
    }

    async fn search(&self, language: &str) -> Result<Vec<EntityLabel>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.language == language)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryEntityWorkMetadataRepository {
    inner: std::sync::Mutex<Vec<EntityWorkMetadata>>,
}

#[async_trait]
impl EntityWorkMetadataRepository for InMemoryEntityWorkMetadataRepository {
    async fn upsert(&self, metadata: &EntityWorkMetadata) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        if let Some(existing) = guard
            .iter_mut()
            .find(|m| m.entity_id == metadata.entity_id && m.work_id == metadata.work_id)
        {
            *existing = metadata.clone();
        } else {
            guard.push(metadata.clone());
        }
        Ok(())
    }

    async fn get(&self, entity_id: Uuid, work_id: Uuid) -> Result<EntityWorkMetadata> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.entity_id == entity_id && m.work_id == work_id)
            .cloned()
            .ok_or_else(|| LitteraError::NotFound(format!("metadata for entity {entity_id} in work {work_id}")))
    }

    async fn list_by_work(&self, work_id: Uuid) -> Result<Vec<EntityWorkMetadata>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.work_id == work_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, entity_id: Uuid, work_id: Uuid) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.len();
        guard.retain(|m| !(m.entity_id == entity_id && m.work_id == work_id));
        if guard.len() == before {
            return Err(LitteraError::NotFound(format!("metadata for entity {entity_id} in work {work_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn upsert_label_overwrites_same_language() {
        let repo = InMemoryEntityLabelRepository::default();
        let entity_id = Uuid::new_v4();
        let label = EntityLabel {
            entity_id,
            language: "en".to_string(),
            text: "Paris".to_string(),
            aliases: vec![],
        };
        repo.upsert(&label).await.unwrap();
        let mut updated = label.clone();
        updated.text = "The City of Light".to_string();
        repo.upsert(&updated).await.unwrap();

        let labels = repo.list_by_entity(entity_id).await.unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text, "The City of Light");
    }

    #[tokio::test]
    async fn labels_are_scoped_per_language() {
        let repo = InMemoryEntityLabelRepository::default();
        let entity_id = Uuid::new_v4();
        repo.upsert(&EntityLabel {
            entity_id,
            language: "en".to_string(),
            text: "Paris".to_string(),
            aliases: vec![],
        })
        .await
        .unwrap();
        repo.upsert(&EntityLabel {
            entity_id,
            language: "fr".to_string(),
            text: "Paris".to_string(),
            aliases: vec!["Ville Lumière".to_string()],
        })
        .await
        .unwrap();
        assert_eq!(repo.list_by_entity(entity_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_properties_on_missing_entity_is_not_found() {
        let repo = InMemoryEntityRepository::default();
        let err = repo.update_properties(Uuid::new_v4(), json!({})).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn search_only_returns_requested_language() {
        let repo = InMemoryEntityLabelRepository::default();
        repo.upsert(&EntityLabel {
            entity_id: Uuid::new_v4(),
            language: "en".to_string(),
            text: "Paris".to_string(),
            aliases: vec![],
        })
        .await
        .unwrap();
        repo.upsert(&EntityLabel {
            entity_id: Uuid::new_v4(),
            language: "fr".to_string(),
            text: "Lyon".to_string(),
            aliases: vec![],
        })
        .await
        .unwrap();

        let results = repo.search("en").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "Paris");
    }

    #[tokio::test]
    async fn work_metadata_upsert_overwrites_same_pair() {
        let repo = InMemoryEntityWorkMetadataRepository::default();
        let entity_id = Uuid::new_v4();
        let work_id = Uuid::new_v4();
        repo.upsert(&EntityWorkMetadata {
            entity_id,
            work_id,
            notes: Some("first".to_string()),
            metadata: json!({}),
        })
        .await
        .unwrap();
        repo.upsert(&EntityWorkMetadata {
            entity_id,
            work_id,
            notes: Some("second".to_string()),
            metadata: json!({}),
        })
        .await
        .unwrap();

        let stored = repo.get(entity_id, work_id).await.unwrap();
        assert_eq!(stored.notes.as_deref(), Some("second"));
        assert_eq!(repo.list_by_work(work_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn entity_round_trips() {
        let repo = InMemoryEntityRepository::default();
        let entity = Entity {
            id: Uuid::new_v4(),
            properties: json!({"gender": "f"}),
            created_at: Utc::now(),
        };
        repo.create(&entity).await.unwrap();
        let fetched = repo.get(entity.id).await.unwrap();
        assert_eq!(fetched.properties, json!({"gender": "f"}));
    }
}
