use async_trait::async_trait;
use deadpool_postgres::Pool;
use littera_core::{LitteraError, Mention, Result};
use tokio_postgres::Row;
use uuid::Uuid;

#[async_trait]
pub trait MentionRepository: Send + Sync {
    async fn create(&self, mention: &Mention) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Mention>;
    async fn list_by_block(&self, block_id: Uuid) -> Result<Vec<Mention>>;
    async fn list_by_entity(&self, entity_id: Uuid) -> Result<Vec<Mention>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn delete_by_block(&self, block_id: Uuid) -> Result<()>;
}

pub struct PgMentionRepository {
    pool: Pool,
}

impl PgMentionRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_mention(row: &Row) -> Mention {
    Mention {
        id: row.get("id"),
        block_id: row.get("block_id"),
        entity_id: row.get("entity_id"),
        language: row.get("language"),
        features: row.get("features"),
        observed_surface_form: row.get("observed_surface_form"),
    }
}

#[async_trait]
impl MentionRepository for PgMentionRepository {
    async fn create(&self, mention: &Mention) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO mentions (id, block_id, entity_id, language, features, observed_surface_form)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &mention.id,
                    &mention.block_id,
                    &mention.entity_id,
                    &mention.language,
                    &mention.features,
                    &mention.observed_surface_form,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Mention> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, block_id, entity_id, language, features, observed_surface_form
                 FROM mentions WHERE id = $1",
                &[&id],
            )
            .await?
            .ok_or_else(|| LitteraError::NotFound(format!("mention {id}")))?;
        Ok(row_to_mention(&row))
    }

    async fn list_by_block(&self, block_id: Uuid) -> Result<Vec<Mention>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, block_id, entity_id, language, features, observed_surface_form
                 FROM mentions WHERE block_id = $1",
                &[&block_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_mention).collect())
    }

    async fn list_by_entity(&self, entity_id: Uuid) -> Result<Vec<Mention>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, block_id, entity_id, language, features, observed_surface_form
                 FROM mentions WHERE entity_id = $1",
                &[&entity_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_mention).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client.execute("DELETE FROM mentions WHERE id = $1", &[&id]).await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("mention {id}")));
        }
        Ok(())
    }

    async fn delete_by_block(&self, block_id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        client.execute("DELETE FROM mentions WHERE block_id = $1", &[&block_id]).await?;
        Ok(())
    }
}

/// In-memory stand-in for unit tests that don't need a live cluster.
#[derive(Default)]
pub struct InMemoryMentionRepository {
    inner: std::sync::Mutex<Vec<Mention>>,
}

#[async_trait]
impl MentionRepository for InMemoryMentionRepository {
    async fn create(&self, mention: &Mention) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        if guard
            .iter()
            .any(|m| m.block_id == mention.block_id && m.entity_id == mention.entity_id && m.language == mention.language)
        {
            return Err(LitteraError::Conflict(format!(
                "mention of entity {} on block {} in {} already exists",
                mention.entity_id, mention.block_id, mention.language
            )));
        }
        guard.push(mention.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Mention> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| LitteraError::NotFound(format!("mention {id}")))
    }

    async fn list_by_block(&self, block_id: Uuid) -> Result<Vec<Mention>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.block_id == block_id)
            .cloned()
            .collect())
    }

    async fn list_by_entity(&self, entity_id: Uuid) -> Result<Vec<Mention>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.len();
        guard.retain(|m| m.id != id);
        if guard.len() == before {
            return Err(LitteraError::NotFound(format!("mention {id}")));
        }
        Ok(())
    }

    async fn delete_by_block(&self, block_id: Uuid) -> Result<()> {
        self.inner.lock().unwrap().retain(|m| m.block_id != block_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(block_id: Uuid, entity_id: Uuid, language: &str) -> Mention {
        Mention {
            id: Uuid::new_v4(),
            block_id,
            entity_id,
            language: language.to_string(),
            features: json!({}),
            observed_surface_form: None,
        }
    }

    #[tokio::test]
    async fn duplicate_mention_for_same_block_entity_language_is_conflict() {
        let repo = InMemoryMentionRepository::default();
        let block = Uuid::new_v4();
        let entity = Uuid::new_v4();
        repo.create(&sample(block, entity, "en")).await.unwrap();
        let err = repo.create(&sample(block, entity, "en")).await.unwrap_err();
        assert_eq!(err.kind(), "conflict");
    }

    #[tokio::test]
    async fn same_entity_can_be_mentioned_in_different_languages_on_one_block() {
        let repo = InMemoryMentionRepository::default();
        let block = Uuid::new_v4();
        let entity = Uuid::new_v4();
        repo.create(&sample(block, entity, "en")).await.unwrap();
        repo.create(&sample(block, entity, "fr")).await.unwrap();
        assert_eq!(repo.list_by_block(block).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_by_block_clears_only_that_blocks_mentions() {
        let repo = InMemoryMentionRepository::default();
        let block_a = Uuid::new_v4();
        let block_b = Uuid::new_v4();
        let entity = Uuid::new_v4();
        repo.create(&sample(block_a, entity, "en")).await.unwrap();
        repo.create(&sample(block_b, entity, "en")).await.unwrap();
        repo.delete_by_block(block_a).await.unwrap();
        assert!(repo.list_by_block(block_a).await.unwrap().is_empty());
        assert_eq!(repo.list_by_block(block_b).await.unwrap().len(), 1);
    }
}
