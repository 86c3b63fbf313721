use async_trait::async_trait;
use deadpool_postgres::Pool;
use littera_core::{Block, BlockKind, LitteraError, Result};
use tokio_postgres::Row;
use uuid::Uuid;

#[async_trait]
pub trait BlockRepository: Send + Sync {
    async fn create(&self, block: &Block) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Block>;
    async fn list_by_section(&self, section_id: Uuid) -> Result<Vec<Block>>;
    async fn update(&self, block: &Block) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// Applies a whole editor save — every created, updated, and deleted
    /// Block — inside a single transaction, so a multi-Block save either
    /// lands completely or not at all.
    async fn apply_batch(&self, creates: &[Block], updates: &[Block], deletes: &[Uuid]) -> Result<()>;
}

pub struct PgBlockRepository {
    pool: Pool,
}

impl PgBlockRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_block(row: &Row) -> Block {
    let kind_str: String = row.get("kind");
    Block {
        id: row.get("id"),
        section_id: row.get("section_id"),
        kind: BlockKind::from(kind_str.as_str()),
        heading_level: row.get("heading_level"),
        language: row.get("language"),
        order_index: row.get("order_index"),
        source_text: row.get("source_text"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl BlockRepository for PgBlockRepository {
    async fn create(&self, block: &Block) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO blocks
                 (id, section_id, kind, heading_level, language, order_index, source_text, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &block.id,
                    &block.section_id,
                    &block.kind.as_str(),
                    &block.heading_level,
                    &block.language,
                    &block.order_index,
                    &block.source_text,
                    &block.created_at,
                    &block.updated_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Block> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, section_id, kind, heading_level, language, order_index, source_text, created_at, updated_at
                 FROM blocks WHERE id = $1",
                &[&id],
            )
            .await?
            .ok_or_else(|| LitteraError::NotFound(format!("block {id}")))?;
        Ok(row_to_block(&row))
    }

    async fn list_by_section(&self, section_id: Uuid) -> Result<Vec<Block>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, section_id, kind, heading_level, language, order_index, source_text, created_at, updated_at
                 FROM blocks WHERE section_id = $1 ORDER BY order_index",
                &[&section_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_block).collect())
    }

    async fn update(&self, block: &Block) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client
            .execute(
                "UPDATE blocks
                 SET kind = $1, heading_level = $2, language = $3, order_index = $4,
                     source_text = $5, updated_at = $6
                 WHERE id = $7",
                &[
                    &block.kind.as_str(),
                    &block.heading_level,
                    &block.language,
                    &block.order_index,
                    &block.source_text,
                    &block.updated_at,
                    &block.id,
                ],
            )
            .await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("block {}", block.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client.execute("DELETE FROM blocks WHERE id = $1", &[&id]).await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("block {id}")));
        }
        Ok(())
    }

    async fn apply_batch(&self, creates: &[Block], updates: &[Block], deletes: &[Uuid]) -> Result<()> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        for block in creates {
            tx.execute(
                "INSERT INTO blocks
                 (id, section_id, kind, heading_level, language, order_index, source_text, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &block.id,
                    &block.section_id,
                    &block.kind.as_str(),
                    &block.heading_level,
                    &block.language,
                    &block.order_index,
                    &block.source_text,
                    &block.created_at,
                    &block.updated_at,
                ],
            )
            .await?;
        }

        for block in updates {
            let affected = tx
                .execute(
                    "UPDATE blocks
                     SET kind = $1, heading_level = $2, language = $3, order_index = $4,
                         source_text = $5, updated_at = $6
                     WHERE id = $7",
                    &[
                        &block.kind.as_str(),
                        &block.heading_level,
                        &block.language,
                        &block.order_index,
                        &block.source_text,
                        &block.updated_at,
                        &block.id,
                    ],
                )
                .await?;
            if affected == 0 {
                // Dropping `tx` without commit rolls back every prior write in this batch.
                return Err(LitteraError::NotFound(format!("block {}", block.id)));
            }
        }

        for id in deletes {
            let affected = tx.execute("DELETE FROM blocks WHERE id = $1", &[id]).await?;
            if affected == 0 {
                return Err(LitteraError::NotFound(format!("block {id}")));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

/// In-memory stand-in for unit tests that don't need a live cluster.
#[derive(Default)]
pub struct InMemoryBlockRepository {
    inner: std::sync::Mutex<Vec<Block>>,
}

#[async_trait]
impl BlockRepository for InMemoryBlockRepository {
    async fn create(&self, block: &Block) -> Result<()> {
        self.inner.lock().unwrap().push(block.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Block> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| LitteraError::NotFound(format!("block {id}")))
    }

    async fn list_by_section(&self, section_id: Uuid) -> Result<Vec<Block>> {
        let mut v: Vec<Block> = self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.section_id == section_id)
            .cloned()
            .collect();
        v.sort_by_key(|b| b.order_index);
        Ok(v)
    }

    async fn update(&self, block: &Block) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let existing = guard
            .iter_mut()
            .find(|b| b.id == block.id)
            .ok_or_else(|| LitteraError::NotFound(format!("block {}", block.id)))?;
        *existing = block.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.len();
        guard.retain(|b| b.id != id);
        if guard.len() == before {
            return Err(LitteraError::NotFound(format!("block {id}")));
        }
        Ok(())
    }

    async fn apply_batch(&self, creates: &[Block], updates: &[Block], deletes: &[Uuid]) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        // Validate every update/delete target exists, and every create id is
        // new, before mutating anything, so a failure partway through never
        // leaves the in-memory store half-applied.
        for block in creates {
            if guard.iter().any(|b| b.id == block.id) {
                return Err(LitteraError::Conflict(format!("block {} already exists", block.id)));
            }
        }
        for block in updates {
            if !guard.iter().any(|b| b.id == block.id) {
                return Err(LitteraError::NotFound(format!("block {}", block.id)));
            }
        }
        for id in deletes {
            if !guard.iter().any(|b| b.id == *id) {
                return Err(LitteraError::NotFound(format!("block {id}")));
            }
        }

        for block in creates {
            guard.push(block.clone());
        }
        for block in updates {
            if let Some(existing) = guard.iter_mut().find(|b| b.id == block.id) {
                *existing = block.clone();
            }
        }
        for id in deletes {
            guard.retain(|b| b.id != *id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(section_id: Uuid, order: i32) -> Block {
        Block::new(section_id, BlockKind::Paragraph, None, "en", order, "hello")
    }

    #[tokio::test]
    async fn list_by_section_is_ordered() {
        let repo = InMemoryBlockRepository::default();
        let section = Uuid::new_v4();
        let b1 = sample(section, 1);
        let b0 = sample(section, 0);
        repo.create(&b1).await.unwrap();
        repo.create(&b0).await.unwrap();
        let listed = repo.list_by_section(section).await.unwrap();
        assert_eq!(listed[0].id, b0.id);
        assert_eq!(listed[1].id, b1.id);
    }

    #[tokio::test]
    async fn apply_batch_creates_updates_and_deletes_together() {
        let repo = InMemoryBlockRepository::default();
        let section = Uuid::new_v4();
        let mut kept = sample(section, 0);
        let removed = sample(section, 1);
        repo.create(&kept).await.unwrap();
        repo.create(&removed).await.unwrap();

        kept.source_text = "edited".to_string();
        let fresh = sample(section, 2);

        repo.apply_batch(&[fresh.clone()], &[kept.clone()], &[removed.id]).await.unwrap();

        assert_eq!(repo.get(kept.id).await.unwrap().source_text, "edited");
        assert_eq!(repo.get(fresh.id).await.unwrap().source_text, "hello");
        assert!(repo.get(removed.id).await.is_err());
    }

    #[tokio::test]
    async fn apply_batch_is_all_or_nothing() {
        let repo = InMemoryBlockRepository::default();
        let section = Uuid::new_v4();
        let mut known = sample(section, 0);
        repo.create(&known).await.unwrap();
        known.source_text = "should not stick".to_string();

        let unknown = sample(section, 1); // never created, update target missing
        let err = repo.apply_batch(&[], &[known.clone(), unknown], &[]).await;
        assert!(err.is_err());
        assert_eq!(repo.get(known.id).await.unwrap().source_text, "hello");
    }

    #[tokio::test]
    async fn apply_batch_rejects_create_of_existing_id() {
        let repo = InMemoryBlockRepository::default();
        let section = Uuid::new_v4();
        let existing = sample(section, 0);
        repo.create(&existing).await.unwrap();

        let err = repo.apply_batch(&[existing.clone()], &[], &[]).await;
        assert!(err.is_err());
    }
}
