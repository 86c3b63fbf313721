use async_trait::async_trait;
use deadpool_postgres::Pool;
use littera_core::{AlignmentType, BlockAlignment, LitteraError, Result};
use tokio_postgres::Row;
use uuid::Uuid;

#[async_trait]
pub trait BlockAlignmentRepository: Send + Sync {
    async fn create(&self, alignment: &BlockAlignment) -> Result<()>;
    async fn list_for_block(&self, block_id: Uuid) -> Result<Vec<BlockAlignment>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// Replaces every alignment touching `block_ids` with a freshly computed
    /// set, in one transaction. Alignments are derived, not authored, so a
    /// recompute always fully supersedes what it replaces.
    async fn replace_for_blocks(&self, block_ids: &[Uuid], fresh: &[BlockAlignment]) -> Result<()>;
}

pub struct PgBlockAlignmentRepository {
    pool: Pool,
}

impl PgBlockAlignmentRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_alignment(row: &Row) -> BlockAlignment {
    let kind: String = row.get("alignment_type");
    BlockAlignment {
        id: row.get("id"),
        block_a: row.get("block_a"),
        block_b: row.get("block_b"),
        alignment_type: AlignmentType::from(kind.as_str()),
        confidence: row.get("confidence"),
    }
}

#[async_trait]
impl BlockAlignmentRepository for PgBlockAlignmentRepository {
    async fn create(&self, alignment: &BlockAlignment) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO block_alignments (id, block_a, block_b, alignment_type, confidence)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &alignment.id,
                    &alignment.block_a,
                    &alignment.block_b,
                    &alignment.alignment_type.as_str(),
                    &alignment.confidence,
                ],
            )
            .await?;
        Ok(())
    }

    async fn list_for_block(&self, block_id: Uuid) -> Result<Vec<BlockAlignment>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, block_a, block_b, alignment_type, confidence
                 FROM block_alignments WHERE block_a = $1 OR block_b = $1",
                &[&block_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_alignment).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client.execute("DELETE FROM block_alignments WHERE id = $1", &[&id]).await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("block alignment {id}")));
        }
        Ok(())
    }

    async fn replace_for_blocks(&self, block_ids: &[Uuid], fresh: &[BlockAlignment]) -> Result<()> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        for id in block_ids {
            tx.execute(
                "DELETE FROM block_alignments WHERE block_a = $1 OR block_b = $1",
                &[id],
            )
            .await?;
        }
        for alignment in fresh {
            tx.execute(
                "INSERT INTO block_alignments (id, block_a, block_b, alignment_type, confidence)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &alignment.id,
                    &alignment.block_a,
                    &alignment.block_b,
                    &alignment.alignment_type.as_str(),
                    &alignment.confidence,
                ],
            )
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// In-memory stand-in for unit tests that don't need a live cluster.
#[derive(Default)]
pub struct InMemoryBlockAlignmentRepository {
    inner: std::sync::Mutex<Vec<BlockAlignment>>,
}

#[async_trait]
impl BlockAlignmentRepository for InMemoryBlockAlignmentRepository {
    async fn create(&self, alignment: &BlockAlignment) -> Result<()> {
        self.inner.lock().unwrap().push(alignment.clone());
        Ok(())
    }

    async fn list_for_block(&self, block_id: Uuid) -> Result<Vec<BlockAlignment>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.block_a == block_id || a.block_b == block_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.len();
        guard.retain(|a| a.id != id);
        if guard.len() == before {
            return Err(LitteraError::NotFound(format!("block alignment {id}")));
        }
        Ok(())
    }

    async fn replace_for_blocks(&self, block_ids: &[Uuid], fresh: &[BlockAlignment]) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        guard.retain(|a| !block_ids.contains(&a.block_a) && !block_ids.contains(&a.block_b));
        guard.extend(fresh.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(a: Uuid, b: Uuid) -> BlockAlignment {
        BlockAlignment {
            id: Uuid::new_v4(),
            block_a: a,
            block_b: b,
            alignment_type: AlignmentType::Exact,
            confidence: 0.95,
        }
    }

    #[tokio::test]
    async fn replace_for_blocks_drops_stale_and_keeps_fresh() {
        let repo = InMemoryBlockAlignmentRepository::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let stale = sample(a, b);
        repo.create(&stale).await.unwrap();

        let c = Uuid::new_v4();
        let fresh = sample(a, c);
        repo.replace_for_blocks(&[a, b], std::slice::from_ref(&fresh)).await.unwrap();

        let for_a = repo.list_for_block(a).await.unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].id, fresh.id);
    }

    #[tokio::test]
    async fn list_for_block_matches_either_side() {
        let repo = InMemoryBlockAlignmentRepository::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        repo.create(&sample(a, b)).await.unwrap();
        assert_eq!(repo.list_for_block(a).await.unwrap().len(), 1);
        assert_eq!(repo.list_for_block(b).await.unwrap().len(), 1);
    }
}
