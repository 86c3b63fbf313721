use async_trait::async_trait;
use deadpool_postgres::Pool;
use littera_core::{LitteraError, Result, Work};
use tokio_postgres::Row;
use uuid::Uuid;

/// Persistence interface for Works.
#[async_trait]
pub trait WorkRepository: Send + Sync {
    async fn create(&self, work: &Work) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Work>;
    async fn list(&self) -> Result<Vec<Work>>;
    async fn update_title(&self, id: Uuid, title: &str) -> Result<()>;
    /// Deletes the Work row. Callers (the Command Surface) are responsible
    /// for requiring `--force` before reaching here when the Work is
    /// non-empty; the storage layer itself just cascades.
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn document_count(&self, id: Uuid) -> Result<i64>;
}

pub struct PgWorkRepository {
    pool: Pool,
}

impl PgWorkRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_work(row: &Row) -> Work {
    Work {
        id: row.get("id"),
        title: row.get("title"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl WorkRepository for PgWorkRepository {
    async fn create(&self, work: &Work) -> Result<()> {
        let client = self.pool.get().await?;
        let existing = client
            .query_opt("SELECT 1 FROM works WHERE id = $1", &[&work.id])
            .await?;
        if existing.is_some() {
            return Err(LitteraError::Conflict(format!(
                "work {} already exists",
                work.id
            )));
        }
        client
            .execute(
                "INSERT INTO works (id, title, created_at) VALUES ($1, $2, $3)",
                &[&work.id, &work.title, &work.created_at],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Work> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT id, title, created_at FROM works WHERE id = $1", &[&id])
            .await?
            .ok_or_else(|| LitteraError::NotFound(format!("work {id}")))?;
        Ok(row_to_work(&row))
    }

    async fn list(&self) -> Result<Vec<Work>> {
        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT id, title, created_at FROM works ORDER BY created_at", &[])
            .await?;
        Ok(rows.iter().map(row_to_work).collect())
    }

    async fn update_title(&self, id: Uuid, title: &str) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client
            .execute("UPDATE works SET title = $1 WHERE id = $2", &[&title, &id])
            .await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("work {id}")));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client.execute("DELETE FROM works WHERE id = $1", &[&id]).await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("work {id}")));
        }
        Ok(())
    }

    async fn document_count(&self, id: Uuid) -> Result<i64> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "SELECT COUNT(*) AS n FROM documents WHERE work_id = $1",
                &[&id],
            )
            .await?;
        Ok(row.get("n"))
    }
}

/// In-memory stand-in used by unit tests elsewhere in the workspace that
/// need a `WorkRepository` without a live cluster.
pub struct InMemoryWorkRepository {
    inner: std::sync::Mutex<Vec<Work>>,
}

impl Default for InMemoryWorkRepository {
    fn default() -> Self {
        Self {
            inner: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WorkRepository for InMemoryWorkRepository {
    async fn create(&self, work: &Work) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        if guard.iter().any(|w| w.id == work.id) {
            return Err(LitteraError::Conflict(format!("work {} already exists", work.id)));
        }
        guard.push(work.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Work> {
        let guard = self.inner.lock().unwrap();
        guard
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| LitteraError::NotFound(format!("work {id}")))
    }

    async fn list(&self) -> Result<Vec<Work>> {
        Ok(self.inner.lock().unwrap().clone())
    }

    async fn update_title(&self, id: Uuid, title: &str) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let work = guard
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| LitteraError::NotFound(format!("work {id}")))?;
        work.title = title.to_string();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.len();
        guard.retain(|w| w.id != id);
        if guard.len() == before {
            return Err(LitteraError::NotFound(format!("work {id}")));
        }
        Ok(())
    }

    async fn document_count(&self, _id: Uuid) -> Result<i64> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample() -> Work {
        Work {
            id: Uuid::new_v4(),
            title: "Test Work".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = InMemoryWorkRepository::default();
        let work = sample();
        repo.create(&work).await.unwrap();
        let fetched = repo.get(work.id).await.unwrap();
        assert_eq!(fetched.title, work.title);
    }

    #[tokio::test]
    async fn duplicate_create_is_conflict() {
        let repo = InMemoryWorkRepository::default();
        let work = sample();
        repo.create(&work).await.unwrap();
        let err = repo.create(&work).await.unwrap_err();
        assert_eq!(err.kind(), "conflict");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let repo = InMemoryWorkRepository::default();
        let err = repo.get(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn update_title_changes_value() {
        let repo = InMemoryWorkRepository::default();
        let work = sample();
        repo.create(&work).await.unwrap();
        repo.update_title(work.id, "New Title").await.unwrap();
        assert_eq!(repo.get(work.id).await.unwrap().title, "New Title");
    }

    #[tokio::test]
    async fn delete_removes_work() {
        let repo = InMemoryWorkRepository::default();
        let work = sample();
        repo.create(&work).await.unwrap();
        repo.delete(work.id).await.unwrap();
        assert!(repo.get(work.id).await.is_err());
    }
}
