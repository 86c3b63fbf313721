use async_trait::async_trait;
use deadpool_postgres::Pool;
use littera_core::{Document, LitteraError, Result};
use tokio_postgres::Row;
use uuid::Uuid;

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: &Document) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Document>;
    async fn list_by_work(&self, work_id: Uuid) -> Result<Vec<Document>>;
    async fn update(&self, document: &Document) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn section_count(&self, id: Uuid) -> Result<i64>;
}

pub struct PgDocumentRepository {
    pool: Pool,
}

impl PgDocumentRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_document(row: &Row) -> Document {
    Document {
        id: row.get("id"),
        work_id: row.get("work_id"),
        title: row.get("title"),
        language: row.get("language"),
        order_index: row.get("order_index"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn create(&self, document: &Document) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO documents (id, work_id, title, language, order_index, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &document.id,
                    &document.work_id,
                    &document.title,
                    &document.language,
                    &document.order_index,
                    &document.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Document> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, work_id, title, language, order_index, created_at
                 FROM documents WHERE id = $1",
                &[&id],
            )
            .await?
            .ok_or_else(|| LitteraError::NotFound(format!("document {id}")))?;
        Ok(row_to_document(&row))
    }

    async fn list_by_work(&self, work_id: Uuid) -> Result<Vec<Document>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, work_id, title, language, order_index, created_at
                 FROM documents WHERE work_id = $1 ORDER BY order_index",
                &[&work_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_document).collect())
    }

    async fn update(&self, document: &Document) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client
            .execute(
                "UPDATE documents SET title = $1, language = $2, order_index = $3 WHERE id = $4",
                &[&document.title, &document.language, &document.order_index, &document.id],
            )
            .await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("document {}", document.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client.execute("DELETE FROM documents WHERE id = $1", &[&id]).await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("document {id}")));
        }
        Ok(())
    }

    async fn section_count(&self, id: Uuid) -> Result<i64> {
        let client = self.pool.get().await?;
        let row = client
            .query_one("SELECT COUNT(*) AS n FROM sections WHERE document_id = $1", &[&id])
            .await?;
        Ok(row.get("n"))
    }
}

/// In-memory stand-in for unit tests that don't need a live cluster.
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    inner: std::sync::Mutex<Vec<Document>>,
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, document: &Document) -> Result<()> {
        self.inner.lock().unwrap().push(document.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Document> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| LitteraError::NotFound(format!("document {id}")))
    }

    async fn list_by_work(&self, work_id: Uuid) -> Result<Vec<Document>> {
        let mut docs: Vec<Document> = self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.work_id == work_id)
            .cloned()
            .collect();
        docs.sort_by_key(|d| d.order_index);
        Ok(docs)
    }

    async fn update(&self, document: &Document) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let existing = guard
            .iter_mut()
            .find(|d| d.id == document.id)
            .ok_or_else(|| LitteraError::NotFound(format!("document {}", document.id)))?;
        *existing = document.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.len();
        guard.retain(|d| d.id != id);
        if guard.len() == before {
            return Err(LitteraError::NotFound(format!("document {id}")));
        }
        Ok(())
    }

    async fn section_count(&self, _id: Uuid) -> Result<i64> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(work_id: Uuid, order: i32) -> Document {
        Document {
            id: Uuid::new_v4(),
            work_id,
            title: "Chapter".to_string(),
            language: "en".to_string(),
            order_index: order,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn list_by_work_is_ordered() {
        let repo = InMemoryDocumentRepository::default();
        let work = Uuid::new_v4();
        let d1 = sample(work, 1);
        let d0 = sample(work, 0);
        repo.create(&d1).await.unwrap();
        repo.create(&d0).await.unwrap();
        let listed = repo.list_by_work(work).await.unwrap();
        assert_eq!(listed[0].id, d0.id);
        assert_eq!(listed[1].id, d1.id);
    }

    #[tokio::test]
    async fn list_by_work_excludes_other_works() {
        let repo = InMemoryDocumentRepository::default();
        let work_a = Uuid::new_v4();
        let work_b = Uuid::new_v4();
        repo.create(&sample(work_a, 0)).await.unwrap();
        repo.create(&sample(work_b, 0)).await.unwrap();
        assert_eq!(repo.list_by_work(work_a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let repo = InMemoryDocumentRepository::default();
        let doc = sample(Uuid::new_v4(), 0);
        assert!(repo.update(&doc).await.is_err());
    }
}
