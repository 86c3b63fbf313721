use async_trait::async_trait;
use deadpool_postgres::Pool;
use littera_core::{LitteraError, Result, Section};
use tokio_postgres::Row;
use uuid::Uuid;

#[async_trait]
pub trait SectionRepository: Send + Sync {
    async fn create(&self, section: &Section) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Section>;
    async fn list_by_document(&self, document_id: Uuid) -> Result<Vec<Section>>;
    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Section>>;
    async fn update(&self, section: &Section) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn block_count(&self, id: Uuid) -> Result<i64>;
}

pub struct PgSectionRepository {
    pool: Pool,
}

impl PgSectionRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_section(row: &Row) -> Section {
    Section {
        id: row.get("id"),
        document_id: row.get("document_id"),
        parent_id: row.get("parent_id"),
        title: row.get("title"),
        order_index: row.get("order_index"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl SectionRepository for PgSectionRepository {
    async fn create(&self, section: &Section) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO sections (id, document_id, parent_id, title, order_index, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &section.id,
                    &section.document_id,
                    &section.parent_id,
                    &section.title,
                    &section.order_index,
                    &section.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Section> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, document_id, parent_id, title, order_index, created_at
                 FROM sections WHERE id = $1",
                &[&id],
            )
            .await?
            .ok_or_else(|| LitteraError::NotFound(format!("section {id}")))?;
        Ok(row_to_section(&row))
    }

    async fn list_by_document(&self, document_id: Uuid) -> Result<Vec<Section>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, document_id, parent_id, title, order_index, created_at
                 FROM sections WHERE document_id = $1 ORDER BY order_index",
                &[&document_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_section).collect())
    }

    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Section>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, document_id, parent_id, title, order_index, created_at
                 FROM sections WHERE parent_id = $1 ORDER BY order_index",
                &[&parent_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_section).collect())
    }

    async fn update(&self, section: &Section) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client
            .execute(
                "UPDATE sections SET title = $1, order_index = $2, parent_id = $3 WHERE id = $4",
                &[&section.title, &section.order_index, &section.parent_id, &section.id],
            )
            .await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("section {}", section.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client.execute("DELETE FROM sections WHERE id = $1", &[&id]).await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("section {id}")));
        }
        Ok(())
    }

    async fn block_count(&self, id: Uuid) -> Result<i64> {
        let client = self.pool.get().await?;
        let row = client
            .query_one("SELECT COUNT(*) AS n FROM blocks WHERE section_id = $1", &[&id])
            .await?;
        Ok(row.get("n"))
    }
}

/// In-memory stand-in for unit tests that don't need a live cluster.
#[derive(Default)]
pub struct InMemorySectionRepository {
    inner: std::sync::Mutex<Vec<Section>>,
}

#[async_trait]
impl SectionRepository for InMemorySectionRepository {
    async fn create(&self, section: &Section) -> Result<()> {
        self.inner.lock().unwrap().push(section.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Section> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| LitteraError::NotFound(format!("section {id}")))
    }

    async fn list_by_document(&self, document_id: Uuid) -> Result<Vec<Section>> {
        let mut v: Vec<Section> = self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.document_id == document_id)
            .cloned()
            .collect();
        v.sort_by_key(|s| s.order_index);
        Ok(v)
    }

    async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Section>> {
        let mut v: Vec<Section> = self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.parent_id == Some(parent_id))
            .cloned()
            .collect();
        v.sort_by_key(|s| s.order_index);
        Ok(v)
    }

    async fn update(&self, section: &Section) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let existing = guard
            .iter_mut()
            .find(|s| s.id == section.id)
            .ok_or_else(|| LitteraError::NotFound(format!("section {}", section.id)))?;
        *existing = section.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.len();
        guard.retain(|s| s.id != id);
        if guard.len() == before {
            return Err(LitteraError::NotFound(format!("section {id}")));
        }
        Ok(())
    }

    async fn block_count(&self, _id: Uuid) -> Result<i64> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(document_id: Uuid, parent_id: Option<Uuid>, order: i32) -> Section {
        Section {
            id: Uuid::new_v4(),
            document_id,
            parent_id,
            title: Some("Intro".to_string()),
            order_index: order,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn list_children_only_returns_direct_children() {
        let repo = InMemorySectionRepository::default();
        let doc = Uuid::new_v4();
        let parent = sample(doc, None, 0);
        let child = sample(doc, Some(parent.id), 0);
        let unrelated = sample(doc, None, 1);
        repo.create(&parent).await.unwrap();
        repo.create(&child).await.unwrap();
        repo.create(&unrelated).await.unwrap();
        let children = repo.list_children(parent.id).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child.id);
    }

    #[tokio::test]
    async fn top_level_sections_have_no_parent() {
        let repo = InMemorySectionRepository::default();
        let doc = Uuid::new_v4();
        let s = sample(doc, None, 0);
        repo.create(&s).await.unwrap();
        let fetched = repo.get(s.id).await.unwrap();
        assert!(fetched.parent_id.is_none());
    }
}
