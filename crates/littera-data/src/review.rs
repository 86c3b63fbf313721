use async_trait::async_trait;
use deadpool_postgres::Pool;
use littera_core::{LitteraError, Result, Review, ReviewScope, Severity};
use tokio_postgres::Row;
use uuid::Uuid;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: &Review) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Review>;
    async fn list_by_work(&self, work_id: Uuid) -> Result<Vec<Review>>;
    async fn list_by_scope(&self, work_id: Uuid, scope: ReviewScope, scope_id: Uuid) -> Result<Vec<Review>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

pub struct PgReviewRepository {
    pool: Pool,
}

impl PgReviewRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_review(row: &Row) -> Review {
    let scope: String = row.get("scope");
    let severity: String = row.get("severity");
    Review {
        id: row.get("id"),
        work_id: row.get("work_id"),
        scope: ReviewScope::from(scope.as_str()),
        scope_id: row.get("scope_id"),
        issue_type: row.get("issue_type"),
        severity: Severity::from(severity.as_str()),
        message: row.get("message"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn create(&self, review: &Review) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO reviews (id, work_id, scope, scope_id, issue_type, severity, message, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &review.id,
                    &review.work_id,
                    &review.scope.as_str(),
                    &review.scope_id,
                    &review.issue_type,
                    &review.severity.as_str(),
                    &review.message,
                    &review.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Review> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, work_id, scope, scope_id, issue_type, severity, message, created_at
                 FROM reviews WHERE id = $1",
                &[&id],
            )
            .await?
            .ok_or_else(|| LitteraError::NotFound(format!("review {id}")))?;
        Ok(row_to_review(&row))
    }

    async fn list_by_work(&self, work_id: Uuid) -> Result<Vec<Review>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, work_id, scope, scope_id, issue_type, severity, message, created_at
                 FROM reviews WHERE work_id = $1 ORDER BY created_at",
                &[&work_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_review).collect())
    }

    async fn list_by_scope(&self, work_id: Uuid, scope: ReviewScope, scope_id: Uuid) -> Result<Vec<Review>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT id, work_id, scope, scope_id, issue_type, severity, message, created_at
                 FROM reviews WHERE work_id = $1 AND scope = $2 AND scope_id = $3 ORDER BY created_at",
                &[&work_id, &scope.as_str(), &scope_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_review).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        let affected = client.execute("DELETE FROM reviews WHERE id = $1", &[&id]).await?;
        if affected == 0 {
            return Err(LitteraError::NotFound(format!("review {id}")));
        }
        Ok(())
    }
}

/// In-memory stand-in for unit tests that don't need a live cluster.
#[derive(Default)]
pub struct InMemoryReviewRepository {
    inner: std::sync::Mutex<Vec<Review>>,
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn create(&self, review: &Review) -> Result<()> {
        self.inner.lock().unwrap().push(review.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Review> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| LitteraError::NotFound(format!("review {id}")))
    }

    async fn list_by_work(&self, work_id: Uuid) -> Result<Vec<Review>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.work_id == work_id)
            .cloned()
            .collect())
    }

    async fn list_by_scope(&self, work_id: Uuid, scope: ReviewScope, scope_id: Uuid) -> Result<Vec<Review>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.work_id == work_id && r.scope == scope && r.scope_id == scope_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let before = guard.len();
        guard.retain(|r| r.id != id);
        if guard.len() == before {
            return Err(LitteraError::NotFound(format!("review {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(work_id: Uuid, scope: ReviewScope, scope_id: Uuid, severity: Severity) -> Review {
        Review {
            id: Uuid::new_v4(),
            work_id,
            scope,
            scope_id,
            issue_type: "missing_label".to_string(),
            severity,
            message: "no French label for this entity".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn list_by_scope_filters_precisely() {
        let repo = InMemoryReviewRepository::default();
        let work = Uuid::new_v4();
        let block = Uuid::new_v4();
        let other_block = Uuid::new_v4();
        repo.create(&sample(work, ReviewScope::Block, block, Severity::Warning))
            .await
            .unwrap();
        repo.create(&sample(work, ReviewScope::Block, other_block, Severity::Warning))
            .await
            .unwrap();
        let found = repo.list_by_scope(work, ReviewScope::Block, block).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn list_by_work_includes_every_scope() {
        let repo = InMemoryReviewRepository::default();
        let work = Uuid::new_v4();
        repo.create(&sample(work, ReviewScope::Work, work, Severity::Info))
            .await
            .unwrap();
        repo.create(&sample(work, ReviewScope::Block, Uuid::new_v4(), Severity::Error))
            .await
            .unwrap();
        assert_eq!(repo.list_by_work(work).await.unwrap().len(), 2);
    }
}
