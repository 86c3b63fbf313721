//! Generic front-end resource surface over the `littera-data` repositories.
//!
//! `Resource<T>` gives every front end (CLI, HTTP, a future GUI) the same
//! five operations regardless of which noun it is working with, so the
//! surface a client has to learn is uniform even though the underlying
//! repository traits are not (each repository exposes the narrower
//! operations that noun's invariants actually allow).

use async_trait::async_trait;
use littera_core::{Document, Result, Section, Work};
use littera_data::{DocumentRepository, SectionRepository, WorkRepository};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait Resource<T>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>>;
    async fn read(&self, id: Uuid) -> Result<T>;
    async fn create(&self, item: &T) -> Result<()>;
    async fn update(&self, item: &T) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Adapts a [`WorkRepository`] to the uniform [`Resource`] surface.
pub struct WorkResource {
    repo: Arc<dyn WorkRepository>,
}

impl WorkResource {
    pub fn new(repo: Arc<dyn WorkRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Resource<Work> for WorkResource {
    async fn list(&self) -> Result<Vec<Work>> {
        self.repo.list().await
    }

    async fn read(&self, id: Uuid) -> Result<Work> {
        self.repo.get(id).await
    }

    async fn create(&self, item: &Work) -> Result<()> {
        self.repo.create(item).await
    }

    async fn update(&self, item: &Work) -> Result<()> {
        self.repo.update_title(item.id, &item.title).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await
    }
}

/// Adapts a [`DocumentRepository`] to the uniform [`Resource`] surface.
/// `list` enumerates documents for a single Work, so the id passed to
/// `DocumentResource::new` scopes every subsequent `list` call.
pub struct DocumentResource {
    repo: Arc<dyn DocumentRepository>,
    work_id: Uuid,
}

impl DocumentResource {
    pub fn new(repo: Arc<dyn DocumentRepository>, work_id: Uuid) -> Self {
        Self { repo, work_id }
    }
}

#[async_trait]
impl Resource<Document> for DocumentResource {
    async fn list(&self) -> Result<Vec<Document>> {
        self.repo.list_by_work(self.work_id).await
    }

    async fn read(&self, id: Uuid) -> Result<Document> {
        self.repo.get(id).await
    }

    async fn create(&self, item: &Document) -> Result<()> {
        self.repo.create(item).await
    }

    async fn update(&self, item: &Document) -> Result<()> {
        self.repo.update(item).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await
    }
}

/// Adapts a [`SectionRepository`] to the uniform [`Resource`] surface, scoped
/// to a single Document the same way [`DocumentResource`] scopes to a Work.
pub struct SectionResource {
    repo: Arc<dyn SectionRepository>,
    document_id: Uuid,
}

impl SectionResource {
    pub fn new(repo: Arc<dyn SectionRepository>, document_id: Uuid) -> Self {
        Self { repo, document_id }
    }
}

#[async_trait]
impl Resource<Section> for SectionResource {
    async fn list(&self) -> Result<Vec<Section>> {
        self.repo.list_by_document(self.document_id).await
    }

    async fn read(&self, id: Uuid) -> Result<Section> {
        self.repo.get(id).await
    }

    async fn create(&self, item: &Section) -> Result<()> {
        self.repo.create(item).await
    }

    async fn update(&self, item: &Section) -> Result<()> {
        self.repo.update(item).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await
    }
}

/// Returned by [`crate::status_probe`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StatusProbe {
    pub work_id: Uuid,
    pub document_count: i64,
    pub reachable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use littera_data::InMemoryWorkRepository;

    #[tokio::test]
    async fn work_resource_update_delegates_to_update_title() {
        let repo = Arc::new(InMemoryWorkRepository::default());
        let resource = WorkResource::new(repo.clone());
        let work = Work {
            id: Uuid::new_v4(),
            title: "Original".to_string(),
            created_at: Utc::now(),
        };
        resource.create(&work).await.unwrap();

        let mut renamed = work.clone();
        renamed.title = "Renamed".to_string();
        resource.update(&renamed).await.unwrap();

        let fetched = resource.read(work.id).await.unwrap();
        assert_eq!(fetched.title, "Renamed");
    }
}
