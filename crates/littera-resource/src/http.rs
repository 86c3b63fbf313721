//! Optional, loopback-only HTTP binding over the [`crate::Resource`] surface.
//!
//! This is a thin convenience layer, not a general-purpose API: it exists so
//! a local tool (a GUI, a browser-based reviewer) can talk to a Work's data
//! over a socket instead of linking the crate directly. It is not meant to be
//! exposed beyond `127.0.0.1`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use littera_core::{Document, Section, Work};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::resource::{DocumentResource, Resource, SectionResource, WorkResource};

#[derive(Clone)]
pub struct AppState {
    pub works: Arc<dyn Resource<Work>>,
    pub documents: Arc<dyn littera_data::DocumentRepository>,
    pub sections: Arc<dyn littera_data::SectionRepository>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/works", get(list_works))
        .route("/works/:id", get(read_work))
        .route("/works/:id/documents", get(list_documents))
        .route("/documents/:id/sections", get(list_sections))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn list_works(State(state): State<AppState>) -> Result<Json<Vec<Work>>, ApiError> {
    Ok(Json(state.works.list().await?))
}

async fn read_work(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Work>, ApiError> {
    Ok(Json(state.works.read(id).await?))
}

async fn list_documents(
    State(state): State<AppState>,
    Path(work_id): Path<Uuid>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let resource = DocumentResource::new(state.documents.clone(), work_id);
    Ok(Json(resource.list().await?))
}

async fn list_sections(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<Vec<Section>>, ApiError> {
    let resource = SectionResource::new(state.sections.clone(), document_id);
    Ok(Json(resource.list().await?))
}

/// Wraps [`littera_core::LitteraError`] so this crate can implement
/// `IntoResponse` for it without violating the orphan rule.
pub struct ApiError(pub littera_core::LitteraError);

impl From<littera_core::LitteraError> for ApiError {
    fn from(e: littera_core::LitteraError) -> Self {
        ApiError(e)
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.kind() {
            "not_found" => axum::http::StatusCode::NOT_FOUND,
            "conflict" => axum::http::StatusCode::CONFLICT,
            "invariant_violation" | "invalid_input" => axum::http::StatusCode::BAD_REQUEST,
            "backend_unavailable" => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use littera_data::{InMemoryDocumentRepository, InMemorySectionRepository, InMemoryWorkRepository};

    #[tokio::test]
    async fn router_builds_without_panicking() {
        let state = AppState {
            works: Arc::new(WorkResource::new(Arc::new(InMemoryWorkRepository::default()))),
            documents: Arc::new(InMemoryDocumentRepository::default()),
            sections: Arc::new(InMemorySectionRepository::default()),
        };
        let _ = router(state);
    }
}
