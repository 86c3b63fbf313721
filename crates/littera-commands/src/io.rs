//! `work json-export`/`work json-import` (canonical JSON round-trip of a
//! whole Work) and `doc md-export` (per-Document Markdown rendering).

use littera_core::{Block, Document, LitteraError, Result, Section, Work};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::output::CommandOutput;
use crate::workspace::Workspace;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkSnapshot {
    pub work: Work,
    pub documents: Vec<Document>,
    pub sections: Vec<Section>,
    pub blocks: Vec<Block>,
}

pub struct IoCommands;

impl IoCommands {
    pub async fn work_json_export(ws: &Workspace, work_id: Uuid) -> Result<CommandOutput> {
        let work = ws.works.get(work_id).await?;
        let documents = ws.documents.list_by_work(work_id).await?;
        let mut sections = Vec::new();
        let mut blocks = Vec::new();
        for document in &documents {
            let doc_sections = ws.sections.list_by_document(document.id).await?;
            for section in &doc_sections {
                blocks.extend(ws.blocks.list_by_section(section.id).await?);
            }
            sections.extend(doc_sections);
        }
        let snapshot = WorkSnapshot {
            work,
            documents,
            sections,
            blocks,
        };
        let human = format!(
            "exported work {work_id}: {} document(s), {} section(s), {} block(s)",
            snapshot.documents.len(),
            snapshot.sections.len(),
            snapshot.blocks.len()
        );
        Ok(CommandOutput::from_value(human, &snapshot))
    }

    /// Recreates every record in `snapshot`. The Work itself must not already
    /// exist; importing over a live Work would silently fork its history.
    pub async fn work_json_import(ws: &Workspace, snapshot: &WorkSnapshot) -> Result<CommandOutput> {
        if ws.works.get(snapshot.work.id).await.is_ok() {
            return Err(LitteraError::Conflict(format!("work {} already exists", snapshot.work.id)));
        }
        ws.works.create(&snapshot.work).await?;
        for document in &snapshot.documents {
            ws.documents.create(document).await?;
        }
        for section in &snapshot.sections {
            ws.sections.create(section).await?;
        }
        for block in &snapshot.blocks {
            ws.blocks.create(block).await?;
        }
        Ok(CommandOutput::message(format!("imported work {}", snapshot.work.id)))
    }

    /// Renders a Document as Markdown: one `##`-style heading per Section
    /// title (nesting reflected by level), followed by its Blocks'
    /// canonical source text in order.
    pub async fn doc_md_export(ws: &Workspace, document_id: Uuid) -> Result<CommandOutput> {
        let document = ws.documents.get(document_id).await?;
        let mut sections = ws.sections.list_by_document(document_id).await?;
        sections.sort_by_key(|s| s.order_index);

        let mut out = String::new();
        for section in &sections {
            if let Some(title) = &section.title {
                let depth = section_depth(ws, section.parent_id).await?;
                out.push_str(&"#".repeat(depth.min(6)));
                out.push(' ');
                out.push_str(title);
                out.push_str("\n\n");
            }
            let mut blocks = ws.blocks.list_by_section(section.id).await?;
            blocks.sort_by_key(|b| b.order_index);
            for block in &blocks {
                out.push_str(&block.source_text);
                out.push_str("\n\n");
            }
        }
        Ok(CommandOutput::from_value(format!("rendered document {}", document.title), &out))
    }
}

async fn section_depth(ws: &Workspace, mut parent_id: Option<Uuid>) -> Result<usize> {
    let mut depth = 1;
    while let Some(id) = parent_id {
        let parent = ws.sections.get(id).await?;
        parent_id = parent.parent_id;
        depth += 1;
    }
    Ok(depth)
}
