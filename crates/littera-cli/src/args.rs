//! `clap` argument trees for each noun. Kept separate from dispatch so
//! `main.rs` reads as "what happens", not "how it's typed on the command line".

use std::path::PathBuf;

use clap::Subcommand;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum WorkVerb {
    Create {
        #[arg(long)]
        id: Option<Uuid>,
        #[arg(long)]
        title: String,
    },
    Get {
        #[arg(long)]
        id: Uuid,
    },
    List,
    Rename {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: String,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum DocumentVerb {
    Create {
        #[arg(long)]
        id: Option<Uuid>,
        #[arg(long)]
        work_id: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long)]
        language: String,
        #[arg(long)]
        order_index: Option<i32>,
    },
    Get {
        #[arg(long)]
        id: Uuid,
    },
    List {
        #[arg(long)]
        work_id: Uuid,
    },
    Rename {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: String,
    },
    Reorder {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        order_index: i32,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum SectionVerb {
    Create {
        #[arg(long)]
        id: Option<Uuid>,
        #[arg(long)]
        document_id: Uuid,
        #[arg(long)]
        parent_id: Option<Uuid>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        order_index: Option<i32>,
    },
    Get {
        #[arg(long)]
        id: Uuid,
    },
    List {
        #[arg(long)]
        document_id: Uuid,
    },
    ListChildren {
        #[arg(long)]
        parent_id: Uuid,
    },
    Rename {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: String,
    },
    Reorder {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        order_index: i32,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum BlockVerb {
    Create {
        #[arg(long)]
        id: Option<Uuid>,
        #[arg(long)]
        section_id: Uuid,
        /// One of paragraph, heading, code_block, horizontal_rule, blockquote.
        #[arg(long, default_value = "paragraph")]
        kind: String,
        #[arg(long)]
        heading_level: Option<i16>,
        #[arg(long)]
        language: String,
        #[arg(long)]
        order_index: Option<i32>,
        #[arg(long)]
        text: String,
    },
    Get {
        #[arg(long)]
        id: Uuid,
    },
    List {
        #[arg(long)]
        section_id: Uuid,
    },
    SetText {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        text: String,
    },
    Reorder {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        order_index: i32,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum EntityVerb {
    Create {
        #[arg(long)]
        id: Option<Uuid>,
        /// JSON object of free-form properties, defaults to `{}`.
        #[arg(long, default_value = "{}")]
        properties: String,
    },
    Get {
        #[arg(long)]
        id: Uuid,
    },
    List,
    SetProperty {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        key: String,
        /// JSON-encoded value, e.g. `"\"f\""` or `42`.
        #[arg(long)]
        value: String,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        force: bool,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum LabelVerb {
    Set {
        #[arg(long)]
        entity_id: Uuid,
        #[arg(long)]
        language: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        alias: Vec<String>,
    },
    Get {
        #[arg(long)]
        entity_id: Uuid,
        #[arg(long)]
        language: String,
    },
    List {
        #[arg(long)]
        entity_id: Uuid,
    },
    Delete {
        #[arg(long)]
        entity_id: Uuid,
        #[arg(long)]
        language: String,
    },
}

#[derive(Subcommand)]
pub enum WorkMetadataVerb {
    Set {
        #[arg(long)]
        entity_id: Uuid,
        #[arg(long)]
        work_id: Uuid,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, default_value = "{}")]
        metadata: String,
    },
    Get {
        #[arg(long)]
        entity_id: Uuid,
        #[arg(long)]
        work_id: Uuid,
    },
    Clear {
        #[arg(long)]
        entity_id: Uuid,
        #[arg(long)]
        work_id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum MentionVerb {
    Create {
        #[arg(long)]
        id: Option<Uuid>,
        #[arg(long)]
        block_id: Uuid,
        #[arg(long)]
        entity_id: Uuid,
        #[arg(long)]
        language: String,
        #[arg(long)]
        surface_form: Option<String>,
        #[arg(long, default_value = "{}")]
        features: String,
    },
    ListByBlock {
        #[arg(long)]
        block_id: Uuid,
    },
    ListByEntity {
        #[arg(long)]
        entity_id: Uuid,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum AlignmentVerb {
    Create {
        #[arg(long)]
        id: Option<Uuid>,
        #[arg(long)]
        block_a: Uuid,
        #[arg(long)]
        block_b: Uuid,
        /// One of exact, similar, partial.
        #[arg(long, default_value = "similar")]
        alignment_type: String,
        #[arg(long)]
        confidence: f64,
    },
    ListForBlock {
        #[arg(long)]
        block_id: Uuid,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Recomputes alignments between two Block sequences from mention overlap
    /// and replaces whatever was stored for either side.
    Recompute {
        #[arg(long, required = true, num_args = 1..)]
        left: Vec<Uuid>,
        #[arg(long, required = true, num_args = 1..)]
        right: Vec<Uuid>,
    },
    /// Reports Entities mentioned on one side of an alignment with no label
    /// in the other side's language.
    Gaps {
        #[arg(long)]
        block_id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum ReviewVerb {
    Create {
        #[arg(long)]
        id: Option<Uuid>,
        #[arg(long)]
        work_id: Uuid,
        /// One of work, document, section, block.
        #[arg(long)]
        scope: String,
        #[arg(long)]
        scope_id: Uuid,
        #[arg(long)]
        issue_type: String,
        /// One of info, warning, error.
        #[arg(long, default_value = "info")]
        severity: String,
        #[arg(long)]
        message: String,
    },
    ListByWork {
        #[arg(long)]
        work_id: Uuid,
    },
    ListByScope {
        #[arg(long)]
        work_id: Uuid,
        #[arg(long)]
        scope: String,
        #[arg(long)]
        scope_id: Uuid,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum IoVerb {
    /// Prints the full Work (Documents, Sections, Blocks) as JSON.
    WorkExport {
        #[arg(long)]
        work_id: Uuid,
    },
    /// Recreates a Work from a JSON file previously produced by `work-export`.
    WorkImport {
        #[arg(long)]
        path: PathBuf,
    },
    /// Renders a Document's Sections and Blocks as Markdown.
    DocMdExport {
        #[arg(long)]
        document_id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum MaintenanceVerb {
    /// Clears and recreates the write-ahead log. Lossy for uncheckpointed WAL.
    WalReset,
    /// Deletes the entire storage cluster; every record in the Work is lost.
    Reinit,
}
