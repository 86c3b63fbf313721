//! `littera` — command-line entry point over the Command Surface.
//!
//! Every subcommand but `maintenance` acquires the Work's embedded Postgres
//! cluster, runs one `littera-commands` call, and releases it; `maintenance`
//! operates directly on `--work-dir` and must not be run against a live Work.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use littera_core::{AlignmentType, BlockKind, LitteraError, ReviewScope, Severity};
use littera_data::{
    PgBlockAlignmentRepository, PgBlockRepository, PgDocumentRepository, PgEntityLabelRepository,
    PgEntityRepository, PgEntityWorkMetadataRepository, PgMentionRepository, PgReviewRepository,
    PgSectionRepository, PgWorkRepository,
};
use littera_commands::{
    AlignmentCommands, BlockCommands, CommandOutput, DocumentCommands, EntityCommands,
    EntityWorkMetadataCommands, IoCommands, LabelCommands, MaintenanceCommands, MentionCommands,
    ReviewCommands, SectionCommands, WorkCommands, Workspace,
};
use littera_storage::ClusterHandle;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

mod args;

use args::*;

#[derive(Parser)]
#[command(name = "littera", version, about = "A local-first workspace for long-form multilingual writing")]
struct Cli {
    /// Root directory of the Work. Holds `.littera/pgdata` and any sidecar config.
    #[arg(long, short = 'w', global = true, default_value = ".")]
    work_dir: PathBuf,

    /// Print the structured JSON form of a command's result instead of the
    /// human-readable summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Noun,
}

#[derive(Subcommand)]
enum Noun {
    /// Top-level container for a multilingual body of work.
    #[command(subcommand)]
    Work(WorkVerb),
    /// A single-language rendering of a Work.
    #[command(subcommand)]
    Document(DocumentVerb),
    /// A titled or untitled subdivision of a Document, nestable.
    #[command(subcommand)]
    Section(SectionVerb),
    /// The atomic content unit of a Section.
    #[command(subcommand)]
    Block(BlockVerb),
    /// A language-independent thing Mentions refer to.
    #[command(subcommand)]
    Entity(EntityVerb),
    /// A per-language name/alias set for an Entity.
    #[command(subcommand)]
    Label(LabelVerb),
    /// Per-Work notes and metadata overlaid on an Entity.
    #[command(subcommand)]
    WorkMetadata(WorkMetadataVerb),
    /// A reference from a Block to an Entity in a given language.
    #[command(subcommand)]
    Mention(MentionVerb),
    /// A derived cross-language correspondence between two Blocks.
    #[command(subcommand)]
    Alignment(AlignmentVerb),
    /// A scoped diagnostic raised against part of a Work.
    #[command(subcommand)]
    Review(ReviewVerb),
    /// Whole-Work JSON export/import and per-Document Markdown rendering.
    #[command(subcommand)]
    Io(IoVerb),
    /// Filesystem-level recovery actions on a Work's storage cluster.
    #[command(subcommand)]
    Maintenance(MaintenanceVerb),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = run(&cli).await;
    match result {
        Ok(output) => {
            print_output(&cli, &output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(littera_commands::exit_code(&err) as u8)
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn print_output(cli: &Cli, output: &CommandOutput) {
    if cli.json {
        match serde_json::to_string_pretty(&output.structured) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => eprintln!("error: failed to render json output: {err}"),
        }
    } else if !output.human.is_empty() {
        println!("{}", output.human);
    }
}

async fn run(cli: &Cli) -> littera_core::Result<CommandOutput> {
    if let Noun::Maintenance(verb) = &cli.command {
        return match verb {
            MaintenanceVerb::WalReset => MaintenanceCommands::wal_reset(&cli.work_dir),
            MaintenanceVerb::Reinit => MaintenanceCommands::reinit(&cli.work_dir),
        };
    }

    let cluster = ClusterHandle::acquire(cli.work_dir.clone()).await?;
    let pool = cluster.pool().await?;
    let ws = Workspace {
        works: Arc::new(PgWorkRepository::new(pool.clone())),
        documents: Arc::new(PgDocumentRepository::new(pool.clone())),
        sections: Arc::new(PgSectionRepository::new(pool.clone())),
        blocks: Arc::new(PgBlockRepository::new(pool.clone())),
        entities: Arc::new(PgEntityRepository::new(pool.clone())),
        labels: Arc::new(PgEntityLabelRepository::new(pool.clone())),
        work_metadata: Arc::new(PgEntityWorkMetadataRepository::new(pool.clone())),
        mentions: Arc::new(PgMentionRepository::new(pool.clone())),
        alignments: Arc::new(PgBlockAlignmentRepository::new(pool.clone())),
        reviews: Arc::new(PgReviewRepository::new(pool.clone())),
    };

    let outcome = dispatch(&ws, &cli.command).await;
    cluster.release().await?;
    outcome
}

async fn dispatch(ws: &Workspace, noun: &Noun) -> littera_core::Result<CommandOutput> {
    match noun {
        Noun::Work(verb) => match verb {
            WorkVerb::Create { id, title } => WorkCommands::create(ws, id.unwrap_or_else(Uuid::new_v4), title).await,
            WorkVerb::Get { id } => WorkCommands::get(ws, *id).await,
            WorkVerb::List => WorkCommands::list(ws).await,
            WorkVerb::Rename { id, title } => WorkCommands::rename(ws, *id, title).await,
            WorkVerb::Delete { id, force, dry_run } => WorkCommands::delete(ws, *id, *force, *dry_run).await,
        },
        Noun::Document(verb) => match verb {
            DocumentVerb::Create {
                id,
                work_id,
                title,
                language,
                order_index,
            } => DocumentCommands::create(ws, id.unwrap_or_else(Uuid::new_v4), *work_id, title, language, *order_index).await,
            DocumentVerb::Get { id } => DocumentCommands::get(ws, *id).await,
            DocumentVerb::List { work_id } => DocumentCommands::list(ws, *work_id).await,
            DocumentVerb::Rename { id, title } => DocumentCommands::rename(ws, *id, title).await,
            DocumentVerb::Reorder { id, order_index } => DocumentCommands::reorder(ws, *id, *order_index).await,
            DocumentVerb::Delete { id, force, dry_run } => DocumentCommands::delete(ws, *id, *force, *dry_run).await,
        },
        Noun::Section(verb) => match verb {
            SectionVerb::Create {
                id,
                document_id,
                parent_id,
                title,
                order_index,
            } => {
                SectionCommands::create(
                    ws,
                    id.unwrap_or_else(Uuid::new_v4),
                    *document_id,
                    *parent_id,
                    title.as_deref(),
                    *order_index,
                )
                .await
            }
            SectionVerb::Get { id } => SectionCommands::get(ws, *id).await,
            SectionVerb::List { document_id } => SectionCommands::list(ws, *document_id).await,
            SectionVerb::ListChildren { parent_id } => SectionCommands::list_children(ws, *parent_id).await,
            SectionVerb::Rename { id, title } => SectionCommands::rename(ws, *id, title).await,
            SectionVerb::Reorder { id, order_index } => SectionCommands::reorder(ws, *id, *order_index).await,
            SectionVerb::Delete { id, force, dry_run } => SectionCommands::delete(ws, *id, *force, *dry_run).await,
        },
        Noun::Block(verb) => match verb {
            BlockVerb::Create {
                id,
                section_id,
                kind,
                heading_level,
                language,
                order_index,
                text,
            } => {
                BlockCommands::create(
                    ws,
                    id.unwrap_or_else(Uuid::new_v4),
                    *section_id,
                    BlockKind::from(kind.as_str()),
                    *heading_level,
                    language,
                    *order_index,
                    text,
                )
                .await
            }
            BlockVerb::Get { id } => BlockCommands::get(ws, *id).await,
            BlockVerb::List { section_id } => BlockCommands::list(ws, *section_id).await,
            BlockVerb::SetText { id, text } => BlockCommands::set_text(ws, *id, text).await,
            BlockVerb::Reorder { id, order_index } => BlockCommands::reorder(ws, *id, *order_index).await,
            BlockVerb::Delete { id, dry_run } => BlockCommands::delete(ws, *id, *dry_run).await,
        },
        Noun::Entity(verb) => match verb {
            EntityVerb::Create { id, properties } => {
                EntityCommands::create(ws, id.unwrap_or_else(Uuid::new_v4), parse_json(properties)?).await
            }
            EntityVerb::Get { id } => EntityCommands::get(ws, *id).await,
            EntityVerb::List => EntityCommands::list(ws).await,
            EntityVerb::SetProperty { id, key, value } => {
                EntityCommands::set_property(ws, *id, key, parse_json(value)?).await
            }
            EntityVerb::Delete { id, force, dry_run } => EntityCommands::delete(ws, *id, *force, *dry_run).await,
        },
        Noun::Label(verb) => match verb {
            LabelVerb::Set {
                entity_id,
                language,
                text,
                alias,
            } => LabelCommands::set(ws, *entity_id, language, text, alias.clone()).await,
            LabelVerb::Get { entity_id, language } => LabelCommands::get(ws, *entity_id, language).await,
            LabelVerb::List { entity_id } => LabelCommands::list(ws, *entity_id).await,
            LabelVerb::Delete { entity_id, language } => LabelCommands::delete(ws, *entity_id, language).await,
        },
        Noun::WorkMetadata(verb) => match verb {
            WorkMetadataVerb::Set {
                entity_id,
                work_id,
                notes,
                metadata,
            } => EntityWorkMetadataCommands::set(ws, *entity_id, *work_id, notes.clone(), parse_json(metadata)?).await,
            WorkMetadataVerb::Get { entity_id, work_id } => EntityWorkMetadataCommands::get(ws, *entity_id, *work_id).await,
            WorkMetadataVerb::Clear { entity_id, work_id } => {
                EntityWorkMetadataCommands::clear(ws, *entity_id, *work_id).await
            }
        },
        Noun::Mention(verb) => match verb {
            MentionVerb::Create {
                id,
                block_id,
                entity_id,
                language,
                surface_form,
                features,
            } => {
                MentionCommands::create(
                    ws,
                    id.unwrap_or_else(Uuid::new_v4),
                    *block_id,
                    *entity_id,
                    language,
                    surface_form.clone(),
                    parse_json(features)?,
                )
                .await
            }
            MentionVerb::ListByBlock { block_id } => MentionCommands::list_by_block(ws, *block_id).await,
            MentionVerb::ListByEntity { entity_id } => MentionCommands::list_by_entity(ws, *entity_id).await,
            MentionVerb::Delete { id } => MentionCommands::delete(ws, *id).await,
        },
        Noun::Alignment(verb) => match verb {
            AlignmentVerb::Create {
                id,
                block_a,
                block_b,
                alignment_type,
                confidence,
            } => {
                AlignmentCommands::create(
                    ws,
                    id.unwrap_or_else(Uuid::new_v4),
                    *block_a,
                    *block_b,
                    AlignmentType::from(alignment_type.as_str()),
                    *confidence,
                )
                .await
            }
            AlignmentVerb::ListForBlock { block_id } => AlignmentCommands::list_for_block(ws, *block_id).await,
            AlignmentVerb::Delete { id } => AlignmentCommands::delete(ws, *id).await,
            AlignmentVerb::Recompute { left, right } => AlignmentCommands::recompute(ws, left, right).await,
            AlignmentVerb::Gaps { block_id } => AlignmentCommands::gaps(ws, *block_id).await,
        },
        Noun::Review(verb) => match verb {
            ReviewVerb::Create {
                id,
                work_id,
                scope,
                scope_id,
                issue_type,
                severity,
                message,
            } => {
                ReviewCommands::create(
                    ws,
                    id.unwrap_or_else(Uuid::new_v4),
                    *work_id,
                    ReviewScope::from(scope.as_str()),
                    *scope_id,
                    issue_type,
                    Severity::from(severity.as_str()),
                    message,
                )
                .await
            }
            ReviewVerb::ListByWork { work_id } => ReviewCommands::list_by_work(ws, *work_id).await,
            ReviewVerb::ListByScope { work_id, scope, scope_id } => {
                ReviewCommands::list_by_scope(ws, *work_id, ReviewScope::from(scope.as_str()), *scope_id).await
            }
            ReviewVerb::Delete { id } => ReviewCommands::delete(ws, *id).await,
        },
        Noun::Io(verb) => match verb {
            IoVerb::WorkExport { work_id } => IoCommands::work_json_export(ws, *work_id).await,
            IoVerb::WorkImport { path } => {
                let raw = std::fs::read_to_string(path).map_err(LitteraError::from)?;
                let snapshot = serde_json::from_str(&raw).map_err(LitteraError::from)?;
                IoCommands::work_json_import(ws, &snapshot).await
            }
            IoVerb::DocMdExport { document_id } => IoCommands::doc_md_export(ws, *document_id).await,
        },
        Noun::Maintenance(_) => unreachable!("maintenance dispatched before cluster acquisition"),
    }
}

fn parse_json(raw: &str) -> littera_core::Result<Value> {
    serde_json::from_str(raw).map_err(LitteraError::from)
}
