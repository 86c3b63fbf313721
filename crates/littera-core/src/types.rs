use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Work / Document / Section
// ---------------------------------------------------------------------------

/// The top-level container for a long-form multilingual work.
///
/// A Work owns its own isolated storage cluster; its id is also the name of
/// the directory under which that cluster lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Work {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A Document within a Work — a chapter, volume, or standalone piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub work_id: Uuid,
    pub title: String,
    /// BCP-47-ish short language tag, e.g. "en", "fr", "ja".
    pub language: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

/// A Section within a Document. Sections nest via `parent_id` to form a
/// table-of-contents tree; a `None` parent is a top-level section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub document_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// Structural role of a Block's content container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading,
    CodeBlock,
    HorizontalRule,
    Blockquote,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading => "heading",
            BlockKind::CodeBlock => "code_block",
            BlockKind::HorizontalRule => "horizontal_rule",
            BlockKind::Blockquote => "blockquote",
        }
    }
}

impl From<&str> for BlockKind {
    fn from(s: &str) -> Self {
        match s {
            "heading" => BlockKind::Heading,
            "code_block" => BlockKind::CodeBlock,
            "horizontal_rule" => BlockKind::HorizontalRule,
            "blockquote" => BlockKind::Blockquote,
            _ => BlockKind::Paragraph, // graceful fallback
        }
    }
}

/// The atomic persisted unit of a Document's body: one isolating content
/// container, independently created/updated/deleted, identified by a stable
/// caller-minted id that is never reassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: Uuid,
    pub section_id: Uuid,
    pub kind: BlockKind,
    /// Heading level (1-6), populated only when `kind == Heading`.
    pub heading_level: Option<i16>,
    /// Short language tag for this Block's content.
    pub language: String,
    pub order_index: i32,
    /// Canonical Markdown-with-mentions source text for this container.
    pub source_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Block {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        section_id: Uuid,
        kind: BlockKind,
        heading_level: Option<i16>,
        language: impl Into<String>,
        order_index: i32,
        source_text: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            section_id,
            kind,
            heading_level,
            language: language.into(),
            order_index,
            source_text: source_text.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Entity / EntityLabel / EntityWorkMetadata
// ---------------------------------------------------------------------------

/// A global, Work-independent node in the semantic graph: a person, place,
/// organization, or other thing that can be mentioned across any Work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    /// Free-form properties (e.g. `{"gender": "f"}`), not tied to any language.
    pub properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A language-specific name for an Entity. Unique per `(entity_id, language)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityLabel {
    pub entity_id: Uuid,
    pub language: String,
    pub text: String,
    pub aliases: Vec<String>,
}

/// Per-Work overlay on an Entity: notes and metadata that only make sense in
/// the context of one particular Work. Primary key is `(entity_id, work_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityWorkMetadata {
    pub entity_id: Uuid,
    pub work_id: Uuid,
    pub notes: Option<String>,
    pub metadata: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Mention
// ---------------------------------------------------------------------------

/// A single occurrence of an Entity within a Block, in a given language.
/// Unique per `(block_id, entity_id, language)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    pub id: Uuid,
    pub block_id: Uuid,
    pub entity_id: Uuid,
    pub language: String,
    /// Grammatical features relevant to rendering (case, number, gender, ...).
    pub features: serde_json::Value,
    /// The exact surface form actually observed in the source text, if it
    /// differs from what `surface_form` would generate.
    pub observed_surface_form: Option<String>,
}

// ---------------------------------------------------------------------------
// BlockAlignment
// ---------------------------------------------------------------------------

/// Confidence classification of a derived cross-Block alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentType {
    /// High-confidence alignment backed by strong mention overlap.
    Exact,
    /// Moderate-confidence alignment.
    Similar,
    /// Weak, low-overlap alignment surfaced for human review.
    Partial,
}

impl AlignmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentType::Exact => "exact",
            AlignmentType::Similar => "similar",
            AlignmentType::Partial => "partial",
        }
    }
}

impl From<&str> for AlignmentType {
    fn from(s: &str) -> Self {
        match s {
            "exact" => AlignmentType::Exact,
            "partial" => AlignmentType::Partial,
            _ => AlignmentType::Similar,
        }
    }
}

/// A derived, rebuildable many-to-many relation between two Blocks
/// (typically across languages) that are believed to correspond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockAlignment {
    pub id: Uuid,
    pub block_a: Uuid,
    pub block_b: Uuid,
    pub alignment_type: AlignmentType,
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// The structural level a Review is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewScope {
    Work,
    Document,
    Section,
    Block,
}

impl ReviewScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewScope::Work => "work",
            ReviewScope::Document => "document",
            ReviewScope::Section => "section",
            ReviewScope::Block => "block",
        }
    }
}

impl From<&str> for ReviewScope {
    fn from(s: &str) -> Self {
        match s {
            "document" => ReviewScope::Document,
            "section" => ReviewScope::Section,
            "block" => ReviewScope::Block,
            _ => ReviewScope::Work,
        }
    }
}

/// Severity of a diagnostic Review record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s {
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            _ => Severity::Info,
        }
    }
}

/// A scoped diagnostic record raised against some part of a Work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub work_id: Uuid,
    pub scope: ReviewScope,
    /// Id of the scoped entity (Work/Document/Section/Block) this review targets.
    pub scope_id: Uuid,
    pub issue_type: String,
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_new_generates_unique_ids() {
        let section = Uuid::new_v4();
        let b1 = Block::new(section, BlockKind::Paragraph, None, "en", 0, "text");
        let b2 = Block::new(section, BlockKind::Paragraph, None, "en", 0, "text");
        assert_ne!(b1.id, b2.id);
    }

    #[test]
    fn block_kind_serializes_to_snake_case() {
        assert_eq!(
            serde_json::to_string(&BlockKind::CodeBlock).unwrap(),
            "\"code_block\""
        );
        assert_eq!(
            serde_json::to_string(&BlockKind::HorizontalRule).unwrap(),
            "\"horizontal_rule\""
        );
    }

    #[test]
    fn block_kind_round_trips_via_str() {
        for kind in [
            BlockKind::Paragraph,
            BlockKind::Heading,
            BlockKind::CodeBlock,
            BlockKind::HorizontalRule,
            BlockKind::Blockquote,
        ] {
            assert_eq!(BlockKind::from(kind.as_str()), kind);
        }
    }

    #[test]
    fn unknown_block_kind_str_falls_back_to_paragraph() {
        assert_eq!(BlockKind::from("nonsense"), BlockKind::Paragraph);
    }

    #[test]
    fn alignment_type_round_trips_via_str() {
        for t in [AlignmentType::Exact, AlignmentType::Similar, AlignmentType::Partial] {
            assert_eq!(AlignmentType::from(t.as_str()), t);
        }
    }

    #[test]
    fn review_scope_round_trips_via_str() {
        for s in [
            ReviewScope::Work,
            ReviewScope::Document,
            ReviewScope::Section,
            ReviewScope::Block,
        ] {
            assert_eq!(ReviewScope::from(s.as_str()), s);
        }
    }

    #[test]
    fn block_round_trips_json() {
        let section = Uuid::new_v4();
        let b = Block::new(section, BlockKind::Heading, Some(2), "en", 1, "## Hi");
        let json = serde_json::to_string(&b).expect("serialize");
        let b2: Block = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(b.id, b2.id);
        assert_eq!(b.heading_level, b2.heading_level);
        assert_eq!(b.source_text, b2.source_text);
    }
}
