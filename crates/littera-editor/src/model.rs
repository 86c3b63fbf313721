//! In-memory document model edited by a session, independent of how it is
//! persisted. One [`Container`] corresponds to one stored [`littera_core::Block`].

use std::rc::Rc;

use littera_core::BlockKind;
use uuid::Uuid;

/// Inline content within a [`ContentNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    /// A reference to a semantic-graph Entity, rendered with its label text
    /// at parse time. `entity_id` is carried so re-serialization can emit
    /// the same mention literal even if the label text is later reworded.
    Mention { entity_id: Uuid, label: String },
}

/// The block-level content a [`Container`] holds. Named after the Markdown
/// constructs a Block's `source_text` may contain.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    Paragraph(Vec<Inline>),
    Heading(u8, Vec<Inline>),
    CodeBlock { language: Option<String>, text: String },
    HorizontalRule,
    /// Preserved as a first-class node rather than flattened into its
    /// contained paragraphs, so a blockquote round-trips intact.
    Blockquote(Vec<ContentNode>),
}

/// One editable unit, corresponding 1:1 to a persisted [`littera_core::Block`].
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub block_id: Uuid,
    pub kind: BlockKind,
    pub language: String,
    pub order_index: i32,
    pub nodes: Vec<ContentNode>,
}

/// The whole editable body of a Section: an ordered list of Containers.
#[derive(Debug, Clone, Default)]
pub struct EditorDoc {
    pub root: Vec<Rc<Container>>,
}

impl EditorDoc {
    pub fn new(root: Vec<Rc<Container>>) -> Self {
        Self { root }
    }
}
