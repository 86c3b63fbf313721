//! Structural mutations on an [`EditorDoc`]: splitting a container, deleting
//! one, and the slash-prefixed command palette that turns an empty content
//! node into a heading, code block, quote, or horizontal rule.
//!
//! Containers are isolating by construction: the only operations here either
//! act within one container (`apply_structural_command`) or move whole
//! containers around (`split_container`, `delete_container`). There is no
//! join/merge operation, so a caller can never fold one container's content
//! into another's.

use std::rc::Rc;

use littera_core::BlockKind;
use uuid::Uuid;

use crate::model::{Container, ContentNode, EditorDoc};

/// A command from the slash-prefixed palette. Offered only when the cursor
/// sits at the start of an otherwise-empty content node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralCommand {
    Heading(u8),
    CodeBlock,
    Blockquote,
    HorizontalRule,
}

impl StructuralCommand {
    /// Parses the token typed after the `/` trigger, e.g. `"h2"` -> `Heading(2)`.
    pub fn from_palette_token(token: &str) -> Option<Self> {
        match token {
            "h1" => Some(Self::Heading(1)),
            "h2" => Some(Self::Heading(2)),
            "h3" => Some(Self::Heading(3)),
            "code" => Some(Self::CodeBlock),
            "quote" => Some(Self::Blockquote),
            "hr" => Some(Self::HorizontalRule),
            _ => None,
        }
    }
}

/// Whether `node` is the kind of node the palette is allowed to activate
/// against: an empty paragraph, the state a freshly split or freshly typed
/// line starts in.
pub fn is_palette_activation_point(node: &ContentNode) -> bool {
    matches!(node, ContentNode::Paragraph(inlines) if inlines.is_empty())
}

fn renumber(root: &mut [Rc<Container>]) {
    for (index, container) in root.iter_mut().enumerate() {
        if container.order_index != index as i32 {
            *container = Rc::new(Container {
                order_index: index as i32,
                ..(**container).clone()
            });
        }
    }
}

impl EditorDoc {
    /// Splits the container at `container_index` at content-node boundary
    /// `split_at`: nodes before the boundary stay in place, nodes from
    /// `split_at` onward move into a freshly identified container inserted
    /// immediately after it. Regular newlines never call this; only the
    /// split chord does. `new_id` is caller-minted like every other
    /// identifier in this model.
    ///
    /// Returns `false`, leaving the document unchanged, if `container_index`
    /// is out of range.
    pub fn split_container(&mut self, container_index: usize, split_at: usize, new_id: Uuid) -> bool {
        let Some(container) = self.root.get(container_index) else {
            return false;
        };
        let split_at = split_at.min(container.nodes.len());
        let tail = container.nodes[split_at..].to_vec();
        let head = container.nodes[..split_at].to_vec();

        let updated_head = Rc::new(Container {
            nodes: head,
            ..(**container).clone()
        });
        let new_container = Rc::new(Container {
            block_id: new_id,
            kind: container.kind,
            language: container.language.clone(),
            order_index: container.order_index,
            nodes: if tail.is_empty() { vec![ContentNode::Paragraph(Vec::new())] } else { tail },
        });

        self.root[container_index] = updated_head;
        self.root.insert(container_index + 1, new_container);
        renumber(&mut self.root);
        true
    }

    /// Removes the container identified by `block_id`. The document always
    /// has at least one container, so deleting the only remaining one
    /// inserts an empty replacement carrying `replacement_id` rather than
    /// leaving the document empty.
    ///
    /// Returns `false` if no container with `block_id` was found.
    pub fn delete_container(&mut self, block_id: Uuid, replacement_id: Uuid, language: impl Into<String>) -> bool {
        let before = self.root.len();
        self.root.retain(|c| c.block_id != block_id);
        if self.root.len() == before {
            return false;
        }

        if self.root.is_empty() {
            self.root.push(Rc::new(Container {
                block_id: replacement_id,
                kind: BlockKind::Paragraph,
                language: language.into(),
                order_index: 0,
                nodes: vec![ContentNode::Paragraph(Vec::new())],
            }));
        } else {
            renumber(&mut self.root);
        }
        true
    }

    /// Applies a structural command to the content node at
    /// `(container_index, node_index)`. Only valid when that node is an
    /// empty paragraph; returns `false` otherwise, or if either index is out
    /// of range.
    pub fn apply_structural_command(
        &mut self,
        container_index: usize,
        node_index: usize,
        command: StructuralCommand,
    ) -> bool {
        let Some(container) = self.root.get(container_index) else {
            return false;
        };
        let Some(node) = container.nodes.get(node_index) else {
            return false;
        };
        if !is_palette_activation_point(node) {
            return false;
        }

        let mut nodes = container.nodes.clone();
        match command {
            StructuralCommand::Heading(level) => nodes[node_index] = ContentNode::Heading(level, Vec::new()),
            StructuralCommand::CodeBlock => {
                nodes[node_index] = ContentNode::CodeBlock { language: None, text: String::new() }
            }
            StructuralCommand::Blockquote => {
                nodes[node_index] = ContentNode::Blockquote(vec![ContentNode::Paragraph(Vec::new())])
            }
            StructuralCommand::HorizontalRule => {
                nodes[node_index] = ContentNode::HorizontalRule;
                nodes.insert(node_index + 1, ContentNode::Paragraph(Vec::new()));
            }
        }

        self.root[container_index] = Rc::new(Container { nodes, ..(**container).clone() });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Inline;

    fn container(block_id: Uuid, nodes: Vec<ContentNode>) -> Rc<Container> {
        Rc::new(Container {
            block_id,
            kind: BlockKind::Paragraph,
            language: "en".to_string(),
            order_index: 0,
            nodes,
        })
    }

    #[test]
    fn from_palette_token_parses_known_commands() {
        assert_eq!(StructuralCommand::from_palette_token("h2"), Some(StructuralCommand::Heading(2)));
        assert_eq!(StructuralCommand::from_palette_token("code"), Some(StructuralCommand::CodeBlock));
        assert_eq!(StructuralCommand::from_palette_token("nope"), None);
    }

    #[test]
    fn split_container_moves_tail_nodes_into_a_new_container() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let text = ContentNode::Paragraph(vec![Inline::Text("a".to_string())]);
        let heading = ContentNode::Heading(1, vec![Inline::Text("b".to_string())]);
        let mut doc = EditorDoc::new(vec![container(first, vec![text.clone(), heading.clone()])]);

        let ok = doc.split_container(0, 1, second);
        assert!(ok);
        assert_eq!(doc.root.len(), 2);
        assert_eq!(doc.root[0].block_id, first);
        assert_eq!(doc.root[0].nodes, vec![text]);
        assert_eq!(doc.root[1].block_id, second);
        assert_eq!(doc.root[1].nodes, vec![heading]);
    }

    #[test]
    fn split_container_out_of_range_is_a_no_op() {
        let mut doc = EditorDoc::new(vec![container(Uuid::new_v4(), vec![ContentNode::Paragraph(Vec::new())])]);
        assert!(!doc.split_container(5, 0, Uuid::new_v4()));
        assert_eq!(doc.root.len(), 1);
    }

    #[test]
    fn deleting_the_last_container_inserts_an_empty_replacement() {
        let only = Uuid::new_v4();
        let replacement = Uuid::new_v4();
        let mut doc = EditorDoc::new(vec![container(only, vec![ContentNode::Paragraph(Vec::new())])]);

        let ok = doc.delete_container(only, replacement, "en");
        assert!(ok);
        assert_eq!(doc.root.len(), 1);
        assert_eq!(doc.root[0].block_id, replacement);
        assert_eq!(doc.root[0].nodes, vec![ContentNode::Paragraph(Vec::new())]);
    }

    #[test]
    fn deleting_one_of_several_containers_leaves_the_rest() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut doc = EditorDoc::new(vec![
            container(a, vec![ContentNode::Paragraph(Vec::new())]),
            container(b, vec![ContentNode::Paragraph(Vec::new())]),
        ]);

        let ok = doc.delete_container(a, Uuid::new_v4(), "en");
        assert!(ok);
        assert_eq!(doc.root.len(), 1);
        assert_eq!(doc.root[0].block_id, b);
        assert_eq!(doc.root[0].order_index, 0);
    }

    #[test]
    fn deleting_unknown_id_is_a_no_op() {
        let mut doc = EditorDoc::new(vec![container(Uuid::new_v4(), vec![ContentNode::Paragraph(Vec::new())])]);
        assert!(!doc.delete_container(Uuid::new_v4(), Uuid::new_v4(), "en"));
        assert_eq!(doc.root.len(), 1);
    }

    #[test]
    fn structural_command_rewrites_an_empty_paragraph() {
        let id = Uuid::new_v4();
        let mut doc = EditorDoc::new(vec![container(id, vec![ContentNode::Paragraph(Vec::new())])]);

        let ok = doc.apply_structural_command(0, 0, StructuralCommand::Heading(2));
        assert!(ok);
        assert_eq!(doc.root[0].nodes, vec![ContentNode::Heading(2, Vec::new())]);
    }

    #[test]
    fn structural_command_refuses_a_nonempty_node() {
        let id = Uuid::new_v4();
        let mut doc = EditorDoc::new(vec![container(
            id,
            vec![ContentNode::Paragraph(vec![Inline::Text("not empty".to_string())])],
        )]);

        let ok = doc.apply_structural_command(0, 0, StructuralCommand::CodeBlock);
        assert!(!ok);
        assert!(matches!(doc.root[0].nodes[0], ContentNode::Paragraph(_)));
    }

    #[test]
    fn horizontal_rule_inserts_a_fresh_empty_node_after_it() {
        let id = Uuid::new_v4();
        let mut doc = EditorDoc::new(vec![container(id, vec![ContentNode::Paragraph(Vec::new())])]);

        let ok = doc.apply_structural_command(0, 0, StructuralCommand::HorizontalRule);
        assert!(ok);
        assert_eq!(
            doc.root[0].nodes,
            vec![ContentNode::HorizontalRule, ContentNode::Paragraph(Vec::new())]
        );
    }
}
