//! Conversion between a Block's canonical `source_text` (Markdown with
//! mention literals) and the in-memory [`ContentNode`]/[`Inline`] tree.
//!
//! `pulldown-cmark` has no extension point for a custom inline syntax, so
//! mention literals (`{@label|entity:<uuid>}`) are extracted into sentinel
//! placeholder tokens before the text reaches the parser, then re-spliced
//! into `Inline::Mention` nodes once the event stream comes back.

use std::fmt::Write as _;

use littera_core::BlockKind;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use uuid::Uuid;

use crate::model::{Container, ContentNode, Inline};

const PLACEHOLDER_PREFIX: char = '\u{E000}';
const PLACEHOLDER_SUFFIX: char = '\u{E001}';

struct ExtractedMention {
    entity_id: Uuid,
    label: String,
}

/// Pulls every `{@label|entity:<uuid>}` literal out of `text`, replacing each
/// with a private-use-area placeholder that pulldown-cmark will treat as
/// ordinary text and never split across token boundaries.
fn extract_mentions(text: &str) -> (String, Vec<ExtractedMention>) {
    let mut out = String::with_capacity(text.len());
    let mut mentions = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("{@") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let body = &after[..end];
        if let Some((label, entity_part)) = body.split_once('|') {
            if let Some(id_str) = entity_part.strip_prefix("entity:") {
                if let Ok(entity_id) = Uuid::parse_str(id_str) {
                    let index = mentions.len();
                    mentions.push(ExtractedMention {
                        entity_id,
                        label: label.to_string(),
                    });
                    let _ = write!(out, "{PLACEHOLDER_PREFIX}{index}{PLACEHOLDER_SUFFIX}");
                    rest = &after[end + 1..];
                    continue;
                }
            }
        }
        // Not a well-formed mention literal; keep the text verbatim.
        out.push_str(&rest[start..start + 2 + end + 1]);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    (out, mentions)
}

fn split_placeholder(text: &str, mentions: &[ExtractedMention]) -> Vec<Inline> {
    let mut inlines = Vec::new();
    let mut buf = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == PLACEHOLDER_PREFIX {
            let mut index_str = String::new();
            while let Some(&d) = chars.peek() {
                if d == PLACEHOLDER_SUFFIX {
                    chars.next();
                    break;
                }
                index_str.push(d);
                chars.next();
            }
            if let Ok(index) = index_str.parse::<usize>() {
                if let Some(m) = mentions.get(index) {
                    if !buf.is_empty() {
                        inlines.push(Inline::Text(std::mem::take(&mut buf)));
                    }
                    inlines.push(Inline::Mention {
                        entity_id: m.entity_id,
                        label: m.label.clone(),
                    });
                    continue;
                }
            }
            // Unrecognized placeholder; keep literally.
            buf.push(c);
            buf.push_str(&index_str);
        } else {
            buf.push(c);
        }
    }
    if !buf.is_empty() {
        inlines.push(Inline::Text(buf));
    }
    inlines
}

/// Parses one Block's `source_text` into its [`ContentNode`] tree.
pub fn parse_source(source_text: &str) -> Vec<ContentNode> {
    let (placeholder_text, mentions) = extract_mentions(source_text);
    let parser = Parser::new_ext(&placeholder_text, Options::empty());

    let mut nodes = Vec::new();
    let mut stack: Vec<Vec<ContentNode>> = Vec::new();
    let mut inline_stack: Vec<Vec<Inline>> = vec![Vec::new()];
    let mut code_lang: Option<String> = None;
    let mut code_text = String::new();
    let mut heading_level: u8 = 1;
    let mut in_code_block = false;

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading_level = heading_level_to_u8(level);
                inline_stack.push(Vec::new());
            }
            Event::End(TagEnd::Heading(_)) => {
                let content = inline_stack.pop().unwrap_or_default();
                push_node(&mut nodes, &mut stack, ContentNode::Heading(heading_level, content));
            }
            Event::Start(Tag::Paragraph) => {
                inline_stack.push(Vec::new());
            }
            Event::End(TagEnd::Paragraph) => {
                let content = inline_stack.pop().unwrap_or_default();
                push_node(&mut nodes, &mut stack, ContentNode::Paragraph(content));
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                code_text.clear();
                code_lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                push_node(
                    &mut nodes,
                    &mut stack,
                    ContentNode::CodeBlock {
                        language: code_lang.take(),
                        text: std::mem::take(&mut code_text),
                    },
                );
            }
            Event::Rule => {
                push_node(&mut nodes, &mut stack, ContentNode::HorizontalRule);
            }
            Event::Start(Tag::BlockQuote(_)) => {
                stack.push(Vec::new());
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                let content = stack.pop().unwrap_or_default();
                push_node(&mut nodes, &mut stack, ContentNode::Blockquote(content));
            }
            Event::Start(Tag::Emphasis) => inline_stack.push(Vec::new()),
            Event::End(TagEnd::Emphasis) => {
                let inner = inline_stack.pop().unwrap_or_default();
                current_inline(&mut inline_stack).push(Inline::Emphasis(inner));
            }
            Event::Start(Tag::Strong) => inline_stack.push(Vec::new()),
            Event::End(TagEnd::Strong) => {
                let inner = inline_stack.pop().unwrap_or_default();
                current_inline(&mut inline_stack).push(Inline::Strong(inner));
            }
            Event::Text(text) => {
                if in_code_block {
                    code_text.push_str(&text);
                } else {
                    current_inline(&mut inline_stack).extend(split_placeholder(&text, &mentions));
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                current_inline(&mut inline_stack).push(Inline::Text("\n".to_string()));
            }
            _ => {}
        }
    }

    nodes
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn current_inline(inline_stack: &mut [Vec<Inline>]) -> &mut Vec<Inline> {
    inline_stack.last_mut().expect("inline stack never empty")
}

fn push_node(top_level: &mut Vec<ContentNode>, stack: &mut Vec<Vec<ContentNode>>, node: ContentNode) {
    match stack.last_mut() {
        Some(open_blockquote) => open_blockquote.push(node),
        None => top_level.push(node),
    }
}

/// Serializes a [`ContentNode`] tree back into canonical Markdown-with-mentions
/// source text. Calling `parse_source` on the output must reproduce the same
/// tree (the round-trip fixed point).
pub fn serialize_nodes(nodes: &[ContentNode]) -> String {
    let mut out = String::new();
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        serialize_node(node, &mut out);
    }
    out
}

fn serialize_node(node: &ContentNode, out: &mut String) {
    match node {
        ContentNode::Paragraph(inlines) => serialize_inlines(inlines, out),
        ContentNode::Heading(level, inlines) => {
            out.push_str(&"#".repeat(*level as usize));
            out.push(' ');
            serialize_inlines(inlines, out);
        }
        ContentNode::CodeBlock { language, text } => {
            out.push_str("```");
            if let Some(lang) = language {
                out.push_str(lang);
            }
            out.push('\n');
            out.push_str(text);
            out.push_str("\n```");
        }
        ContentNode::HorizontalRule => out.push_str("---"),
        ContentNode::Blockquote(inner) => {
            let body = serialize_nodes(inner);
            for line in body.lines() {
                out.push_str("> ");
                out.push_str(line);
                out.push('\n');
            }
            if out.ends_with('\n') {
                out.pop();
            }
        }
    }
}

fn serialize_inlines(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        serialize_inline(inline, out);
    }
}

fn serialize_inline(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text(text) => out.push_str(text),
        Inline::Emphasis(inner) => {
            out.push('*');
            serialize_inlines(inner, out);
            out.push('*');
        }
        Inline::Strong(inner) => {
            out.push_str("**");
            serialize_inlines(inner, out);
            out.push_str("**");
        }
        Inline::Mention { entity_id, label } => {
            let _ = write!(out, "{{@{label}|entity:{entity_id}}}");
        }
    }
}

/// Builds a [`Container`] from a persisted Block's fields and raw source text.
pub fn container_from_source(
    block_id: Uuid,
    kind: BlockKind,
    language: String,
    order_index: i32,
    source_text: &str,
) -> Container {
    Container {
        block_id,
        kind,
        language,
        order_index,
        nodes: parse_source(source_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paragraph_round_trips() {
        let nodes = parse_source("hello world");
        let text = serialize_nodes(&nodes);
        let nodes2 = parse_source(&text);
        assert_eq!(nodes, nodes2);
    }

    #[test]
    fn mention_literal_round_trips() {
        let id = Uuid::new_v4();
        let source = format!("Paris, said {{@the city|entity:{id}}}, is lovely.");
        let nodes = parse_source(&source);
        let has_mention = nodes.iter().any(|n| {
            matches!(n, ContentNode::Paragraph(inlines) if inlines.iter().any(|i| matches!(i, Inline::Mention { entity_id, .. } if *entity_id == id)))
        });
        assert!(has_mention);

        let text = serialize_nodes(&nodes);
        let nodes2 = parse_source(&text);
        assert_eq!(nodes, nodes2);
    }

    #[test]
    fn heading_level_round_trips() {
        let nodes = parse_source("## A Title");
        assert_eq!(nodes, vec![ContentNode::Heading(2, vec![Inline::Text("A Title".to_string())])]);
    }

    #[test]
    fn blockquote_is_preserved_as_first_class_node() {
        let nodes = parse_source("> quoted text");
        assert!(matches!(nodes.as_slice(), [ContentNode::Blockquote(_)]));
    }

    #[test]
    fn emphasis_and_strong_round_trip() {
        let nodes = parse_source("a *b* and **c**");
        let text = serialize_nodes(&nodes);
        let nodes2 = parse_source(&text);
        assert_eq!(nodes, nodes2);
    }

    #[test]
    fn malformed_mention_literal_is_kept_as_plain_text() {
        let nodes = parse_source("this {@not a mention} stays as text");
        let has_mention = nodes.iter().any(|n| {
            matches!(n, ContentNode::Paragraph(inlines) if inlines.iter().any(|i| matches!(i, Inline::Mention { .. })))
        });
        assert!(!has_mention);
    }
}
