//! Tree construction from the scanned event stream
//!
//! Stack-based: open tags push a pending node, close tags pop and attach.
//! The builder is tolerant by design - it produces a best-effort tree even
//! for text the validator rejects, so callers can inspect malformed
//! documents. Validation remains a separate pass.

use super::node::Node;
use crate::core::tokenizer::{scan, Event};
use crate::error::Result;
use std::collections::BTreeMap;

/// A node still waiting for its closing tag
struct PendingNode {
    node: Node,
    text_buf: String,
    cdata: Option<String>,
}

impl PendingNode {
    fn new(node: Node) -> Self {
        PendingNode {
            node,
            text_buf: String::new(),
            cdata: None,
        }
    }

    /// Resolve content. CDATA wins over plain text when both are present.
    fn finish(mut self) -> Node {
        self.node.text_content = match self.cdata {
            Some(cdata) => Some(cdata),
            None => {
                let trimmed = self.text_buf.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        };
        self.node
    }
}

/// Build a node tree from raw text (internally scans)
pub fn build_tree(text: &str) -> Result<Vec<Node>> {
    let events = scan(text)?;
    Ok(build_from_events(&events))
}

/// Build a node tree from an already scanned event stream
pub fn build_from_events(events: &[Event]) -> Vec<Node> {
    let mut stack: Vec<PendingNode> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    let attach = |stack: &mut Vec<PendingNode>, roots: &mut Vec<Node>, node: Node| {
        match stack.last_mut() {
            Some(parent) => parent.node.children.push(node),
            None => roots.push(node),
        }
    };

    for event in events {
        match event {
            Event::OpenTag {
                name,
                attributes,
                self_closing,
                ..
            } => {
                let mut node = Node::new(name.clone());
                node.attributes = attributes
                    .iter()
                    .map(|a| (a.name.clone(), a.value.clone()))
                    .collect::<BTreeMap<_, _>>();
                node.uuid = Node::extract_uuid(&node.attributes);

                if *self_closing {
                    attach(&mut stack, &mut roots, node);
                } else {
                    stack.push(PendingNode::new(node));
                }
            }
            Event::CloseTag { name, .. } => {
                if !stack.iter().any(|p| p.node.tag_name == *name) {
                    // Stray closing tag: nothing to close, skip it
                    continue;
                }
                // Unwind to the matching opener, finishing implicitly
                // closed nodes on the way
                loop {
                    let pending = match stack.pop() {
                        Some(pending) => pending,
                        None => break,
                    };
                    let matched = pending.node.tag_name == *name;
                    let node = pending.finish();
                    attach(&mut stack, &mut roots, node);
                    if matched {
                        break;
                    }
                }
            }
            Event::Text { content, .. } => {
                if let Some(top) = stack.last_mut() {
                    top.text_buf.push_str(content);
                }
            }
            Event::CData { content, .. } => {
                if let Some(top) = stack.last_mut() {
                    // First CDATA wins; later sections append
                    match top.cdata.as_mut() {
                        Some(existing) => existing.push_str(content),
                        None => top.cdata = Some(content.clone()),
                    }
                }
            }
            // Comments, PIs, declarations and DOCTYPE carry no tree content
            _ => {}
        }
    }

    // Unclosed tags at EOF: finish them as if closed in order
    while let Some(pending) = stack.pop() {
        let node = pending.finish();
        match stack.last_mut() {
            Some(parent) => parent.node.children.push(node),
            None => roots.push(node),
        }
    }

    assign_paths(&mut roots, "", 0);
    roots
}

/// Assign unique slash-delimited paths and depths
///
/// Repeated same-named siblings get positional suffixes so that every
/// path in the tree is unique; singletons keep the bare name.
fn assign_paths(nodes: &mut [Node], parent_path: &str, depth: u32) {
    let mut name_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for node in nodes.iter() {
        *name_counts.entry(node.tag_name.as_str()).or_insert(0) += 1;
    }
    let repeated: Vec<String> = name_counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(name, _)| name.to_string())
        .collect();

    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for node in nodes.iter_mut() {
        let segment = if repeated.iter().any(|n| n == &node.tag_name) {
            let index = seen.entry(node.tag_name.clone()).or_insert(0);
            let segment = format!("{}[{}]", node.tag_name, index);
            *index += 1;
            segment
        } else {
            node.tag_name.clone()
        };

        node.path = if parent_path.is_empty() {
            segment
        } else {
            format!("{parent_path}/{segment}")
        };
        node.depth = depth;
        let path = node.path.clone();
        assign_paths(&mut node.children, &path, depth + 1);
    }
}
