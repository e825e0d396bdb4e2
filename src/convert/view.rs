//! Typed element views over the parsed tree
//!
//! ElementViews are the UI-ready projection of Nodes: flat list with
//! synthetic ids, coarse type classification, derived tags and parent
//! back-references by id (never owning). The whole list is rebuilt per
//! parse and never patched.

use super::classify::{classify, describe, matched_keyword, ElementType};
use crate::tree::Node;
use serde::Serialize;
use std::collections::BTreeMap;

/// Derived, display-oriented element metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Source line; zero when the scanning strategy did not track it
    pub line: u32,
    /// Byte offset; zero when not tracked
    pub byte_offset: usize,
}

/// A typed projection of a Node for consumers beyond the core
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementView {
    /// Synthetic id, independent of path
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub path: String,
    pub depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    pub metadata: ElementMetadata,
    /// Parent view id (back-reference, never owning)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Child view ids in document order
    pub children: Vec<String>,
}

/// Project a node forest into a flat, pre-order list of element views
pub fn to_element_views(nodes: &[Node]) -> Vec<ElementView> {
    let mut views = Vec::new();
    let mut counter = 0usize;
    for node in nodes {
        project(node, None, None, &mut counter, &mut views);
    }
    views
}

fn project(
    node: &Node,
    parent_id: Option<&str>,
    inherited_namespace: Option<&str>,
    counter: &mut usize,
    views: &mut Vec<ElementView>,
) -> String {
    let id = format!("el-{}", *counter);
    *counter += 1;

    // Best-effort namespace: own xmlns attribute, else inherited
    let namespace = node
        .attributes
        .get("xmlns")
        .cloned()
        .or_else(|| inherited_namespace.map(str::to_string));

    let mut tags = vec![node.tag_name.to_ascii_lowercase()];
    if node.uuid.is_some() {
        tags.push("uuid".to_string());
    }
    if node.attributes.contains_key("DEST") {
        tags.push("reference".to_string());
    }
    if let Some(keyword) = matched_keyword(&node.tag_name) {
        tags.push(keyword.to_string());
    }

    let view = ElementView {
        id: id.clone(),
        name: node.tag_name.clone(),
        element_type: classify(&node.tag_name),
        path: node.path.clone(),
        depth: node.depth,
        uuid: node.uuid.clone(),
        attributes: node.attributes.clone(),
        text_content: node.text_content.clone(),
        metadata: ElementMetadata {
            namespace: namespace.clone(),
            description: describe(&node.tag_name).map(str::to_string),
            tags,
            line: 0,
            byte_offset: 0,
        },
        parent: parent_id.map(str::to_string),
        children: Vec::new(),
    };
    let index = views.len();
    views.push(view);

    let mut child_ids = Vec::with_capacity(node.children.len());
    for child in &node.children {
        child_ids.push(project(child, Some(&id), namespace.as_deref(), counter, views));
    }
    views[index].children = child_ids;

    id
}
