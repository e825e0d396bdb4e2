//! Tree node type produced by the builder

use serde::Serialize;
use std::collections::BTreeMap;

/// A typed element in the parsed document tree
///
/// `path` is a slash-delimited address unique within the tree; repeated
/// same-named siblings carry positional suffixes (`Foo/Bar[0]`,
/// `Foo/Bar[1]`). `depth` is 0 for roots. `uuid` is extracted from the
/// `UUID`, `uuid` or `id` attribute, in that priority order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub tag_name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    pub path: String,
    pub depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl Node {
    /// Create a bare node; path and depth are assigned by the builder
    pub fn new(tag_name: impl Into<String>) -> Self {
        Node {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text_content: None,
            path: String::new(),
            depth: 0,
            uuid: None,
        }
    }

    /// Extract the uuid following the UUID > uuid > id priority order
    pub fn extract_uuid(attributes: &BTreeMap<String, String>) -> Option<String> {
        ["UUID", "uuid", "id"]
            .iter()
            .find_map(|key| attributes.get(*key).cloned())
    }

    /// Count this node plus all descendants
    pub fn element_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Node::element_count)
            .sum::<usize>()
    }

    /// Best-effort size estimate of this subtree's owned data in bytes
    pub fn estimated_size(&self) -> usize {
        let own = std::mem::size_of::<Node>()
            + self.tag_name.len()
            + self.path.len()
            + self.text_content.as_ref().map_or(0, String::len)
            + self.uuid.as_ref().map_or(0, String::len)
            + self
                .attributes
                .iter()
                .map(|(k, v)| k.len() + v.len())
                .sum::<usize>();
        own + self.children.iter().map(Node::estimated_size).sum::<usize>()
    }

    /// Find a descendant (or self) by its exact path
    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        if self.path == path {
            return Some(self);
        }
        // Child paths strictly extend the parent's path
        if !path.starts_with(self.path.as_str()) {
            return None;
        }
        self.children.iter().find_map(|c| c.find_by_path(path))
    }
}
