//! Tree serialization back to markup text
//!
//! The inverse of the builder: repeated tag names re-collapse naturally by
//! serializing children in document order. Round-tripping a tree through
//! `to_markup` and `build_tree` yields a structurally equal tree
//! (attributes as sets, children ordered).

use super::node::Node;
use crate::core::entities::{escape_attribute, escape_text};

const INDENT: &str = "  ";

/// Serialize a node forest to indented markup text
pub fn to_markup(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, 0, &mut out);
    }
    out
}

/// Write text content, preserving significant edge whitespace via CDATA
///
/// The builder trims plain text, so content whose edges matter (it came
/// from a CDATA section) must go back out as CDATA to survive a round
/// trip. The same goes for empty content, which only a CDATA section can
/// carry.
fn write_text(text: &str, out: &mut String) {
    if text.is_empty() || text.trim() != text {
        out.push_str("<![CDATA[");
        out.push_str(text);
        out.push_str("]]>");
    } else {
        out.push_str(&escape_text(text));
    }
}

fn write_node(node: &Node, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push('<');
    out.push_str(&node.tag_name);
    for (name, value) in &node.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }

    match (&node.text_content, node.children.is_empty()) {
        (None, true) => {
            out.push_str("/>\n");
        }
        (Some(text), true) => {
            out.push('>');
            write_text(text, out);
            out.push_str("</");
            out.push_str(&node.tag_name);
            out.push_str(">\n");
        }
        (text, false) => {
            out.push_str(">\n");
            if let Some(text) = text {
                for _ in 0..=depth {
                    out.push_str(INDENT);
                }
                write_text(text, out);
                out.push('\n');
            }
            for child in &node.children {
                write_node(child, depth + 1, out);
            }
            for _ in 0..depth {
                out.push_str(INDENT);
            }
            out.push_str("</");
            out.push_str(&node.tag_name);
            out.push_str(">\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::builder::build_tree;

    #[test]
    fn test_leaf_with_text_inline() {
        let nodes = build_tree("<a><b>hi</b></a>").unwrap();
        let markup = to_markup(&nodes);
        assert_eq!(markup, "<a>\n  <b>hi</b>\n</a>\n");
    }

    #[test]
    fn test_empty_element_self_closes() {
        let nodes = build_tree("<a><b></b></a>").unwrap();
        let markup = to_markup(&nodes);
        assert_eq!(markup, "<a>\n  <b/>\n</a>\n");
    }

    #[test]
    fn test_attributes_serialized() {
        let nodes = build_tree("<a x=\"1\" y=\"two\"/>").unwrap();
        let markup = to_markup(&nodes);
        assert_eq!(markup, "<a x=\"1\" y=\"two\"/>\n");
    }

    #[test]
    fn test_special_chars_escaped() {
        let nodes = build_tree("<a t=\"&quot;q&quot;\">x &lt; y</a>").unwrap();
        let markup = to_markup(&nodes);
        assert!(markup.contains("t=\"&quot;q&quot;\""));
        assert!(markup.contains("x &lt; y"));
    }

    #[test]
    fn test_roundtrip_structural_equality() {
        let text = "<AUTOSAR xmlns=\"http://autosar.org/schema/r4.0\">\
                    <AR-PACKAGES><AR-PACKAGE UUID=\"u1\"><SHORT-NAME>P1</SHORT-NAME></AR-PACKAGE>\
                    <AR-PACKAGE UUID=\"u2\"><SHORT-NAME>P2</SHORT-NAME></AR-PACKAGE></AR-PACKAGES></AUTOSAR>";
        let original = build_tree(text).unwrap();
        let rebuilt = build_tree(&to_markup(&original)).unwrap();
        assert_eq!(original, rebuilt);
    }

    #[test]
    fn test_roundtrip_cdata_edge_whitespace() {
        let original = build_tree("<a><![CDATA[  padded  ]]></a>").unwrap();
        let rebuilt = build_tree(&to_markup(&original)).unwrap();
        assert_eq!(original, rebuilt);
        assert_eq!(rebuilt[0].text_content.as_deref(), Some("  padded  "));
    }

    #[test]
    fn test_roundtrip_empty_cdata() {
        let original = build_tree("<a><![CDATA[]]></a>").unwrap();
        assert_eq!(original[0].text_content.as_deref(), Some(""));
        let rebuilt = build_tree(&to_markup(&original)).unwrap();
        assert_eq!(original, rebuilt);
    }

    #[test]
    fn test_roundtrip_repeated_siblings() {
        let original = build_tree("<r><x>1</x><x>2</x><x>3</x></r>").unwrap();
        let rebuilt = build_tree(&to_markup(&original)).unwrap();
        assert_eq!(original, rebuilt);
        assert_eq!(rebuilt[0].children[2].path, "r/x[2]");
    }
}
