//! Text-to-text format conversions: beautify, compress, JSON
//!
//! All three are pure functions of the source text. Beautify and compress
//! re-emit the scanned event stream; to_json serializes the built tree, so
//! the JSON conversion is by construction format-insensitive (beautified
//! and compressed inputs produce identical JSON).

use crate::core::attributes::RawAttribute;
use crate::core::entities::{escape_attribute, escape_text};
use crate::core::tokenizer::{scan, Event};
use crate::error::{Error, Result};
use crate::tree::{build_tree, Node};
use serde_json::{Map, Value};

const INDENT: &str = "  ";

fn open_tag(name: &str, attributes: &[RawAttribute], self_closing: bool) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('<');
    out.push_str(name);
    for attr in attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(&attr.value));
        out.push('"');
    }
    out.push_str(if self_closing { "/>" } else { ">" });
    out
}

fn standalone_markup(event: &Event) -> Option<String> {
    match event {
        Event::Declaration { content, .. } => Some(format!("<?{content}?>")),
        Event::Doctype { content, .. } => Some(format!("<!DOCTYPE {content}>")),
        Event::ProcessingInstruction { target, data, .. } => {
            if data.is_empty() {
                Some(format!("<?{target}?>"))
            } else {
                Some(format!("<?{target} {data}?>"))
            }
        }
        Event::Comment { content, .. } => Some(format!("<!--{content}-->")),
        Event::CData { content, .. } => Some(format!("<![CDATA[{content}]]>")),
        _ => None,
    }
}

/// Re-indent markup with a fixed two-space unit, one element per line
///
/// Comments and CDATA are preserved verbatim; elements holding only a
/// short text or CDATA run are kept on a single line.
pub fn beautify(text: &str) -> Result<String> {
    let events = scan(text)?;
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    let mut depth = 0usize;
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::OpenTag {
                name,
                attributes,
                self_closing,
                ..
            } => {
                // Inline an element whose entire content is one text or
                // CDATA run
                if !self_closing {
                    let inline = match (events.get(i + 1), events.get(i + 2)) {
                        (Some(Event::Text { content, .. }), Some(Event::CloseTag { name: close, .. }))
                            if close == name && !content.trim().is_empty() =>
                        {
                            Some(escape_text(content.trim()).into_owned())
                        }
                        (Some(Event::CData { content, .. }), Some(Event::CloseTag { name: close, .. }))
                            if close == name =>
                        {
                            Some(format!("<![CDATA[{content}]]>"))
                        }
                        _ => None,
                    };
                    if let Some(body) = inline {
                        push_line(
                            &mut out,
                            depth,
                            &format!(
                                "{}{}</{}>",
                                open_tag(name, attributes, false),
                                body,
                                name
                            ),
                        );
                        i += 3;
                        continue;
                    }
                }

                push_line(&mut out, depth, &open_tag(name, attributes, *self_closing));
                if !self_closing {
                    depth += 1;
                }
            }
            Event::CloseTag { name, .. } => {
                depth = depth.saturating_sub(1);
                push_line(&mut out, depth, &format!("</{name}>"));
            }
            Event::Text { content, .. } => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    push_line(&mut out, depth, &escape_text(trimmed));
                }
            }
            other => {
                if let Some(markup) = standalone_markup(other) {
                    push_line(&mut out, depth, &markup);
                }
            }
        }
        i += 1;
    }

    Ok(out)
}

fn push_line(out: &mut String, depth: usize, content: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(content);
    out.push('\n');
}

/// Remove insignificant whitespace between tags
///
/// Whitespace-only text runs are dropped; non-blank text is kept trimmed.
/// CDATA content is untouched.
pub fn compress(text: &str) -> Result<String> {
    let events = scan(text)?;
    let mut out = String::with_capacity(text.len());

    for event in &events {
        match event {
            Event::OpenTag {
                name,
                attributes,
                self_closing,
                ..
            } => out.push_str(&open_tag(name, attributes, *self_closing)),
            Event::CloseTag { name, .. } => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            Event::Text { content, .. } => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    out.push_str(&escape_text(trimmed));
                }
            }
            other => {
                if let Some(markup) = standalone_markup(other) {
                    out.push_str(&markup);
                }
            }
        }
    }

    Ok(out)
}

/// Convert markup text to its JSON representation
///
/// Attributes are prefixed with '@', text content lives under "#text",
/// repeated children become arrays - the JSON-equivalent of the tree
/// builder's output.
pub fn to_json(text: &str) -> Result<String> {
    let nodes = build_tree(text)?;
    let value = forest_to_value(&nodes);
    serde_json::to_string_pretty(&value).map_err(|e| Error::convert(e.to_string()))
}

fn forest_to_value(nodes: &[Node]) -> Value {
    let mut map = Map::new();
    let mut names: Vec<&str> = Vec::new();
    for node in nodes {
        if !names.contains(&node.tag_name.as_str()) {
            names.push(&node.tag_name);
        }
    }

    for name in names {
        let group: Vec<&Node> = nodes.iter().filter(|n| n.tag_name == name).collect();
        if group.len() == 1 {
            map.insert(name.to_string(), node_to_value(group[0]));
        } else {
            map.insert(
                name.to_string(),
                Value::Array(group.into_iter().map(node_to_value).collect()),
            );
        }
    }
    Value::Object(map)
}

fn node_to_value(node: &Node) -> Value {
    // Pure text leaves collapse to a plain string
    if node.attributes.is_empty() && node.children.is_empty() {
        return match &node.text_content {
            Some(text) => Value::String(text.clone()),
            None => Value::Object(Map::new()),
        };
    }

    let mut map = Map::new();
    for (name, value) in &node.attributes {
        map.insert(format!("@{name}"), Value::String(value.clone()));
    }
    if let Some(text) = &node.text_content {
        map.insert("#text".to_string(), Value::String(text.clone()));
    }
    if let Value::Object(children) = forest_to_value(&node.children) {
        for (key, value) in children {
            map.insert(key, value);
        }
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beautify_indents() {
        let out = beautify("<a><b><c/></b></a>").unwrap();
        assert_eq!(out, "<a>\n  <b>\n    <c/>\n  </b>\n</a>\n");
    }

    #[test]
    fn test_beautify_inline_text_leaf() {
        let out = beautify("<a><b>hi</b></a>").unwrap();
        assert_eq!(out, "<a>\n  <b>hi</b>\n</a>\n");
    }

    #[test]
    fn test_beautify_preserves_comments_and_cdata() {
        let out = beautify("<a><!-- note --><![CDATA[raw <x>]]></a>").unwrap();
        assert!(out.contains("<!-- note -->"));
        assert!(out.contains("<![CDATA[raw <x>]]>"));
    }

    #[test]
    fn test_compress_removes_whitespace() {
        let out = compress("<a>\n  <b>hi</b>\n</a>").unwrap();
        assert_eq!(out, "<a><b>hi</b></a>");
    }

    #[test]
    fn test_compress_keeps_text() {
        let out = compress("<a>  keep me  </a>").unwrap();
        assert_eq!(out, "<a>keep me</a>");
    }

    #[test]
    fn test_to_json_attributes_and_text() {
        let json = to_json("<a x=\"1\"><b>hi</b></a>").unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["a"]["@x"], "1");
        assert_eq!(value["a"]["b"], "hi");
    }

    #[test]
    fn test_to_json_repeated_children_as_array() {
        let json = to_json("<r><x>1</x><x>2</x></r>").unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["r"]["x"], serde_json::json!(["1", "2"]));
    }

    #[test]
    fn test_to_json_format_insensitive() {
        let text = "<r a=\"1\">\n  <x>one</x>\n  <x>two</x>\n</r>";
        let pretty = beautify(text).unwrap();
        let compact = compress(text).unwrap();
        assert_eq!(to_json(&pretty).unwrap(), to_json(&compact).unwrap());
        assert_eq!(to_json(text).unwrap(), to_json(&compact).unwrap());
    }

    #[test]
    fn test_conversion_failure_surfaces() {
        assert!(beautify("no markup at all").is_err());
        assert!(to_json("no markup at all").is_err());
    }
}
