//! Attribute parsing from raw tag content
//!
//! Tolerant parsing: single quotes, double quotes and unquoted values are
//! all accepted so that the tree builder survives malformed input. Each
//! attribute records whether its value was quoted; the validator turns
//! unquoted values into diagnostics, the builder does not care.

use super::entities::decode_text;
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use serde::Serialize;

/// A parsed attribute from an open tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawAttribute {
    /// Attribute name (may include a namespace prefix)
    pub name: String,
    /// Attribute value (entities decoded)
    pub value: String,
    /// Whether the value was wrapped in matching quotes
    pub quoted: bool,
}

/// Parse attributes from raw tag content (the bytes between the element
/// name and '>' or '/>')
pub fn parse_attributes(input: &str) -> Vec<RawAttribute> {
    let bytes = input.as_bytes();
    let mut attrs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] == b'/' || bytes[pos] == b'>' || bytes[pos] == b'?' {
            break;
        }

        // Attribute name
        let name_start = pos;
        if !is_name_start_char(bytes[pos]) {
            pos += 1;
            continue;
        }
        while pos < bytes.len() && is_name_char(bytes[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        if pos >= bytes.len() || bytes[pos] != b'=' {
            // Valueless attribute (HTML-style boolean); treated as quoted
            // since there is no value to misquote
            attrs.push(RawAttribute {
                name: name.to_string(),
                value: String::new(),
                quoted: true,
            });
            continue;
        }

        pos += 1; // Skip '='
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            attrs.push(RawAttribute {
                name: name.to_string(),
                value: String::new(),
                quoted: false,
            });
            break;
        }

        let quote = bytes[pos];
        if quote == b'"' || quote == b'\'' {
            pos += 1;
            let value_start = pos;
            while pos < bytes.len() && bytes[pos] != quote {
                pos += 1;
            }
            let closed = pos < bytes.len();
            let value = decode_text(&input[value_start..pos]).into_owned();
            if closed {
                pos += 1;
            }
            attrs.push(RawAttribute {
                name: name.to_string(),
                value,
                quoted: closed,
            });
        } else {
            // Unquoted value: read until whitespace or tag end
            let value_start = pos;
            while pos < bytes.len()
                && !is_whitespace(bytes[pos])
                && bytes[pos] != b'/'
                && bytes[pos] != b'>'
            {
                pos += 1;
            }
            let value = decode_text(&input[value_start..pos]).into_owned();
            attrs.push(RawAttribute {
                name: name.to_string(),
                value,
                quoted: false,
            });
        }
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_attributes() {
        let attrs = parse_attributes(" id=\"test\" class=\"foo\"");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name, "id");
        assert_eq!(attrs[0].value, "test");
        assert!(attrs[0].quoted);
        assert_eq!(attrs[1].name, "class");
        assert_eq!(attrs[1].value, "foo");
    }

    #[test]
    fn test_single_quoted() {
        let attrs = parse_attributes(" id='test'");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value, "test");
        assert!(attrs[0].quoted);
    }

    #[test]
    fn test_unquoted_value() {
        let attrs = parse_attributes(" b=unquoted");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "b");
        assert_eq!(attrs[0].value, "unquoted");
        assert!(!attrs[0].quoted);
    }

    #[test]
    fn test_namespaced_attribute() {
        let attrs = parse_attributes(" xmlns:xlink=\"http://www.w3.org/1999/xlink\"");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "xmlns:xlink");
        assert_eq!(attrs[0].value, "http://www.w3.org/1999/xlink");
    }

    #[test]
    fn test_entity_in_value() {
        let attrs = parse_attributes(" title=\"&lt;hello&gt;\"");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value, "<hello>");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_attributes("").is_empty());
    }

    #[test]
    fn test_whitespace_handling() {
        let attrs = parse_attributes("  id  =  \"test\"  ");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "id");
        assert_eq!(attrs[0].value, "test");
    }

    #[test]
    fn test_unterminated_quote() {
        let attrs = parse_attributes(" id=\"open");
        assert_eq!(attrs.len(), 1);
        assert!(!attrs[0].quoted);
    }
}
