//! Well-formedness validation
//!
//! Independent from the tree builder: validation runs line-oriented,
//! best-effort passes over the raw text and accumulates diagnostics. No
//! pass blocks another, so one broken construct does not hide the rest.
//!
//! Passes, in order: empty check, markup heuristic, structure
//! (declaration/root), tag stack, attribute quoting, character validity,
//! CDATA nesting, encoding, performance.

pub mod diagnostics;
pub mod stack;

pub use diagnostics::{
    Diagnostic, ErrorKind, ValidationError, ValidationResult, ValidationWarning, WarningKind,
};
pub use stack::TagStackScanner;

use crate::core::encoding::{declared_encoding, is_supported_encoding, Bom};
use crate::core::tokenizer::{scan, Event};
use memchr::memchr_iter;

/// Documents above this size get a performance warning
pub const LARGE_FILE_BYTES: usize = 10 * 1024 * 1024;
/// Nesting deeper than this gets a performance warning
pub const MAX_COMFORTABLE_DEPTH: usize = 20;
/// Elements with more attributes than this get a performance warning
pub const MAX_COMFORTABLE_ATTRIBUTES: usize = 50;

/// Validate raw markup text
///
/// `is_valid` is true iff no errors were found; warnings never affect it.
pub fn validate(text: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    // Pass 1: reject empty input immediately
    if text.trim().is_empty() {
        result.push_error(ValidationError::new(
            ErrorKind::EmptyContent,
            "Document is empty",
            None,
        ));
        return result;
    }

    // Pass 2: content must at least look like markup
    if !looks_like_markup(text) {
        result.push_error(ValidationError::new(
            ErrorKind::NotMarkup,
            "Content does not look like markup",
            Some(1),
        ));
        return result;
    }

    let events = match scan(text) {
        Ok(events) => events,
        Err(err) => {
            result.push_error(ValidationError::new(
                ErrorKind::NotMarkup,
                err.to_string(),
                Some(1),
            ));
            return result;
        }
    };

    structure_pass(text, &events, &mut result);
    let max_depth = tag_stack_pass(text, &mut result);
    attribute_pass(&events, &mut result);
    character_pass(text, &mut result);
    cdata_pass(text, &mut result);
    encoding_pass(text, &events, &mut result);
    performance_pass(text, &events, max_depth, &mut result);

    result
}

/// Heuristic markup check: starts with '<', contains '>', and opens with a
/// declaration, element, CDATA section or comment
fn looks_like_markup(text: &str) -> bool {
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if !trimmed.starts_with('<') || !trimmed.contains('>') {
        return false;
    }
    let bytes = trimmed.as_bytes();
    trimmed.starts_with("<?xml")
        || trimmed.starts_with("<!--")
        || trimmed.starts_with("<![CDATA[")
        || trimmed.starts_with("<!DOCTYPE")
        || bytes
            .get(1)
            .is_some_and(|&b| b == b'/' || crate::core::scanner::is_name_start_char(b))
}

/// Pass 3: XML declaration and root element structure
fn structure_pass(_text: &str, events: &[Event], result: &mut ValidationResult) {
    let has_declaration = events.iter().any(|e| matches!(e, Event::Declaration { .. }));
    if !has_declaration {
        result.push_warning(ValidationWarning::new(
            WarningKind::MissingDeclaration,
            "Missing XML declaration (<?xml version=\"1.0\"?>)",
            Some(1),
        ));
    }

    let mut depth = 0usize;
    let mut roots = 0usize;
    let mut extra_root_line = None;
    for event in events {
        match event {
            Event::OpenTag {
                self_closing, line, ..
            } => {
                if depth == 0 {
                    roots += 1;
                    if roots == 2 {
                        extra_root_line = Some(*line);
                    }
                }
                if !self_closing {
                    depth += 1;
                }
            }
            Event::CloseTag { .. } => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    if roots > 1 {
        result.push_error(ValidationError::new(
            ErrorKind::MultipleRoots,
            format!("Document has {roots} root elements; exactly one is allowed"),
            extra_root_line,
        ));
    }
}

/// Pass 4: tag nesting via the line-oriented stack scanner
///
/// Returns the deepest nesting level seen, for the performance pass.
fn tag_stack_pass(text: &str, result: &mut ValidationResult) -> usize {
    let mut scanner = TagStackScanner::new();
    for line in text.lines() {
        scanner.feed(line);
    }
    let max_depth = scanner.max_depth();
    for error in scanner.finish() {
        result.push_error(error);
    }
    max_depth
}

/// Pass 5: attribute values must be quoted
fn attribute_pass(events: &[Event], result: &mut ValidationResult) {
    for event in events {
        if let Event::OpenTag {
            attributes, line, ..
        } = event
        {
            for attr in attributes {
                if !attr.quoted {
                    result.push_error(ValidationError::new(
                        ErrorKind::UnquotedAttribute,
                        format!(
                            "Attribute value must be quoted: {}={}",
                            attr.name, attr.value
                        ),
                        Some(*line),
                    ));
                }
            }
        }
    }
}

/// Pass 6: control characters outside tab/CR/LF
fn character_pass(text: &str, result: &mut ValidationResult) {
    for (idx, line) in text.lines().enumerate() {
        let has_invalid = line
            .bytes()
            .any(|b| matches!(b, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F | 0x7F));
        if has_invalid {
            result.push_error(ValidationError::new(
                ErrorKind::InvalidCharacters,
                format!("Invalid control characters on line {}", idx + 1),
                Some(idx as u32 + 1),
            ));
        }
    }
}

/// Pass 7: CDATA nesting and stray terminators
fn cdata_pass(text: &str, result: &mut ValidationResult) {
    const OPEN: &str = "<![CDATA[";
    const CLOSE: &str = "]]>";

    let mut pos = 0;
    let mut in_cdata = false;
    while pos < text.len() {
        let next_open = text[pos..].find(OPEN).map(|i| pos + i);
        let next_close = text[pos..].find(CLOSE).map(|i| pos + i);

        // Take whichever marker comes first; ties cannot happen since the
        // two markers never start at the same byte
        match (next_open, next_close) {
            (Some(open), None) => {
                if in_cdata {
                    result.push_error(ValidationError::new(
                        ErrorKind::NestedCdata,
                        "Nested CDATA section is not allowed",
                        Some(line_of(text, open)),
                    ));
                }
                in_cdata = true;
                pos = open + OPEN.len();
            }
            (Some(open), Some(close)) if open < close => {
                if in_cdata {
                    result.push_error(ValidationError::new(
                        ErrorKind::NestedCdata,
                        "Nested CDATA section is not allowed",
                        Some(line_of(text, open)),
                    ));
                }
                in_cdata = true;
                pos = open + OPEN.len();
            }
            (_, Some(close)) => {
                if in_cdata {
                    in_cdata = false;
                } else {
                    result.push_error(ValidationError::new(
                        ErrorKind::InvalidCdataEnd,
                        "']]>' without a matching CDATA section start",
                        Some(line_of(text, close)),
                    ));
                }
                pos = close + CLOSE.len();
            }
            (None, None) => break,
        }
    }
}

/// Pass 8: encoding warnings (never errors)
fn encoding_pass(text: &str, events: &[Event], result: &mut ValidationResult) {
    if let Some(bom) = Bom::detect(text.as_bytes()) {
        result.push_warning(ValidationWarning::new(
            WarningKind::BomDetected,
            format!("Byte order mark detected ({})", bom.label()),
            Some(1),
        ));
    }

    for event in events {
        if let Event::Declaration { content, line } = event {
            if let Some(encoding) = declared_encoding(content) {
                if !is_supported_encoding(&encoding) {
                    result.push_warning(ValidationWarning::new(
                        WarningKind::UnsupportedEncoding,
                        format!("Declared encoding '{encoding}' is not supported"),
                        Some(*line),
                    ));
                }
            }
        }
    }
}

/// Pass 9: structural/performance risk warnings
///
/// `max_depth` comes from the tag stack pass, which already tracked it.
fn performance_pass(text: &str, events: &[Event], max_depth: usize, result: &mut ValidationResult) {
    if text.len() > LARGE_FILE_BYTES {
        result.push_warning(ValidationWarning::new(
            WarningKind::LargeFile,
            format!(
                "Large file ({} MB); parsing may be slow",
                text.len() / (1024 * 1024)
            ),
            None,
        ));
    }

    for event in events {
        if let Event::OpenTag {
            attributes, name, line, ..
        } = event
        {
            if attributes.len() > MAX_COMFORTABLE_ATTRIBUTES {
                result.push_warning(ValidationWarning::new(
                    WarningKind::ManyAttributes,
                    format!("Element <{}> has {} attributes", name, attributes.len()),
                    Some(*line),
                ));
            }
        }
    }

    if max_depth > MAX_COMFORTABLE_DEPTH {
        result.push_warning(ValidationWarning::new(
            WarningKind::DeepNesting,
            format!("Nesting depth {max_depth} exceeds {MAX_COMFORTABLE_DEPTH} levels"),
            None,
        ));
    }
}

/// 1-based line of a byte position
fn line_of(text: &str, pos: usize) -> u32 {
    memchr_iter(b'\n', &text.as_bytes()[..pos]).count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_is_valid() {
        let result = validate("<?xml version=\"1.0\"?>\n<root><child/></root>");
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_content() {
        let result = validate("   \n  ");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::EmptyContent);
    }

    #[test]
    fn test_not_markup() {
        let result = validate("hello world > not markup");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::NotMarkup);
    }

    #[test]
    fn test_missing_declaration_warns_only() {
        let result = validate("<root/>");
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::MissingDeclaration);
    }

    #[test]
    fn test_stylesheet_pi_does_not_count_as_declaration() {
        let result = validate("<?xml-stylesheet href=\"a.xsl\"?><root/>");
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::MissingDeclaration));
    }

    #[test]
    fn test_multiple_roots() {
        let result = validate("<a/><b/>");
        assert!(!result.is_valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.kind == ErrorKind::MultipleRoots));
    }

    #[test]
    fn test_unmatched_closing_exactly_one() {
        let result = validate("</a>");
        let unmatched: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.kind == ErrorKind::UnmatchedClosing)
            .collect();
        assert_eq!(unmatched.len(), 1);
        assert!(unmatched[0].message.contains('a'));
    }

    #[test]
    fn test_mismatched_names_both_tags() {
        let result = validate("<a><b></a>");
        let mismatched: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.kind == ErrorKind::MismatchedTags)
            .collect();
        assert_eq!(mismatched.len(), 1);
        assert!(mismatched[0].message.contains("</b>"));
        assert!(mismatched[0].message.contains("</a>"));
    }

    #[test]
    fn test_unclosed_cites_line() {
        let result = validate("<a>\n<b>\n</b>");
        let unclosed: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.kind == ErrorKind::UnclosedTag)
            .collect();
        assert_eq!(unclosed.len(), 1);
        assert_eq!(unclosed[0].line, Some(1));
    }

    #[test]
    fn test_unquoted_attribute_cites_pair() {
        let result = validate("<a b=unquoted>x</a>");
        let unquoted: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.kind == ErrorKind::UnquotedAttribute)
            .collect();
        assert_eq!(unquoted.len(), 1);
        assert!(unquoted[0].message.contains("b=unquoted"));
    }

    #[test]
    fn test_invalid_control_characters() {
        let result = validate("<a>bad\u{0001}char</a>");
        assert!(result
            .errors
            .iter()
            .any(|e| e.kind == ErrorKind::InvalidCharacters));
    }

    #[test]
    fn test_nested_cdata() {
        let result = validate("<a><![CDATA[outer <![CDATA[inner]]></a>");
        assert!(result.errors.iter().any(|e| e.kind == ErrorKind::NestedCdata));
    }

    #[test]
    fn test_stray_cdata_end() {
        let result = validate("<a>text ]]> more</a>");
        assert!(result
            .errors
            .iter()
            .any(|e| e.kind == ErrorKind::InvalidCdataEnd));
    }

    #[test]
    fn test_stray_cdata_end_before_real_section() {
        // A stray terminator first, then a well-formed section after it
        let result = validate("<a>]]> here<![CDATA[ok]]></a>");
        let stray: Vec<_> = result
            .errors
            .iter()
            .filter(|e| e.kind == ErrorKind::InvalidCdataEnd)
            .collect();
        assert_eq!(stray.len(), 1);
        assert!(!result.errors.iter().any(|e| e.kind == ErrorKind::NestedCdata));
    }

    #[test]
    fn test_unterminated_cdata_section() {
        // Opens but never closes; must not loop or report a stray end
        let result = validate("<a><![CDATA[dangling</a>");
        assert!(!result
            .errors
            .iter()
            .any(|e| e.kind == ErrorKind::InvalidCdataEnd));
    }

    #[test]
    fn test_unsupported_encoding_warns() {
        let result = validate("<?xml version=\"1.0\" encoding=\"ebcdic\"?><a/>");
        assert!(result.is_valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::UnsupportedEncoding));
    }

    #[test]
    fn test_supported_encoding_no_warning() {
        let result = validate("<?xml version=\"1.0\" encoding=\"UTF-8\"?><a/>");
        assert!(!result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::UnsupportedEncoding));
    }

    #[test]
    fn test_bom_warns() {
        let result = validate("\u{feff}<?xml version=\"1.0\"?><a/>");
        assert!(result.is_valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::BomDetected));
    }

    #[test]
    fn test_deep_nesting_warns_but_valid() {
        let mut doc = String::new();
        for i in 0..25 {
            doc.push_str(&format!("<n{i}>"));
        }
        for i in (0..25).rev() {
            doc.push_str(&format!("</n{i}>"));
        }
        let result = validate(&doc);
        assert!(result.is_valid, "errors: {:?}", result.errors);
        let deep: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::DeepNesting)
            .collect();
        assert_eq!(deep.len(), 1);
    }

    #[test]
    fn test_many_attributes_warns() {
        let attrs: String = (0..55).map(|i| format!(" a{i}=\"v\"")).collect();
        let result = validate(&format!("<el{attrs}/>"));
        assert!(result.is_valid);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::ManyAttributes));
    }

    #[test]
    fn test_passes_accumulate() {
        // Unquoted attribute AND mismatched tags in one document: both reported
        let result = validate("<a x=bad><b></a>");
        assert!(result
            .errors
            .iter()
            .any(|e| e.kind == ErrorKind::UnquotedAttribute));
        assert!(result
            .errors
            .iter()
            .any(|e| e.kind == ErrorKind::MismatchedTags));
    }
}
