//! Line-oriented tag-stack scanner
//!
//! An explicit finite-state scanner fed one line at a time. It carries the
//! open-tag stack and accumulated diagnostics as plain fields, so the
//! well-formedness pass can be unit-tested line by line. Comments, CDATA
//! sections, processing instructions and tags may all span lines; the
//! scanner keeps the necessary carry state between `feed` calls.

use super::diagnostics::{ErrorKind, ValidationError};
use crate::core::scanner::{is_name_char, is_name_start_char};

/// What the scanner is inside of when a line ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Comment,
    Cdata,
    Pi,
    Doctype,
    /// Inside a tag that has not seen its unquoted '>' yet
    Tag,
}

/// Stateful line-by-line well-formedness scanner
pub struct TagStackScanner {
    stack: Vec<(String, u32)>,
    errors: Vec<ValidationError>,
    mode: Mode,
    /// Partial tag accumulated across lines (Mode::Tag)
    carry: String,
    carry_line: u32,
    /// Open quote character inside the carried tag, if any
    carry_quote: Option<u8>,
    line: u32,
    max_depth: usize,
}

impl TagStackScanner {
    pub fn new() -> Self {
        TagStackScanner {
            stack: Vec::new(),
            errors: Vec::new(),
            mode: Mode::Text,
            carry: String::new(),
            carry_line: 0,
            carry_quote: None,
            line: 0,
            max_depth: 0,
        }
    }

    /// Feed the next source line (without its trailing newline)
    pub fn feed(&mut self, line: &str) {
        self.line += 1;
        let mut pos = 0;

        // Resolve carry state from previous lines first
        match self.mode {
            Mode::Comment => match find_from(line, 0, "-->") {
                Some(end) => {
                    self.mode = Mode::Text;
                    pos = end + 3;
                }
                None => return,
            },
            Mode::Cdata => match find_from(line, 0, "]]>") {
                Some(end) => {
                    self.mode = Mode::Text;
                    pos = end + 3;
                }
                None => return,
            },
            Mode::Pi => match find_from(line, 0, "?>") {
                Some(end) => {
                    self.mode = Mode::Text;
                    pos = end + 2;
                }
                None => return,
            },
            Mode::Doctype => match find_from(line, 0, ">") {
                Some(end) => {
                    self.mode = Mode::Text;
                    pos = end + 1;
                }
                None => return,
            },
            Mode::Tag => match self.find_tag_close(line) {
                Some(end) => {
                    // Newline inside a tag is attribute whitespace
                    let mut tag = std::mem::take(&mut self.carry);
                    tag.push(' ');
                    tag.push_str(&line[..=end]);
                    let tag_line = self.carry_line;
                    self.process_tag(&tag, tag_line);
                    self.mode = Mode::Text;
                    self.carry_quote = None;
                    pos = end + 1;
                }
                None => {
                    self.carry.push(' ');
                    self.carry.push_str(line);
                    return;
                }
            },
            Mode::Text => {}
        }

        self.scan_text(line, pos);
    }

    /// Scan the text portion of a line starting at `pos`
    fn scan_text(&mut self, line: &str, mut pos: usize) {
        let bytes = line.as_bytes();

        while pos < bytes.len() {
            let lt = match find_from(line, pos, "<") {
                Some(lt) => lt,
                None => return,
            };
            let rest = &line[lt..];

            if rest.starts_with("<!--") {
                match find_from(line, lt + 4, "-->") {
                    Some(end) => pos = end + 3,
                    None => {
                        self.mode = Mode::Comment;
                        return;
                    }
                }
            } else if rest.starts_with("<![CDATA[") {
                match find_from(line, lt + 9, "]]>") {
                    Some(end) => pos = end + 3,
                    None => {
                        self.mode = Mode::Cdata;
                        return;
                    }
                }
            } else if rest.starts_with("<?") {
                match find_from(line, lt + 2, "?>") {
                    Some(end) => pos = end + 2,
                    None => {
                        self.mode = Mode::Pi;
                        return;
                    }
                }
            } else if rest.starts_with("<!") {
                match find_from(line, lt + 2, ">") {
                    Some(end) => pos = end + 1,
                    None => {
                        self.mode = Mode::Doctype;
                        return;
                    }
                }
            } else if rest.len() >= 2
                && (rest.as_bytes()[1] == b'/' || is_name_start_char(rest.as_bytes()[1]))
            {
                // Open or close tag
                self.carry_quote = None;
                match self.find_tag_close(&line[lt..]) {
                    Some(off) => {
                        let end = lt + off;
                        let tag = line[lt..=end].to_string();
                        self.process_tag(&tag, self.line);
                        pos = end + 1;
                    }
                    None => {
                        self.carry = line[lt..].to_string();
                        self.carry_line = self.line;
                        self.mode = Mode::Tag;
                        return;
                    }
                }
            } else {
                // Stray '<' that opens nothing scannable
                pos = lt + 1;
            }
        }
    }

    /// Find the position of the unquoted '>' in a tag fragment, updating
    /// the carried quote state
    fn find_tag_close(&mut self, fragment: &str) -> Option<usize> {
        for (i, &b) in fragment.as_bytes().iter().enumerate() {
            match (b, self.carry_quote) {
                (b'"' | b'\'', None) => self.carry_quote = Some(b),
                (b, Some(q)) if b == q => self.carry_quote = None,
                (b'>', None) => return Some(i),
                _ => {}
            }
        }
        None
    }

    /// Apply a complete tag (from '<' through '>') to the stack
    fn process_tag(&mut self, tag: &str, line: u32) {
        let bytes = tag.as_bytes();
        if bytes.len() < 3 {
            return;
        }

        if bytes[1] == b'/' {
            let name = read_tag_name(&tag[2..]);
            if !name.is_empty() {
                self.close_tag(name, line);
            }
            return;
        }

        let name = read_tag_name(&tag[1..]);
        if name.is_empty() {
            return;
        }
        let self_closing = tag.trim_end().ends_with("/>");
        if self_closing {
            self.max_depth = self.max_depth.max(self.stack.len() + 1);
        } else {
            self.stack.push((name.to_string(), line));
            self.max_depth = self.max_depth.max(self.stack.len());
        }
    }

    fn close_tag(&mut self, name: &str, line: u32) {
        match self.stack.last() {
            None => {
                self.errors.push(ValidationError::new(
                    ErrorKind::UnmatchedClosing,
                    format!("Closing tag </{name}> has no matching opening tag"),
                    Some(line),
                ));
            }
            Some((top, _)) if top == name => {
                self.stack.pop();
            }
            Some((top, _)) => {
                self.errors.push(ValidationError::new(
                    ErrorKind::MismatchedTags,
                    format!("Mismatched tags: expected </{top}>, found </{name}>"),
                    Some(line),
                ));
                // Recover by unwinding to the matching opener, if there is one
                if self.stack.iter().any(|(n, _)| n == name) {
                    while let Some((n, _)) = self.stack.pop() {
                        if n == name {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Drain remaining stack entries as unclosed-tag errors and return all
    /// accumulated diagnostics
    pub fn finish(mut self) -> Vec<ValidationError> {
        for (name, line) in self.stack.drain(..) {
            self.errors.push(ValidationError::new(
                ErrorKind::UnclosedTag,
                format!("Unclosed tag <{name}> opened on line {line}"),
                Some(line),
            ));
        }
        self.errors
    }

    /// Deepest nesting level seen so far
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for TagStackScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Substring search starting at a byte offset
fn find_from(haystack: &str, start: usize, needle: &str) -> Option<usize> {
    if start >= haystack.len() {
        return None;
    }
    haystack[start..].find(needle).map(|i| start + i)
}

/// Read the leading tag name from a fragment positioned just past '<' or '</'
fn read_tag_name(fragment: &str) -> &str {
    let bytes = fragment.as_bytes();
    let mut end = 0;
    while end < bytes.len() && is_name_char(bytes[end]) {
        end += 1;
    }
    &fragment[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lines: &[&str]) -> Vec<ValidationError> {
        let mut scanner = TagStackScanner::new();
        for line in lines {
            scanner.feed(line);
        }
        scanner.finish()
    }

    #[test]
    fn test_balanced() {
        assert!(run(&["<a>", "<b></b>", "</a>"]).is_empty());
    }

    #[test]
    fn test_unmatched_closing() {
        let errors = run(&["</a>"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::UnmatchedClosing);
        assert!(errors[0].message.contains("</a>"));
    }

    #[test]
    fn test_mismatched_tags() {
        let errors = run(&["<a><b></a>"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MismatchedTags);
        assert!(errors[0].message.contains("</b>"));
        assert!(errors[0].message.contains("</a>"));
    }

    #[test]
    fn test_unclosed_cites_opening_line() {
        let errors = run(&["<a>", "<b>", "</b>"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::UnclosedTag);
        assert_eq!(errors[0].line, Some(1));
    }

    #[test]
    fn test_one_error_per_unclosed_entry() {
        let errors = run(&["<a><b><c>"]);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::UnclosedTag));
    }

    #[test]
    fn test_self_closing_not_pushed() {
        assert!(run(&["<a>", "<b/>", "</a>"]).is_empty());
    }

    #[test]
    fn test_comment_spanning_lines_skipped() {
        assert!(run(&["<a>", "<!-- <fake>", "</fake> -->", "</a>"]).is_empty());
    }

    #[test]
    fn test_cdata_spanning_lines_skipped() {
        assert!(run(&["<a>", "<![CDATA[", "</notatag>", "]]>", "</a>"]).is_empty());
    }

    #[test]
    fn test_tag_spanning_lines() {
        assert!(run(&["<a attr=\"one\"", "other=\"two\">", "</a>"]).is_empty());
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        assert!(run(&["<a attr=\"x>y\">text</a>"]).is_empty());
    }

    #[test]
    fn test_max_depth() {
        let mut scanner = TagStackScanner::new();
        scanner.feed("<a><b><c/></b></a>");
        assert_eq!(scanner.max_depth(), 3);
    }
}
