//! Markup tokenizer - pull parser emitting line-tagged structural events
//!
//! Extracts a linear event sequence from raw text: open/close tags, text
//! runs, CDATA sections, comments, processing instructions, the XML
//! declaration and DOCTYPE. No nesting is enforced here; malformed or
//! unmatched tags are still emitted so the validator can diagnose them.

use super::attributes::{parse_attributes, RawAttribute};
use super::entities::decode_text;
use super::scanner::Scanner;
use crate::error::{Error, Result};
use serde::Serialize;

/// A structural event, tagged with the 1-based line it starts on
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Event {
    OpenTag {
        name: String,
        attributes: Vec<RawAttribute>,
        self_closing: bool,
        line: u32,
    },
    CloseTag {
        name: String,
        line: u32,
    },
    Text {
        content: String,
        line: u32,
    },
    CData {
        content: String,
        line: u32,
    },
    Comment {
        content: String,
        line: u32,
    },
    ProcessingInstruction {
        target: String,
        data: String,
        line: u32,
    },
    Declaration {
        content: String,
        line: u32,
    },
    Doctype {
        content: String,
        line: u32,
    },
}

impl Event {
    /// Source line the event starts on
    pub fn line(&self) -> u32 {
        match self {
            Event::OpenTag { line, .. }
            | Event::CloseTag { line, .. }
            | Event::Text { line, .. }
            | Event::CData { line, .. }
            | Event::Comment { line, .. }
            | Event::ProcessingInstruction { line, .. }
            | Event::Declaration { line, .. }
            | Event::Doctype { line, .. } => *line,
        }
    }
}

/// Pull tokenizer over raw markup text
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    input: &'a str,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer for the given input
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            scanner: Scanner::new(input.as_bytes()),
            input,
        }
    }

    fn text(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Get the next event, or None at end of input
    pub fn next_event(&mut self) -> Option<Event> {
        if self.scanner.is_eof() {
            return None;
        }

        match self.scanner.peek() {
            Some(b'<') => self.parse_markup(),
            Some(_) => self.parse_text(),
            None => None,
        }
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Option<Event> {
        let line = self.scanner.line();
        let start = self.scanner.position();
        self.scanner.advance(1); // Skip '<'

        match self.scanner.peek() {
            Some(b'/') => self.parse_close_tag(start, line),
            Some(b'!') => self.parse_bang_markup(start, line),
            Some(b'?') => self.parse_pi(start, line),
            Some(_) => self.parse_open_tag(start, line),
            None => {
                // Dangling '<' at end of input: emit as text
                Some(Event::Text {
                    content: "<".to_string(),
                    line,
                })
            }
        }
    }

    /// Parse an open tag or self-closing tag
    fn parse_open_tag(&mut self, start: usize, line: u32) -> Option<Event> {
        let name = match self.scanner.read_name() {
            Some(name) => String::from_utf8_lossy(name).into_owned(),
            // Malformed tag: emit the raw span as text so nothing is lost
            None => return self.emit_malformed(start, line),
        };

        let end = match self.scanner.find_tag_end_quoted() {
            Some(end) => end,
            None => return self.emit_malformed(start, line),
        };

        let self_closing = end > start && self.scanner.slice(end - 1, end) == b"/";
        let attr_end = if self_closing { end - 1 } else { end };
        let attr_src = self.text(self.scanner.position(), attr_end);
        let attributes = parse_attributes(attr_src);

        self.scanner.advance_to(end + 1);

        Some(Event::OpenTag {
            name,
            attributes,
            self_closing,
            line,
        })
    }

    /// Parse a closing tag
    fn parse_close_tag(&mut self, start: usize, line: u32) -> Option<Event> {
        self.scanner.advance(1); // Skip '/'

        let name = match self.scanner.read_name() {
            Some(name) => String::from_utf8_lossy(name).into_owned(),
            None => return self.emit_malformed(start, line),
        };

        let end = match self.scanner.find_tag_end() {
            Some(end) => end,
            None => return self.emit_malformed(start, line),
        };
        self.scanner.advance_to(end + 1);

        Some(Event::CloseTag { name, line })
    }

    /// Parse markup starting with '!' (comment, CDATA, DOCTYPE)
    fn parse_bang_markup(&mut self, start: usize, line: u32) -> Option<Event> {
        self.scanner.advance(1); // Skip '!'

        if self.scanner.starts_with(b"--") {
            self.parse_comment(line)
        } else if self.scanner.starts_with(b"[CDATA[") {
            self.parse_cdata(line)
        } else if self.scanner.starts_with(b"DOCTYPE") {
            self.parse_doctype(line)
        } else {
            self.emit_malformed(start, line)
        }
    }

    /// Parse a comment <!--...-->, which may contain '<' and '>'
    fn parse_comment(&mut self, line: u32) -> Option<Event> {
        self.scanner.advance(2); // Skip '--'
        let content_start = self.scanner.position();

        loop {
            match self.scanner.find_byte(b'-') {
                Some(pos) => {
                    self.scanner.advance_to(pos);
                    if self.scanner.starts_with(b"-->") {
                        let content = self.text(content_start, pos).to_string();
                        self.scanner.advance(3);
                        return Some(Event::Comment { content, line });
                    }
                    self.scanner.advance(1);
                }
                None => {
                    // Unterminated comment: take everything to EOF
                    let end = self.input.len();
                    let content = self.text(content_start, end).to_string();
                    self.scanner.advance_to(end);
                    return Some(Event::Comment { content, line });
                }
            }
        }
    }

    /// Parse a CDATA section <![CDATA[...]]>, which may span lines
    fn parse_cdata(&mut self, line: u32) -> Option<Event> {
        self.scanner.advance(7); // Skip '[CDATA['
        let content_start = self.scanner.position();

        loop {
            match self.scanner.find_byte(b']') {
                Some(pos) => {
                    self.scanner.advance_to(pos);
                    if self.scanner.starts_with(b"]]>") {
                        let content = self.text(content_start, pos).to_string();
                        self.scanner.advance(3);
                        return Some(Event::CData { content, line });
                    }
                    self.scanner.advance(1);
                }
                None => {
                    let end = self.input.len();
                    let content = self.text(content_start, end).to_string();
                    self.scanner.advance_to(end);
                    return Some(Event::CData { content, line });
                }
            }
        }
    }

    /// Parse a DOCTYPE declaration (internal subsets with '[' included)
    fn parse_doctype(&mut self, line: u32) -> Option<Event> {
        self.scanner.advance(7); // Skip 'DOCTYPE'
        let content_start = self.scanner.position();
        let mut bracket_depth = 0usize;

        while let Some(b) = self.scanner.peek() {
            match b {
                b'[' => bracket_depth += 1,
                b']' => bracket_depth = bracket_depth.saturating_sub(1),
                b'>' if bracket_depth == 0 => {
                    let content = self.text(content_start, self.scanner.position())
                        .trim()
                        .to_string();
                    self.scanner.advance(1);
                    return Some(Event::Doctype { content, line });
                }
                _ => {}
            }
            self.scanner.advance(1);
        }

        let content = self.text(content_start, self.input.len()).trim().to_string();
        Some(Event::Doctype { content, line })
    }

    /// Parse a processing instruction or the XML declaration
    fn parse_pi(&mut self, start: usize, line: u32) -> Option<Event> {
        self.scanner.advance(1); // Skip '?'
        let content_start = self.scanner.position();

        // Find '?>'
        let mut end = None;
        loop {
            match self.scanner.find_byte(b'?') {
                Some(pos) => {
                    self.scanner.advance_to(pos);
                    if self.scanner.peek_at(1) == Some(b'>') {
                        end = Some(pos);
                        self.scanner.advance(2);
                        break;
                    }
                    self.scanner.advance(1);
                }
                None => break,
            }
        }

        let end = match end {
            Some(end) => end,
            None => return self.emit_malformed(start, line),
        };

        let content = self.text(content_start, end);
        // The declaration target is exactly "xml"; "xml-stylesheet" and
        // friends are ordinary processing instructions. Byte comparison
        // keeps multibyte targets safe.
        let bytes = content.as_bytes();
        let is_declaration = bytes.len() >= 3
            && bytes[..3].eq_ignore_ascii_case(b"xml")
            && (bytes.len() == 3 || bytes[3].is_ascii_whitespace());
        if is_declaration {
            return Some(Event::Declaration {
                content: content.to_string(),
                line,
            });
        }

        let (target, data) = match content.find(|c: char| c.is_ascii_whitespace()) {
            Some(pos) => (content[..pos].to_string(), content[pos + 1..].trim().to_string()),
            None => (content.to_string(), String::new()),
        };
        Some(Event::ProcessingInstruction { target, data, line })
    }

    /// Parse a text run up to the next '<'
    fn parse_text(&mut self) -> Option<Event> {
        let line = self.scanner.line();
        let start = self.scanner.position();
        let end = self.scanner.find_tag_start().unwrap_or(self.input.len());
        self.scanner.advance_to(end);

        let content = decode_text(self.text(start, end)).into_owned();
        Some(Event::Text { content, line })
    }

    /// Emit an unscannable span verbatim as text, consuming through the
    /// next '>' (or to EOF) so the tokenizer keeps making progress
    fn emit_malformed(&mut self, start: usize, line: u32) -> Option<Event> {
        let end = match self.scanner.find_tag_end() {
            Some(end) => end + 1,
            None => self.input.len(),
        };
        self.scanner.advance_to(end.max(start + 1));
        Some(Event::Text {
            content: self.text(start, end.max(start + 1)).to_string(),
            line,
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        self.next_event()
    }
}

/// Scan raw text into a linear event sequence
///
/// Genuinely unscannable input (no '<' anywhere) fails with
/// [`Error::NotMarkup`] instead of emitting garbage events.
pub fn scan(text: &str) -> Result<Vec<Event>> {
    if memchr::memchr(b'<', text.as_bytes()).is_none() {
        return Err(Error::NotMarkup(
            "no tag start found in input".to_string(),
        ));
    }
    Ok(Tokenizer::new(text).collect())
}
