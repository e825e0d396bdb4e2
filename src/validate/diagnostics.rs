//! Validation diagnostics
//!
//! Diagnostics are data, not Rust errors: one validation run accumulates
//! errors and warnings best-effort across independent passes, then the
//! whole set is replaced on the next run. Each diagnostic carries a
//! stable id used for dedup within a single run.

use serde::Serialize;

/// Hard error kinds - any of these makes the document invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    NotMarkup,
    EmptyContent,
    MultipleRoots,
    UnmatchedClosing,
    MismatchedTags,
    UnclosedTag,
    UnquotedAttribute,
    InvalidCharacters,
    NestedCdata,
    InvalidCdataEnd,
}

impl ErrorKind {
    /// Coarse classification used by consumers to group errors
    pub fn class(&self) -> &'static str {
        match self {
            ErrorKind::NotMarkup | ErrorKind::EmptyContent | ErrorKind::UnquotedAttribute => {
                "syntax"
            }
            ErrorKind::MultipleRoots | ErrorKind::NestedCdata | ErrorKind::InvalidCdataEnd => {
                "structure"
            }
            ErrorKind::UnmatchedClosing | ErrorKind::MismatchedTags | ErrorKind::UnclosedTag => {
                "wellformed"
            }
            ErrorKind::InvalidCharacters => "encoding",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            ErrorKind::NotMarkup => "not-markup",
            ErrorKind::EmptyContent => "empty-content",
            ErrorKind::MultipleRoots => "multiple-roots",
            ErrorKind::UnmatchedClosing => "unmatched-closing",
            ErrorKind::MismatchedTags => "mismatched-tags",
            ErrorKind::UnclosedTag => "unclosed-tag",
            ErrorKind::UnquotedAttribute => "unquoted-attribute",
            ErrorKind::InvalidCharacters => "invalid-characters",
            ErrorKind::NestedCdata => "nested-cdata",
            ErrorKind::InvalidCdataEnd => "invalid-cdata-end",
        }
    }
}

/// Warning kinds - never affect validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    MissingDeclaration,
    UnsupportedEncoding,
    BomDetected,
    LargeFile,
    DeepNesting,
    ManyAttributes,
}

impl WarningKind {
    /// Coarse classification used by consumers to group warnings
    pub fn class(&self) -> &'static str {
        match self {
            WarningKind::MissingDeclaration => "recommendation",
            WarningKind::UnsupportedEncoding | WarningKind::BomDetected => "format",
            WarningKind::LargeFile | WarningKind::DeepNesting | WarningKind::ManyAttributes => {
                "performance"
            }
        }
    }

    fn key(&self) -> &'static str {
        match self {
            WarningKind::MissingDeclaration => "missing-declaration",
            WarningKind::UnsupportedEncoding => "unsupported-encoding",
            WarningKind::BomDetected => "bom-detected",
            WarningKind::LargeFile => "large-file",
            WarningKind::DeepNesting => "deep-nesting",
            WarningKind::ManyAttributes => "many-attributes",
        }
    }
}

/// A single validation finding with source position context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic<K> {
    /// Stable key for dedup within one run
    pub id: String,
    pub kind: K,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub severity: &'static str,
}

pub type ValidationError = Diagnostic<ErrorKind>;
pub type ValidationWarning = Diagnostic<WarningKind>;

impl ValidationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: Option<u32>) -> Self {
        let message = message.into();
        Diagnostic {
            id: match line {
                Some(line) => format!("{}:{}:{}", kind.key(), line, message),
                None => format!("{}:{}", kind.key(), message),
            },
            kind,
            message,
            line,
            column: None,
            severity: "error",
        }
    }
}

impl ValidationWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>, line: Option<u32>) -> Self {
        let message = message.into();
        Diagnostic {
            id: match line {
                Some(line) => format!("{}:{}:{}", kind.key(), line, message),
                None => format!("{}:{}", kind.key(), message),
            },
            kind,
            message,
            line,
            column: None,
            severity: "warning",
        }
    }
}

/// Outcome of one validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn new() -> Self {
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Append an error unless the same id was already recorded this run
    pub fn push_error(&mut self, error: ValidationError) {
        if !self.errors.iter().any(|e| e.id == error.id) {
            self.errors.push(error);
        }
        self.is_valid = false;
    }

    /// Append a warning unless the same id was already recorded this run
    pub fn push_warning(&mut self, warning: ValidationWarning) {
        if !self.warnings.iter().any(|w| w.id == warning.id) {
            self.warnings.push(warning);
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}
