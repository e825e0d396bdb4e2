//! Error types for arxml-core
//!
//! Operational failures only. Well-formedness findings are data, not
//! errors: they live in [`crate::validate::Diagnostic`] and accumulate
//! instead of propagating.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input has no markup structure at all (no '<' anywhere)
    #[error("content does not look like markup: {0}")]
    NotMarkup(String),

    /// Input is empty or whitespace-only
    #[error("document is empty")]
    EmptyContent,

    /// Structural parse failed while building the tree
    #[error("parse error: {0}")]
    Parse(String),

    /// A conversion (beautify/compress/JSON) failed
    #[error("conversion error: {0}")]
    Convert(String),
}

impl Error {
    /// Create a parse error from any message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a conversion error from any message
    pub fn convert(msg: impl Into<String>) -> Self {
        Self::Convert(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
