//! arxml-core - Markup parsing, validation and conversion engine
//!
//! Pipeline:
//! scan: tolerant event scanner (scan)
//! validate: multi-pass well-formedness diagnostics (validate)
//! tree: tolerant tree builder and markup writer (build_tree, to_markup)
//! convert: element views, beautify/compress/JSON (to_element_views, ...)
//! search: ranked lookup over element views (build_index, search on it)
//! session: staged lifecycle with progress (ParseSession)
//!
//! The validator and the builder are independent by design: a build can
//! succeed on text the validator flags, and validation never requires a
//! successful build.

pub mod convert;
pub mod core;
pub mod error;
pub mod search;
pub mod session;
pub mod tree;
pub mod validate;

pub use convert::{beautify, classify, compress, to_element_views, to_json, ElementType, ElementView};
pub use crate::core::tokenizer::{scan, Event};
pub use error::{Error, Result};
pub use search::{build_index, SearchHit, SearchIndex};
pub use session::{ConfigLimits, ParseSession, SessionState, SessionStatus};
pub use tree::{build_tree, to_markup, Node};
pub use validate::diagnostics::{ErrorKind, ValidationError, ValidationResult, ValidationWarning, WarningKind};
pub use validate::validate;
