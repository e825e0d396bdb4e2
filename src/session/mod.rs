//! Parse session lifecycle: staged orchestration with progress
//!
//! A session runs the pipeline as sequential stages (scan, validate,
//! build, index), updating an observable state snapshot at each stage
//! boundary. Stages are bounded linear scans, so cancellation is
//! advisory: the flag is checked between stages, never mid-stage.

use crate::convert::{to_element_views, ElementView};
use crate::core::tokenizer::scan;
use crate::error::Error;
use crate::search::{build_index, SearchIndex};
use crate::tree::{build_from_events, Node};
use crate::validate::diagnostics::{ErrorKind, ValidationError, ValidationWarning, WarningKind};
use crate::validate::validate;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Per-stage progress marks; each stage boundary moves the bar forward
const PROGRESS_SCANNED: u8 = 25;
const PROGRESS_VALIDATED: u8 = 50;
const PROGRESS_BUILT: u8 = 75;
const PROGRESS_INDEXED: u8 = 90;
const PROGRESS_DONE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Parsing,
    Loading,
    Complete,
    Error,
}

/// Observable snapshot of a session's progress and diagnostics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    /// 0-100, monotonically non-decreasing within one run
    pub progress: u8,
    pub current_section: String,
    pub elements_processed: usize,
    /// Best-effort estimate of the tree's in-memory footprint
    pub memory_usage: usize,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            status: SessionStatus::Idle,
            progress: 0,
            current_section: String::new(),
            elements_processed: 0,
            memory_usage: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Optional hard ceilings for callers that want them
///
/// The core itself only warns on large inputs; enforcement is the
/// caller's decision. A zero field means "no limit".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigLimits {
    pub memory_limit: usize,
    pub max_elements: usize,
}

impl ConfigLimits {
    /// Whether a parse outcome fits under both ceilings
    pub fn permits(&self, memory_usage: usize, element_count: usize) -> bool {
        (self.memory_limit == 0 || memory_usage <= self.memory_limit)
            && (self.max_elements == 0 || element_count <= self.max_elements)
    }
}

/// One document's parse lifecycle: tree, views, index and diagnostics
///
/// All products are discarded and rebuilt wholesale on every
/// [`start`](ParseSession::start); nothing is incrementally patched.
#[derive(Debug, Default)]
pub struct ParseSession {
    state: SessionState,
    nodes: Vec<Node>,
    views: Vec<ElementView>,
    index: Option<SearchIndex>,
    limits: ConfigLimits,
    cancelled: Arc<AtomicBool>,
}

impl ParseSession {
    pub fn new() -> Self {
        ParseSession::default()
    }

    /// A session that warns when a parse outcome exceeds the given ceilings
    pub fn with_limits(limits: ConfigLimits) -> Self {
        ParseSession {
            limits,
            ..ParseSession::default()
        }
    }

    #[inline]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn views(&self) -> &[ElementView] {
        &self.views
    }

    #[inline]
    pub fn index(&self) -> Option<&SearchIndex> {
        self.index.as_ref()
    }

    /// Request that the current run stop at the next stage boundary
    ///
    /// Advisory only; a running stage always finishes its linear scan.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Reset to idle from any state, discarding tree, index and diagnostics
    pub fn clear(&mut self) {
        debug!("session cleared");
        self.reset_products();
        self.cancelled.store(false, Ordering::Relaxed);
    }

    fn reset_products(&mut self) {
        self.state = SessionState::default();
        self.nodes.clear();
        self.views.clear();
        self.index = None;
    }

    /// Run the full pipeline over one document
    ///
    /// Ends at `progress = 100, status = complete` on success. A stage
    /// failure leaves `status = error` with the stage's diagnostic
    /// appended and `elements_processed` frozen at its last value. A
    /// cancelled run resets to idle.
    pub fn start(&mut self, text: &str) {
        self.reset_products();
        self.state.status = SessionStatus::Parsing;
        self.enter_section("scanning", 0);
        info!(bytes = text.len(), "parse session started");

        let events = match scan(text) {
            Ok(events) => events,
            Err(e) => return self.fail(e),
        };
        self.advance(PROGRESS_SCANNED);
        if self.check_cancelled() {
            return;
        }

        self.enter_section("validating", PROGRESS_SCANNED);
        let result = validate(text);
        self.state.errors = result.errors;
        self.state.warnings = result.warnings;
        self.advance(PROGRESS_VALIDATED);
        if self.check_cancelled() {
            return;
        }

        self.state.status = SessionStatus::Loading;
        self.enter_section("building tree", PROGRESS_VALIDATED);
        self.nodes = build_from_events(&events);
        self.views = to_element_views(&self.nodes);
        self.state.elements_processed = self.nodes.iter().map(Node::element_count).sum();
        self.state.memory_usage = self.nodes.iter().map(Node::estimated_size).sum();
        if !self
            .limits
            .permits(self.state.memory_usage, self.state.elements_processed)
        {
            self.state.warnings.push(ValidationWarning::new(
                WarningKind::LargeFile,
                format!(
                    "Document exceeds configured limits ({} elements, {} bytes)",
                    self.state.elements_processed, self.state.memory_usage
                ),
                None,
            ));
        }
        self.advance(PROGRESS_BUILT);
        if self.check_cancelled() {
            return;
        }

        self.enter_section("indexing", PROGRESS_BUILT);
        self.index = Some(build_index(&self.views));
        self.advance(PROGRESS_INDEXED);

        self.enter_section("complete", PROGRESS_INDEXED);
        self.advance(PROGRESS_DONE);
        self.state.status = SessionStatus::Complete;
        info!(
            elements = self.state.elements_processed,
            errors = self.state.errors.len(),
            warnings = self.state.warnings.len(),
            "parse session complete"
        );
    }

    fn enter_section(&mut self, label: &str, progress: u8) {
        debug!(section = label, progress, "session stage");
        self.state.current_section = label.to_string();
    }

    /// Progress only moves forward within a run
    fn advance(&mut self, progress: u8) {
        if progress > self.state.progress {
            self.state.progress = progress;
        }
    }

    fn check_cancelled(&mut self) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            info!("parse session cancelled");
            self.clear();
            true
        } else {
            false
        }
    }

    fn fail(&mut self, error: Error) {
        let message = error.to_string();
        let message = if message.is_empty() {
            "unknown parsing error".to_string()
        } else {
            message
        };
        info!(%message, "parse session failed");
        let kind = match error {
            Error::NotMarkup(_) => ErrorKind::NotMarkup,
            Error::EmptyContent => ErrorKind::EmptyContent,
            _ => ErrorKind::NotMarkup,
        };
        self.state
            .errors
            .push(ValidationError::new(kind, message, None));
        self.state.status = SessionStatus::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<?xml version=\"1.0\"?>\n<AUTOSAR><AR-PACKAGES><AR-PACKAGE UUID=\"u1\"><SHORT-NAME>Pkg</SHORT-NAME></AR-PACKAGE></AR-PACKAGES></AUTOSAR>";

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_start_reaches_complete() {
        init_tracing();
        let mut session = ParseSession::new();
        session.start(DOC);
        let state = session.state();
        assert_eq!(state.status, SessionStatus::Complete);
        assert_eq!(state.progress, 100);
        assert_eq!(state.current_section, "complete");
        assert!(state.errors.is_empty());
        assert_eq!(state.elements_processed, 4);
        assert!(state.memory_usage > 0);
        assert_eq!(session.nodes().len(), 1);
        assert_eq!(session.views().len(), 4);
        assert!(session.index().is_some());
    }

    #[test]
    fn test_start_on_non_markup_errors() {
        let mut session = ParseSession::new();
        session.start("just plain prose");
        assert_eq!(session.state().status, SessionStatus::Error);
        assert_eq!(session.state().errors.len(), 1);
        assert!(session.nodes().is_empty());
        assert!(session.index().is_none());
    }

    #[test]
    fn test_invalid_markup_still_completes_with_diagnostics() {
        let mut session = ParseSession::new();
        session.start("<a><b></a>");
        assert_eq!(session.state().status, SessionStatus::Complete);
        assert!(!session.state().errors.is_empty());
        assert!(!session.nodes().is_empty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = ParseSession::new();
        session.start(DOC);
        session.clear();
        let state = session.state();
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.progress, 0);
        assert_eq!(state.elements_processed, 0);
        assert!(state.errors.is_empty());
        assert!(session.nodes().is_empty());
        assert!(session.index().is_none());
    }

    #[test]
    fn test_cancel_resets_to_idle() {
        let mut session = ParseSession::new();
        session.cancel();
        session.start(DOC);
        // the flag is observed at the first stage boundary
        assert_eq!(session.state().status, SessionStatus::Idle);
        assert!(session.index().is_none());
    }

    #[test]
    fn test_restart_rebuilds_products() {
        let mut session = ParseSession::new();
        session.start(DOC);
        session.start("<root><only/></root>");
        assert_eq!(session.state().status, SessionStatus::Complete);
        assert_eq!(session.state().elements_processed, 2);
        assert_eq!(session.nodes()[0].tag_name, "root");
    }

    #[test]
    fn test_exceeded_limits_warn_but_complete() {
        let mut session = ParseSession::with_limits(ConfigLimits {
            memory_limit: 0,
            max_elements: 2,
        });
        session.start(DOC);
        assert_eq!(session.state().status, SessionStatus::Complete);
        assert_eq!(session.state().elements_processed, 4);
        assert!(session
            .state()
            .warnings
            .iter()
            .any(|w| w.message.contains("configured limits")));

        let mut unlimited = ParseSession::new();
        unlimited.start(DOC);
        assert!(!unlimited
            .state()
            .warnings
            .iter()
            .any(|w| w.message.contains("configured limits")));
    }

    #[test]
    fn test_config_limits() {
        let unlimited = ConfigLimits::default();
        assert!(unlimited.permits(usize::MAX, usize::MAX));

        let capped = ConfigLimits {
            memory_limit: 1024,
            max_elements: 10,
        };
        assert!(capped.permits(1024, 10));
        assert!(!capped.permits(2048, 1));
        assert!(!capped.permits(1, 11));
    }
}
