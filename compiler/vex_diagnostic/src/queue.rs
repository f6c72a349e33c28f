//! Diagnostic queue: accumulate, deduplicate, sort.
//!
//! Diagnostics accumulate per phase. Nothing here aborts; the driver checks
//! [`DiagnosticQueue::has_errors`] at each phase boundary.

use crate::{Diagnostic, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors to keep (0 = unlimited).
    pub error_limit: usize,
    /// Drop a syntax error on a line that already has one.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 20,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// No limits, no deduplication (for tests).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue collecting diagnostics for one compilation.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    last_syntax_line: Option<u32>,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic. `line` is only used for syntax-error deduplication.
    ///
    /// Returns `true` if the diagnostic was kept, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic, line: u32) -> bool {
        if diag.is_error() && self.limit_reached() {
            return false;
        }

        if self.config.deduplicate && diag.code.is_syntax_error() {
            if self.last_syntax_line == Some(line) {
                return false;
            }
            self.last_syntax_line = Some(line);
        }

        if diag.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Add a diagnostic whose line is computed from `source`.
    pub fn add_with_source(&mut self, diag: Diagnostic, source: &str) -> bool {
        let line = diag.span.map_or(1, |span| span.line_col(source).0);
        self.add(diag, line)
    }

    /// Emit an error and get proof it was emitted. `line` is passed to
    /// [`add`](Self::add) for deduplication.
    pub fn emit_error(&mut self, diag: Diagnostic, line: u32) -> ErrorGuaranteed {
        self.add(diag, line);
        ErrorGuaranteed::new()
    }

    /// [`emit_error`](Self::emit_error) with the line computed from `source`.
    pub fn emit_error_with_source(&mut self, diag: Diagnostic, source: &str) -> ErrorGuaranteed {
        self.add_with_source(diag, source);
        ErrorGuaranteed::new()
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Phase-boundary check: `Some` if any error or bug was recorded.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Return all diagnostics ordered by span and clear the queue.
    ///
    /// Diagnostics without a span keep their relative order at the end.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| d.span.map_or((1, u32::MAX, 0), |s| (0, s.start, s.end)));
        self.error_count = 0;
        self.last_syntax_line = None;
        std::mem::take(&mut self.diagnostics)
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
