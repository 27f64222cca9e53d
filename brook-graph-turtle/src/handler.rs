//! Error handlers: where syntax diagnostics are reported.
//!
//! The parser reports every diagnostic to an [`ErrorHandler`] before it
//! unwinds, so the handler sees errors even when the caller only looks at
//! the returned `Result`.

use brook_graph_ir::TextPosition;
use parking_lot::Mutex;

/// Receives parser diagnostics.
pub trait ErrorHandler: Send + Sync {
    /// Something suspicious that does not stop the parse
    fn warning(&self, message: &str, position: TextPosition);

    /// A syntax error; the parse stops after reporting it
    fn error(&self, message: &str, position: TextPosition);
}

/// Reports diagnostics through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn warning(&self, message: &str, position: TextPosition) {
        tracing::warn!(line = position.line, column = position.column, "{}", message);
    }

    fn error(&self, message: &str, position: TextPosition) {
        tracing::error!(line = position.line, column = position.column, "{}", message);
    }
}

/// Severity of a collected diagnostic
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A reported diagnostic
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub position: TextPosition,
}

/// Keeps every diagnostic in memory, for tests and tooling.
#[derive(Debug, Default)]
pub struct CollectingErrorHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.of(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.of(Severity::Warning)
    }

    fn of(&self, severity: Severity) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.severity == severity)
            .cloned()
            .collect()
    }

    fn push(&self, severity: Severity, message: &str, position: TextPosition) {
        self.diagnostics.lock().push(Diagnostic {
            severity,
            message: message.to_string(),
            position,
        });
    }
}

impl ErrorHandler for CollectingErrorHandler {
    fn warning(&self, message: &str, position: TextPosition) {
        self.push(Severity::Warning, message, position);
    }

    fn error(&self, message: &str, position: TextPosition) {
        self.push(Severity::Error, message, position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_handler_separates_severities() {
        let handler = CollectingErrorHandler::new();
        handler.warning("odd", TextPosition::new(1, 1));
        handler.error("bad", TextPosition::new(2, 4));

        assert_eq!(handler.diagnostics().len(), 2);
        assert_eq!(handler.warnings()[0].message, "odd");
        assert_eq!(handler.errors()[0].position, TextPosition::new(2, 4));
    }
}
