//! Mock reporter for testing.

use std::cell::RefCell;

use super::{Diagnostic, Level, Reporter};

/// Captures every diagnostic for later assertion.
#[derive(Debug, Default)]
pub struct MockReporter {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured diagnostics, in order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Messages of captured warnings.
    pub fn warnings(&self) -> Vec<String> {
        self.messages_at(Level::Warning)
    }

    /// Messages of captured debug diagnostics.
    pub fn debugs(&self) -> Vec<String> {
        self.messages_at(Level::Debug)
    }

    /// Whether any warning contains `needle`.
    pub fn has_warning(&self, needle: &str) -> bool {
        self.warnings().iter().any(|w| w.contains(needle))
    }

    fn messages_at(&self, level: Level) -> Vec<String> {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == level)
            .map(|d| d.message.clone())
            .collect()
    }
}

impl Reporter for MockReporter {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}
