//! Paragraph type.

use super::{Run, RunStyle};
use serde::{Deserialize, Serialize};

/// A paragraph: an ordered sequence of runs.
///
/// The concatenation of all run texts is the paragraph's visible text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Runs in document order
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// Create a paragraph holding one default-style run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a paragraph from runs.
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    /// Append a default-style run.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.runs.push(Run::new(text));
    }

    /// Append a styled run.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Append a run with the given text and style.
    pub fn add_styled(&mut self, text: impl Into<String>, style: RunStyle) {
        self.runs.push(Run::styled(text, style));
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(Run::is_empty)
    }

    /// Number of runs.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}
