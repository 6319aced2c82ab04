//! Batch job and execution options.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use super::report::BatchEvent;
use crate::edit::{FontPolicy, RuleSet};
use crate::error::{Error, Result};

/// What a batch does to each document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchJob {
    /// Replacement rules applied to body paragraphs and to filenames
    pub rules: RuleSet,

    /// Font policy applied after replacement, if any
    pub font_policy: Option<FontPolicy>,
}

impl BatchJob {
    /// Create an empty job (documents are re-saved unchanged).
    pub fn new() -> Self {
        Self::default()
    }

    /// A job that only applies replacement rules.
    pub fn replace(rules: RuleSet) -> Self {
        Self {
            rules,
            font_policy: None,
        }
    }

    /// A job that only normalizes fonts. Filenames are kept.
    pub fn normalize(policy: FontPolicy) -> Self {
        Self {
            rules: RuleSet::empty(),
            font_policy: Some(policy),
        }
    }

    /// Set the replacement rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Set the font policy.
    pub fn with_font_policy(mut self, policy: FontPolicy) -> Self {
        self.font_policy = Some(policy);
        self
    }

    /// Check the job before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.rules.iter().any(|rule| rule.old().is_empty()) {
            return Err(Error::InvalidRule("text to replace is empty".to_string()));
        }
        if let Some(policy) = &self.font_policy {
            policy.validate()?;
        }
        Ok(())
    }

    /// Derive the output filename for a source filename.
    pub fn output_name(&self, file_name: &str) -> String {
        if self.rules.is_empty() {
            file_name.to_string()
        } else {
            self.rules.derive_filename(file_name)
        }
    }
}

/// How a batch runs.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Process documents on the rayon worker pool
    pub parallel: bool,

    /// Walk sub-folders of the source directory
    pub recursive: bool,

    /// Checked before each document starts
    pub cancel: Option<Arc<AtomicBool>>,

    /// Receives progress events
    pub progress: Option<Sender<BatchEvent>>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            recursive: false,
            cancel: None,
            progress: None,
        }
    }
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable walking sub-folders.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set a cancellation flag.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Send progress events to `sender`.
    pub fn with_progress(mut self, sender: Sender<BatchEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub(crate) fn emit(&self, event: BatchEvent) {
        if let Some(sender) = &self.progress {
            // A dropped receiver only means nobody is listening.
            let _ = sender.send(event);
        }
    }
}
