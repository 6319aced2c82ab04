//! # docflow
//!
//! Batch find/replace and font normalization for Word documents.
//!
//! Replacements preserve run-level formatting: when a match sits inside one
//! formatting run, the run is split and every piece keeps the run's bold,
//! italic, underline, font, size and named style. Output files are renamed
//! by applying the same rules to their filenames.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docflow::{DocFlow, RuleSet};
//!
//! fn main() -> docflow::Result<()> {
//!     let rules = RuleSet::from_pairs([("Draft", "Final"), ("2023", "2024")])?;
//!
//!     let report = DocFlow::new()
//!         .with_rules(rules)
//!         .with_default_fonts()
//!         .run("drafts", "final")?;
//!
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Run-splitting replacement**: formatting survives single-run matches
//! - **Filename rules**: outputs renamed with the same ordered rules
//! - **Font normalization**: one family across body, tables and footers
//! - **Parallel batches**: documents processed independently with Rayon
//! - **Per-file reports**: failures recorded, never fatal to the batch

pub mod batch;
pub mod detect;
pub mod docx;
pub mod edit;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use batch::{
    normalize_batch, run_batch, run_job, BatchEvent, BatchJob, BatchOptions, BatchReport,
    FailureKind, FileOutcome, FileStatus,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx_bytes};
pub use docx::DocxDocument;
pub use edit::{
    normalize, normalize_fonts, replace, replace_in_document, FontPolicy, FontSpec,
    ReplacementRule, RuleSet,
};
pub use error::{Error, Result};
pub use model::{
    Block, Document, Footer, Paragraph, Region, Run, RunModel, RunSequence, RunStyle, Table,
    TableCell, TableRow, Underline,
};

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Open a DOCX file for editing.
///
/// # Example
///
/// ```no_run
/// use docflow::open;
///
/// let doc = open("report.docx").unwrap();
/// println!("Footers: {}", doc.footer_count());
/// ```
pub fn open<P: AsRef<Path>>(path: P) -> Result<DocxDocument> {
    DocxDocument::open(path)
}

/// Read a DOCX file into the in-memory model.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    DocxDocument::open(path)?.to_model()
}

/// Extract the plain text of a DOCX file's body.
///
/// # Example
///
/// ```no_run
/// use docflow::extract_text;
///
/// let text = extract_text("report.docx").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(parse_file(path)?.plain_text())
}

/// Apply rules to one file's body paragraphs and save the result to
/// `output`. Returns the number of occurrences replaced.
pub fn replace_file<S: AsRef<Path>, D: AsRef<Path>>(
    source: S,
    output: D,
    rules: &RuleSet,
) -> Result<usize> {
    let job = BatchJob::replace(rules.clone());
    job.validate()?;
    batch::process_file(source.as_ref(), output.as_ref(), &job)
}

/// Apply a font policy to one file and save the result to `output`.
pub fn normalize_file<S: AsRef<Path>, D: AsRef<Path>>(
    source: S,
    output: D,
    policy: &FontPolicy,
) -> Result<()> {
    policy.validate()?;
    batch::process_file(
        source.as_ref(),
        output.as_ref(),
        &BatchJob::normalize(policy.clone()),
    )?;
    Ok(())
}

/// Builder for batch jobs.
///
/// # Example
///
/// ```no_run
/// use docflow::{DocFlow, FontPolicy, RuleSet};
///
/// let report = DocFlow::new()
///     .with_rules(RuleSet::from_pairs([("Draft", "Final")])?)
///     .with_font_policy(FontPolicy::new("Arial", 11.0, 7.0)?)
///     .sequential()
///     .recursive()
///     .run("drafts", "final")?;
/// assert!(!report.has_failures());
/// # Ok::<(), docflow::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocFlow {
    job: BatchJob,
    options: BatchOptions,
}

impl DocFlow {
    /// Create a new builder that re-saves documents unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the replacement rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.job = self.job.with_rules(rules);
        self
    }

    /// Set the font policy.
    pub fn with_font_policy(mut self, policy: FontPolicy) -> Self {
        self.job = self.job.with_font_policy(policy);
        self
    }

    /// Normalize fonts to Calibri 12pt, footers 8pt.
    pub fn with_default_fonts(self) -> Self {
        self.with_font_policy(FontPolicy::default())
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Walk sub-folders of the source directory.
    pub fn recursive(mut self) -> Self {
        self.options = self.options.with_recursive(true);
        self
    }

    /// Set a cancellation flag checked before each document.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.options = self.options.with_cancel(cancel);
        self
    }

    /// Send progress events to `sender`.
    pub fn with_progress(mut self, sender: crossbeam_channel::Sender<BatchEvent>) -> Self {
        self.options = self.options.with_progress(sender);
        self
    }

    /// The job this builder describes.
    pub fn job(&self) -> &BatchJob {
        &self.job
    }

    /// Run the batch.
    pub fn run<S: AsRef<Path>, D: AsRef<Path>>(&self, source_dir: S, dest_dir: D) -> Result<BatchReport> {
        run_job(source_dir, dest_dir, &self.job, &self.options)
    }

    /// Apply the job to a single file, writing `output`.
    pub fn run_file<S: AsRef<Path>, D: AsRef<Path>>(&self, source: S, output: D) -> Result<usize> {
        self.job.validate()?;
        batch::process_file(source.as_ref(), output.as_ref(), &self.job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_job() {
        let rules = RuleSet::from_pairs([("a", "b")]).unwrap();
        let flow = DocFlow::new().with_rules(rules.clone()).with_default_fonts();
        assert_eq!(flow.job().rules, rules);
        assert_eq!(flow.job().font_policy, Some(FontPolicy::default()));
    }

    #[test]
    fn test_builder_validates_before_running() {
        let mut policy = FontPolicy::default();
        policy.footer.size_pt = 0.0;
        let flow = DocFlow::new().with_font_policy(policy);
        let err = flow.run("/nonexistent", "/nonexistent").unwrap_err();
        assert!(matches!(err, Error::InvalidFontPolicy(_)));
    }
}
