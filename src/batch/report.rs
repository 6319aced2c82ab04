//! Batch report and progress events.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stage at which a document failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Reading or parsing the source document
    Load,
    /// Applying rules or the font policy
    Transform,
    /// Writing the output document
    Save,
    /// Another source already claimed the output path
    Collision,
    /// The derived output name would leave the destination directory
    Naming,
}

impl FailureKind {
    /// Classify a per-file error.
    pub fn of(err: &Error) -> Self {
        match err {
            Error::DocumentLoad { .. } | Error::UnknownFormat => FailureKind::Load,
            Error::DocumentSave { .. } => FailureKind::Save,
            Error::OutputCollision { .. } => FailureKind::Collision,
            Error::InvalidOutputName(_) => FailureKind::Naming,
            _ => FailureKind::Transform,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::Load => "load",
            FailureKind::Transform => "transform",
            FailureKind::Save => "save",
            FailureKind::Collision => "collision",
            FailureKind::Naming => "naming",
        };
        f.write_str(name)
    }
}

/// Result of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Document written to `output`
    Succeeded {
        /// Output path
        output: PathBuf,
        /// Occurrences replaced in the body
        replacements: usize,
    },
    /// Document not written
    Failed {
        /// Failing stage
        kind: FailureKind,
        /// Error message
        reason: String,
    },
    /// Not started because the batch was cancelled
    Skipped,
}

/// Per-document outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Source document
    pub source: PathBuf,
    /// What happened to it
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileOutcome {
    /// A successful outcome.
    pub fn succeeded(source: impl Into<PathBuf>, output: impl Into<PathBuf>, replacements: usize) -> Self {
        Self {
            source: source.into(),
            status: FileStatus::Succeeded {
                output: output.into(),
                replacements,
            },
        }
    }

    /// A failed outcome built from the error that stopped the document.
    pub fn failed(source: impl Into<PathBuf>, err: &Error) -> Self {
        Self {
            source: source.into(),
            status: FileStatus::Failed {
                kind: FailureKind::of(err),
                reason: err.to_string(),
            },
        }
    }

    /// An outcome for a document that was never started.
    pub fn skipped(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            status: FileStatus::Skipped,
        }
    }

    /// Check if the document was written.
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Succeeded { .. })
    }

    /// Check if the document failed.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, FileStatus::Failed { .. })
    }

    /// Output path, if the document was written.
    pub fn output(&self) -> Option<&Path> {
        match &self.status {
            FileStatus::Succeeded { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Progress events sent while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// Discovery finished
    Started {
        /// Documents to process
        total: usize,
    },
    /// A document is about to be processed
    FileStarted {
        /// Source document
        source: PathBuf,
    },
    /// A document finished, failed or was skipped
    FileFinished(FileOutcome),
    /// Every document has an outcome
    Finished {
        /// Documents written
        succeeded: usize,
        /// Documents that failed
        failed: usize,
        /// Documents not started
        skipped: usize,
    },
}

/// Outcome of a whole batch, in discovery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Source directory
    pub source_dir: PathBuf,
    /// Destination directory
    pub dest_dir: PathBuf,
    /// When the batch started
    pub started_at: DateTime<Utc>,
    /// When the last document finished
    pub finished_at: DateTime<Utc>,
    /// One outcome per discovered document
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    /// Number of discovered documents.
    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Number of documents written.
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    /// Number of documents that failed.
    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.is_failure()).count()
    }

    /// Number of documents skipped by cancellation.
    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Skipped)
            .count()
    }

    /// Total occurrences replaced across written documents.
    pub fn replacements(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.status {
                FileStatus::Succeeded { replacements, .. } => replacements,
                _ => 0,
            })
            .sum()
    }

    /// Check if any document failed.
    pub fn has_failures(&self) -> bool {
        self.files.iter().any(|f| f.is_failure())
    }

    /// Failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.is_failure())
    }

    /// Wall-clock duration of the batch.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// One-line summary, e.g. `processed 2/3 (1 failed)`.
    pub fn summary(&self) -> String {
        let mut summary = format!("processed {}/{}", self.succeeded(), self.total());
        let mut details = Vec::new();
        if self.failed() > 0 {
            details.push(format!("{} failed", self.failed()));
        }
        if self.skipped() > 0 {
            details.push(format!("{} skipped", self.skipped()));
        }
        if !details.is_empty() {
            summary.push_str(&format!(" ({})", details.join(", ")));
        }
        summary
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
