//! Batch processing of document folders.
//!
//! Every document is loaded, transformed and saved independently. A failing
//! document is recorded in the [`BatchReport`] and never stops the batch.

mod driver;
mod options;
mod report;

pub use driver::{discover, normalize_batch, run_batch, run_job};
pub(crate) use driver::process_file;
pub use options::{BatchJob, BatchOptions};
pub use report::{BatchEvent, BatchReport, FailureKind, FileOutcome, FileStatus};
