//! Batch pipeline: discover, plan outputs, process each document.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use rayon::prelude::*;
use walkdir::WalkDir;

use super::options::{BatchJob, BatchOptions};
use super::report::{BatchEvent, BatchReport, FileOutcome};
use crate::detect::{has_docx_extension, is_lock_file};
use crate::docx::DocxDocument;
use crate::edit::{normalize, replace_in_document, FontPolicy, RuleSet};
use crate::error::{Error, Result};

/// Apply `rules` to every document in `source_dir` and write the results,
/// renamed by the same rules, into `dest_dir`.
///
/// Fails only for configuration problems found before any document is
/// touched; per-document failures are recorded in the report.
///
/// # Example
///
/// ```no_run
/// use docflow::batch::run_batch;
/// use docflow::RuleSet;
///
/// fn main() -> docflow::Result<()> {
///     let rules = RuleSet::from_pairs([("Draft", "Final")])?;
///     let report = run_batch("drafts", "final", &rules)?;
///     println!("{}", report.summary());
///     Ok(())
/// }
/// ```
pub fn run_batch<S: AsRef<Path>, D: AsRef<Path>>(
    source_dir: S,
    dest_dir: D,
    rules: &RuleSet,
) -> Result<BatchReport> {
    run_job(
        source_dir,
        dest_dir,
        &BatchJob::replace(rules.clone()),
        &BatchOptions::default(),
    )
}

/// Apply a font policy to every document in `source_dir`, keeping filenames.
pub fn normalize_batch<S: AsRef<Path>, D: AsRef<Path>>(
    source_dir: S,
    dest_dir: D,
    policy: &FontPolicy,
) -> Result<BatchReport> {
    run_job(
        source_dir,
        dest_dir,
        &BatchJob::normalize(policy.clone()),
        &BatchOptions::default(),
    )
}

/// Run `job` over every document in `source_dir`.
pub fn run_job<S: AsRef<Path>, D: AsRef<Path>>(
    source_dir: S,
    dest_dir: D,
    job: &BatchJob,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let source_dir = source_dir.as_ref();
    let dest_dir = dest_dir.as_ref();

    job.validate()?;
    if !source_dir.is_dir() {
        return Err(Error::SourceNotFound(source_dir.to_path_buf()));
    }
    fs::create_dir_all(dest_dir)?;

    let started_at = Utc::now();
    let sources = discover(source_dir, dest_dir, options.recursive);
    let plan = plan_outputs(&sources, dest_dir, job);
    log::info!(
        "Processing {} documents from {} into {}",
        plan.len(),
        source_dir.display(),
        dest_dir.display()
    );
    options.emit(BatchEvent::Started { total: plan.len() });

    let process = |(source, output): &(PathBuf, Result<PathBuf>)| -> FileOutcome {
        if options.is_cancelled() {
            let outcome = FileOutcome::skipped(source);
            options.emit(BatchEvent::FileFinished(outcome.clone()));
            return outcome;
        }
        options.emit(BatchEvent::FileStarted {
            source: source.clone(),
        });

        let outcome = match output {
            Ok(output) => match process_file(source, output, job) {
                Ok(replacements) => {
                    log::info!("Created {}", output.display());
                    FileOutcome::succeeded(source, output, replacements)
                }
                Err(e) => {
                    log::warn!("Error processing {}: {}", source.display(), e);
                    FileOutcome::failed(source, &e)
                }
            },
            Err(e) => {
                log::warn!("Skipping {}: {}", source.display(), e);
                FileOutcome::failed(source, e)
            }
        };
        options.emit(BatchEvent::FileFinished(outcome.clone()));
        outcome
    };

    let files: Vec<FileOutcome> = if options.parallel {
        plan.par_iter().map(process).collect()
    } else {
        plan.iter().map(process).collect()
    };

    let report = BatchReport {
        source_dir: source_dir.to_path_buf(),
        dest_dir: dest_dir.to_path_buf(),
        started_at,
        finished_at: Utc::now(),
        files,
    };
    options.emit(BatchEvent::Finished {
        succeeded: report.succeeded(),
        failed: report.failed(),
        skipped: report.skipped(),
    });
    log::info!("{}", report.summary());
    Ok(report)
}

/// Load, transform and save one document. Returns the replacement count.
pub(crate) fn process_file(source: &Path, output: &Path, job: &BatchJob) -> Result<usize> {
    let mut doc = DocxDocument::open(source)?;
    let replacements = replace_in_document(&mut doc, job.rules.rules())?;
    if let Some(policy) = &job.font_policy {
        normalize(&mut doc, policy).map_err(|e| Error::RuleApplication(e.to_string()))?;
    }
    doc.save(output)?;
    Ok(replacements)
}

/// Candidate documents under `source_dir`, sorted by path.
///
/// The destination directory is never descended into, so re-running a
/// recursive batch does not pick up its own outputs.
pub fn discover(source_dir: &Path, dest_dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let dest = fs::canonicalize(dest_dir).ok();
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut found = Vec::new();
    let walker = WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && dest.is_some()
                && fs::canonicalize(entry.path()).ok() == dest)
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Cannot read directory entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !has_docx_extension(path) {
            continue;
        }
        if is_lock_file(path) {
            log::warn!("Skipping lock file {}", path.display());
            continue;
        }
        found.push(path.to_path_buf());
    }
    found.sort();
    found
}

/// Pair each source with its output path, or with the collision that
/// prevents writing it.
fn plan_outputs(
    sources: &[PathBuf],
    dest_dir: &Path,
    job: &BatchJob,
) -> Vec<(PathBuf, Result<PathBuf>)> {
    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
    sources
        .iter()
        .map(|source| {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let output = match plain_file_name(job.output_name(&name)) {
                Ok(name) => dest_dir.join(name),
                Err(e) => return (source.clone(), Err(e)),
            };

            // Writing over another pending source would corrupt its input.
            if let Some(other) = sources.iter().find(|s| **s == output && *s != source) {
                return (
                    source.clone(),
                    Err(Error::OutputCollision {
                        path: output,
                        first: other.clone(),
                    }),
                );
            }
            match claimed.get(&output) {
                Some(first) => (
                    source.clone(),
                    Err(Error::OutputCollision {
                        path: output,
                        first: (*first).clone(),
                    }),
                ),
                None => {
                    claimed.insert(output.clone(), source);
                    (source.clone(), Ok(output))
                }
            }
        })
        .collect()
}

/// Accept `name` only if it is a single file name, so joining it onto the
/// destination stays inside the destination.
fn plain_file_name(name: String) -> Result<String> {
    let mut components = Path::new(&name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if single && !name.contains(['/', '\\']) {
        Ok(name)
    } else {
        Err(Error::InvalidOutputName(name))
    }
}
