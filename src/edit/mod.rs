//! Editing passes over the run model.
//!
//! - [`replace`]: run-splitting find/replace within paragraphs
//! - [`rules`]: replacement rules and rule sets
//! - [`font`]: font family/size normalization per region

pub mod font;
pub mod replace;
pub mod rules;

pub use font::{normalize, normalize_fonts, FontPolicy, FontSpec};
pub use replace::{apply_rules, replace, replace_occurrences};
pub use rules::{ReplacementRule, RuleSet};

use crate::error::{Error, Result};
use crate::model::{Region, RunModel};

/// Apply `rules`, in order, to every body paragraph of a document.
///
/// Table cells and footers are left alone. Returns the total number of
/// occurrences replaced.
pub fn replace_in_document<M: RunModel + ?Sized>(
    document: &mut M,
    rules: &[ReplacementRule],
) -> Result<usize> {
    let mut replaced = 0;
    let mut paragraphs = 0;
    document
        .for_each_paragraph(Region::Body, &mut |paragraph| {
            paragraphs += 1;
            replaced += apply_rules(paragraph, rules);
        })
        .map_err(|e| match e {
            Error::RuleApplication(_) => e,
            other => Error::RuleApplication(other.to_string()),
        })?;
    log::debug!(
        "{} replacements across {} body paragraphs",
        replaced,
        paragraphs
    );
    Ok(replaced)
}
