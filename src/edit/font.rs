//! Font normalization.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Region, RunModel, RunSequence};

/// Largest font size WordprocessingML can store (`w:sz` is capped at 3276
/// half points).
pub const MAX_FONT_SIZE_PT: f32 = 1638.0;

/// Font family and size applied to one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Font family name
    pub family: String,
    /// Size in points
    pub size_pt: f32,
}

impl FontSpec {
    /// Create a new font spec.
    pub fn new(family: impl Into<String>, size_pt: f32) -> Self {
        Self {
            family: family.into(),
            size_pt,
        }
    }

    fn validate(&self, region: &str) -> Result<()> {
        if self.family.trim().is_empty() {
            return Err(Error::InvalidFontPolicy(format!(
                "{} font family is empty",
                region
            )));
        }
        if !(self.size_pt > 0.0 && self.size_pt <= MAX_FONT_SIZE_PT) {
            return Err(Error::InvalidFontPolicy(format!(
                "{} size {}pt is outside (0, {}]",
                region, self.size_pt, MAX_FONT_SIZE_PT
            )));
        }
        if (self.size_pt * 2.0).fract() != 0.0 {
            return Err(Error::InvalidFontPolicy(format!(
                "{} size {}pt is not a multiple of 0.5pt",
                region, self.size_pt
            )));
        }
        Ok(())
    }
}

/// Target font per region.
///
/// Body and table-cell paragraphs usually share one spec; footers use the
/// same family at a smaller size.
///
/// # Example
///
/// ```
/// use docflow::FontPolicy;
///
/// let policy = FontPolicy::new("Arial", 11.0, 7.0).unwrap();
/// assert_eq!(policy.footer.family, "Arial");
/// assert_eq!(policy.table, policy.body);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontPolicy {
    /// Top-level body paragraphs
    pub body: FontSpec,
    /// Paragraphs inside table cells
    pub table: FontSpec,
    /// Footer paragraphs
    pub footer: FontSpec,
}

impl Default for FontPolicy {
    fn default() -> Self {
        Self {
            body: FontSpec::new("Calibri", 12.0),
            table: FontSpec::new("Calibri", 12.0),
            footer: FontSpec::new("Calibri", 8.0),
        }
    }
}

impl FontPolicy {
    /// Create a validated policy: `family` everywhere, `body_size_pt` for
    /// body and table cells, `footer_size_pt` for footers.
    pub fn new(family: impl Into<String>, body_size_pt: f32, footer_size_pt: f32) -> Result<Self> {
        let family = family.into();
        let policy = Self {
            body: FontSpec::new(family.clone(), body_size_pt),
            table: FontSpec::new(family.clone(), body_size_pt),
            footer: FontSpec::new(family, footer_size_pt),
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Use a distinct spec for table cells.
    pub fn with_table(mut self, spec: FontSpec) -> Self {
        self.table = spec;
        self
    }

    /// Use a distinct spec for footers.
    pub fn with_footer(mut self, spec: FontSpec) -> Self {
        self.footer = spec;
        self
    }

    /// Check every region's family and size.
    pub fn validate(&self) -> Result<()> {
        self.body.validate("body")?;
        self.table.validate("table")?;
        self.footer.validate("footer")
    }

    /// Spec applied to `region`.
    pub fn spec_for(&self, region: Region) -> &FontSpec {
        match region {
            Region::Body => &self.body,
            Region::TableCell => &self.table,
            Region::Footer => &self.footer,
        }
    }
}

/// Apply `policy` to every run of the document.
///
/// Only the font family and size change. Running it twice leaves the
/// document as the first run left it. Returns the number of runs visited.
pub fn normalize<M: RunModel + ?Sized>(document: &mut M, policy: &FontPolicy) -> Result<usize> {
    policy.validate()?;

    let mut visited = 0;
    for region in Region::ALL {
        let spec = policy.spec_for(region);
        let mut changed = 0;
        document.for_each_paragraph(region, &mut |paragraph| {
            let (runs, updated) = apply_spec(paragraph, spec);
            visited += runs;
            changed += updated;
        })?;
        log::debug!(
            "{:?}: {} runs set to {} {}pt",
            region,
            changed,
            spec.family,
            spec.size_pt
        );
    }
    Ok(visited)
}

/// Apply `body_font` at `body_size_pt` to body and table paragraphs and at
/// `footer_size_pt` to footer paragraphs.
pub fn normalize_fonts<M: RunModel + ?Sized>(
    document: &mut M,
    body_font: &str,
    body_size_pt: f32,
    footer_size_pt: f32,
) -> Result<usize> {
    let policy = FontPolicy::new(body_font, body_size_pt, footer_size_pt)?;
    normalize(document, &policy)
}

fn apply_spec(paragraph: &mut dyn RunSequence, spec: &FontSpec) -> (usize, usize) {
    let runs = paragraph.run_count();
    let mut updated = 0;
    for index in 0..runs {
        let style = paragraph.run_style(index);
        if style.font_name.as_deref() == Some(spec.family.as_str())
            && style.font_size == Some(spec.size_pt)
        {
            continue;
        }
        paragraph.set_run_style(index, &style.with_font(spec.family.as_str(), spec.size_pt));
        updated += 1;
    }
    (runs, updated)
}
