//! Run model adapter traits.
//!
//! The replacer and the font normalizer never touch a document backend
//! directly. They work against these two traits, which expose a document as
//! regions of paragraphs and each paragraph as an ordered, editable run list.
//! The in-memory [`Document`] implements them, and so does the DOCX backend.

use std::ops::Range;

use super::{Block, Document, Paragraph, Run, RunStyle};
use crate::error::Result;

/// Structural region of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Top-level body paragraphs
    Body,
    /// Paragraphs inside table cells
    TableCell,
    /// Paragraphs inside section footers
    Footer,
}

impl Region {
    /// All regions, in the order they are visited by normalization.
    pub const ALL: [Region; 3] = [Region::Body, Region::TableCell, Region::Footer];
}

/// Editable run sequence of one paragraph.
///
/// Indices are run positions within the paragraph. Callers keep them within
/// `0..run_count()` (and `0..=run_count()` for [`insert_run`]).
///
/// [`insert_run`]: RunSequence::insert_run
pub trait RunSequence {
    /// Number of runs.
    fn run_count(&self) -> usize;

    /// Text of the run at `index`.
    fn run_text(&self, index: usize) -> String;

    /// Replace the text of the run at `index`, keeping its style.
    fn set_run_text(&mut self, index: usize, text: &str);

    /// Style of the run at `index`.
    fn run_style(&self, index: usize) -> RunStyle;

    /// Replace the style of the run at `index`.
    fn set_run_style(&mut self, index: usize, style: &RunStyle);

    /// Insert a new run at `index`, shifting later runs right.
    fn insert_run(&mut self, index: usize, text: &str, style: &RunStyle);

    /// Remove the run at `index`.
    fn remove_run(&mut self, index: usize);

    /// Append a run carrying the default style a new run receives.
    fn push_run(&mut self, text: &str);

    /// Visible text: the concatenation of all run texts.
    fn text(&self) -> String {
        (0..self.run_count()).map(|i| self.run_text(i)).collect()
    }

    /// Remove every run.
    fn clear_runs(&mut self) {
        for index in (0..self.run_count()).rev() {
            self.remove_run(index);
        }
    }

    /// Ranges of runs whose texts are adjacent in the visible text, with no
    /// other content between them. A plain run list is one group.
    fn run_groups(&self) -> Vec<Range<usize>> {
        match self.run_count() {
            0 => Vec::new(),
            count => vec![0..count],
        }
    }

    /// Replace the runs in `range` with one default-style run holding `text`,
    /// placed where the first removed run was.
    fn replace_runs(&mut self, range: Range<usize>, text: &str) {
        for index in range.clone().rev() {
            self.remove_run(index);
        }
        self.insert_run(range.start, text, &RunStyle::default());
    }
}

/// A document whose paragraphs can be visited region by region.
pub trait RunModel {
    /// Call `f` on every paragraph of `region`, in document order.
    fn for_each_paragraph(
        &mut self,
        region: Region,
        f: &mut dyn FnMut(&mut dyn RunSequence),
    ) -> Result<()>;
}

impl RunSequence for Paragraph {
    fn run_count(&self) -> usize {
        self.runs.len()
    }

    fn run_text(&self, index: usize) -> String {
        self.runs[index].text.clone()
    }

    fn set_run_text(&mut self, index: usize, text: &str) {
        self.runs[index].text = text.to_string();
    }

    fn run_style(&self, index: usize) -> RunStyle {
        self.runs[index].style.clone()
    }

    fn set_run_style(&mut self, index: usize, style: &RunStyle) {
        self.runs[index].style = style.clone();
    }

    fn insert_run(&mut self, index: usize, text: &str, style: &RunStyle) {
        self.runs.insert(index, Run::styled(text, style.clone()));
    }

    fn remove_run(&mut self, index: usize) {
        self.runs.remove(index);
    }

    fn push_run(&mut self, text: &str) {
        self.runs.push(Run::new(text));
    }

    fn text(&self) -> String {
        self.plain_text()
    }

    fn clear_runs(&mut self) {
        self.runs.clear();
    }
}

impl RunModel for Document {
    fn for_each_paragraph(
        &mut self,
        region: Region,
        f: &mut dyn FnMut(&mut dyn RunSequence),
    ) -> Result<()> {
        match region {
            Region::Body => {
                for block in &mut self.body {
                    if let Block::Paragraph(p) = block {
                        f(p);
                    }
                }
            }
            Region::TableCell => {
                for block in &mut self.body {
                    if let Block::Table(table) = block {
                        for cell in table.cells_mut() {
                            for p in &mut cell.paragraphs {
                                f(p);
                            }
                        }
                    }
                }
            }
            Region::Footer => {
                for footer in &mut self.footers {
                    for p in &mut footer.paragraphs {
                        f(p);
                    }
                }
            }
        }
        Ok(())
    }
}
