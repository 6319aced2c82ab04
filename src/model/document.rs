//! Document-level types.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// An in-memory document: body blocks plus per-section footers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Body content in document order
    pub body: Vec<Block>,

    /// Section footers in document order
    pub footers: Vec<Footer>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    /// Add a table to the body.
    pub fn add_table(&mut self, table: Table) {
        self.body.push(Block::Table(table));
    }

    /// Add a section footer.
    pub fn add_footer(&mut self, footer: Footer) {
        self.footers.push(footer);
    }

    /// Top-level body paragraphs (tables excluded).
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// Top-level body tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// Check if the document has no content at all.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.footers.is_empty()
    }

    /// Get plain text content of the body.
    pub fn plain_text(&self) -> String {
        self.body
            .iter()
            .map(|b| match b {
                Block::Paragraph(p) => p.plain_text(),
                Block::Table(t) => t.plain_text(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A body-level content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),

    /// A table
    Table(Table),
}

/// A section footer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    /// Footer paragraphs
    pub paragraphs: Vec<Paragraph>,
}

impl Footer {
    /// Create a footer from paragraphs.
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Create a footer holding one plain-text paragraph.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![Paragraph::with_text(text)])
    }
}
