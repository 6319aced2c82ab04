//! Document model types for rich-text editing.
//!
//! This module defines the in-memory representation of a word-processing
//! document (paragraphs of style-tagged runs, tables, footers) together with
//! the adapter traits the editing passes are written against. The model is
//! backend-agnostic: the DOCX backend implements the same traits directly
//! over its XML parts.

mod adapter;
mod document;
mod paragraph;
mod run;
mod table;

pub use adapter::{Region, RunModel, RunSequence};
pub use document::{Block, Document, Footer};
pub use paragraph::Paragraph;
pub use run::{Run, RunStyle, Underline};
pub use table::{Table, TableCell, TableRow};
