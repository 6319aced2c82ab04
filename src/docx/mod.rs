//! DOCX backend.
//!
//! Opens a Word package, parses the main document part and the footer parts
//! its sections reference, and exposes them through the run model traits.
//! Unrelated parts (styles, media, headers, settings) are written back
//! byte-for-byte.
//!
//! # Example
//!
//! ```no_run
//! use docflow::docx::DocxDocument;
//! use docflow::edit::replace_in_document;
//! use docflow::ReplacementRule;
//!
//! fn main() -> docflow::Result<()> {
//!     let mut doc = DocxDocument::open("Draft - Jan.docx")?;
//!     let rules = [ReplacementRule::new("Draft", "Final")?];
//!     replace_in_document(&mut doc, &rules)?;
//!     doc.save("Final - Jan.docx")?;
//!     Ok(())
//! }
//! ```

mod builder;
mod document;
mod package;
mod rels;
mod wml;
pub mod xml;

pub use document::DocxDocument;
pub use package::Package;
pub use rels::{Relationship, Relationships};
pub use wml::WmlParagraph;
