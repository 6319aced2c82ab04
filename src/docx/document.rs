//! DOCX document backed by its package parts.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::package::Package;
use super::rels::{rels_part_for, resolve_target, Relationships, REL_OFFICE_DOCUMENT};
use super::wml::{self, WmlParagraph, W_P, W_R, W_TBL, W_TC, W_TR};
use super::xml::{XmlDocument, XmlElement};
use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{
    Document, Footer, Paragraph, Region, Run, RunModel, RunSequence, Table, TableCell, TableRow,
};

const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// A footer part loaded for editing.
#[derive(Debug, Clone)]
struct FooterPart {
    name: String,
    xml: XmlDocument,
}

/// A Word document opened for editing.
///
/// Only the main document part and the footer parts referenced by its
/// sections are parsed. Every other part is carried through unchanged.
#[derive(Debug, Clone)]
pub struct DocxDocument {
    package: Package,
    main_part: String,
    main: XmlDocument,
    footers: Vec<FooterPart>,
    path: Option<PathBuf>,
}

impl DocxDocument {
    /// Open a DOCX file.
    ///
    /// Any failure is reported as [`Error::DocumentLoad`] naming the file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| Error::load(path, e))?;
        let mut doc = Self::from_bytes(&data).map_err(|e| Error::load(path, e))?;
        doc.path = Some(path.to_path_buf());
        log::debug!(
            "Opened {} ({} footer parts)",
            path.display(),
            doc.footers.len()
        );
        Ok(doc)
    }

    /// Load a document from DOCX bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        detect_format_from_bytes(data)?;
        Self::from_package(Package::from_bytes(data)?)
    }

    /// Load a document from an already-read package.
    pub fn from_package(package: Package) -> Result<Self> {
        let main_part = match package.part("_rels/.rels") {
            Some(data) => Relationships::parse(data)?
                .first_of_type(REL_OFFICE_DOCUMENT)
                .map(|rel| resolve_target("", &rel.target))
                .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()),
            None => DEFAULT_MAIN_PART.to_string(),
        };

        let main = XmlDocument::parse(package.require(&main_part)?)?;
        if !main.root.name.ends_with("document") {
            return Err(Error::Xml(format!(
                "{} has root <{}>, expected <w:document>",
                main_part, main.root.name
            )));
        }

        let footers = load_footers(&package, &main_part, &main)?;

        Ok(Self {
            package,
            main_part,
            main,
            footers,
            path: None,
        })
    }

    /// Path the document was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of footer parts referenced by the document's sections.
    pub fn footer_count(&self) -> usize {
        self.footers.len()
    }

    /// Names of the package parts, in package order.
    pub fn part_names(&self) -> Vec<String> {
        self.package.part_names().map(str::to_string).collect()
    }

    /// Serialize the document to DOCX bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut package = self.package.clone();
        package.set_part(self.main_part.clone(), self.main.to_bytes()?);
        for footer in &self.footers {
            package.set_part(footer.name.clone(), footer.xml.to_bytes()?);
        }
        package.to_bytes()
    }

    /// Save the document.
    ///
    /// Any failure is reported as [`Error::DocumentSave`] naming the file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes().map_err(|e| Error::save(path, e))?;
        fs::write(path, bytes).map_err(|e| Error::save(path, e))?;
        log::debug!("Saved {}", path.display());
        Ok(())
    }

    /// Snapshot the document as the in-memory model.
    pub fn to_model(&self) -> Result<Document> {
        let body = self
            .main
            .root
            .child("w:body")
            .ok_or_else(|| Error::MissingPart(format!("{}#w:body", self.main_part)))?;

        let mut doc = Document::new();
        for element in body.elements() {
            match element.name.as_str() {
                W_P => doc.add_paragraph(paragraph_model(element)),
                W_TBL => doc.add_table(table_model(element)),
                _ => {}
            }
        }
        for footer in &self.footers {
            doc.add_footer(Footer::new(
                footer
                    .xml
                    .root
                    .children_named(W_P)
                    .map(paragraph_model)
                    .collect(),
            ));
        }
        Ok(doc)
    }
}

impl RunModel for DocxDocument {
    fn for_each_paragraph(
        &mut self,
        region: Region,
        f: &mut dyn FnMut(&mut dyn RunSequence),
    ) -> Result<()> {
        match region {
            Region::Body => {
                let body = body_mut(&mut self.main, &self.main_part)?;
                for p in body.children_named_mut(W_P) {
                    f(&mut WmlParagraph::new(p));
                }
            }
            Region::TableCell => {
                let body = body_mut(&mut self.main, &self.main_part)?;
                for table in body.children_named_mut(W_TBL) {
                    for row in table.children_named_mut(W_TR) {
                        for cell in row.children_named_mut(W_TC) {
                            for p in cell.children_named_mut(W_P) {
                                f(&mut WmlParagraph::new(p));
                            }
                        }
                    }
                }
            }
            Region::Footer => {
                for footer in &mut self.footers {
                    for p in footer.xml.root.children_named_mut(W_P) {
                        f(&mut WmlParagraph::new(p));
                    }
                }
            }
        }
        Ok(())
    }
}

fn body_mut<'a>(
    main: &'a mut XmlDocument,
    main_part: &str,
) -> Result<&'a mut XmlElement> {
    main.root
        .child_mut("w:body")
        .ok_or_else(|| Error::RuleApplication(format!("{} has no w:body", main_part)))
}

/// Footer parts referenced by section properties, deduplicated, in order.
fn load_footers(
    package: &Package,
    main_part: &str,
    main: &XmlDocument,
) -> Result<Vec<FooterPart>> {
    let Some(body) = main.root.child("w:body") else {
        return Ok(Vec::new());
    };

    let mut ids = Vec::new();
    for element in body.elements() {
        let sect_pr = match element.name.as_str() {
            W_P => element.child("w:pPr").and_then(|ppr| ppr.child("w:sectPr")),
            "w:sectPr" => Some(element),
            _ => None,
        };
        if let Some(sect_pr) = sect_pr {
            ids.extend(
                sect_pr
                    .children_named("w:footerReference")
                    .filter_map(|r| r.attr("r:id"))
                    .map(str::to_string),
            );
        }
    }
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rels = match package.part(&rels_part_for(main_part)) {
        Some(data) => Relationships::parse(data)?,
        None => {
            log::warn!("{} references footers but has no relationships part", main_part);
            return Ok(Vec::new());
        }
    };

    let mut seen = HashSet::new();
    let mut footers = Vec::new();
    for id in ids {
        let Some(rel) = rels.get(&id) else {
            log::warn!("Footer relationship {} not found", id);
            continue;
        };
        let name = resolve_target(main_part, &rel.target);
        if !seen.insert(name.clone()) {
            continue;
        }
        let xml = XmlDocument::parse(package.require(&name)?)?;
        footers.push(FooterPart { name, xml });
    }
    Ok(footers)
}

fn paragraph_model(p: &XmlElement) -> Paragraph {
    Paragraph::from_runs(
        p.children_named(W_R)
            .map(|r| Run::styled(wml::run_text(r), wml::read_style(r)))
            .collect(),
    )
}

fn table_model(tbl: &XmlElement) -> Table {
    let mut table = Table::new();
    for row in tbl.children_named(W_TR) {
        table.add_row(TableRow::new(
            row.children_named(W_TC)
                .map(|cell| TableCell::new(cell.children_named(W_P).map(paragraph_model).collect()))
                .collect(),
        ));
    }
    table
}
