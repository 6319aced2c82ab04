//! Building a minimal DOCX package from the in-memory model.

use super::document::DocxDocument;
use super::package::Package;
use super::rels::{Relationships, REL_FOOTER, REL_OFFICE_DOCUMENT};
use super::wml::{new_run, W_P, W_TBL, W_TC, W_TR};
use super::xml::{XmlDocument, XmlElement};
use crate::error::Result;
use crate::model::{Block, Document, Paragraph, Table};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const CT_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";

impl DocxDocument {
    /// Build a new DOCX document holding the content of `model`.
    ///
    /// Each footer gets its own section. The first footers are attached to
    /// empty section-break paragraphs at the end of the body, the last one to
    /// the body's final section properties.
    pub fn from_model(model: &Document) -> Result<Self> {
        let mut package = Package::new();
        let mut content_types = XmlElement::new("Types")
            .with_attr("xmlns", CT_NS)
            .with_child(
                XmlElement::new("Default")
                    .with_attr("Extension", "rels")
                    .with_attr("ContentType", CT_RELS),
            )
            .with_child(
                XmlElement::new("Default")
                    .with_attr("Extension", "xml")
                    .with_attr("ContentType", "application/xml"),
            )
            .with_child(
                XmlElement::new("Override")
                    .with_attr("PartName", "/word/document.xml")
                    .with_attr("ContentType", CT_MAIN),
            );

        let mut root_rels = Relationships::new();
        root_rels.push("rId1", REL_OFFICE_DOCUMENT, "word/document.xml");

        let mut body = XmlElement::new("w:body");
        for block in &model.body {
            body.push_child(match block {
                Block::Paragraph(p) => paragraph_element(p),
                Block::Table(t) => table_element(t),
            });
        }

        let mut document_rels = Relationships::new();
        let mut footer_parts = Vec::new();
        for (i, footer) in model.footers.iter().enumerate() {
            let number = i + 1;
            let id = format!("rId{}", number);
            let part = format!("footer{}.xml", number);
            document_rels.push(id.as_str(), REL_FOOTER, part.as_str());
            content_types.push_child(
                XmlElement::new("Override")
                    .with_attr("PartName", format!("/word/{}", part))
                    .with_attr("ContentType", CT_FOOTER),
            );

            let mut ftr = XmlElement::new("w:ftr")
                .with_attr("xmlns:w", W_NS)
                .with_attr("xmlns:r", R_NS);
            for p in &footer.paragraphs {
                ftr.push_child(paragraph_element(p));
            }
            footer_parts.push((format!("word/{}", part), XmlDocument::new(ftr)));

            let sect_pr = section_properties(Some(&id));
            if number < model.footers.len() {
                body.push_child(
                    XmlElement::new(W_P)
                        .with_child(XmlElement::new("w:pPr").with_child(sect_pr)),
                );
            } else {
                body.push_child(sect_pr);
            }
        }
        if model.footers.is_empty() {
            body.push_child(section_properties(None));
        }

        let document = XmlElement::new("w:document")
            .with_attr("xmlns:w", W_NS)
            .with_attr("xmlns:r", R_NS)
            .with_child(body);

        package.set_part(
            "[Content_Types].xml",
            XmlDocument::new(content_types).to_bytes()?,
        );
        package.set_part("_rels/.rels", root_rels.to_xml().to_bytes()?);
        package.set_part("word/document.xml", XmlDocument::new(document).to_bytes()?);
        if !model.footers.is_empty() {
            package.set_part(
                "word/_rels/document.xml.rels",
                document_rels.to_xml().to_bytes()?,
            );
        }
        for (name, xml) in footer_parts {
            package.set_part(name, xml.to_bytes()?);
        }

        DocxDocument::from_package(package)
    }
}

fn paragraph_element(paragraph: &Paragraph) -> XmlElement {
    let mut p = XmlElement::new(W_P);
    for run in &paragraph.runs {
        p.push_child(new_run(&run.text, &run.style));
    }
    p
}

fn table_element(table: &Table) -> XmlElement {
    let mut tbl = XmlElement::new(W_TBL).with_child(
        XmlElement::new("w:tblPr").with_child(
            XmlElement::new("w:tblW")
                .with_attr("w:w", "0")
                .with_attr("w:type", "auto"),
        ),
    );

    let mut grid = XmlElement::new("w:tblGrid");
    for _ in 0..table.column_count() {
        grid.push_child(XmlElement::new("w:gridCol"));
    }
    tbl.push_child(grid);

    for row in &table.rows {
        let mut tr = XmlElement::new(W_TR);
        for cell in &row.cells {
            let mut tc = XmlElement::new(W_TC);
            for p in &cell.paragraphs {
                tc.push_child(paragraph_element(p));
            }
            // A cell must end with a paragraph.
            if cell.paragraphs.is_empty() {
                tc.push_child(XmlElement::new(W_P));
            }
            tr.push_child(tc);
        }
        tbl.push_child(tr);
    }
    tbl
}

fn section_properties(footer_id: Option<&str>) -> XmlElement {
    let mut sect_pr = XmlElement::new("w:sectPr");
    if let Some(id) = footer_id {
        sect_pr.push_child(
            XmlElement::new("w:footerReference")
                .with_attr("w:type", "default")
                .with_attr("r:id", id),
        );
    }
    sect_pr.push_child(
        XmlElement::new("w:pgSz")
            .with_attr("w:w", "12240")
            .with_attr("w:h", "15840"),
    );
    sect_pr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Footer, TableCell, TableRow};

    #[test]
    fn test_package_layout() {
        let mut model = Document::new();
        model.add_paragraph(Paragraph::with_text("x"));
        model.add_footer(Footer::with_text("f"));
        let docx = DocxDocument::from_model(&model).unwrap();

        let names = docx.part_names();
        assert!(names.contains(&"[Content_Types].xml".to_string()));
        assert!(names.contains(&"word/document.xml".to_string()));
        assert!(names.contains(&"word/_rels/document.xml.rels".to_string()));
        assert!(names.contains(&"word/footer1.xml".to_string()));
    }

    #[test]
    fn test_empty_cell_gets_paragraph() {
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::default()]));
        let tbl = table_element(&table);

        let tc = tbl
            .child(W_TR)
            .and_then(|tr| tr.child(W_TC))
            .unwrap();
        assert_eq!(tc.children_named(W_P).count(), 1);
    }

    #[test]
    fn test_document_without_footers() {
        let mut model = Document::new();
        model.add_paragraph(Paragraph::with_text("only body"));
        let docx = DocxDocument::from_model(&model).unwrap();

        assert_eq!(docx.footer_count(), 0);
        assert!(!docx
            .part_names()
            .contains(&"word/_rels/document.xml.rels".to_string()));
        assert_eq!(docx.to_model().unwrap(), model);
    }
}
