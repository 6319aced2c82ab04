//! Integration tests for font normalization on DOCX documents.

use docflow::{
    normalize, normalize_fonts, Document, DocxDocument, FontPolicy, FontSpec, Footer, Paragraph,
    Run, RunStyle, Table, TableCell, TableRow,
};

fn times(size: f32) -> RunStyle {
    RunStyle::new().with_font("Times New Roman", size)
}

fn sample() -> DocxDocument {
    let mut doc = Document::new();
    doc.add_paragraph(Paragraph::from_runs(vec![
        Run::styled("Heading ", times(12.0).with_bold(true).with_color("1F3864")),
        Run::styled("body", times(12.0)),
    ]));
    let mut table = Table::new();
    table.add_row(TableRow::new(vec![
        TableCell::new(vec![Paragraph::from_runs(vec![Run::styled("A1", times(12.0))])]),
        TableCell::new(vec![Paragraph::from_runs(vec![Run::styled(
            "B1",
            times(12.0).with_italic(true),
        )])]),
    ]));
    doc.add_table(table);
    doc.add_footer(Footer::new(vec![Paragraph::from_runs(vec![Run::styled(
        "Page footer",
        times(10.0),
    )])]));
    DocxDocument::from_model(&doc).unwrap()
}

fn all_fonts(model: &Document) -> Vec<(String, f32)> {
    let body = model.paragraphs();
    let cells = model
        .tables()
        .flat_map(|t| t.cells().flat_map(|c| c.paragraphs.iter()));
    let footers = model.footers.iter().flat_map(|f| f.paragraphs.iter());
    body.chain(cells)
        .chain(footers)
        .flat_map(|p| p.runs.iter())
        .map(|r| {
            (
                r.style.font_name.clone().unwrap_or_default(),
                r.style.font_size.unwrap_or_default(),
            )
        })
        .collect()
}

#[test]
fn test_times_to_calibri() {
    let mut doc = sample();
    let visited = normalize_fonts(&mut doc, "Calibri", 12.0, 8.0).unwrap();
    assert_eq!(visited, 5);

    let reopened = DocxDocument::from_bytes(&doc.to_bytes().unwrap()).unwrap();
    let model = reopened.to_model().unwrap();
    let calibri = |size: f32| ("Calibri".to_string(), size);
    assert_eq!(
        all_fonts(&model),
        vec![
            calibri(12.0),
            calibri(12.0),
            calibri(12.0),
            calibri(12.0),
            calibri(8.0)
        ]
    );
}

#[test]
fn test_other_attributes_untouched() {
    let mut doc = sample();
    normalize(&mut doc, &FontPolicy::default()).unwrap();
    let model = doc.to_model().unwrap();

    let heading = &model.paragraphs().next().unwrap().runs[0];
    assert_eq!(heading.text, "Heading ");
    assert_eq!(heading.style.bold, Some(true));
    assert_eq!(heading.style.color.as_deref(), Some("1F3864"));

    let b1 = &model.tables().next().unwrap().rows[0].cells[1].paragraphs[0].runs[0];
    assert_eq!(b1.style.italic, Some(true));
}

#[test]
fn test_normalization_is_idempotent() {
    let mut doc = sample();
    normalize(&mut doc, &FontPolicy::default()).unwrap();
    let once = doc.to_model().unwrap();

    normalize(&mut doc, &FontPolicy::default()).unwrap();
    assert_eq!(doc.to_model().unwrap(), once);
}

#[test]
fn test_region_specific_policy() {
    let mut doc = sample();
    let policy = FontPolicy::new("Georgia", 11.0, 7.5)
        .unwrap()
        .with_table(FontSpec::new("Arial Narrow", 9.0));
    normalize(&mut doc, &policy).unwrap();

    let model = doc.to_model().unwrap();
    let fonts = all_fonts(&model);
    assert_eq!(fonts[0], ("Georgia".to_string(), 11.0));
    assert_eq!(fonts[2], ("Arial Narrow".to_string(), 9.0));
    assert_eq!(fonts[4], ("Georgia".to_string(), 7.5));
}

#[test]
fn test_invalid_sizes_rejected() {
    let mut doc = sample();
    assert!(normalize_fonts(&mut doc, "Calibri", 12.0, 0.0).is_err());
    assert!(normalize_fonts(&mut doc, "  ", 12.0, 8.0).is_err());
    assert!(normalize_fonts(&mut doc, "Calibri", 12.3, 8.0).is_err());
}
