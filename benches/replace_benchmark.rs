//! Benchmarks for replacement and normalization throughput.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic documents built in memory.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docflow::edit::{apply_rules, replace_in_document};
use docflow::{
    normalize, Document, DocxDocument, FontPolicy, Paragraph, Run, RunStyle, RuleSet,
};

/// Creates a document with `paragraphs` paragraphs of three styled runs each.
fn create_test_document(paragraphs: usize) -> Document {
    let mut doc = Document::new();
    for i in 0..paragraphs {
        doc.add_paragraph(Paragraph::from_runs(vec![
            Run::styled(
                format!("Draft section {} of the quarterly report. ", i),
                RunStyle::new().with_bold(true).with_font("Times New Roman", 12.0),
            ),
            Run::styled(
                "The Draft figures are preliminary and subject to change. ",
                RunStyle::new().with_font("Times New Roman", 12.0),
            ),
            Run::styled(
                "Contact finance for the Dra",
                RunStyle::new().with_italic(true),
            ),
        ]));
        doc.add_paragraph(Paragraph::with_text("ft version."));
    }
    doc
}

fn bench_replace_paragraph(c: &mut Criterion) {
    let rules = RuleSet::from_pairs([("Draft", "Final"), ("2023", "2024")]).unwrap();
    let paragraph = Paragraph::from_runs(vec![
        Run::styled("Draft one, Draft two, Draft three", RunStyle::new().with_bold(true)),
        Run::new(" and some trailing text without matches"),
    ]);

    c.bench_function("replace_paragraph", |b| {
        b.iter(|| {
            let mut p = paragraph.clone();
            black_box(apply_rules(&mut p, rules.rules()))
        })
    });
}

fn bench_replace_document(c: &mut Criterion) {
    let rules = RuleSet::from_pairs([("Draft", "Final")]).unwrap();
    let mut group = c.benchmark_group("replace_docx");

    for paragraphs in [10, 100, 500] {
        let bytes = DocxDocument::from_model(&create_test_document(paragraphs))
            .unwrap()
            .to_bytes()
            .unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(paragraphs),
            &bytes,
            |b, bytes| {
                b.iter(|| {
                    let mut doc = DocxDocument::from_bytes(black_box(bytes)).unwrap();
                    replace_in_document(&mut doc, rules.rules()).unwrap();
                    black_box(doc.to_bytes().unwrap())
                })
            },
        );
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let docx = DocxDocument::from_model(&create_test_document(100)).unwrap();
    let policy = FontPolicy::default();

    c.bench_function("normalize_100", |b| {
        b.iter(|| {
            let mut doc = docx.clone();
            black_box(normalize(&mut doc, &policy).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_replace_paragraph,
    bench_replace_document,
    bench_normalize
);
criterion_main!(benches);
