//! Benchmarks for the document pipeline.
//!
//! Run with: cargo bench

use std::fs;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};

use lore::{Document, MungeOptions, PlainHighlighter, munge};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");
const TEMPLATE: &str = include_str!("../tests/fixtures/template.tpl");
const HOWTO: &str = include_str!("../tests/fixtures/howto/deferreds.xhtml");

/// A long page built by repeating the howto body's sections.
fn large_source() -> String {
    let start = HOWTO.find("<h2>").unwrap();
    let end = HOWTO.rfind("</body>").unwrap();
    let sections = &HOWTO[start..end];
    let head = &HOWTO[..start];
    format!("{head}{}</body></html>", sections.repeat(50))
}

fn options() -> MungeOptions {
    MungeOptions::new(format!("{FIXTURES_DIR}/howto/deferreds.xhtml"))
        .with_highlighter(Arc::new(PlainHighlighter))
}

// ============================================================================
// Parsing
// ============================================================================

fn bench_parse_xhtml(c: &mut Criterion) {
    let source = large_source();
    c.bench_function("parse_xhtml", |b| {
        b.iter(|| Document::parse_xhtml(&source).unwrap());
    });
}

fn bench_parse_html(c: &mut Criterion) {
    let source = large_source();
    c.bench_function("parse_html", |b| {
        b.iter(|| Document::parse_html(&source));
    });
}

// ============================================================================
// Pipeline
// ============================================================================

fn bench_munge(c: &mut Criterion) {
    let template = Document::parse_xhtml(TEMPLATE).unwrap();
    let source = Document::parse_xhtml(&large_source()).unwrap();
    let opts = options();

    c.bench_function("munge", |b| {
        b.iter(|| {
            let mut page = template.clone();
            munge(source.clone(), &mut page, &opts).unwrap();
            page
        });
    });
}

fn bench_munge_and_serialize(c: &mut Criterion) {
    let template = Document::parse_xhtml(TEMPLATE).unwrap();
    let source = fs::read_to_string(format!("{FIXTURES_DIR}/howto/deferreds.xhtml")).unwrap();
    let opts = options();

    c.bench_function("munge_and_serialize", |b| {
        b.iter(|| {
            let doc = Document::parse_xhtml(&source).unwrap();
            let mut page = template.clone();
            munge(doc, &mut page, &opts).unwrap();
            page.to_xhtml()
        });
    });
}

criterion_group!(
    benches,
    bench_parse_xhtml,
    bench_parse_html,
    bench_munge,
    bench_munge_and_serialize
);
criterion_main!(benches);
